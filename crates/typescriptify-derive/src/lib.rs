//! Proc-macro providing `#[derive(TypeScriptify)]`.
//!
//! The derive implements `typescriptify::TsType` and `typescriptify::TsRecord`
//! for a struct with named fields, so it can be registered with
//! `Converter::add::<T>()`. Field attributes are written into the field's raw
//! tag text; the converter validates them when it runs.
//!
//! # Attributes
//!
//! Field level, `#[ts(...)]`:
//!
//! - `json = "name,omitempty"`: the `json` tag, verbatim (`"-"` excludes the field)
//! - `rename = "name"`: serialized name
//! - `ts_type = "Date"`: TypeScript type override; the Rust type is not inspected
//! - `ts_transform = "new Date(__VALUE__)"`: `createFrom` access expression
//! - `flatten`: splice the member's fields into this type
//! - `skip`: leave the field out
//!
//! `#[serde(rename = "...", skip, skip_serializing, skip_serializing_if = "...", flatten)]`
//! is honoured when no `ts` attribute says otherwise.
//!
//! Container level, `#[ts(...)]`: `rename = "Name"` for the class name, and
//! `custom_encoding` for types that serialize themselves. Enums and tuple
//! structs are always treated as custom-encoded.
//!
//! # Example
//!
//! ```rust,ignore
//! use typescriptify::{Converter, TypeScriptify};
//!
//! #[derive(TypeScriptify)]
//! struct Person {
//!     name: String,
//!     #[ts(ts_type = "Date", ts_transform = "new Date(__VALUE__)")]
//!     born: chrono::NaiveDate,
//!     friends: Vec<Box<Person>>,
//! }
//!
//! let code = Converter::new().add::<Person>().convert()?;
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr};

#[proc_macro_derive(TypeScriptify, attributes(ts, serde))]
pub fn derive_typescriptify(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

#[derive(Debug, Default)]
struct ContainerAttrs {
    rename: Option<String>,
    custom_encoding: bool,
}

#[derive(Debug, Default)]
struct FieldAttrs {
    json: Option<String>,
    rename: Option<String>,
    ts_type: Option<String>,
    ts_transform: Option<String>,
    flatten: bool,
    skip: bool,
    omit_empty: bool,
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

/// Consume the value of a nested meta item we do not interpret.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut parsed = ContainerAttrs::default();
    let mut serde_rename = None;

    for attr in attrs {
        if attr.path().is_ident("ts") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    parsed.rename = Some(string_value(&meta)?);
                } else if meta.path.is_ident("custom_encoding") {
                    parsed.custom_encoding = true;
                } else {
                    return Err(meta.error("unknown `ts` container attribute"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    serde_rename = Some(string_value(&meta)?);
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
    }

    if parsed.rename.is_none() {
        parsed.rename = serde_rename;
    }
    Ok(parsed)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    let mut serde = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("ts") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("json") {
                    parsed.json = Some(string_value(&meta)?);
                } else if meta.path.is_ident("rename") {
                    parsed.rename = Some(string_value(&meta)?);
                } else if meta.path.is_ident("ts_type") {
                    parsed.ts_type = Some(string_value(&meta)?);
                } else if meta.path.is_ident("ts_transform") {
                    parsed.ts_transform = Some(string_value(&meta)?);
                } else if meta.path.is_ident("flatten") {
                    parsed.flatten = true;
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else {
                    return Err(meta.error("unknown `ts` field attribute"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    serde.rename = Some(string_value(&meta)?);
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    serde.skip = true;
                } else if meta.path.is_ident("skip_serializing_if") {
                    serde.omit_empty = true;
                    skip_meta(&meta)?;
                } else if meta.path.is_ident("flatten") {
                    serde.flatten = true;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
    }

    parsed.rename = parsed.rename.or(serde.rename);
    parsed.skip |= serde.skip;
    parsed.flatten |= serde.flatten;
    parsed.omit_empty |= serde.omit_empty;
    Ok(parsed)
}

impl FieldAttrs {
    fn json_tag(&self, field_name: &str) -> Option<String> {
        if let Some(json) = &self.json {
            return Some(json.clone());
        }
        match (&self.rename, self.omit_empty) {
            (Some(name), true) => Some(format!("{name},omitempty")),
            (Some(name), false) => Some(name.clone()),
            (None, true) => Some(format!("{field_name},omitempty")),
            (None, false) => None,
        }
    }
}

fn derive_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "TypeScriptify cannot be derived for generic types",
        ));
    }

    let container = parse_container_attrs(&input.attrs)?;
    let name = container.rename.clone().unwrap_or_else(|| ident.to_string());

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) if !container.custom_encoding => Some(&named.named),
            Fields::Unit if !container.custom_encoding => None,
            _ => return Ok(custom_encoded(ident, &name)),
        },
        Data::Enum(_) => return Ok(custom_encoded(ident, &name)),
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "TypeScriptify cannot be derived for unions",
            ));
        }
    };

    let mut field_exprs = Vec::new();
    let mut visits = Vec::new();
    for field in named.into_iter().flatten() {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let field_name = field_ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let ty = &field.ty;

        // An overridden type is never inspected, so it needs no TsType impl.
        let kind = if attrs.ts_type.is_some() {
            quote!(::typescriptify::FieldKind::Any)
        } else {
            visits.push(quote!(<#ty as ::typescriptify::TsType>::visit(schema);));
            quote!(<#ty as ::typescriptify::TsType>::field_kind())
        };

        let json = attrs.json_tag(field_name).map(|json| quote!(.json(#json)));
        let ts_type = attrs.ts_type.as_ref().map(|t| quote!(.ts_type(#t)));
        let ts_transform = attrs.ts_transform.as_ref().map(|t| quote!(.ts_transform(#t)));
        let embedded = attrs.flatten.then(|| quote!(.embedded()));

        field_exprs.push(quote! {
            .field(
                ::typescriptify::FieldDescriptor::new(#field_name, #kind)
                    #json #ts_type #ts_transform #embedded
            )
        });
    }

    Ok(quote! {
        impl ::typescriptify::TsType for #ident {
            fn field_kind() -> ::typescriptify::FieldKind {
                ::typescriptify::FieldKind::Record(<Self as ::typescriptify::TsRecord>::identity())
            }

            fn visit(schema: &mut ::typescriptify::Schema) {
                if schema.insert(<Self as ::typescriptify::TsRecord>::descriptor()) {
                    #(#visits)*
                }
            }
        }

        impl ::typescriptify::TsRecord for #ident {
            fn identity() -> ::typescriptify::TypeIdentity {
                ::typescriptify::TypeIdentity::of::<Self>()
            }

            fn descriptor() -> ::typescriptify::TypeDescriptor {
                ::typescriptify::TypeDescriptor::new(Self::identity(), #name)
                    #(#field_exprs)*
            }
        }
    })
}

fn custom_encoded(ident: &syn::Ident, name: &str) -> TokenStream2 {
    quote! {
        impl ::typescriptify::TsType for #ident {
            fn field_kind() -> ::typescriptify::FieldKind {
                ::typescriptify::FieldKind::Record(<Self as ::typescriptify::TsRecord>::identity())
            }

            fn visit(schema: &mut ::typescriptify::Schema) {
                schema.insert(<Self as ::typescriptify::TsRecord>::descriptor());
            }
        }

        impl ::typescriptify::TsRecord for #ident {
            fn identity() -> ::typescriptify::TypeIdentity {
                ::typescriptify::TypeIdentity::of::<Self>()
            }

            fn descriptor() -> ::typescriptify::TypeDescriptor {
                ::typescriptify::TypeDescriptor::new(Self::identity(), #name).custom_encoding()
            }
        }
    }
}
