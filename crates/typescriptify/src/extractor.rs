//! Source scanner that registers types annotated with
//! `#[derive(TypeScriptify)]`.
//!
//! This is the build-script path: instead of compiling the model crate, the
//! converter parses its source and builds descriptors from the syntax. Field
//! attributes are read the same way the derive reads them (`#[ts(...)]`, with
//! `#[serde(...)]` as a fallback), and type paths are resolved through the
//! [`TypeRegistry`](crate::registry::TypeRegistry).
//!
//! ## Use-item analysis
//!
//! Each file's `use` items and type aliases are collected into a map from
//! local name to fully-qualified path:
//!
//! - `use std::collections::BTreeMap` maps `"BTreeMap"` to `"std::collections::BTreeMap"`
//! - `use indexmap::IndexMap as Ordered` maps `"Ordered"` to `"indexmap::IndexMap"`
//! - `use typescriptify::TypeScriptify as Ts` makes `#[derive(Ts)]` a marker
//!
//! ## Record references
//!
//! A field type naming another marked type resolves to that record when the
//! type is part of the same scan or already registered on the converter. Scan
//! files that refer to each other together with
//! [`add_source_dir`](Converter::add_source_dir). Anything else the registry
//! does not know is logged and falls back to `any`.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use syn::punctuated::Punctuated;
use syn::{Attribute, Fields, GenericArgument, Meta, PathArguments, Type, TypePath, UseTree};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::Converter;
use crate::error::ExtractError;
use crate::types::{FieldDescriptor, FieldKind, TypeDescriptor, TypeIdentity};

/// The fully-qualified derive marker path that triggers type extraction.
const MARKER: &str = "typescriptify::TypeScriptify";

/// Per-file map from local name to fully-qualified path, built from `use`
/// items and type aliases. Glob imports can't be resolved statically and are
/// not tracked.
struct SourceContext {
    imports: HashMap<String, String>,
}

fn collect_imports(tree: &UseTree, prefix: &[String], imports: &mut HashMap<String, String>) {
    match tree {
        UseTree::Path(p) => {
            let mut nested = prefix.to_vec();
            nested.push(p.ident.to_string());
            collect_imports(&p.tree, &nested, imports);
        }
        UseTree::Name(n) => {
            let name = n.ident.to_string();
            imports.insert(name.clone(), join_path(prefix, &name));
        }
        UseTree::Rename(r) => {
            imports.insert(r.rename.to_string(), join_path(prefix, &r.ident.to_string()));
        }
        UseTree::Glob(_) => {}
        UseTree::Group(g) => {
            for item in &g.items {
                collect_imports(item, prefix, imports);
            }
        }
    }
}

fn join_path(prefix: &[String], name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", prefix.join("::"), name)
    }
}

fn path_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

fn build_source_context(file: &syn::File) -> SourceContext {
    let mut imports = HashMap::new();

    for item in &file.items {
        match item {
            syn::Item::Use(item_use) => collect_imports(&item_use.tree, &[], &mut imports),
            // `type Ids = std::collections::BTreeSet<u64>` maps "Ids" to the set.
            syn::Item::Type(item_type) => {
                if let Type::Path(TypePath { path, .. }) = &*item_type.ty
                    && path.segments.len() > 1
                {
                    imports.insert(item_type.ident.to_string(), path_string(path));
                }
            }
            _ => {}
        }
    }

    SourceContext { imports }
}

/// Recognizes `#[derive(TypeScriptify)]` under `use typescriptify::TypeScriptify`,
/// any qualified path ending in `::TypeScriptify`, and import aliases of the
/// marker.
fn has_marker_derive(attrs: &[Attribute], ctx: &SourceContext) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("derive")
            && attr
                .parse_args_with(Punctuated::<syn::Path, syn::Token![,]>::parse_terminated)
                .is_ok_and(|paths| {
                    paths.iter().any(|path| {
                        if path.segments.len() == 1 {
                            let ident = path.segments[0].ident.to_string();
                            ctx.imports.get(&ident).is_some_and(|p| p == MARKER)
                        } else {
                            let qualified = path_string(path);
                            qualified == MARKER || qualified.ends_with("::TypeScriptify")
                        }
                    })
                })
    })
}

/// Prelude names that resolve without an import.
fn prelude_path(ident: &str) -> Option<&'static str> {
    match ident {
        "Vec" => Some("std::vec::Vec"),
        "Option" => Some("std::option::Option"),
        "Box" => Some("std::boxed::Box"),
        _ => None,
    }
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

#[derive(Debug, Default)]
struct ContainerAttrs {
    rename: Option<String>,
    custom_encoding: bool,
}

fn string_value(meta: &Meta) -> syn::Result<Option<String>> {
    match meta {
        Meta::NameValue(nv) => match &nv.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) => Ok(Some(s.value())),
            other => Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        _ => Ok(None),
    }
}

fn nested_meta(attr: &Attribute) -> syn::Result<Punctuated<Meta, syn::Token![,]>> {
    attr.parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("ts") {
            for meta in nested_meta(attr)? {
                let key = path_string(meta.path());
                match key.as_str() {
                    "json" => parsed.json = string_value(&meta)?,
                    "rename" => parsed.rename = string_value(&meta)?,
                    "ts_type" => parsed.ts_type = string_value(&meta)?,
                    "ts_transform" => parsed.ts_transform = string_value(&meta)?,
                    "flatten" => parsed.flatten = true,
                    "skip" => parsed.skip = true,
                    _ => return Err(syn::Error::new_spanned(meta, "unknown `ts` field attribute")),
                }
            }
        } else if attr.path().is_ident("serde") {
            // Only the serde options that change the JSON shape are read.
            for meta in nested_meta(attr)? {
                let key = path_string(meta.path());
                match key.as_str() {
                    "rename" if parsed.rename.is_none() => {
                        parsed.rename = string_value(&meta)?;
                    }
                    "flatten" => parsed.flatten = true,
                    "skip" | "skip_serializing" => parsed.skip = true,
                    "skip_serializing_if" => parsed.omit_empty = true,
                    _ => {}
                }
            }
        }
    }

    Ok(parsed)
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut parsed = ContainerAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("ts") {
            for meta in nested_meta(attr)? {
                let key = path_string(meta.path());
                match key.as_str() {
                    "rename" => parsed.rename = string_value(&meta)?,
                    "custom_encoding" => parsed.custom_encoding = true,
                    _ => {
                        return Err(syn::Error::new_spanned(
                            meta,
                            "unknown `ts` container attribute",
                        ));
                    }
                }
            }
        } else if attr.path().is_ident("serde") {
            for meta in nested_meta(attr)? {
                if meta.path().is_ident("rename") && parsed.rename.is_none() {
                    parsed.rename = string_value(&meta)?;
                }
            }
        }
    }

    Ok(parsed)
}

impl FieldAttrs {
    /// The `json` tag value implied by the attributes, if any.
    fn json_tag(&self, field_name: &str) -> Option<String> {
        if self.skip {
            return Some("-".to_string());
        }
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

/// Type resolution state for one source file.
struct Extraction<'a> {
    converter: &'a Converter,
    ctx: &'a SourceContext,
    /// Marked type names of the whole scan.
    known: &'a HashSet<String>,
}

impl Extraction<'_> {
    fn field_kind(&self, ty: &Type, owner: &str, field: &str) -> FieldKind {
        match ty {
            Type::Path(TypePath { qself: None, path }) => self.path_kind(path, owner, field),
            Type::Reference(reference) => self.field_kind(&reference.elem, owner, field),
            Type::Paren(paren) => self.field_kind(&paren.elem, owner, field),
            Type::Group(group) => self.field_kind(&group.elem, owner, field),
            Type::Array(array) => {
                FieldKind::collection(self.field_kind(&array.elem, owner, field))
            }
            Type::Slice(slice) => {
                FieldKind::collection(self.field_kind(&slice.elem, owner, field))
            }
            _ => {
                warn!(owner, field, "unsupported field type syntax, falling back to any");
                FieldKind::Any
            }
        }
    }

    fn path_kind(&self, path: &syn::Path, owner: &str, field: &str) -> FieldKind {
        let Some(segment) = path.segments.last() else {
            return FieldKind::Any;
        };
        let raw_ident = segment.ident.to_string();

        // Multi-segment paths are taken as written; single names go through
        // the imports, then the prelude.
        let full_path = if path.segments.len() > 1 {
            path_string(path)
        } else {
            self.ctx
                .imports
                .get(&raw_ident)
                .cloned()
                .or_else(|| prelude_path(&raw_ident).map(str::to_string))
                .unwrap_or_else(|| raw_ident.clone())
        };

        match full_path.as_str() {
            "bool" => return FieldKind::Bool,
            "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8" | "i16" | "i32" | "i64"
            | "i128" | "isize" | "f32" | "f64" => return FieldKind::Number,
            "String" | "std::string::String" | "alloc::string::String" | "str" | "char" => {
                return FieldKind::String;
            }
            _ => {}
        }

        if let Some(mapping) = self.converter.registry.get(&full_path) {
            let inline_array = matches!(
                full_path.as_str(),
                "smallvec::SmallVec" | "tinyvec::TinyVec"
            );
            let args = type_args(segment, inline_array)
                .into_iter()
                .take(mapping.arity())
                .map(|ty| self.field_kind(ty, owner, field))
                .collect();
            return mapping.resolve(args);
        }

        let identity = TypeIdentity::new(raw_ident.clone());
        if self.known.contains(&raw_ident) || self.converter.schema().contains(&identity) {
            return FieldKind::Record(identity);
        }

        warn!(owner, field, ty = %full_path, "unknown field type, falling back to any");
        FieldKind::Any
    }
}

/// Type arguments of a path segment; lifetimes and const arguments are
/// skipped. With `inline_array`, `[T; N]` arguments unwrap to `T`
/// (`SmallVec<[T; N]>`).
fn type_args(segment: &syn::PathSegment, inline_array: bool) -> Vec<&Type> {
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return vec![];
    };

    args.args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(Type::Array(array)) if inline_array => Some(array.elem.as_ref()),
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

/// Build the descriptor for a marked struct.
fn extract_struct(
    item: &syn::ItemStruct,
    extraction: &Extraction<'_>,
) -> syn::Result<Option<TypeDescriptor>> {
    let ident = item.ident.to_string();
    if item.generics.type_params().next().is_some() {
        warn!(ty = %ident, "generic types are not supported, skipping");
        return Ok(None);
    }

    let container = parse_container_attrs(&item.attrs)?;
    let name = container.rename.clone().unwrap_or_else(|| ident.clone());
    let mut descriptor = TypeDescriptor::new(ident.clone(), name);

    let named = match &item.fields {
        Fields::Named(named) if !container.custom_encoding => named,
        Fields::Unit if !container.custom_encoding => return Ok(Some(descriptor)),
        _ => {
            // Tuple structs serialize as their contents, not as objects.
            debug!(ty = %ident, "registering as custom-encoded");
            return Ok(Some(descriptor.custom_encoding()));
        }
    };

    for field in &named.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let field_name = field_ident.to_string().trim_start_matches("r#").to_string();
        let attrs = parse_field_attrs(&field.attrs)?;
        let json = attrs.json_tag(&field_name);

        // An overridden type is never inspected, so it is not resolved either.
        let kind = if attrs.ts_type.is_some() {
            FieldKind::Any
        } else {
            extraction.field_kind(&field.ty, &ident, &field_name)
        };

        let mut descriptor_field = FieldDescriptor::new(field_name, kind);
        if let Some(json) = json {
            descriptor_field = descriptor_field.json(&json);
        }
        if let Some(ts_type) = &attrs.ts_type {
            descriptor_field = descriptor_field.ts_type(ts_type);
        }
        if let Some(ts_transform) = &attrs.ts_transform {
            descriptor_field = descriptor_field.ts_transform(ts_transform);
        }
        if attrs.flatten {
            descriptor_field = descriptor_field.embedded();
        }
        descriptor.fields.push(descriptor_field);
    }

    Ok(Some(descriptor))
}

/// Marked enums have no class shape; they are registered as custom-encoded so
/// fields referring to them fall back to `any` unless overridden.
fn extract_enum(item: &syn::ItemEnum) -> syn::Result<TypeDescriptor> {
    let ident = item.ident.to_string();
    let container = parse_container_attrs(&item.attrs)?;
    let name = container.rename.unwrap_or_else(|| ident.clone());
    Ok(TypeDescriptor::new(ident, name).custom_encoding())
}

struct ParsedSource {
    path: Option<PathBuf>,
    file: syn::File,
}

fn parse_source(path: Option<PathBuf>, source: &str) -> Result<ParsedSource, ExtractError> {
    match syn::parse_file(source) {
        Ok(file) => Ok(ParsedSource { path, file }),
        Err(source) => Err(ExtractError::Parse { path, source }),
    }
}

/// Register every marked type of `sources` as a root, in source order.
fn register_sources(
    converter: &mut Converter,
    sources: &[ParsedSource],
) -> Result<usize, ExtractError> {
    let mut known = HashSet::new();
    for source in sources {
        let ctx = build_source_context(&source.file);
        for item in &source.file.items {
            match item {
                syn::Item::Struct(s) if has_marker_derive(&s.attrs, &ctx) => {
                    known.insert(s.ident.to_string());
                }
                syn::Item::Enum(e) if has_marker_derive(&e.attrs, &ctx) => {
                    known.insert(e.ident.to_string());
                }
                _ => {}
            }
        }
    }

    let mut descriptors = Vec::new();
    for source in sources {
        let ctx = build_source_context(&source.file);
        let extraction = Extraction {
            converter,
            ctx: &ctx,
            known: &known,
        };
        let parse_error = |err: syn::Error| ExtractError::Parse {
            path: source.path.clone(),
            source: err,
        };

        for item in &source.file.items {
            match item {
                syn::Item::Struct(s) if has_marker_derive(&s.attrs, &ctx) => {
                    if let Some(descriptor) =
                        extract_struct(s, &extraction).map_err(parse_error)?
                    {
                        descriptors.push(descriptor);
                    }
                }
                syn::Item::Enum(e) if has_marker_derive(&e.attrs, &ctx) => {
                    descriptors.push(extract_enum(e).map_err(parse_error)?);
                }
                _ => {}
            }
        }
    }

    let count = descriptors.len();
    for descriptor in descriptors {
        converter.add_type(descriptor);
    }
    Ok(count)
}

fn read_source(path: &Path) -> Result<ParsedSource, ExtractError> {
    let source = fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(Some(path.to_path_buf()), &source)
}

impl Converter {
    /// Parse Rust source from a string and register its marked types.
    pub fn add_source_str(&mut self, source: &str) -> Result<&mut Self, ExtractError> {
        let parsed = parse_source(None, source)?;
        let count = register_sources(self, &[parsed])?;
        debug!(types = count, "extracted types from source string");
        Ok(self)
    }

    /// Parse a single Rust source file and register its marked types.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use typescriptify::Converter;
    ///
    /// let mut converter = Converter::new();
    /// converter.add_source_file("src/models.rs")?;
    /// converter.convert_to_file("frontend/src/models.ts")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_source_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ExtractError> {
        let path = path.as_ref();
        let parsed = read_source(path)?;
        let count = register_sources(self, &[parsed])?;
        debug!(path = %path.display(), types = count, "extracted types");
        Ok(self)
    }

    /// Recursively scan a directory for `.rs` files, in file name order, and
    /// register their marked types.
    pub fn add_source_dir(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ExtractError> {
        let mut sources = Vec::new();
        for entry in WalkDir::new(path.as_ref()).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "rs") {
                sources.push(read_source(path)?);
            }
        }
        let count = register_sources(self, &sources)?;
        debug!(
            path = %path.as_ref().display(),
            files = sources.len(),
            types = count,
            "extracted types from directory"
        );
        Ok(self)
    }
}
