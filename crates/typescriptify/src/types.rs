//! Type descriptors consumed by the converter.
//!
//! These are the ahead-of-time description of a Rust data model: every record
//! type declares its identity, its display name, and its fields with their
//! structural kind and tag metadata. Descriptors are normally produced by
//! `#[derive(TypeScriptify)]` or by the source extractor, but they can also be
//! built by hand.

use std::borrow::Cow;
use std::fmt;

use crate::tag::StructTag;

/// Identity of a record type.
///
/// Two declarations that share a display name but are distinct types have
/// distinct identities, so deduplication never merges them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentity(Cow<'static, str>);

impl TypeIdentity {
    pub fn new(identity: impl Into<Cow<'static, str>>) -> Self {
        Self(identity.into())
    }

    /// Identity of a Rust type, derived from its fully-qualified type name.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeIdentity {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeIdentity {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Structural kind of a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    /// Any integer or floating-point type.
    Number,
    /// Text, including single characters.
    String,
    /// A raw byte sequence.
    Bytes,
    /// Reference to a named record type.
    Record(TypeIdentity),
    /// Pointer indirection (`Option`, `Box`, `Rc`, `Arc`, `&T`).
    Pointer(Box<FieldKind>),
    /// Sequence or set of elements.
    Collection(Box<FieldKind>),
    /// Map or dictionary with key and value kinds.
    Map(Box<FieldKind>, Box<FieldKind>),
    /// Untyped value.
    Any,
}

impl FieldKind {
    pub fn record(identity: impl Into<TypeIdentity>) -> Self {
        FieldKind::Record(identity.into())
    }

    pub fn pointer(inner: FieldKind) -> Self {
        FieldKind::Pointer(Box::new(inner))
    }

    pub fn collection(inner: FieldKind) -> Self {
        FieldKind::Collection(Box::new(inner))
    }

    pub fn map(key: FieldKind, value: FieldKind) -> Self {
        FieldKind::Map(Box::new(key), Box::new(value))
    }

    /// Follow pointer indirections down to the first non-pointer kind.
    pub fn pointee(&self) -> &FieldKind {
        match self {
            FieldKind::Pointer(inner) => inner.pointee(),
            other => other,
        }
    }
}

/// A declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared identifier, used when no serialized name is tagged.
    pub name: String,
    pub kind: FieldKind,
    pub tag: StructTag,
    /// Whether the field's own fields are promoted into the owner.
    pub embedded: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            tag: StructTag::default(),
            embedded: false,
        }
    }

    /// Replace the raw tag text (`json:"name" ts_type:"Date"`).
    pub fn tag(mut self, raw: impl Into<String>) -> Self {
        self.tag = StructTag::new(raw);
        self
    }

    /// Append a `json` tag value, e.g. `"name,omitempty"` or `"-"`.
    pub fn json(mut self, value: &str) -> Self {
        self.tag.push("json", value);
        self
    }

    /// Append a `ts_type` override.
    pub fn ts_type(mut self, value: &str) -> Self {
        self.tag.push("ts_type", value);
        self
    }

    /// Append a `ts_transform` template.
    pub fn ts_transform(mut self, value: &str) -> Self {
        self.tag.push("ts_transform", value);
        self
    }

    /// Mark the field as an embedded member.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// A named record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub identity: TypeIdentity,
    /// Display name, used for the emitted class name.
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    /// The type supplies its own wire encoding, so its JSON shape cannot be
    /// inferred from its fields.
    pub custom_encoding: bool,
}

impl TypeDescriptor {
    pub fn new(identity: impl Into<TypeIdentity>, name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            name: name.into(),
            fields: Vec::new(),
            custom_encoding: false,
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn custom_encoding(mut self) -> Self {
        self.custom_encoding = true;
        self
    }
}
