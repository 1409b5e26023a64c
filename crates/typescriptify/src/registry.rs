//! Registry mapping Rust type paths to field kinds.
//!
//! The source extractor only sees type syntax, so it needs a table telling it
//! what `std::collections::HashMap<K, V>` or `uuid::Uuid` look like on the
//! wire. Built-in mappings cover std containers and the usual serde-friendly
//! crates; users can add, replace or remove entries.

use std::collections::HashMap;

use crate::types::FieldKind;

/// How a registered Rust path maps to a [`FieldKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMapping {
    /// A fixed kind; type arguments are ignored.
    Kind(FieldKind),
    /// Transparent wrapper around its first type argument.
    Pointer,
    /// Sequence or set of its first type argument.
    Collection,
    /// Map from its first type argument to its second.
    Map,
}

impl TypeMapping {
    /// Number of type arguments the mapping consumes.
    pub fn arity(&self) -> usize {
        match self {
            TypeMapping::Kind(_) => 0,
            TypeMapping::Pointer | TypeMapping::Collection => 1,
            TypeMapping::Map => 2,
        }
    }

    /// Build the kind from the kinds of the consumed type arguments.
    ///
    /// Missing arguments resolve to [`FieldKind::Any`].
    pub fn resolve(&self, mut args: Vec<FieldKind>) -> FieldKind {
        args.resize(self.arity(), FieldKind::Any);
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or(FieldKind::Any);
        match self {
            TypeMapping::Kind(kind) => kind.clone(),
            TypeMapping::Pointer => FieldKind::pointer(next()),
            TypeMapping::Collection => FieldKind::collection(next()),
            TypeMapping::Map => {
                let key = next();
                FieldKind::map(key, next())
            }
        }
    }
}

/// Fully-qualified Rust type path -> [`TypeMapping`].
///
/// # Built-in mappings
///
/// | Rust type | Kind |
/// |-----------|------|
/// | `Option<T>`, `Box<T>`, `Rc<T>`, `Arc<T>`, `Cow<T>`, `triomphe::Arc<T>` | pointer to `T` |
/// | `Vec<T>`, `VecDeque<T>`, `LinkedList<T>`, `BinaryHeap<T>`, `HashSet<T>`, `BTreeSet<T>` | collection of `T` |
/// | `indexmap::IndexSet<T>`, `hashbrown::HashSet<T>`, `smallvec::SmallVec<[T; N]>`, `thin_vec::ThinVec<T>`, `arrayvec::ArrayVec<T, N>`, `tinyvec::TinyVec<[T; N]>` | collection of `T` |
/// | `HashMap<K, V>`, `BTreeMap<K, V>`, `indexmap::IndexMap<K, V>`, `hashbrown::HashMap<K, V>`, `serde_json::Map<K, V>` | map |
/// | `uuid::Uuid`, `chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime}`, `rust_decimal::Decimal`, `smol_str::SmolStr`, `compact_str::CompactString`, `PathBuf`, `IpAddr`, `SocketAddr` | string |
/// | `NonZeroU32` and the other `std::num::NonZero*` types | number |
/// | `bytes::Bytes`, `bytes::BytesMut`, `serde_bytes::ByteBuf` | bytes |
/// | `serde_json::Value` | any |
///
/// # Custom mappings
///
/// ```
/// use typescriptify::{Converter, FieldKind, TypeMapping};
///
/// let mut converter = Converter::new();
/// converter.register_type("my_crate::Id", TypeMapping::Kind(FieldKind::String));
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    mappings: HashMap<String, TypeMapping>,
}

impl TypeRegistry {
    /// Create an empty registry with no mappings.
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in mappings.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    pub fn register_builtins(&mut self) {
        for path in [
            "std::option::Option",
            "std::boxed::Box",
            "std::rc::Rc",
            "std::sync::Arc",
            "std::borrow::Cow",
            "alloc::boxed::Box",
            "alloc::rc::Rc",
            "alloc::sync::Arc",
            "triomphe::Arc",
        ] {
            self.register(path, TypeMapping::Pointer);
        }

        for path in [
            "std::vec::Vec",
            "std::collections::VecDeque",
            "std::collections::LinkedList",
            "std::collections::BinaryHeap",
            "std::collections::HashSet",
            "std::collections::BTreeSet",
            "alloc::vec::Vec",
            "hashbrown::HashSet",
            "indexmap::IndexSet",
            "smallvec::SmallVec",
            "thin_vec::ThinVec",
            "arrayvec::ArrayVec",
            "tinyvec::TinyVec",
        ] {
            self.register(path, TypeMapping::Collection);
        }

        for path in [
            "std::collections::HashMap",
            "std::collections::BTreeMap",
            "hashbrown::HashMap",
            "indexmap::IndexMap",
            "serde_json::Map",
        ] {
            self.register(path, TypeMapping::Map);
        }

        for path in [
            "uuid::Uuid",
            "chrono::DateTime",
            "chrono::NaiveDate",
            "chrono::NaiveDateTime",
            "chrono::NaiveTime",
            "rust_decimal::Decimal",
            "smol_str::SmolStr",
            "compact_str::CompactString",
            "std::path::PathBuf",
            "std::net::IpAddr",
            "std::net::Ipv4Addr",
            "std::net::Ipv6Addr",
            "std::net::SocketAddr",
        ] {
            self.register(path, TypeMapping::Kind(FieldKind::String));
        }

        for width in ["8", "16", "32", "64", "128", "size"] {
            self.register(
                format!("std::num::NonZeroU{width}"),
                TypeMapping::Kind(FieldKind::Number),
            );
            self.register(
                format!("std::num::NonZeroI{width}"),
                TypeMapping::Kind(FieldKind::Number),
            );
        }

        for path in ["bytes::Bytes", "bytes::BytesMut", "serde_bytes::ByteBuf"] {
            self.register(path, TypeMapping::Kind(FieldKind::Bytes));
        }

        self.register("serde_json::Value", TypeMapping::Kind(FieldKind::Any));
    }

    /// Register a mapping for a fully-qualified Rust type path, replacing any
    /// existing one.
    pub fn register(&mut self, path: impl Into<String>, mapping: TypeMapping) {
        self.mappings.insert(path.into(), mapping);
    }

    pub fn get(&self, path: &str) -> Option<&TypeMapping> {
        self.mappings.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.mappings.contains_key(path)
    }

    pub fn unregister(&mut self, path: &str) -> Option<TypeMapping> {
        self.mappings.remove(path)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
