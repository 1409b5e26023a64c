//! # typescriptify
//!
//! TypeScript class generator for Rust data models. Every record type becomes
//! a TypeScript `class` with one property per serialized field, plus an
//! optional `static createFrom(source: any)` factory that rebuilds typed
//! instances, nested objects and arrays included, from parsed or raw JSON.
//!
//! ## Features
//!
//! - Discovers every record type reachable from the registered roots,
//!   including self-referencing and mutually recursive types
//! - Dependencies are emitted before the classes that use them
//! - Per-field `json`, `ts_type` and `ts_transform` tags, embedded members,
//!   well-known type mappings and a name prefix
//! - Source file scanning for build scripts, with `use` import resolution and
//!   an extensible type registry
//! - Hand-written code blocks that survive regeneration
//!
//! ## Quick Start
//!
//! ### Using `#[derive(TypeScriptify)]`
//!
//! ```rust,ignore
//! use typescriptify::{Converter, TypeScriptify};
//!
//! #[derive(TypeScriptify)]
//! struct Address {
//!     city: String,
//!     #[ts(json = "postal_code,omitempty")]
//!     postal_code: Option<String>,
//! }
//!
//! #[derive(TypeScriptify)]
//! struct Person {
//!     name: String,
//!     addresses: Vec<Address>,
//!     #[ts(ts_type = "Date", ts_transform = "new Date(__VALUE__)")]
//!     born: chrono::NaiveDate,
//! }
//!
//! let code = Converter::new().add::<Person>().convert()?;
//! ```
//!
//! ### Describing types by hand
//!
//! ```rust
//! use typescriptify::{Converter, FieldDescriptor, FieldKind, TypeDescriptor};
//!
//! let mut converter = Converter::new();
//! converter
//!     .set_create_from(false)
//!     .define(
//!         TypeDescriptor::new("app::Address", "Address")
//!             .field(FieldDescriptor::new("City", FieldKind::String).json("city")),
//!     )
//!     .add_type(
//!         TypeDescriptor::new("app::Person", "Person").field(
//!             FieldDescriptor::new(
//!                 "Addresses",
//!                 FieldKind::collection(FieldKind::record("app::Address")),
//!             )
//!             .json("addresses"),
//!         ),
//!     );
//!
//! let code = converter.convert().unwrap();
//! assert!(code.contains("addresses: Address[];"));
//! ```
//!
//! ### Scanning sources in `build.rs`
//!
//! ```no_run
//! use typescriptify::Converter;
//!
//! fn main() {
//!     Converter::new()
//!         .add_source_file("src/lib.rs").unwrap()
//!         .convert_to_file("generated/models.ts").unwrap();
//!
//!     println!("cargo:rerun-if-changed=src/lib.rs");
//! }
//! ```
//!
//! ## Type Mappings
//!
//! | Rust Type | FieldKind | TypeScript Type |
//! |-----------|-----------|-----------------|
//! | `bool` | `Bool` | `boolean` |
//! | integers, `f32`, `f64` | `Number` | `number` |
//! | `String`, `&str`, `char` | `String` | `string` |
//! | `Option<T>`, `Box<T>`, `Rc<T>`, `Arc<T>` | `Pointer(T)` | `T` |
//! | `Vec<T>`, `[T; N]`, sets | `Collection(T)` | `T[]` |
//! | `HashMap<K, V>`, `BTreeMap<K, V>` | `Map(K, V)` | `any` |
//! | derived records | `Record(identity)` | class name |
//! | `#[ts(custom_encoding)]` types, enums | | `any` |

mod collector;
mod config;
mod converter;
mod emitter;
mod error;
mod extractor;
pub mod registry;
mod resolver;
mod schema;
mod tag;
mod traits;
mod types;
mod writer;

pub use config::{CONFIG_FILENAME, ConverterConfig, OutputConfig};
pub use converter::Converter;
pub use error::{ConfigError, ConvertError, ConvertResult, ExtractError, TagError, WriteError};
pub use registry::{TypeMapping, TypeRegistry};
pub use resolver::{FALLBACK, NestedRecord, ResolvedField, TypeOverride};
pub use schema::Schema;
pub use tag::{JsonField, JsonTag, PLACEHOLDER, StructTag, TagOptions};
pub use traits::{TsRecord, TsType};
pub use types::{FieldDescriptor, FieldKind, TypeDescriptor, TypeIdentity};
pub use writer::{OutputWriter, WriteOutcome, extract_custom_code, read_custom_code};

#[cfg(feature = "derive")]
pub use typescriptify_derive::TypeScriptify;
