//! Error types.
//!
//! Conversion errors carry the identity of the offending type and field so a
//! malformed tag can be traced back to its declaration.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TypeIdentity;

/// Result type alias for conversions.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Malformed tag syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("invalid tag syntax at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("tag key `{key}` appears more than once")]
    DuplicateKey { key: String },

    #[error("unknown json tag option `{option}`")]
    UnknownOption { option: String },

    #[error("ts_type override is empty")]
    EmptyTypeOverride,

    #[error("ts_transform `{template}` must contain `__VALUE__` exactly once, found {count}")]
    Placeholder { template: String, count: usize },
}

impl TagError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Failure of a whole conversion. No partial output is produced.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed tag on field `{field}` of `{owner}`: {source}")]
    MalformedTag {
        owner: TypeIdentity,
        field: String,
        #[source]
        source: TagError,
    },

    #[error("field `{field}` of `{owner}` references unregistered type `{identity}`")]
    UnregisteredType {
        owner: TypeIdentity,
        field: String,
        identity: TypeIdentity,
    },

    #[error("root type `{identity}` has no registered descriptor")]
    UnregisteredRoot { identity: TypeIdentity },

    #[error("`{owner}` embeds itself through field `{field}`")]
    RecursiveEmbedding { owner: TypeIdentity, field: String },
}

/// Error while discovering types from Rust source.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", display_origin(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: syn::Error,
    },

    #[error("failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", display_origin(.path))]
    InvalidToml {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },
}

/// Error persisting generated output.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read previous output {path}: {source}")]
    ReadExisting {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

fn display_origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<source string>".to_string(),
    }
}
