//! Converter configuration.
//!
//! Every option has a default, so a TOML file only needs to name what it
//! changes:
//!
//! ```toml
//! prefix = "Api"
//! create_from = false
//!
//! [output]
//! path = "frontend/src/models.ts"
//! backup_dir = "frontend/backup"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "typescriptify.toml";

/// Options controlling the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Prefix declarations with `export`.
    pub export: bool,

    /// Generate a `static createFrom(source: any)` factory in every class.
    pub create_from: bool,

    /// Prepended to every emitted class name and every reference to it.
    pub prefix: String,

    /// One level of indentation.
    pub indent: String,

    /// Verbatim text placed before the first class.
    pub prologue: Option<String>,

    /// Verbatim text placed after the last class.
    pub epilogue: Option<String>,

    /// Render `omitempty` fields as optional properties (`name?: type`).
    pub optional_omitempty: bool,

    pub output: OutputConfig,
}

/// Where and how generated text is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target file.
    pub path: Option<PathBuf>,

    /// Directory receiving a timestamped copy of the previous target file.
    pub backup_dir: Option<PathBuf>,

    /// Comment line written at the top of the file.
    pub header: Option<String>,

    /// Carry `//[Name:]` blocks over from the previous target file.
    pub preserve_custom_code: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            export: true,
            create_from: true,
            prefix: String::new(),
            indent: "    ".to_string(),
            prologue: None,
            epilogue: None,
            optional_omitempty: false,
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            backup_dir: None,
            header: Some("/* Do not change, this code is generated from Rust types */".to_string()),
            preserve_custom_code: false,
        }
    }
}

impl ConverterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::InvalidToml { path: None, source })
    }

    /// Load a configuration file.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::InvalidToml {
            path: Some(path.to_path_buf()),
            source,
        })
    }
}
