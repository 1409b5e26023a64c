//! Persisting generated text.
//!
//! The writer backs up any file already at the target path, then writes the
//! new text. It also recovers the hand-written `//[Name:]` ... `//[end]`
//! blocks of a previous output so they survive regeneration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::WriteError;

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub bytes: usize,
    /// Where the previous file was copied, if there was one to back up.
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    backup_dir: Option<PathBuf>,
    header: Option<String>,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            backup_dir: config.backup_dir.clone(),
            header: config.header.clone(),
        }
    }

    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Write `content` to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path, content: &str) -> Result<WriteOutcome, WriteError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let backup = match &self.backup_dir {
            Some(dir) if path.exists() => Some(self.back_up(path, dir)?),
            _ => None,
        };

        let mut text = String::new();
        if let Some(header) = &self.header {
            text.push_str(header);
            text.push_str("\n\n");
        }
        text.push_str(content);

        std::fs::write(path, &text).map_err(|source| WriteError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = text.len(), "wrote bindings");

        Ok(WriteOutcome {
            path: path.to_path_buf(),
            bytes: text.len(),
            backup,
        })
    }

    fn back_up(&self, path: &Path, dir: &Path) -> Result<PathBuf, WriteError> {
        std::fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let stamp = Local::now().format("%Y-%m-%dT%H_%M_%S%.3f");
        let backup = dir.join(format!("{file_name}-{stamp}.backup"));

        std::fs::copy(path, &backup).map_err(|source| WriteError::Backup {
            path: path.to_path_buf(),
            backup: backup.clone(),
            source,
        })?;
        info!(from = %path.display(), to = %backup.display(), "backed up previous output");
        Ok(backup)
    }
}

/// Collect the custom code blocks of a generated file, keyed by class name.
///
/// Trailing whitespace of each block is dropped, which makes regeneration
/// stable.
pub fn extract_custom_code(text: &str) -> HashMap<String, String> {
    let mut blocks = HashMap::new();
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed == "//[end]" {
            if let Some((name, code)) = current.take() {
                blocks.insert(name, code.trim_end().to_string());
            }
        } else if let Some((_, code)) = current.as_mut() {
            code.push_str(line);
            code.push('\n');
        } else if let Some(name) = trimmed
            .strip_prefix("//[")
            .and_then(|rest| rest.strip_suffix(":]"))
        {
            current = Some((name.to_string(), String::new()));
        }
    }

    blocks
}

/// Read the custom code blocks of the file at `path`, if it exists.
pub fn read_custom_code(path: &Path) -> Result<HashMap<String, String>, WriteError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let text = std::fs::read_to_string(path).map_err(|source| WriteError::ReadExisting {
        path: path.to_path_buf(),
        source,
    })?;
    let blocks = extract_custom_code(&text);
    debug!(path = %path.display(), blocks = blocks.len(), "read custom code");
    Ok(blocks)
}
