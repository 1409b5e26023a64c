//! Writes TypeScript bindings for the example models.
//!
//! ```bash
//! # Bindings for the derived models, configured by ./typescriptify.toml
//! generate-bindings --output frontend/src/models.ts
//!
//! # Scan a source tree instead, keeping a copy of the previous output
//! generate-bindings --source src --backup-dir backup --prefix Api
//! ```
//!
//! Set `RUST_LOG=typescriptify=debug` for conversion details.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use typescriptify::{CONFIG_FILENAME, Converter, ConverterConfig};
use typescriptify_example::SearchPage;

#[derive(Parser, Debug)]
#[command(name = "generate-bindings")]
#[command(version, about = "Generate TypeScript classes for the example models", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Output file; overrides `output.path` from the configuration
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scan Rust sources in this directory instead of using the derived models
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Prefix for every class name
    #[arg(long)]
    prefix: Option<String>,

    /// Do not generate `createFrom` factories
    #[arg(long)]
    no_create_from: bool,

    /// Directory receiving a copy of the previous output
    #[arg(long)]
    backup_dir: Option<PathBuf>,

    /// Carry hand-written `//[Name:]` blocks over from the previous output
    #[arg(long)]
    preserve_custom_code: bool,
}

impl Cli {
    /// Layer the command line over the configuration file; flags win.
    fn apply(&self, config: &mut ConverterConfig) {
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if self.no_create_from {
            config.create_from = false;
        }
        if let Some(backup_dir) = &self.backup_dir {
            config.output.backup_dir = Some(backup_dir.clone());
        }
        if self.preserve_custom_code {
            config.output.preserve_custom_code = true;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = ConverterConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply(&mut config);

    let output = config
        .output
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from("generated/models.ts"));

    let mut converter = Converter::with_config(config);
    match &cli.source {
        Some(dir) => {
            converter
                .add_source_dir(dir)
                .with_context(|| format!("scanning {}", dir.display()))?;
        }
        None => {
            converter.add::<SearchPage>();
        }
    }

    let outcome = converter
        .convert_to_file(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        path = %outcome.path.display(),
        bytes = outcome.bytes,
        types = converter.schema().len(),
        "bindings written"
    );
    if let Some(backup) = &outcome.backup {
        info!(path = %backup.display(), "previous output backed up");
    }

    Ok(())
}
