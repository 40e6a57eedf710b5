//! Lab configuration management for `lab.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── content    # [content]
//! │   ├── sandbox    # [sandbox]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # LabConfig (this file)
//! ```
//!
//! The config file is optional. Without one every section takes its
//! defaults and the current directory is the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{ContentConfig, SandboxConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing lab.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabConfig {
    /// Absolute path to the config file, which may not exist (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Content root, curriculum and guide files
    #[serde(default)]
    pub content: ContentConfig,

    /// Sandboxed document settings
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl LabConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when there is no config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.finalize(cli, &root);
        config.validate()?;

        Ok(config)
    }

    /// Set the root, apply CLI overrides and resolve paths.
    fn finalize(&mut self, cli: &Cli, root: &Path) {
        self.root = crate::utils::path::normalize_path(root);
        self.apply_command_options(cli);
        self.content.normalize(&self.root);
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        Self::update_option(&mut self.content.root, cli.content.as_ref());

        match &cli.command {
            Commands::Serve { interface, port } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            Commands::Run { args } => {
                Self::update_option(&mut self.sandbox.target, args.target.as_ref());
            }
            Commands::Fetch { .. } | Commands::Lookup { .. } => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.serve.validate(&mut diag);
        self.content.validate(&mut diag);
        self.sandbox.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a config snippet. Panics on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> LabConfig {
    let (parsed, ignored) = LabConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_invalid_toml() {
        assert!(LabConfig::parse_with_ignored("[serve\nport = 1").is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[serve]\nport = 4000\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = LabConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.serve.port, 4000);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.toml");
        fs::write(&path, "[sandbox]\ntitle = \"Scratch\"").unwrap();

        let config = LabConfig::from_path(&path).unwrap();
        assert_eq!(config.sandbox.title, "Scratch");

        assert!(LabConfig::from_path(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["lab", "-c", "lib", "serve", "-p", "9000"]);

        let mut config = test_parse_config("[serve]\nport = 4000\ninterface = \"0.0.0.0\"");
        config.finalize(&cli, dir.path());

        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.serve.interface.to_string(), "0.0.0.0");
        assert!(config.content.root.ends_with("lib"));
        assert!(config.content.root.is_absolute());
    }

    #[test]
    fn test_run_target_override() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["lab", "run", "--ts", "a.ts", "-t", "es2020"]);

        let mut config = LabConfig::default();
        config.finalize(&cli, dir.path());
        assert_eq!(config.sandbox.target, "es2020");
    }

    #[test]
    fn test_defaults_validate() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["lab", "lookup", "html"]);

        let mut config = LabConfig::default();
        config.finalize(&cli, dir.path());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_sandbox_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["lab", "lookup", "html"]);

        let mut config =
            test_parse_config("[sandbox]\nflags = [\"allow-scripts\", \"allow-forms\"]");
        config.finalize(&cli, dir.path());
        assert!(config.validate().is_err());
    }
}
