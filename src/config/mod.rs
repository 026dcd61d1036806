//! Provider configuration management for `assetry.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assetic    # [assetic]
//! │   ├── twig       # [twig]
//! │   ├── serve      # [serve]
//! │   ├── filters    # [[filters]]
//! │   └── assets     # [[assets]]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # ProviderConfig (this file)
//! ```
//!
//! All relative paths are resolved against the directory holding the
//! config file.

pub mod section;
pub mod types;
mod util;

pub use section::{
    AssetDecl, AsseticConfig, FilterDecl, FilterKind, ServeConfig, TwigConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, log};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::{find_config_file, normalize_path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetry.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Asset pipeline options
    #[serde(default)]
    pub assetic: AsseticConfig,

    /// Template directories
    #[serde(default)]
    pub twig: TwigConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Named filter declarations
    #[serde(default)]
    pub filters: Vec<FilterDecl>,

    /// Named asset declarations
    #[serde(default)]
    pub assets: Vec<AssetDecl>,
}

impl ProviderConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;
        let config_path = normalize_path(&config_path);

        let content = fs::read_to_string(&config_path)
            .map_err(|err| ConfigError::Io(config_path.clone(), err))?;
        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, &config_path);
        }

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        config.finalize(&root);
        config.apply_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse, resolve paths against `root` and validate.
    ///
    /// Used when the configuration does not come from a file on disk.
    pub fn from_toml(content: &str, root: &Path) -> Result<Self> {
        let (mut config, _) = Self::parse_with_ignored(content)?;
        config.finalize(root);
        config.validate()?;
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

    /// Get path relative to the project root (for display).
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Resolve all paths relative to the root directory.
    fn finalize(&mut self, root: &Path) {
        self.root = normalize_path(root);
        let root = self.root.clone();
        self.assetic.normalize(&root);
        self.twig.normalize(&root);
    }

    /// Apply CLI overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        let common = cli.common();
        crate::logger::set_verbose(common.verbose);
        Self::update_option(&mut self.assetic.debug, common.debug.as_ref());

        if let crate::cli::Commands::Serve { interface, port, .. } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
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

        self.assetic.validate(&mut diag);
        self.serve.validate(&mut diag);
        section::validate_filters(&self.filters, &mut diag);
        section::validate_assets(&self.assets, &mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

/// Parse a config snippet without path resolution or validation.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> ProviderConfig {
    let (parsed, ignored) = ProviderConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
