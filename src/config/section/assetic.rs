//! `[assetic]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assetic]
//! debug = false                        # per-leaf routes, `?filter` skipping
//! formulae_cache_dir = "cache/assetic" # dumped assets + parsed formulae
//! asset_path = "assets"                # where formula inputs are resolved
//! path_to_web = "web"                  # where compiled assets are written
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsseticConfig {
    /// Register one extra route per leaf of every bundle.
    pub debug: bool,

    /// Directory for the filesystem asset cache. Required to serve assets.
    pub formulae_cache_dir: Option<PathBuf>,

    /// Root directory of asset sources.
    pub asset_path: PathBuf,

    /// Output directory compiled assets are written to.
    pub path_to_web: PathBuf,
}

impl Default for AsseticConfig {
    fn default() -> Self {
        Self {
            debug: false,
            formulae_cache_dir: None,
            asset_path: "assets".into(),
            path_to_web: "web".into(),
        }
    }
}

impl AsseticConfig {
    pub fn normalize(&mut self, root: &Path) {
        use crate::config::util::normalize_path;

        self.asset_path = normalize_path(&root.join(&self.asset_path));
        self.path_to_web = normalize_path(&root.join(&self.path_to_web));
        if let Some(dir) = self.formulae_cache_dir.take() {
            self.formulae_cache_dir = Some(normalize_path(&root.join(dir)));
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.asset_path.is_dir() {
            diag.error_with_hint(
                FieldPath::new("assetic.asset_path"),
                format!("directory `{}` does not exist", self.asset_path.display()),
                "formula inputs are resolved against this directory",
            );
        }

        if self.path_to_web.as_os_str().is_empty() {
            diag.error(FieldPath::new("assetic.path_to_web"), "must not be empty");
        }

        if let Some(dir) = &self.formulae_cache_dir
            && dir.exists()
            && !dir.is_dir()
        {
            diag.error(
                FieldPath::new("assetic.formulae_cache_dir"),
                format!("`{}` exists but is not a directory", dir.display()),
            );
        }
    }
}
