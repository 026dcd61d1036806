//! `[twig]` section configuration.
//!
//! ```toml
//! [twig]
//! paths = ["templates", "vendor/theme/templates"]
//! ```
//!
//! Every directory is walked at boot for `{% stylesheets %}` and
//! `{% javascripts %}` formulae. An empty list disables template discovery.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwigConfig {
    pub paths: Vec<PathBuf>,
}

impl TwigConfig {
    pub fn normalize(&mut self, root: &Path) {
        self.paths = self
            .paths
            .iter()
            .map(|p| crate::config::util::normalize_path(&root.join(p)))
            .collect();
    }

    /// Whether template integration is present.
    pub fn is_enabled(&self) -> bool {
        !self.paths.is_empty()
    }
}
