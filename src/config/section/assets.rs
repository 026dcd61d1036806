//! `[[assets]]` declarations.
//!
//! Named assets registered in the asset manager at boot. They are written
//! to `path_to_web` after every request, and templates may pull them into
//! their own formulae as `@name`.
//!
//! ```toml
//! [[assets]]
//! name = "vendor_js"
//! inputs = ["js/vendor/*.js"]
//! filters = ["?jsmin"]
//! output = "js/vendor.js"
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::asset::Formula;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDecl {
    pub name: String,
    pub inputs: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub output: Option<String>,
}

impl AssetDecl {
    /// Formula for this declaration. The output defaults to `assetic/<name>`.
    pub fn to_formula(&self) -> Formula {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| format!("assetic/{}", self.name));
        Formula::new(self.inputs.clone(), self.filters.clone())
            .with_name(&self.name)
            .with_output(output)
    }
}

pub fn validate_assets(assets: &[AssetDecl], diag: &mut ConfigDiagnostics) {
    let mut seen = FxHashSet::default();

    for (idx, asset) in assets.iter().enumerate() {
        let name = asset.name.as_str();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid {
            diag.error_with_hint(
                FieldPath::indexed("assets", idx, "name"),
                format!("invalid asset name `{name}`"),
                "use letters, digits, `_` and `-`",
            );
        } else if !seen.insert(name) {
            diag.error(
                FieldPath::indexed("assets", idx, "name"),
                format!("duplicate asset name `{name}`"),
            );
        }

        if asset.inputs.is_empty() {
            diag.error(
                FieldPath::indexed("assets", idx, "inputs"),
                "at least one input is required",
            );
        }
    }
}
