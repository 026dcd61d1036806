//! `[[filters]]` declarations.
//!
//! Built-in filters are always registered under their kind name
//! (`cssmin`, `jsmin`, `cssrewrite`). Declarations add extra names:
//!
//! ```toml
//! [[filters]]
//! name = "yui_css"
//! kind = "cssmin"
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Filter implementations shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// CSS minification (lightningcss).
    Cssmin,
    /// JavaScript minification (oxc).
    Jsmin,
    /// Rebase relative `url(...)` references to the target path.
    Cssrewrite,
}

impl FilterKind {
    pub const ALL: [Self; 3] = [Self::Cssmin, Self::Jsmin, Self::Cssrewrite];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cssmin => "cssmin",
            Self::Jsmin => "jsmin",
            Self::Cssrewrite => "cssrewrite",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterDecl {
    pub name: String,
    pub kind: FilterKind,
}

/// Validate filter declarations: unique names, no shadowing of built-ins.
pub fn validate_filters(filters: &[FilterDecl], diag: &mut ConfigDiagnostics) {
    let mut seen = FxHashSet::default();

    for (idx, filter) in filters.iter().enumerate() {
        let field = FieldPath::indexed("filters", idx, "name");
        let name = filter.name.as_str();

        if name.is_empty() || name.contains(['?', ',', ' ']) {
            diag.error(field, format!("invalid filter name `{name}`"));
        } else if FilterKind::ALL.iter().any(|k| k.name() == name) {
            diag.error_with_hint(
                field,
                format!("`{name}` is a built-in filter"),
                "built-in filters are registered automatically",
            );
        } else if !seen.insert(name) {
            diag.error(field, format!("duplicate filter name `{name}`"));
        }
    }
}
