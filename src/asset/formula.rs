//! Formula: the serializable recipe for building one named asset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::hash;

/// Formulae keyed by asset name.
pub type Formulae = BTreeMap<String, Formula>;

/// Recipe for one asset: source inputs, filter names and options.
///
/// Inputs are source-relative paths, globs with `*` in the file name, or
/// `@name` references to assets registered in the asset manager. Filter
/// names prefixed with `?` are skipped in debug mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub inputs: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub options: FormulaOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaOptions {
    /// Asset name; generated from the formula when absent.
    pub name: Option<String>,
    /// Output path relative to the web root. `*` is replaced by the name.
    pub output: Option<String>,
    /// Per-formula debug override.
    pub debug: Option<bool>,
}

impl Formula {
    pub fn new(inputs: Vec<String>, filters: Vec<String>) -> Self {
        Self {
            inputs,
            filters,
            options: FormulaOptions::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.options.output = Some(output.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.options.debug = Some(debug);
        self
    }

    /// Name derived from inputs, filters and output.
    ///
    /// Stable across runs, so a template without an explicit name keeps
    /// the same route between restarts.
    pub fn generated_name(&self) -> String {
        let mut key = String::new();
        for part in self.inputs.iter().chain(&self.filters) {
            key.push_str(part);
            key.push('\0');
        }
        if let Some(output) = &self.options.output {
            key.push_str(output);
        }
        hash::fingerprint(&key)
    }

    /// Entity tag for this formula at the given source modification time.
    ///
    /// Quoted, so it can be sent as-is in the `ETag` header.
    pub fn etag(&self, last_modified: Option<u64>) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Fingerprint<'a> {
            #[serde(flatten)]
            formula: &'a Formula,
            last_modified: Option<u64>,
        }

        let bytes = serde_json::to_vec(&Fingerprint {
            formula: self,
            last_modified,
        })?;
        let digest = hash::digest(&[bytes]);
        Ok(format!("\"{}\"", &digest[..32]))
    }
}
