//! Template source loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::TemplateError;
use crate::freshness::mtime_secs;

/// Source access for templates, shared by every `Resource` it produced.
pub trait TemplateLoader: Send + Sync {
    /// Full source text of the template at `path`.
    fn source(&self, path: &Path) -> Result<String, TemplateError>;

    /// Modification time in unix seconds, `None` when unknown.
    fn mtime(&self, path: &Path) -> Option<u64>;
}

/// Loads templates from a fixed list of directories.
///
/// Relative paths are looked up in each root in order. Absolute paths must
/// lie inside one of the roots.
#[derive(Debug, Clone)]
pub struct FilesystemLoader {
    roots: Vec<PathBuf>,
}

impl FilesystemLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, TemplateError> {
        if path.is_absolute() {
            return if self.roots.iter().any(|root| path.starts_with(root)) {
                Ok(path.to_path_buf())
            } else {
                Err(TemplateError::OutsideRoots(path.to_path_buf()))
            };
        }
        if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(TemplateError::OutsideRoots(path.to_path_buf()));
        }
        self.roots
            .iter()
            .map(|root| root.join(path))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| TemplateError::NotFound(path.to_path_buf()))
    }
}

impl TemplateLoader for FilesystemLoader {
    fn source(&self, path: &Path) -> Result<String, TemplateError> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound(full),
            _ => TemplateError::Io(full, err),
        })
    }

    fn mtime(&self, path: &Path) -> Option<u64> {
        self.resolve(path).ok().and_then(|full| mtime_secs(&full))
    }
}
