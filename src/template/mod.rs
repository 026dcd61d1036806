//! Template integration: loading template sources, walking template
//! directories and extracting asset formulae from them.
//!
//! ```text
//! DirectoryResource ──iter()──▶ Resource ──FormulaLoader::load()──▶ Formulae
//!                                  │
//!                                  └── TemplateLoader (source, mtime)
//! ```

mod error;
mod formula;
mod loader;
mod resource;

pub use error::TemplateError;
pub use formula::{CachedFormulaLoader, FormulaLoader, TagFormulaLoader};
pub use loader::{FilesystemLoader, TemplateLoader};
pub use resource::{DirectoryResource, Resource, ResourceIter};
