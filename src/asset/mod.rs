//! Asset pipeline: formulae, filters, asset trees and their managers.
//!
//! # Module Structure
//!
//! ```text
//! asset/
//! ├── formula    # Formula, Formulae (serializable recipes)
//! ├── node       # Asset, FileAsset, AssetCollection
//! ├── filter     # Filter trait, FilterManager, built-in filters
//! ├── minify     # oxc / lightningcss backends
//! ├── factory    # AssetFactory (formula -> asset)
//! ├── manager    # AssetManager, AssetRegistry
//! ├── lazy       # LazyAssetManager (formulae from templates)
//! ├── cache      # FilesystemCache, AssetCache
//! ├── writer     # AssetWriter
//! └── error      # AssetError, FilterError
//! ```

mod cache;
mod error;
mod factory;
mod filter;
mod formula;
mod lazy;
mod manager;
mod minify;
mod node;
mod writer;

pub use cache::{AssetCache, FilesystemCache};
pub use error::{AssetError, FilterError};
pub use factory::AssetFactory;
pub use filter::{Filter, FilterContext, FilterManager, NamedFilter};
pub use formula::{Formula, FormulaOptions, Formulae};
pub use lazy::{DiscoveryError, LazyAssetManager};
pub use manager::{AssetManager, AssetRegistry};
pub use node::{Asset, AssetCollection, FileAsset};
pub use writer::AssetWriter;
