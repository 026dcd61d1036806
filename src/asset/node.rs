//! Asset tree: single files and collections of files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::filter::{FilterContext, NamedFilter};
use super::{AssetError, FilterError};
use crate::freshness::mtime_secs;
use crate::utils::hash;

/// One source file under the asset root.
#[derive(Debug, Clone)]
pub struct FileAsset {
    source_root: PathBuf,
    /// Relative to `source_root`.
    source_path: PathBuf,
    target_path: String,
    filters: Vec<NamedFilter>,
}

impl FileAsset {
    pub fn new(source_root: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let target_path = source_path.to_string_lossy().replace('\\', "/");
        Self {
            source_root: source_root.into(),
            source_path,
            target_path,
            filters: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<NamedFilter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn full_path(&self) -> PathBuf {
        self.source_root.join(&self.source_path)
    }

    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    pub fn set_target_path(&mut self, target_path: impl Into<String>) {
        self.target_path = target_path.into();
    }

    pub fn filters(&self) -> &[NamedFilter] {
        &self.filters
    }

    pub fn last_modified(&self) -> Option<u64> {
        mtime_secs(&self.full_path())
    }

    /// Read the source and run `filters` followed by `extra` over it.
    ///
    /// `target` is where the content will be served from, which differs
    /// from this leaf's own target path when it is part of a collection.
    fn dump_to(&self, target: &str, extra: &[NamedFilter]) -> Result<String, AssetError> {
        let full = self.full_path();
        let mut content = fs::read_to_string(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => AssetError::SourceNotFound(full.clone()),
            _ => AssetError::Io(full.clone(), err),
        })?;

        let ctx = FilterContext {
            source_path: &self.source_path,
            target_path: target,
        };
        let filters = || self.filters.iter().chain(extra);
        let failed = |f: &NamedFilter| {
            let filter = f.name.clone();
            let target = target.to_string();
            move |source: FilterError| AssetError::Filter {
                filter,
                target,
                source,
            }
        };

        for f in filters() {
            content = f.filter.filter_load(content, &ctx).map_err(failed(f))?;
        }
        for f in filters() {
            content = f.filter.filter_dump(content, &ctx).map_err(failed(f))?;
        }
        Ok(content)
    }
}

/// Ordered leaves bundled into one target, with filters applied to each.
#[derive(Debug, Clone)]
pub struct AssetCollection {
    leaves: Vec<FileAsset>,
    target_path: String,
    filters: Vec<NamedFilter>,
}

impl AssetCollection {
    pub fn new(leaves: Vec<FileAsset>, target_path: impl Into<String>, filters: Vec<NamedFilter>) -> Self {
        Self {
            leaves,
            target_path: target_path.into(),
            filters,
        }
    }

    pub fn leaves(&self) -> &[FileAsset] {
        &self.leaves
    }

    pub fn filters(&self) -> &[NamedFilter] {
        &self.filters
    }
}

#[derive(Debug, Clone)]
pub enum Asset {
    File(FileAsset),
    Collection(AssetCollection),
}

impl Asset {
    pub fn target_path(&self) -> &str {
        match self {
            Self::File(file) => file.target_path(),
            Self::Collection(coll) => &coll.target_path,
        }
    }

    /// Newest source modification time, in unix seconds.
    ///
    /// `None` when no leaf has a readable source.
    pub fn last_modified(&self) -> Option<u64> {
        match self {
            Self::File(file) => file.last_modified(),
            Self::Collection(coll) => coll.leaves.iter().filter_map(FileAsset::last_modified).max(),
        }
    }

    /// Produce the filtered content.
    pub fn dump(&self) -> Result<String, AssetError> {
        match self {
            Self::File(file) => file.dump_to(file.target_path(), &[]),
            Self::Collection(coll) => {
                let parts = coll
                    .leaves
                    .iter()
                    .map(|leaf| leaf.dump_to(&coll.target_path, &coll.filters))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join("\n"))
            }
        }
    }

    /// Leaves in traversal order, as standalone assets.
    ///
    /// Collection filters are appended to each leaf's own filters so a leaf
    /// served on its own looks like its slice of the bundle.
    pub fn leaves(&self) -> Vec<Self> {
        self.file_leaves().into_iter().map(Self::File).collect()
    }

    pub fn file_leaves(&self) -> Vec<FileAsset> {
        match self {
            Self::File(file) => vec![file.clone()],
            Self::Collection(coll) => coll
                .leaves
                .iter()
                .map(|leaf| {
                    let mut leaf = leaf.clone();
                    leaf.filters.extend(coll.filters.iter().cloned());
                    leaf
                })
                .collect(),
        }
    }

    /// Number of file leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::File(_) => 1,
            Self::Collection(coll) => coll.leaves.len(),
        }
    }

    /// Absolute paths of every source file.
    pub fn sources(&self) -> Vec<PathBuf> {
        match self {
            Self::File(file) => vec![file.full_path()],
            Self::Collection(coll) => coll.leaves.iter().map(FileAsset::full_path).collect(),
        }
    }

    /// Filter names applied to the asset as a whole.
    pub fn filter_names(&self) -> Vec<&str> {
        let filters = match self {
            Self::File(file) => &file.filters,
            Self::Collection(coll) => &coll.filters,
        };
        filters.iter().map(|f| f.name.as_str()).collect()
    }

    /// Key identifying the dumped content: target path, and for every leaf
    /// its source, modification time and filter chain.
    pub fn cache_key(&self) -> String {
        let mut parts = vec![self.target_path().to_string()];
        parts.extend(self.filter_names().into_iter().map(str::to_string));
        let leaves: &[FileAsset] = match self {
            Self::File(file) => std::slice::from_ref(file),
            Self::Collection(coll) => &coll.leaves,
        };
        for leaf in leaves {
            parts.push(leaf.full_path().to_string_lossy().into_owned());
            parts.push(leaf.last_modified().map(|t| t.to_string()).unwrap_or_default());
            parts.extend(leaf.filters.iter().map(|f| f.name.clone()));
        }
        hash::digest(&parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Filter;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Upper;

    impl Filter for Upper {
        fn filter_dump(&self, content: String, _: &FilterContext<'_>) -> Result<String, FilterError> {
            Ok(content.to_uppercase())
        }
    }

    struct Broken;

    impl Filter for Broken {
        fn filter_load(&self, _: String, _: &FilterContext<'_>) -> Result<String, FilterError> {
            Err(FilterError::new("boom"))
        }
    }

    fn named(name: &str, filter: Arc<dyn Filter>) -> NamedFilter {
        NamedFilter {
            name: name.into(),
            filter,
        }
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/a.css"), "a{}").unwrap();
        fs::write(dir.path().join("css/b.css"), "b{}").unwrap();
        dir
    }

    fn collection(root: &Path, filters: Vec<NamedFilter>) -> Asset {
        Asset::Collection(AssetCollection::new(
            vec![FileAsset::new(root, "css/a.css"), FileAsset::new(root, "css/b.css")],
            "css/app.css",
            filters,
        ))
    }

    #[test]
    fn test_collection_dump_applies_filters_per_leaf() {
        let dir = fixture();
        let asset = collection(dir.path(), vec![named("upper", Arc::new(Upper))]);
        assert_eq!(asset.dump().unwrap(), "A{}\nB{}");
        assert_eq!(asset.leaf_count(), 2);
        assert_eq!(asset.filter_names(), vec!["upper"]);
    }

    #[test]
    fn test_leaves_inherit_collection_filters() {
        let dir = fixture();
        let asset = collection(dir.path(), vec![named("upper", Arc::new(Upper))]);
        let leaves = asset.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[1].dump().unwrap(), "B{}");
        assert_eq!(leaves[0].target_path(), "css/a.css");
    }

    #[test]
    fn test_last_modified_is_newest_leaf() {
        let dir = fixture();
        let asset = collection(dir.path(), vec![]);
        let a = mtime_secs(&dir.path().join("css/a.css"));
        let b = mtime_secs(&dir.path().join("css/b.css"));
        assert_eq!(asset.last_modified(), a.max(b));
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let asset = Asset::File(FileAsset::new(dir.path(), "gone.css"));
        assert_eq!(asset.last_modified(), None);
        assert!(matches!(asset.dump(), Err(AssetError::SourceNotFound(_))));
    }

    #[test]
    fn test_filter_error_names_filter() {
        let dir = fixture();
        let asset = Asset::File(
            FileAsset::new(dir.path(), "css/a.css").with_filters(vec![named("broken", Arc::new(Broken))]),
        );
        match asset.dump() {
            Err(AssetError::Filter { filter, target, .. }) => {
                assert_eq!(filter, "broken");
                assert_eq!(target, "css/a.css");
            }
            other => panic!("expected filter error, got {other:?}"),
        }
    }

    #[test]
    fn test_cache_key_tracks_filters_and_target() {
        let dir = fixture();
        let plain = collection(dir.path(), vec![]);
        let filtered = collection(dir.path(), vec![named("upper", Arc::new(Upper))]);
        assert_eq!(plain.cache_key(), collection(dir.path(), vec![]).cache_key());
        assert_ne!(plain.cache_key(), filtered.cache_key());

        let mut file = FileAsset::new(dir.path(), "css/a.css");
        let before = Asset::File(file.clone()).cache_key();
        file.set_target_path("css/other.css");
        assert_ne!(before, Asset::File(file).cache_key());
    }
}
