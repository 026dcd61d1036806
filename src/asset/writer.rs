//! Write dumped assets to the web root.

use std::path::{Component, Path, PathBuf};

use parking_lot::Mutex;

use super::{Asset, AssetError, AssetRegistry};
use crate::freshness::is_output_fresh;
use crate::utils::fs::write_atomic;
use crate::debug;

/// Writes assets to `<dir>/<target_path>`.
///
/// Writes within the process are serialized; across processes they are
/// atomic renames of identical content, so concurrent flushes are harmless.
pub struct AssetWriter {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl AssetWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every asset of `registry`. Returns how many files were written.
    pub fn write_manager_assets(&self, registry: &dyn AssetRegistry) -> Result<usize, AssetError> {
        let mut written = 0;
        for name in registry.names() {
            let Some(asset) = registry.get(&name) else {
                continue;
            };
            if self.write_asset(&asset)? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Write one asset unless its output is already up to date.
    ///
    /// Returns `false` when the write was skipped.
    pub fn write_asset(&self, asset: &Asset) -> Result<bool, AssetError> {
        let path = self.output_path(asset.target_path())?;
        if is_output_fresh(&path, asset.last_modified()) {
            return Ok(false);
        }

        let content = asset.dump()?;
        let _guard = self.lock.lock();
        write_atomic(&path, content.as_bytes()).map_err(|err| AssetError::Io(path.clone(), err))?;
        debug!("assets"; "wrote {}", asset.target_path());
        Ok(true)
    }

    fn output_path(&self, target: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(target.trim_start_matches('/'));
        let is_contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if target.is_empty() || !is_contained {
            return Err(AssetError::InvalidTargetPath(target.to_string()));
        }
        Ok(self.dir.join(relative))
    }
}
