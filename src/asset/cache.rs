//! Filesystem-backed content cache for dumped assets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Asset, AssetError};
use crate::utils::{fs::write_atomic, hash};

/// Key/value store of files under one directory.
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FilesystemCache {
    dir: PathBuf,
}

impl FilesystemCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn has(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, AssetError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AssetError::Io(path, err)),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), AssetError> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(AssetError::CacheDir(self.dir.clone()));
        }
        let path = self.path(key);
        write_atomic(&path, value.as_bytes()).map_err(|err| AssetError::Io(path, err))
    }

    pub fn remove(&self, key: &str) -> Result<(), AssetError> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(AssetError::Io(path, err)),
            _ => Ok(()),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

/// Dumps an asset through a `FilesystemCache`.
///
/// The key covers sources, modification times and filters, so editing a
/// source produces a new entry instead of serving the stale one.
pub struct AssetCache<'a> {
    asset: &'a Asset,
    cache: &'a FilesystemCache,
}

impl<'a> AssetCache<'a> {
    pub fn new(asset: &'a Asset, cache: &'a FilesystemCache) -> Self {
        Self { asset, cache }
    }

    pub fn key(&self) -> String {
        hash::digest(&[self.asset.cache_key().as_str(), "dump"])
    }

    /// Cached content on hit; otherwise dump, store and return.
    pub fn dump(&self) -> Result<String, AssetError> {
        let key = self.key();
        if let Some(content) = self.cache.get(&key)? {
            return Ok(content);
        }
        let content = self.asset.dump()?;
        self.cache.set(&key, &content)?;
        Ok(content)
    }
}
