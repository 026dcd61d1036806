//! Named asset registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Asset;

/// Read access shared by the asset managers, used by the writer.
pub trait AssetRegistry {
    /// Asset names, sorted.
    fn names(&self) -> Vec<String>;

    fn get(&self, name: &str) -> Option<Arc<Asset>>;
}

/// Assets registered by name, typically from `[[assets]]` declarations.
#[derive(Debug, Default)]
pub struct AssetManager {
    assets: BTreeMap<String, Arc<Asset>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `asset` under `name`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, asset: Asset) {
        self.assets.insert(name.into(), Arc::new(asset));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Asset>> {
        self.assets.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetRegistry for AssetManager {
    fn names(&self) -> Vec<String> {
        AssetManager::names(self)
    }

    fn get(&self, name: &str) -> Option<Arc<Asset>> {
        AssetManager::get(self, name)
    }
}
