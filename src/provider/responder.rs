//! Serve one asset with caching headers and conditional GET.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::asset::{Asset, AssetCache, AssetError, FilesystemCache, LazyAssetManager};
use crate::utils::date::{DateTimeUtc, http_date};
use crate::utils::mime;
use crate::web::{Handler, Request, Response};

/// Handler behind every `_assetic_*` route.
///
/// `name` is the formula the asset was built from; leaf routes carry the
/// name of their parent formula so they share its `ETag` derivation.
pub struct AssetResponder {
    name: String,
    asset: Arc<Asset>,
    lazy: Arc<LazyAssetManager>,
    cache_dir: Option<PathBuf>,
}

impl AssetResponder {
    pub fn new(
        name: impl Into<String>,
        asset: Arc<Asset>,
        lazy: Arc<LazyAssetManager>,
        cache_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            asset,
            lazy,
            cache_dir,
        }
    }

    pub fn respond(&self, request: &Request) -> Result<Response> {
        let mut response = Response::default();
        response.set_header("Expires", DateTimeUtc::now().to_http());

        if let Some(content_type) = mime::from_path(self.asset.target_path()) {
            response.set_header("Content-Type", content_type);
        }

        let last_modified = self.asset.last_modified();
        if let Some(secs) = last_modified {
            response.set_header("Last-Modified", http_date(secs));
        }

        if let Some(formula) = self.lazy.get_formula(&self.name) {
            response.set_header("ETag", formula.etag(last_modified)?);
        }

        if response.is_not_modified(request) {
            response.set_not_modified();
            return Ok(response);
        }

        let dir = self.cache_dir.as_ref().ok_or(AssetError::CacheNotConfigured)?;
        let cache = FilesystemCache::new(dir);
        let content = AssetCache::new(&self.asset, &cache).dump()?;
        response.set_body(content);
        Ok(response)
    }

    pub fn into_handler(self) -> Handler {
        Box::new(move |request| self.respond(request))
    }
}
