//! Boot: build the asset pipeline from configuration and expose every
//! template formula as an HTTP route.
//!
//! Services are constructed in dependency order:
//!
//! ```text
//! FilterManager ─▶ AssetFactory ─▶ AssetManager ([[assets]])
//!                        │                │
//!                        ▼                ▼
//!                 LazyAssetManager (template formulae)
//!                        │
//!                        ▼
//!          routes (AssetResponder) + after hook (AssetWriter)
//! ```

mod responder;

pub use responder::AssetResponder;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::asset::{AssetFactory, AssetManager, AssetWriter, FilterManager, LazyAssetManager};
use crate::config::{AssetDecl, ProviderConfig};
use crate::template::{
    CachedFormulaLoader, DirectoryResource, FilesystemLoader, FormulaLoader, TagFormulaLoader,
    TemplateLoader,
};
use crate::web::App;
use crate::{debug, log};

/// Alias under which template directories and their loader are registered.
const TWIG: &str = "twig";

/// One registered asset route.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub name: String,
    pub pattern: String,
    pub sources: Vec<PathBuf>,
}

/// Everything built at boot.
pub struct Provider {
    pub app: App,
    pub asset_manager: Arc<AssetManager>,
    pub lazy: Arc<LazyAssetManager>,
    pub writer: Arc<AssetWriter>,
    pub routes: Vec<RouteInfo>,
}

impl Provider {
    /// Write every asset of both managers to the web root.
    pub fn dump(&self) -> Result<usize> {
        flush(&self.writer, &self.lazy, &self.asset_manager)
    }
}

/// Boot with the built-in filters plus `[[filters]]` aliases.
pub fn boot(config: &ProviderConfig) -> Result<Provider> {
    boot_with(config, FilterManager::from_decls(&config.filters))
}

/// Boot with a caller-provided filter registry.
pub fn boot_with(config: &ProviderConfig, filters: FilterManager) -> Result<Provider> {
    let assetic = &config.assetic;
    let factory = Arc::new(AssetFactory::new(&assetic.asset_path, assetic.debug, filters));

    let asset_manager = build_asset_manager(&factory, &config.assets)?;
    let lazy = build_lazy_manager(config, Arc::clone(&factory), &asset_manager)?;
    let asset_manager = Arc::new(asset_manager);
    let lazy = Arc::new(lazy);

    let mut app = App::new();
    let routes = register_routes(
        &mut app,
        &lazy,
        assetic.debug,
        assetic.formulae_cache_dir.clone(),
    )?;

    let writer = Arc::new(AssetWriter::new(&assetic.path_to_web));
    {
        let writer = Arc::clone(&writer);
        let lazy = Arc::clone(&lazy);
        let asset_manager = Arc::clone(&asset_manager);
        app.after(Box::new(move |_, _| {
            flush(&writer, &lazy, &asset_manager).map(|_| ())
        }));
    }

    log!(
        "assets";
        "{} formulae, {} named assets, {} routes",
        lazy.names().len(),
        asset_manager.len(),
        routes.len()
    );

    Ok(Provider {
        app,
        asset_manager,
        lazy,
        writer,
        routes,
    })
}

fn build_asset_manager(factory: &AssetFactory, decls: &[AssetDecl]) -> Result<AssetManager> {
    let mut am = AssetManager::new();
    // declarations may reference earlier ones as `@name`
    for decl in decls {
        let asset = factory
            .create_asset(&decl.to_formula(), &am)
            .with_context(|| format!("failed to build asset `{}`", decl.name))?;
        am.set(&decl.name, asset);
    }
    Ok(am)
}

fn build_lazy_manager(
    config: &ProviderConfig,
    factory: Arc<AssetFactory>,
    am: &AssetManager,
) -> Result<LazyAssetManager> {
    let mut lazy = LazyAssetManager::new(factory);
    if !config.twig.is_enabled() {
        return Ok(lazy);
    }

    let loader: Arc<dyn TemplateLoader> = Arc::new(FilesystemLoader::new(config.twig.paths.clone()));
    let formula_loader: Arc<dyn FormulaLoader> = match &config.assetic.formulae_cache_dir {
        Some(dir) => Arc::new(CachedFormulaLoader::new(TagFormulaLoader::new(), dir)),
        None => Arc::new(TagFormulaLoader::new()),
    };
    lazy.set_loader(TWIG, formula_loader);
    for path in &config.twig.paths {
        lazy.add_resource(DirectoryResource::new(Arc::clone(&loader), path), TWIG);
    }

    lazy.load(am).context("failed to discover asset formulae")?;
    Ok(lazy)
}

/// Bind `_assetic_<name>` for every formula, plus `_assetic_<name>_<i>` per
/// leaf in debug mode.
///
/// Leaf routes follow the provider's debug mode only; a formula's own
/// `debug` option just decides which `?` filters it skips.
fn register_routes(
    app: &mut App,
    lazy: &Arc<LazyAssetManager>,
    debug: bool,
    cache_dir: Option<PathBuf>,
) -> Result<Vec<RouteInfo>> {
    let mut routes = Vec::new();

    for name in lazy.names() {
        let Some(asset) = lazy.get(&name) else {
            continue;
        };

        let mut bindings = vec![(format!("_assetic_{name}"), Arc::clone(&asset))];
        if debug {
            for (idx, leaf) in asset.leaves().into_iter().enumerate() {
                bindings.push((format!("_assetic_{name}_{idx}"), Arc::new(leaf)));
            }
        }

        for (route, asset) in bindings {
            let pattern = format!("/{}", asset.target_path());
            let info = RouteInfo {
                name: route.clone(),
                pattern: pattern.clone(),
                sources: asset.sources(),
            };
            let responder =
                AssetResponder::new(&name, asset, Arc::clone(lazy), cache_dir.clone());
            app.get(&route, &pattern, responder.into_handler())?;
            debug!("route"; "{} {}", route, pattern);
            routes.push(info);
        }
    }

    Ok(routes)
}

fn flush(writer: &AssetWriter, lazy: &LazyAssetManager, am: &AssetManager) -> Result<usize> {
    let written = writer.write_manager_assets(lazy)? + writer.write_manager_assets(am)?;
    if written > 0 {
        debug!("dump"; "wrote {} assets to {}", written, writer.dir().display());
    }
    Ok(written)
}
