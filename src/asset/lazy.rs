//! Asset manager fed by formulae discovered in templates.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{Asset, AssetError, AssetFactory, AssetManager, AssetRegistry, Formula, Formulae};
use crate::debug;
use crate::template::{DirectoryResource, FormulaLoader, TemplateError};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no formula loader registered as `{0}`")]
    UnknownLoader(String),

    #[error("failed to walk template directory `{0}`")]
    Walk(PathBuf, #[source] io::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("asset `{name}` is declared with different formulae in `{first}` and `{second}`")]
    Conflict {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to build asset `{name}`")]
    Asset {
        name: String,
        #[source]
        source: AssetError,
    },
}

/// Assets built from every formula found in a set of template directories.
///
/// Resources are registered under a loader alias; `load` walks them all,
/// merges the formulae and builds one asset per name.
pub struct LazyAssetManager {
    factory: Arc<AssetFactory>,
    loaders: FxHashMap<String, Arc<dyn FormulaLoader>>,
    resources: Vec<(String, DirectoryResource)>,
    formulae: Formulae,
    assets: BTreeMap<String, Arc<Asset>>,
    loaded: bool,
}

impl LazyAssetManager {
    pub fn new(factory: Arc<AssetFactory>) -> Self {
        Self {
            factory,
            loaders: FxHashMap::default(),
            resources: Vec::new(),
            formulae: Formulae::new(),
            assets: BTreeMap::new(),
            loaded: false,
        }
    }

    pub fn set_loader(&mut self, alias: impl Into<String>, loader: Arc<dyn FormulaLoader>) {
        self.loaders.insert(alias.into(), loader);
    }

    pub fn add_resource(&mut self, resource: DirectoryResource, alias: impl Into<String>) {
        self.resources.push((alias.into(), resource));
    }

    /// Walk every resource, collect formulae and build their assets.
    ///
    /// `am` resolves `@name` inputs. Any walk, parse or build error aborts
    /// the load and leaves the manager empty.
    pub fn load(&mut self, am: &AssetManager) -> Result<(), DiscoveryError> {
        let mut formulae = Formulae::new();
        let mut origins: FxHashMap<String, PathBuf> = FxHashMap::default();

        for (alias, directory) in &self.resources {
            let loader = self
                .loaders
                .get(alias)
                .ok_or_else(|| DiscoveryError::UnknownLoader(alias.clone()))?;

            for resource in directory.iter() {
                let resource = resource
                    .map_err(|err| DiscoveryError::Walk(directory.root().to_path_buf(), err))?;
                for (name, formula) in loader.load(&resource)? {
                    if let Some(existing) = formulae.get(&name) {
                        if *existing != formula {
                            return Err(DiscoveryError::Conflict {
                                first: origins.get(&name).cloned().unwrap_or_default(),
                                second: resource.path.clone(),
                                name,
                            });
                        }
                        continue;
                    }
                    debug!("formula"; "{} in {}", name, resource.name);
                    origins.insert(name.clone(), resource.path.clone());
                    formulae.insert(name, formula);
                }
            }
        }

        let mut assets = BTreeMap::new();
        for (name, formula) in &formulae {
            let asset = self
                .factory
                .create_asset(formula, am)
                .map_err(|source| DiscoveryError::Asset {
                    name: name.clone(),
                    source,
                })?;
            assets.insert(name.clone(), Arc::new(asset));
        }

        self.formulae = formulae;
        self.assets = assets;
        self.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_formula(&self, name: &str) -> bool {
        self.formulae.contains_key(name)
    }

    pub fn get_formula(&self, name: &str) -> Option<&Formula> {
        self.formulae.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.formulae.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Asset>> {
        self.assets.get(name).cloned()
    }
}

impl AssetRegistry for LazyAssetManager {
    fn names(&self) -> Vec<String> {
        LazyAssetManager::names(self)
    }

    fn get(&self, name: &str) -> Option<Arc<Asset>> {
        LazyAssetManager::get(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::FilterManager;
    use crate::template::{FilesystemLoader, TagFormulaLoader, TemplateLoader};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        assets: PathBuf,
        templates: PathBuf,
    }

    fn fixture(templates: &[(&str, &str)]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("assets");
        let root = dir.path().join("templates");
        fs::create_dir_all(assets.join("css")).unwrap();
        fs::write(assets.join("css/a.css"), "a{}").unwrap();
        fs::write(assets.join("css/b.css"), "b{}").unwrap();
        for (path, content) in templates {
            let path = root.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        Fixture {
            _dir: dir,
            assets,
            templates: root,
        }
    }

    fn manager(fx: &Fixture) -> LazyAssetManager {
        let factory = Arc::new(AssetFactory::new(&fx.assets, false, FilterManager::with_builtins()));
        let loader: Arc<dyn TemplateLoader> =
            Arc::new(FilesystemLoader::new(vec![fx.templates.clone()]));
        let mut lam = LazyAssetManager::new(factory);
        lam.set_loader("twig", Arc::new(TagFormulaLoader::new()));
        lam.add_resource(DirectoryResource::new(loader, &fx.templates), "twig");
        lam
    }

    #[test]
    fn test_load_collects_formulae_across_templates() {
        let fx = fixture(&[
            ("a.html.twig", "{% stylesheets 'css/a.css' name='a' %}{% endstylesheets %}"),
            ("sub/b.html.twig", "{% stylesheets 'css/b.css' name='b' %}{% endstylesheets %}"),
            ("plain.html.twig", "<p>no assets</p>"),
        ]);
        let mut lam = manager(&fx);
        assert!(!lam.is_loaded());

        lam.load(&AssetManager::new()).unwrap();
        assert!(lam.is_loaded());
        assert_eq!(lam.names(), vec!["a", "b"]);
        assert!(lam.has_formula("b"));
        assert_eq!(lam.get_formula("a").unwrap().inputs, vec!["css/a.css"]);
        assert_eq!(lam.get("a").unwrap().target_path(), "css/a.css");
    }

    #[test]
    fn test_same_formula_in_two_templates_is_merged() {
        let tag = "{% stylesheets 'css/a.css' name='a' %}{% endstylesheets %}";
        let fx = fixture(&[("one.twig", tag), ("two.twig", tag)]);
        let mut lam = manager(&fx);
        lam.load(&AssetManager::new()).unwrap();
        assert_eq!(lam.names().len(), 1);
    }

    #[test]
    fn test_conflicting_formulae_fail() {
        let fx = fixture(&[
            ("one.twig", "{% stylesheets 'css/a.css' name='x' %}{% endstylesheets %}"),
            ("two.twig", "{% stylesheets 'css/b.css' name='x' %}{% endstylesheets %}"),
        ]);
        let err = manager(&fx).load(&AssetManager::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Conflict { name, .. } if name == "x"));
    }

    #[test]
    fn test_errors_abort_load() {
        let fx = fixture(&[(
            "a.twig",
            "{% stylesheets 'css/none.css' name='a' %}{% endstylesheets %}",
        )]);
        let mut lam = manager(&fx);
        let err = lam.load(&AssetManager::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Asset { .. }));
        assert!(lam.names().is_empty());

        let fx = fixture(&[("a.twig", "{% stylesheets 'css/a.css' %}")]);
        let err = manager(&fx).load(&AssetManager::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Template(TemplateError::Syntax { .. })));
    }

    #[test]
    fn test_missing_directory_and_loader() {
        let fx = fixture(&[]);
        let factory = Arc::new(AssetFactory::new(&fx.assets, false, FilterManager::new()));
        let loader: Arc<dyn TemplateLoader> = Arc::new(FilesystemLoader::new(vec![]));

        let mut lam = LazyAssetManager::new(Arc::clone(&factory));
        lam.set_loader("twig", Arc::new(TagFormulaLoader::new()));
        lam.add_resource(
            DirectoryResource::new(Arc::clone(&loader), Path::new("/nonexistent/templates")),
            "twig",
        );
        assert!(matches!(
            lam.load(&AssetManager::new()),
            Err(DiscoveryError::Walk(..))
        ));

        let mut lam = LazyAssetManager::new(factory);
        lam.add_resource(DirectoryResource::new(loader, &fx.templates), "php");
        assert!(matches!(
            lam.load(&AssetManager::new()),
            Err(DiscoveryError::UnknownLoader(alias)) if alias == "php"
        ));
    }
}
