//! Build assets from formulae.
//!
//! # Inputs
//!
//! | Form              | Meaning                                      |
//! |-------------------|----------------------------------------------|
//! | `css/a.css`       | file relative to the asset root              |
//! | `js/vendor/*.js`  | glob in the file-name segment, sorted        |
//! | `@vendor_js`      | leaves of an asset in the `AssetManager`     |
//!
//! Filter names prefixed with `?` are skipped when the formula is built in
//! debug mode.

use std::fs;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

use super::{
    Asset, AssetCollection, AssetError, AssetManager, FileAsset, FilterManager, Formula,
    NamedFilter,
};

const DEFAULT_OUTPUT: &str = "assetic/*";

pub struct AssetFactory {
    root: PathBuf,
    debug: bool,
    filters: FilterManager,
}

impl AssetFactory {
    pub fn new(root: impl Into<PathBuf>, debug: bool, filters: FilterManager) -> Self {
        Self {
            root: root.into(),
            debug,
            filters,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filters(&self) -> &FilterManager {
        &self.filters
    }

    /// Whether `formula` is built in debug mode.
    pub fn debug_for(&self, formula: &Formula) -> bool {
        formula.options.debug.unwrap_or(self.debug)
    }

    /// Name the asset built from `formula` is registered under.
    pub fn name_for(&self, formula: &Formula) -> String {
        formula
            .options
            .name
            .clone()
            .unwrap_or_else(|| formula.generated_name())
    }

    /// Build the asset described by `formula`.
    ///
    /// `@name` inputs are resolved against `am`. The result is always a
    /// collection; in it each leaf gets its own target path
    /// `dir/stem_part_<n>_<file>` so it can be served on its own.
    pub fn create_asset(&self, formula: &Formula, am: &AssetManager) -> Result<Asset, AssetError> {
        let debug = self.debug_for(formula);
        let name = self.name_for(formula);
        let output = formula
            .options
            .output
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT)
            .replace('*', &name);
        let target = output.trim_start_matches('/').to_string();

        let filters = self.resolve_filters(&formula.filters, debug)?;

        let mut leaves = Vec::new();
        for input in &formula.inputs {
            leaves.extend(self.parse_input(input, am)?);
        }
        for (idx, leaf) in leaves.iter_mut().enumerate() {
            let part = part_target(&target, idx, leaf.source_path());
            leaf.set_target_path(part);
        }

        Ok(Asset::Collection(AssetCollection::new(leaves, target, filters)))
    }

    fn resolve_filters(&self, names: &[String], debug: bool) -> Result<Vec<NamedFilter>, AssetError> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let (name, optional) = match name.strip_prefix('?') {
                Some(stripped) => (stripped, true),
                None => (name.as_str(), false),
            };
            let filter = self
                .filters
                .get(name)
                .ok_or_else(|| AssetError::UnknownFilter(name.to_string()))?;
            if optional && debug {
                continue;
            }
            resolved.push(NamedFilter {
                name: name.to_string(),
                filter,
            });
        }
        Ok(resolved)
    }

    fn parse_input(&self, input: &str, am: &AssetManager) -> Result<Vec<FileAsset>, AssetError> {
        if let Some(reference) = input.strip_prefix('@') {
            let asset = am
                .get(reference)
                .ok_or_else(|| AssetError::UnknownAsset(reference.to_string()))?;
            return Ok(asset.file_leaves());
        }

        let relative = Path::new(input);
        if input.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AssetError::InvalidInput(input.to_string()));
        }

        if input.contains('*') {
            return self.expand_glob(input);
        }

        let full = self.root.join(relative);
        if !full.is_file() {
            return Err(AssetError::SourceNotFound(full));
        }
        Ok(vec![FileAsset::new(&self.root, relative)])
    }

    /// Files in one directory whose names match a `*` pattern, sorted.
    fn expand_glob(&self, pattern: &str) -> Result<Vec<FileAsset>, AssetError> {
        let (dir, file_pattern) = pattern.rsplit_once('/').unwrap_or(("", pattern));
        if dir.contains('*') {
            return Err(AssetError::InvalidInput(pattern.to_string()));
        }

        let regex = glob_regex(file_pattern)?;
        let dir_path = self.root.join(dir);
        let entries = match fs::read_dir(&dir_path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(AssetError::Io(dir_path, err)),
        };

        let mut matched = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| AssetError::Io(dir_path.clone(), err))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if regex.is_match(file_name) && entry.path().is_file() {
                matched.push(file_name.to_string());
            }
        }
        matched.sort_unstable();

        Ok(matched
            .into_iter()
            .map(|file| FileAsset::new(&self.root, Path::new(dir).join(file)))
            .collect())
    }
}

fn glob_regex(pattern: &str) -> Result<Regex, AssetError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("[^/]*");
    Regex::new(&format!("^{body}$")).map_err(|_| AssetError::InvalidInput(pattern.to_string()))
}

/// `css/app.css` + leaf 0 `lib/a.css` -> `css/app_part_1_a.css`
fn part_target(target: &str, idx: usize, source: &Path) -> String {
    let (dir, file) = match target.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, target),
    };
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let leaf = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let part = format!("{stem}_part_{}_{leaf}", idx + 1);
    match dir {
        Some(dir) => format!("{dir}/{part}"),
        None => part,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::create_dir_all(root.join("js/vendor")).unwrap();
        fs::write(root.join("css/a.css"), "a { color: red; }").unwrap();
        fs::write(root.join("css/b.css"), "b { color: red; }").unwrap();
        fs::write(root.join("js/vendor/b.js"), "var b = 2;").unwrap();
        fs::write(root.join("js/vendor/a.js"), "var a = 1;").unwrap();
        fs::write(root.join("js/vendor/notes.txt"), "").unwrap();
        dir
    }

    fn factory(root: &Path, debug: bool) -> AssetFactory {
        AssetFactory::new(root, debug, FilterManager::with_builtins())
    }

    fn formula(inputs: &[&str], filters: &[&str]) -> Formula {
        Formula::new(
            inputs.iter().map(|s| s.to_string()).collect(),
            filters.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_create_collection() {
        let dir = fixture();
        let asset = factory(dir.path(), false)
            .create_asset(
                &formula(&["css/a.css", "css/b.css"], &["cssmin"])
                    .with_name("app_css")
                    .with_output("css/app.css"),
                &AssetManager::new(),
            )
            .unwrap();

        assert_eq!(asset.target_path(), "css/app.css");
        assert_eq!(asset.leaf_count(), 2);
        assert_eq!(asset.dump().unwrap(), "a{color:red}\nb{color:red}");

        let leaves = asset.leaves();
        assert_eq!(leaves[0].target_path(), "css/app_part_1_a.css");
        assert_eq!(leaves[1].target_path(), "css/app_part_2_b.css");
    }

    #[test]
    fn test_default_output_uses_name() {
        let dir = fixture();
        let f = formula(&["css/a.css"], &[]);
        let factory = factory(dir.path(), false);
        let asset = factory.create_asset(&f, &AssetManager::new()).unwrap();
        assert_eq!(asset.target_path(), format!("assetic/{}", f.generated_name()));

        let named = factory
            .create_asset(&f.clone().with_name("x").with_output("/css/*.css"), &AssetManager::new())
            .unwrap();
        assert_eq!(named.target_path(), "css/x.css");
    }

    #[test]
    fn test_glob_is_sorted_and_filtered() {
        let dir = fixture();
        let asset = factory(dir.path(), false)
            .create_asset(&formula(&["js/vendor/*.js"], &[]), &AssetManager::new())
            .unwrap();
        let sources: Vec<_> = asset
            .sources()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(sources, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_glob_in_directory_segment_rejected() {
        let dir = fixture();
        let err = factory(dir.path(), false)
            .create_asset(&formula(&["js/*/a.js"], &[]), &AssetManager::new())
            .unwrap_err();
        assert!(matches!(err, AssetError::InvalidInput(_)));
    }

    #[test]
    fn test_optional_filter_skipped_in_debug() {
        let dir = fixture();
        let f = formula(&["css/a.css"], &["?cssmin", "cssrewrite"]);

        let release = factory(dir.path(), false)
            .create_asset(&f, &AssetManager::new())
            .unwrap();
        assert_eq!(release.filter_names(), vec!["cssmin", "cssrewrite"]);

        let debug = factory(dir.path(), true)
            .create_asset(&f, &AssetManager::new())
            .unwrap();
        assert_eq!(debug.filter_names(), vec!["cssrewrite"]);

        let forced = factory(dir.path(), true)
            .create_asset(&f.clone().with_debug(false), &AssetManager::new())
            .unwrap();
        assert_eq!(forced.filter_names(), vec!["cssmin", "cssrewrite"]);
    }

    #[test]
    fn test_reference_inputs() {
        let dir = fixture();
        let factory = factory(dir.path(), false);
        let mut am = AssetManager::new();
        let vendor = factory
            .create_asset(&formula(&["js/vendor/*.js"], &["jsmin"]), &am)
            .unwrap();
        am.set("vendor_js", vendor);

        let app = factory
            .create_asset(&formula(&["@vendor_js", "css/a.css"], &[]).with_name("app"), &am)
            .unwrap();
        assert_eq!(app.leaf_count(), 3);
        // referenced leaves carry the filters of the referenced asset
        assert_eq!(app.file_leaves()[0].filters()[0].name, "jsmin");
    }

    #[test]
    fn test_errors() {
        let dir = fixture();
        let factory = factory(dir.path(), false);
        let am = AssetManager::new();

        let err = factory.create_asset(&formula(&["css/none.css"], &[]), &am).unwrap_err();
        assert!(matches!(err, AssetError::SourceNotFound(_)));

        let err = factory.create_asset(&formula(&["css/a.css"], &["?uglify"]), &am).unwrap_err();
        assert!(matches!(err, AssetError::UnknownFilter(name) if name == "uglify"));

        let err = factory.create_asset(&formula(&["@missing"], &[]), &am).unwrap_err();
        assert!(matches!(err, AssetError::UnknownAsset(name) if name == "missing"));

        let err = factory.create_asset(&formula(&["../secret.css"], &[]), &am).unwrap_err();
        assert!(matches!(err, AssetError::InvalidInput(_)));
    }

    #[test]
    fn test_part_target() {
        assert_eq!(part_target("css/app.css", 0, Path::new("lib/a.css")), "css/app_part_1_a.css");
        assert_eq!(part_target("bundle", 2, Path::new("x.js")), "bundle_part_3_x.js");
    }
}
