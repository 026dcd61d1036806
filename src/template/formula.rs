//! Formula extraction from template sources.
//!
//! Recognized tags:
//!
//! ```text
//! {% stylesheets 'css/a.css' "css/b.css" filter='cssrewrite,?cssmin'
//!    output='css/app.css' name='app_css' debug=false %}
//!     <link rel="stylesheet" href="{{ asset_url }}">
//! {% endstylesheets %}
//! ```
//!
//! `javascripts` works the same way. Everything else in the template is
//! ignored.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::{Resource, TemplateError};
use crate::asset::{Formula, Formulae};
use crate::freshness::mtime_secs;
use crate::utils::{fs::write_atomic, hash};
use crate::debug;

/// Extracts formulae from one resource.
pub trait FormulaLoader: Send + Sync {
    fn load(&self, resource: &Resource) -> Result<Formulae, TemplateError>;
}

// ============================================================================
// Tag scanner
// ============================================================================

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%-?\s*(stylesheets|javascripts)\b(.*?)-?%\}").unwrap()
});

static CLOSE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*end(stylesheets|javascripts)\s*-?%\}").unwrap()
});

/// `key=` prefix (optional), then a quoted string or a bare word.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:(\w+)\s*=\s*)?(?:'([^']*)'|"([^"]*)"|(\w+))"#).unwrap()
});

/// Scans for `{% stylesheets %}` and `{% javascripts %}` blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagFormulaLoader;

impl TagFormulaLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extract formulae from template `source`; `path` is for error messages.
    pub fn parse(&self, source: &str, path: &std::path::Path) -> Result<Formulae, TemplateError> {
        let mut formulae = Formulae::new();
        let mut pos = 0;

        while let Some(open) = OPEN_TAG.captures_at(source, pos) {
            let whole = open.get(0).map_or(0..0, |m| m.range());
            let kind = &open[1];
            let line = line_of(source, whole.start);

            let closed = CLOSE_TAG
                .captures_at(source, whole.end)
                .filter(|close| &close[1] == kind);
            let Some(close) = closed else {
                return Err(TemplateError::syntax(
                    path,
                    line,
                    format!("unterminated `{kind}` tag, expected `{{% end{kind} %}}`"),
                ));
            };

            let formula = parse_tag(kind, &open[2])
                .map_err(|message| TemplateError::syntax(path, line, message))?;
            let name = formula.options.name.clone().unwrap_or_default();
            match formulae.get(&name) {
                Some(existing) if *existing != formula => {
                    return Err(TemplateError::syntax(
                        path,
                        line,
                        format!("asset `{name}` is declared twice with different inputs"),
                    ));
                }
                _ => {
                    formulae.insert(name, formula);
                }
            }

            pos = close.get(0).map_or(whole.end, |m| m.end());
        }

        Ok(formulae)
    }
}

impl FormulaLoader for TagFormulaLoader {
    fn load(&self, resource: &Resource) -> Result<Formulae, TemplateError> {
        let source = resource.content()?;
        self.parse(&source, &resource.path)
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Build a formula from the attribute list of one opening tag.
fn parse_tag(kind: &str, attributes: &str) -> Result<Formula, String> {
    let mut formula = Formula::default();
    let mut last = 0;

    for caps in ATTRIBUTE.captures_iter(attributes) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let gap = &attributes[last..whole.start];
        if !gap.trim().is_empty() {
            return Err(format!("unexpected `{}`", gap.trim()));
        }
        last = whole.end;

        let quoted = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
        let bare = caps.get(4).map(|m| m.as_str());
        let value = quoted.or(bare).unwrap_or_default();

        let Some(key) = caps.get(1).map(|m| m.as_str()) else {
            if quoted.is_none() {
                return Err(format!("unexpected `{value}`, inputs must be quoted"));
            }
            formula.inputs.push(value.to_string());
            continue;
        };

        match key {
            "filter" => formula.filters.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            ),
            "output" => formula.options.output = Some(value.to_string()),
            "name" => formula.options.name = Some(value.to_string()),
            "debug" => {
                formula.options.debug = Some(match value {
                    "true" => true,
                    "false" => false,
                    other => return Err(format!("invalid debug value `{other}`")),
                });
            }
            other => return Err(format!("unknown attribute `{other}` in `{kind}` tag")),
        }
    }

    let rest = attributes[last..].trim();
    if !rest.is_empty() {
        return Err(format!("unexpected `{rest}`"));
    }
    if formula.inputs.is_empty() {
        return Err(format!("`{kind}` tag has no inputs"));
    }

    if formula.options.output.is_none() {
        let output = if kind == "stylesheets" { "css/*.css" } else { "js/*.js" };
        formula.options.output = Some(output.to_string());
    }
    let name = match &formula.options.name {
        Some(name) => name.clone(),
        None => formula.generated_name(),
    };
    formula.options.output = formula.options.output.map(|o| o.replace('*', &name));
    formula.options.name = Some(name);

    Ok(formula)
}

// ============================================================================
// Cache
// ============================================================================

/// Caches another loader's result per resource as JSON files.
///
/// An entry is reused while it is not older than the template.
pub struct CachedFormulaLoader<L> {
    inner: L,
    dir: PathBuf,
}

impl<L: FormulaLoader> CachedFormulaLoader<L> {
    /// `dir` is the cache root; entries live in `dir/formulae/`.
    pub fn new(inner: L, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into().join("formulae"),
        }
    }

    fn entry_path(&self, resource: &Resource) -> PathBuf {
        let key = hash::digest(&[resource.path.to_string_lossy().as_bytes()]);
        self.dir.join(format!("{}.json", &key[..32]))
    }

    fn read_fresh(&self, entry: &std::path::Path, resource: &Resource) -> Option<Formulae> {
        let template = resource.mtime()?;
        let cached = mtime_secs(entry)?;
        if cached < template {
            return None;
        }
        let content = std::fs::read_to_string(entry).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl<L: FormulaLoader> FormulaLoader for CachedFormulaLoader<L> {
    fn load(&self, resource: &Resource) -> Result<Formulae, TemplateError> {
        let entry = self.entry_path(resource);
        if let Some(formulae) = self.read_fresh(&entry, resource) {
            debug!("formula"; "cache hit for {}", resource.name);
            return Ok(formulae);
        }

        let formulae = self.inner.load(resource)?;
        let json = serde_json::to_vec(&formulae)
            .map_err(|err| TemplateError::Io(entry.clone(), err.into()))?;
        write_atomic(&entry, &json).map_err(|err| TemplateError::Io(entry.clone(), err))?;
        Ok(formulae)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{FilesystemLoader, TemplateLoader};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn parse(source: &str) -> Result<Formulae, TemplateError> {
        TagFormulaLoader::new().parse(source, Path::new("t.html.twig"))
    }

    #[test]
    fn test_parse_stylesheets() {
        let source = r#"
<head>
{% stylesheets 'css/a.css' "css/b.css" filter='cssrewrite, ?cssmin' output='css/app.css' name='app_css' %}
  <link href="{{ asset_url }}">
{% endstylesheets %}
</head>"#;
        let formulae = parse(source).unwrap();
        let formula = &formulae["app_css"];
        assert_eq!(formula.inputs, vec!["css/a.css", "css/b.css"]);
        assert_eq!(formula.filters, vec!["cssrewrite", "?cssmin"]);
        assert_eq!(formula.options.output.as_deref(), Some("css/app.css"));
        assert_eq!(formula.options.debug, None);
    }

    #[test]
    fn test_defaults_for_unnamed_javascripts() {
        let formulae =
            parse("{% javascripts 'js/a.js' debug=true %}x{% endjavascripts %}").unwrap();
        let (name, formula) = formulae.iter().next().unwrap();
        assert_eq!(name.len(), 8);
        assert_eq!(formula.options.output, Some(format!("js/{name}.js")));
        assert_eq!(formula.options.debug, Some(true));
    }

    #[test]
    fn test_multiple_tags() {
        let source = "{% stylesheets 'a.css' name='a' %}{% endstylesheets %}\n\
                      {% javascripts 'b.js' name='b' %}{% endjavascripts %}";
        let formulae = parse(source).unwrap();
        assert_eq!(formulae.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse("\n\n{% stylesheets 'a.css' %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { line: 3, .. }), "{err}");

        let err = parse("{% stylesheets 'a.css' combine=true %}{% endstylesheets %}").unwrap_err();
        assert!(err.to_string().contains("unknown attribute `combine`"));

        let err = parse("{% stylesheets a.css %}{% endstylesheets %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));

        let err = parse("{% javascripts %}{% endjavascripts %}").unwrap_err();
        assert!(err.to_string().contains("no inputs"));

        let err = parse("{% javascripts 'a.js' %}{% endstylesheets %}").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_conflicting_names_in_one_template() {
        let source = "{% stylesheets 'a.css' name='x' %}{% endstylesheets %}\
                      {% stylesheets 'b.css' name='x' %}{% endstylesheets %}";
        assert!(parse(source).is_err());

        let same = "{% stylesheets 'a.css' name='x' %}{% endstylesheets %}\
                    {% stylesheets 'a.css' name='x' %}{% endstylesheets %}";
        assert_eq!(parse(same).unwrap().len(), 1);
    }

    #[test]
    fn test_cached_loader_reuses_fresh_entry() {
        let templates = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let template = templates.path().join("a.html.twig");
        fs::write(&template, "{% stylesheets 'a.css' name='a' %}{% endstylesheets %}").unwrap();

        let loader: Arc<dyn TemplateLoader> =
            Arc::new(FilesystemLoader::new(vec![templates.path().into()]));
        let resource = Resource {
            name: "a.html.twig".into(),
            path: template.clone(),
            loader,
        };
        let cached = CachedFormulaLoader::new(TagFormulaLoader::new(), cache.path());

        let first = cached.load(&resource).unwrap();
        assert!(first.contains_key("a"));

        // tamper with the entry: a fresh entry is served as-is
        let entry = cached.entry_path(&resource);
        assert!(entry.starts_with(cache.path().join("formulae")));
        let mut tampered = first.clone();
        tampered.insert("b".into(), first["a"].clone());
        fs::write(&entry, serde_json::to_vec(&tampered).unwrap()).unwrap();
        assert_eq!(cached.load(&resource).unwrap().len(), 2);

        // a newer template invalidates it
        fs::File::options()
            .write(true)
            .open(&template)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(3600))
            .unwrap();
        assert_eq!(cached.load(&resource).unwrap().len(), 1);
    }
}
