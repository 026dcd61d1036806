//! Filters and the filter registry.
//!
//! A filter transforms asset content in two phases. `filter_load` runs on
//! each leaf as it is read; `filter_dump` runs on the loaded content when
//! the asset is dumped. Built-in filters:
//!
//! | Name         | Phase | Backend                  |
//! |--------------|-------|--------------------------|
//! | `cssmin`     | dump  | lightningcss             |
//! | `jsmin`      | dump  | oxc                      |
//! | `cssrewrite` | dump  | relative `url()` rebasing |

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

use super::FilterError;
use super::minify::{minify_css, minify_js};
use crate::config::{FilterDecl, FilterKind};

/// What a filter knows about the leaf it is processing.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Source path relative to the asset root (`css/lib/a.css`).
    pub source_path: &'a Path,
    /// Target path relative to the web root (`css/app.css`).
    pub target_path: &'a str,
}

impl FilterContext<'_> {
    /// `.min.css` / `.min.js` sources are shipped as-is by the minifiers.
    fn is_preminified(&self) -> bool {
        self.source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(".min"))
    }
}

pub trait Filter: Send + Sync {
    fn filter_load(&self, content: String, _ctx: &FilterContext<'_>) -> Result<String, FilterError> {
        Ok(content)
    }

    fn filter_dump(&self, content: String, _ctx: &FilterContext<'_>) -> Result<String, FilterError> {
        Ok(content)
    }
}

/// A filter together with the name it was resolved from.
///
/// The name takes part in cache keys and error messages.
#[derive(Clone)]
pub struct NamedFilter {
    pub name: String,
    pub filter: Arc<dyn Filter>,
}

impl fmt::Debug for NamedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedFilter").field(&self.name).finish()
    }
}

// ============================================================================
// Built-in filters
// ============================================================================

pub struct CssMinFilter;

impl Filter for CssMinFilter {
    fn filter_dump(&self, content: String, ctx: &FilterContext<'_>) -> Result<String, FilterError> {
        if ctx.is_preminified() {
            return Ok(content);
        }
        minify_css(&content)
    }
}

pub struct JsMinFilter;

impl Filter for JsMinFilter {
    fn filter_dump(&self, content: String, ctx: &FilterContext<'_>) -> Result<String, FilterError> {
        if ctx.is_preminified() {
            return Ok(content);
        }
        minify_js(&content)
    }
}

/// Rebases relative `url(...)` references from the source directory to the
/// target directory, assuming the asset root mirrors the web root.
pub struct CssRewriteFilter;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\(\s*(['"]?)([^'")]+)(['"]?)\s*\)"#).unwrap());

impl Filter for CssRewriteFilter {
    fn filter_dump(&self, content: String, ctx: &FilterContext<'_>) -> Result<String, FilterError> {
        let source_dir = parent_dir(&ctx.source_path.to_string_lossy().replace('\\', "/"));
        let target_dir = parent_dir(ctx.target_path.trim_start_matches('/'));
        if source_dir == target_dir {
            return Ok(content);
        }

        let rewritten = URL_RE.replace_all(&content, |caps: &Captures| {
            let url = caps[2].trim();
            match rebase_url(url, &source_dir, &target_dir) {
                Some(rebased) => format!("url({}{}{})", &caps[1], rebased, &caps[3]),
                None => caps[0].to_string(),
            }
        });
        Ok(rewritten.into_owned())
    }
}

fn parent_dir(path: &str) -> String {
    path.rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default()
}

/// Rewrite `url` (relative to `source_dir`) so it resolves the same from
/// `target_dir`. Returns `None` for absolute, external and inline URLs, and
/// for paths climbing above the root.
fn rebase_url(url: &str, source_dir: &str, target_dir: &str) -> Option<String> {
    if url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with("data:")
        || url.contains("://")
    {
        return None;
    }

    let split = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split);

    let mut resolved: Vec<&str> = Vec::new();
    for segment in source_dir.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                resolved.pop()?;
            }
            s => resolved.push(s),
        }
    }

    let target: Vec<&str> = target_dir.split('/').filter(|s| !s.is_empty()).collect();
    let common = resolved
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; target.len() - common];
    parts.extend(&resolved[common..]);
    Some(format!("{}{}", parts.join("/"), suffix))
}

// ============================================================================
// FilterManager
// ============================================================================

/// Registry of filters by name.
#[derive(Default, Clone)]
pub struct FilterManager {
    filters: FxHashMap<String, Arc<dyn Filter>>,
}

impl FilterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in filter under its kind name.
    pub fn with_builtins() -> Self {
        let mut manager = Self::new();
        for kind in FilterKind::ALL {
            manager.set(kind.name(), builtin(kind));
        }
        manager
    }

    /// Built-ins plus the `[[filters]]` aliases.
    pub fn from_decls(decls: &[FilterDecl]) -> Self {
        let mut manager = Self::with_builtins();
        for decl in decls {
            manager.set(&decl.name, builtin(decl.kind));
        }
        manager
    }

    pub fn set(&mut self, name: impl Into<String>, filter: Arc<dyn Filter>) {
        self.filters.insert(name.into(), filter);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.filters.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn builtin(kind: FilterKind) -> Arc<dyn Filter> {
    match kind {
        FilterKind::Cssmin => Arc::new(CssMinFilter),
        FilterKind::Jsmin => Arc::new(JsMinFilter),
        FilterKind::Cssrewrite => Arc::new(CssRewriteFilter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(source: &'a str, target: &'a str) -> FilterContext<'a> {
        FilterContext {
            source_path: Path::new(source),
            target_path: target,
        }
    }

    #[test]
    fn test_builtins_registered() {
        let manager = FilterManager::with_builtins();
        assert_eq!(manager.names(), vec!["cssmin", "cssrewrite", "jsmin"]);
        assert!(manager.get("cssmin").is_some());
        assert!(!manager.has("uglify"));
    }

    #[test]
    fn test_aliases_from_decls() {
        let decls = vec![FilterDecl {
            name: "yui_css".into(),
            kind: FilterKind::Cssmin,
        }];
        let manager = FilterManager::from_decls(&decls);
        assert!(manager.has("yui_css"));
        assert!(manager.has("cssmin"));

        let out = manager
            .get("yui_css")
            .unwrap()
            .filter_dump("a { color: red; }".into(), &ctx("a.css", "app.css"))
            .unwrap();
        assert_eq!(out, "a{color:red}");
    }

    #[test]
    fn test_minifiers_skip_preminified() {
        let source = "a {  color: red;  }";
        let out = CssMinFilter
            .filter_dump(source.into(), &ctx("css/lib.min.css", "css/app.css"))
            .unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn test_cssrewrite_rebases_relative_urls() {
        let css = "a { background: url('../img/x.png'); }\nb { background: url(icons/y.svg?v=1); }";
        let out = CssRewriteFilter
            .filter_dump(css.into(), &ctx("css/lib/a.css", "css/app.css"))
            .unwrap();
        assert!(out.contains("url('img/x.png')"), "{out}");
        assert!(out.contains("url(lib/icons/y.svg?v=1)"), "{out}");
    }

    #[test]
    fn test_cssrewrite_keeps_absolute_urls() {
        let css = "a { background: url(/img/x.png) url(data:image/png;base64,AA) url(https://cdn/x.png); }";
        let out = CssRewriteFilter
            .filter_dump(css.into(), &ctx("css/lib/a.css", "assetic/app.css"))
            .unwrap();
        assert_eq!(out, css);
    }

    #[test]
    fn test_rebase_url() {
        assert_eq!(rebase_url("x.png", "css", "assetic").as_deref(), Some("../css/x.png"));
        assert_eq!(rebase_url("../../x.png", "css", "").as_deref(), None);
        assert_eq!(rebase_url("x.png#frag", "a/b", "a").as_deref(), Some("b/x.png#frag"));
    }
}
