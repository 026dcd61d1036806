//! Template resources and the directory walker.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{TemplateError, TemplateLoader};

/// One template file, paired with the loader that reads it.
#[derive(Clone)]
pub struct Resource {
    /// File base name (`a.html.twig`).
    pub name: String,
    /// Full path of the file.
    pub path: PathBuf,
    pub loader: Arc<dyn TemplateLoader>,
}

impl Resource {
    pub fn content(&self) -> Result<String, TemplateError> {
        self.loader.source(&self.path)
    }

    pub fn mtime(&self) -> Option<u64> {
        self.loader.mtime(&self.path)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Every file below a template directory.
#[derive(Clone)]
pub struct DirectoryResource {
    loader: Arc<dyn TemplateLoader>,
    root: PathBuf,
}

impl DirectoryResource {
    pub fn new(loader: Arc<dyn TemplateLoader>, root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the directory, depth-first in directory-entry order.
    ///
    /// A missing or unreadable root is reported as the first item. Errors on
    /// nested entries are yielded in place and the walk continues with the
    /// next entry. Symlinked directories are not descended into.
    pub fn iter(&self) -> ResourceIter {
        ResourceIter {
            loader: Arc::clone(&self.loader),
            walk: WalkDir::new(&self.root).into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a DirectoryResource {
    type Item = io::Result<Resource>;
    type IntoIter = ResourceIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for DirectoryResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryResource")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`DirectoryResource::iter`].
///
/// Yields regular files and symlinks to regular files. Directories, including
/// symlinked ones, are never yielded.
pub struct ResourceIter {
    loader: Arc<dyn TemplateLoader>,
    walk: walkdir::IntoIter,
}

impl Iterator for ResourceIter {
    type Item = io::Result<Resource>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(walk_error(err))),
            };

            let is_file = if entry.path_is_symlink() {
                entry.path().is_file()
            } else {
                entry.file_type().is_file()
            };
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            return Some(Ok(Resource {
                name,
                path: entry.into_path(),
                loader: Arc::clone(&self.loader),
            }));
        }
    }
}

fn walk_error(err: walkdir::Error) -> io::Error {
    let kind = err.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
    io::Error::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::FilesystemLoader;
    use rustc_hash::FxHashSet;
    use std::fs;
    use tempfile::TempDir;

    fn walker(root: &Path) -> DirectoryResource {
        let loader = Arc::new(FilesystemLoader::new(vec![root.to_path_buf()]));
        DirectoryResource::new(loader, root)
    }

    #[test]
    fn test_visits_every_file_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        for file in ["x.twig", "a/y.twig", "a/b/z.twig", "a/b/c/w.twig", "a/b/c/v.twig"] {
            fs::write(root.join(file), file).unwrap();
        }

        let resources: Vec<Resource> = walker(root).iter().collect::<io::Result<_>>().unwrap();
        assert_eq!(resources.len(), 5);

        let paths: FxHashSet<_> = resources.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths.len(), 5);

        let nested = resources.iter().find(|r| r.name == "z.twig").unwrap();
        assert_eq!(nested.path, root.join("a/b/z.twig"));
        assert_eq!(nested.content().unwrap(), "a/b/z.twig");
    }

    #[test]
    fn test_depth_first() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("d1/inner")).unwrap();
        fs::create_dir_all(root.join("d2")).unwrap();
        fs::write(root.join("d1/inner/deep.twig"), "").unwrap();
        fs::write(root.join("d1/shallow.twig"), "").unwrap();
        fs::write(root.join("d2/other.twig"), "").unwrap();

        let names: Vec<PathBuf> = walker(root)
            .iter()
            .map(|r| r.unwrap().path.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        // files of one subtree are never interleaved with another's
        let d1: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, p)| p.starts_with("d1"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(d1.len(), 2);
        assert_eq!(d1[1] - d1[0], 1);
    }

    #[test]
    fn test_missing_root_fails_first() {
        let dir = TempDir::new().unwrap();
        let mut iter = walker(&dir.path().join("missing")).iter();
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        assert_eq!(walker(dir.path()).iter().count(), 0);
    }

    #[test]
    fn test_into_iterator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.twig"), "").unwrap();
        let resource = walker(dir.path());
        let mut count = 0;
        for item in &resource {
            assert_eq!(item.unwrap().name, "a.twig");
            count += 1;
        }
        assert_eq!(count, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_a_resource() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/x.twig"), "").unwrap();
        fs::write(root.join("top.twig"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();
        std::os::unix::fs::symlink(root.join("top.twig"), root.join("alias.twig")).unwrap();

        let mut names: Vec<String> = walker(root)
            .iter()
            .map(|r| r.unwrap().name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["alias.twig", "top.twig", "x.twig"]);
    }
}
