//! Where role files are looked up.
//!
//! [`LiveSource`] asks the filesystem on every probe. [`IndexedSource`] walks
//! the component directories once and answers probes under them from memory
//! afterwards; probes anywhere else go to the filesystem.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use mvcr_core::MvcrResult;

/// File name prefixes of the three roles.
const ROLE_PREFIXES: [&str; 3] = ["controller.", "model.", "view."];

/// Answers "does this role file exist?" for the resolvers.
pub trait ComponentSource: Send + Sync {
    /// Returns `true` if `path` is an existing role file.
    fn exists(&self, path: &Path) -> bool;
}

/// Checks the filesystem on every probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveSource;

impl ComponentSource for LiveSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// An in-memory index of role files built by a single directory walk.
///
/// Only paths under a scanned directory are answered from the index. Explicit
/// call paths, hook-rewritten paths and directories added after the scan are
/// checked live.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mvcr_loaders::{ComponentSource, IndexedSource};
///
/// let index = IndexedSource::from_files("app", ["app/controller.blog.rs"]);
/// assert!(index.exists(Path::new("app/controller.blog.rs")));
/// assert!(!index.exists(Path::new("app/controller.news.rs")));
/// assert!(index.covers(Path::new("app/admin/view.html.users.rs")));
/// assert!(!index.covers(Path::new("plugins/controller.blog.rs")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndexedSource {
    roots: Vec<PathBuf>,
    files: HashSet<PathBuf>,
}

impl IndexedSource {
    /// Walks `dirs` recursively and records every file named
    /// `controller.*`, `model.*` or `view.*` ending in `.<extension>`.
    ///
    /// Directories that do not exist are skipped and stay live. Symlinked
    /// role files are indexed like `LiveSource` sees them; symlinked
    /// directories are not followed.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::IoError`](mvcr_core::MvcrError::IoError) if an
    /// existing directory cannot be read.
    pub fn scan<'a, I>(dirs: I, extension: &str) -> MvcrResult<Self>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let suffix = format!(".{extension}");
        let mut roots = Vec::new();
        let mut files = HashSet::new();
        for dir in dirs {
            if !dir.is_dir() {
                warn!(dir = %dir.display(), "Component directory does not exist, skipping");
                continue;
            }
            walk(dir, &suffix, &mut files)?;
            roots.push(dir.to_path_buf());
        }
        debug!(roots = roots.len(), count = files.len(), "Indexed component files");
        Ok(Self { roots, files })
    }

    /// Builds an index of `root` from known file paths.
    pub fn from_files<I, P>(root: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: vec![root.into()],
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `path` lies under a scanned directory.
    pub fn covers(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ComponentSource for IndexedSource {
    fn exists(&self, path: &Path) -> bool {
        if self.covers(path) {
            self.files.contains(path)
        } else {
            path.is_file()
        }
    }
}

fn walk(dir: &Path, suffix: &str, files: &mut HashSet<PathBuf>) -> MvcrResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            walk(&path, suffix, files)?;
            continue;
        }
        let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
        if is_file && is_role_file(&entry.file_name().to_string_lossy(), suffix) {
            files.insert(path);
        }
    }
    Ok(())
}

fn is_role_file(name: &str, suffix: &str) -> bool {
    name.ends_with(suffix) && ROLE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
