use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Canonical directory paths entered during one walk.
///
/// Keys are symlink-resolved absolute paths, so `./a/../a`, `a` and a link
/// to `a` all collide. Used only for cycle detection.
#[derive(Debug, Default, Clone)]
pub struct PathSet {
    paths: HashSet<PathBuf>,
}

impl PathSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path`; returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.paths.insert(path.into())
    }

    /// True if `path` was recorded. No normalization is applied.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True before the first insert.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Lexically cleans a path: drops `.` components, folds `..` into its
/// parent and collapses repeated separators. Does not touch the filesystem,
/// so symlinked file paths keep their link name.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(Component::CurDir);
    }
    out
}

/// Absolute, symlink-resolved form of `path`.
pub fn canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    std::fs::canonicalize(path)
}

/// Absolute form of `path` without resolving symlinks.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .map(|abs| normalize_path(&abs))
        .unwrap_or_else(|_| normalize_path(path))
}
