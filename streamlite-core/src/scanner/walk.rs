use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::paths::{PathSet, absolute, canonicalize};

/// A regular file reached by the walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Path as reached: for a symlinked file this is the link, not the target.
    pub path: PathBuf,
    /// Metadata of the file itself (the target's, for a symlinked file).
    pub metadata: Metadata,
    /// Reached through a file symlink.
    pub via_symlink: bool,
}

/// A per-entry failure. The walk always continues past these, except for
/// [`WalkError::Cancelled`] which ends it.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Reading a directory or stat-ing a file failed.
    #[error("cannot access {}: {source}", path.display())]
    EntryAccess {
        /// Entry that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A symlink is dangling, loops, or its target cannot be stat-ed.
    #[error("cannot resolve symlink {}: {source}", path.display())]
    SymlinkResolution {
        /// The link, not its target.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The cancellation token fired. Always the last item.
    #[error("walk cancelled")]
    Cancelled,
}

impl WalkError {
    /// Path the error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::EntryAccess { path, .. } | Self::SymlinkResolution { path, .. } => Some(path),
            Self::Cancelled => None,
        }
    }
}

/// Lazily walks a directory tree, following directory symlinks without
/// looping.
///
/// Every directory is entered at most once per walk, keyed by its canonical
/// path, so self-referential and mutually-referential links terminate. Files
/// reached through a symlink are reported under the link path with the
/// target's metadata. Per-entry failures come out as `Err` items and never
/// stop the walk.
///
/// A walker is single use; construct a new one for every scan.
#[derive(Debug)]
pub struct DirectoryWalker {
    frames: Vec<walkdir::IntoIter>,
    visited: PathSet,
    cancel: Option<CancellationToken>,
    finished: bool,
}

impl DirectoryWalker {
    /// Starts a walk at `root`. Nothing is read until the first `next`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let mut walker = Self {
            frames: Vec::new(),
            visited: PathSet::new(),
            cancel: None,
            finished: false,
        };
        walker.enter(root.as_ref());
        walker
    }

    /// Stop at the next filesystem call once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Canonical directories entered so far.
    pub fn visited(&self) -> &PathSet {
        &self.visited
    }

    /// Pushes a new traversal frame for `root` unless its canonical path has
    /// already been entered.
    fn enter(&mut self, root: &Path) {
        let absolute_root = absolute(root);
        let canonical = match canonicalize(&absolute_root) {
            Ok(path) => path,
            Err(e) => {
                warn!(
                    path = %absolute_root.display(),
                    error = %e,
                    "Cannot resolve path, continuing with unresolved path"
                );
                absolute_root
            }
        };

        if !self.visited.insert(canonical.clone()) {
            debug!(path = %canonical.display(), "Directory already visited, skipping");
            return;
        }

        // Children are enumerated under the path we were given, not the
        // canonical one; walkdir follows `root` itself if it is a link.
        let frame = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        self.frames.push(frame);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn skip_current_dir(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.skip_current_dir();
        }
    }

    /// Handles a plain directory found inside the current frame. Returns
    /// `false` when it must not be descended into.
    fn admit_directory(&mut self, path: &Path) -> bool {
        let canonical = match canonicalize(path) {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot resolve directory");
                absolute(path)
            }
        };

        if self.visited.insert(canonical.clone()) {
            true
        } else {
            debug!(
                path = %path.display(),
                canonical = %canonical.display(),
                "Directory already visited, skipping"
            );
            false
        }
    }

    /// Resolves a symlink. Directory targets become a new frame; file targets
    /// are returned as an entry under the link path.
    fn follow_symlink(&mut self, link: PathBuf) -> Option<Result<WalkEntry, WalkError>> {
        let target = match canonicalize(&link) {
            Ok(target) => target,
            Err(source) => {
                warn!(path = %link.display(), error = %source, "Cannot resolve symlink");
                return Some(Err(WalkError::SymlinkResolution { path: link, source }));
            }
        };

        let metadata = match std::fs::metadata(&target) {
            Ok(metadata) => metadata,
            Err(source) => {
                warn!(path = %target.display(), error = %source, "Cannot stat symlink target");
                return Some(Err(WalkError::SymlinkResolution { path: link, source }));
            }
        };

        if metadata.is_dir() {
            debug!(
                link = %link.display(),
                target = %target.display(),
                "Following symlink directory"
            );
            self.enter(&target);
            None
        } else if metadata.is_file() {
            Some(Ok(WalkEntry {
                path: link,
                metadata,
                via_symlink: true,
            }))
        } else {
            None
        }
    }
}

impl Iterator for DirectoryWalker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.is_cancelled() {
                self.finished = true;
                self.frames.clear();
                return Some(Err(WalkError::Cancelled));
            }

            let frame = self.frames.last_mut()?;
            let Some(next) = frame.next() else {
                self.frames.pop();
                continue;
            };

            let entry = match next {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("directory walk error"));
                    warn!(path = %path.display(), error = %source, "Error accessing path");
                    return Some(Err(WalkError::EntryAccess { path, source }));
                }
            };

            // The frame root was registered when the frame was pushed.
            if entry.depth() == 0 {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                if let Some(item) = self.follow_symlink(entry.into_path()) {
                    return Some(item);
                }
            } else if file_type.is_dir() {
                if !self.admit_directory(entry.path()) {
                    self.skip_current_dir();
                }
            } else if file_type.is_file() {
                return Some(match entry.metadata() {
                    Ok(metadata) => Ok(WalkEntry {
                        path: entry.into_path(),
                        metadata,
                        via_symlink: false,
                    }),
                    Err(err) => {
                        let path = entry.into_path();
                        let source = err
                            .into_io_error()
                            .unwrap_or_else(|| io::Error::other("stat failed"));
                        warn!(path = %path.display(), error = %source, "Cannot stat file");
                        Err(WalkError::EntryAccess { path, source })
                    }
                });
            }
        }
    }
}
