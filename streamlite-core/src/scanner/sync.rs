use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::filter::is_video_file;
use super::paths::normalize_path;
use super::walk::{DirectoryWalker, WalkEntry, WalkError};
use crate::catalog::CatalogStore;
use crate::media::modified_at;
use crate::{MediaError, NewVideo, Result};

/// Walk results buffered between the blocking walker thread and the
/// reconciliation loop.
const WALK_CHANNEL_CAPACITY: usize = 256;

/// Why an entry was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// Unreadable directory or file.
    EntryAccess,
    /// Dangling or unreadable symlink.
    SymlinkResolution,
    /// The catalog store failed for this path.
    Store,
}

/// Something the scan passed over instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Path as reached by the walk.
    pub path: PathBuf,
    /// Which stage gave up on it.
    pub kind: SkipKind,
    /// Error text.
    pub reason: String,
}

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Records inserted.
    pub added: usize,
    /// Records whose size or mtime was refreshed.
    pub updated: usize,
    /// Records deleted because their file is gone.
    pub removed: usize,
    /// Distinct video paths seen on disk.
    pub found: usize,
    /// False when orphan cleanup was skipped (nothing found, listing failed,
    /// or the scan was cancelled).
    pub cleanup_performed: bool,
    /// Entries passed over, in walk order.
    pub skipped: Vec<SkippedEntry>,
}

impl SkipKind {
    fn of(err: &MediaError) -> Self {
        match err {
            MediaError::EntryAccess { .. } => Self::EntryAccess,
            MediaError::SymlinkResolution { .. } => Self::SymlinkResolution,
            _ => Self::Store,
        }
    }
}

impl ScanReport {
    fn skip(&mut self, path: impl Into<PathBuf>, err: MediaError) {
        self.skipped.push(SkippedEntry {
            path: path.into(),
            kind: SkipKind::of(&err),
            reason: err.to_string(),
        });
    }

    fn skip_walk_error(&mut self, err: WalkError) {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        self.skip(path, err.into());
    }
}

/// Reconciles the catalog with one directory tree.
///
/// New video files are inserted, files whose size changed or whose mtime
/// moved forward are updated, and records whose file is gone are deleted.
/// Deletion only happens when the walk found at least one video: an empty
/// result almost always means the library is unmounted, not emptied.
pub struct SyncEngine {
    store: Arc<dyn CatalogStore>,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Engine writing to `store`.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store, cancel: None }
    }

    /// Lets an embedding service stop a long walk. A cancelled scan keeps
    /// the inserts and updates it already made but never deletes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Runs one full scan of `root`.
    pub async fn sync(&self, root: impl AsRef<Path>) -> Result<ScanReport> {
        let root = root.as_ref().to_path_buf();
        info!(root = %root.display(), "Scanning video directory");

        ensure_root_available(&root).await?;

        let (tx, mut rx) = mpsc::channel(WALK_CHANNEL_CAPACITY);
        let walk_root = root.clone();
        let cancel = self.cancel.clone();
        let walker = tokio::task::spawn_blocking(move || {
            let mut walker = DirectoryWalker::new(&walk_root);
            if let Some(token) = cancel {
                walker = walker.with_cancellation(token);
            }
            for item in walker {
                if tx.blocking_send(item).is_err() {
                    break;
                }
            }
        });

        let mut report = ScanReport::default();
        let mut found: HashSet<PathBuf> = HashSet::new();
        let mut cancelled = false;

        while let Some(item) = rx.recv().await {
            match item {
                Ok(entry) => {
                    if is_video_file(&entry.path) {
                        self.reconcile(entry, &mut found, &mut report).await;
                    }
                }
                Err(WalkError::Cancelled) => cancelled = true,
                Err(err) => report.skip_walk_error(err),
            }
        }

        walker
            .await
            .map_err(|e| MediaError::Internal(format!("Directory walk task failed: {}", e)))?;

        report.found = found.len();

        if cancelled {
            warn!(
                root = %root.display(),
                added = report.added,
                updated = report.updated,
                "Scan cancelled, no cleanup performed"
            );
            return Ok(report);
        }

        if found.is_empty() {
            info!(
                added = report.added,
                updated = report.updated,
                "Scan complete (no cleanup performed - no files found)"
            );
            return Ok(report);
        }

        self.remove_orphans(&found, &mut report).await;

        info!(
            added = report.added,
            updated = report.updated,
            removed = report.removed,
            skipped = report.skipped.len(),
            "Scan complete"
        );
        Ok(report)
    }

    async fn reconcile(
        &self,
        entry: WalkEntry,
        found: &mut HashSet<PathBuf>,
        report: &mut ScanReport,
    ) {
        let path = normalize_path(&entry.path);
        let size_bytes = entry.metadata.len();
        let modified = match modified_at(&path, &entry.metadata) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read modification time");
                report.skip(path, e);
                return;
            }
        };

        found.insert(path.clone());

        match self.store.find_by_path(&path).await {
            Ok(None) => {
                let video = NewVideo::new(path.clone(), size_bytes, modified);
                match self.store.insert(video).await {
                    Ok(record) => {
                        report.added += 1;
                        info!(
                            id = record.id,
                            filename = %record.filename,
                            via_symlink = entry.via_symlink,
                            "Added new video"
                        );
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Error inserting video");
                        report.skip(path, e);
                    }
                }
            }
            Ok(Some(existing)) => {
                if !existing.needs_refresh(size_bytes, modified) {
                    debug!(id = existing.id, via_symlink = entry.via_symlink, "Video unchanged");
                    return;
                }
                match self.store.update_metadata(&path, size_bytes, modified).await {
                    Ok(()) => {
                        report.updated += 1;
                        info!(id = existing.id, "Updated metadata for video");
                    }
                    Err(e) => {
                        warn!(id = existing.id, error = %e, "Error updating video metadata");
                        report.skip(path, e);
                    }
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error checking video existence");
                report.skip(path, e);
            }
        }
    }

    async fn remove_orphans(&self, found: &HashSet<PathBuf>, report: &mut ScanReport) {
        let stored = match self.store.list_all_paths().await {
            Ok(paths) => paths,
            Err(e) => {
                warn!(error = %e, "Error querying videos for cleanup");
                return;
            }
        };
        report.cleanup_performed = true;

        for path in stored.into_iter().filter(|path| !found.contains(path)) {
            match self.store.delete(&path).await {
                Ok(()) => {
                    report.removed += 1;
                    info!(path = %path.display(), "Removed deleted video");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Error removing video");
                    report.skip(path, e);
                }
            }
        }
    }
}

/// Fails fast when the root cannot be scanned. Scanning a missing root would
/// otherwise look like every video was deleted.
async fn ensure_root_available(root: &Path) -> Result<()> {
    let unavailable = |reason: String| MediaError::RootUnavailable {
        path: root.to_path_buf(),
        reason,
    };

    match tokio::fs::metadata(root).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(unavailable("not a directory".to_string())),
        Err(e) => {
            let reason = match e.kind() {
                io::ErrorKind::NotFound => "video directory does not exist".to_string(),
                io::ErrorKind::PermissionDenied => {
                    "permission denied accessing video directory".to_string()
                }
                _ => format!("error accessing video directory: {}", e),
            };
            warn!(root = %root.display(), error = %e, "{}", reason);
            Err(unavailable(reason))
        }
    }
}
