//! Directory scanning and catalog reconciliation.

/// Which files count as videos
pub mod filter;
/// Path cleaning and the visited-directory set
pub mod paths;
/// Catalog reconciliation
pub mod sync;
/// Symlink-aware directory traversal
pub mod walk;

pub use filter::{VIDEO_EXTENSIONS, content_type_for, is_video_file};
pub use paths::{PathSet, normalize_path};
pub use sync::{ScanReport, SkipKind, SkippedEntry, SyncEngine};
pub use walk::{DirectoryWalker, WalkEntry, WalkError};
