//! Video catalog and byte-range streaming primitives for StreamLite.
//!
//! [`scanner`] walks a video directory and reconciles it into a
//! [`catalog::CatalogStore`]; [`range`] resolves HTTP `Range` headers against
//! a file size. The HTTP surface lives in `streamlite-server`.

/// Catalog storage port and its adapters
pub mod catalog;
/// Error types
pub mod error;
/// Video records and the timestamp rules shared by scanner and stores
pub mod media;
pub mod range;
pub mod scanner;

/// Embedded catalog schema migrations.
#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use catalog::{CatalogStore, InMemoryCatalog};
#[cfg(feature = "database")]
pub use catalog::PostgresCatalog;
pub use error::*;
pub use media::*;
pub use range::{ByteRange, parse_range_header, unsatisfied_content_range};
pub use scanner::{ScanReport, SkipKind, SkippedEntry, SyncEngine};
