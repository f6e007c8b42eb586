//! `Range` header arithmetic for partial-content responses.

use serde::Serialize;

use crate::{MediaError, Result};

/// Inclusive byte window of a file, already validated against its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    /// First byte.
    pub start: u64,
    /// Last byte, inclusive.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the window. Never zero for a parsed range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Only true for a hand-built window with `end < start`.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// `Content-Range` value for a 206 response.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

/// `Content-Range` value for a 416 response.
pub fn unsatisfied_content_range(total: u64) -> String {
    format!("bytes */{}", total)
}

/// Parses `bytes=<start>-<end>` against a file of `total` bytes.
///
/// `end` may be omitted and is clamped to the last byte. Only the first
/// subrange of a multi-range header is considered. Suffix ranges
/// (`bytes=-500`) are rejected along with every other unsatisfiable form.
pub fn parse_range_header(header: &str, total: u64) -> Result<ByteRange> {
    let invalid = || MediaError::InvalidRange(header.to_string());

    let (unit, ranges) = header.trim().split_once('=').ok_or_else(invalid)?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(invalid());
    }

    let first = ranges.split(',').next().unwrap_or_default().trim();
    let (start, end) = first.split_once('-').ok_or_else(invalid)?;
    let (start, end) = (start.trim(), end.trim());

    // start is required
    let start: u64 = start.parse().map_err(|_| invalid())?;
    if start >= total {
        return Err(invalid());
    }

    let last = total - 1;
    let end = if end.is_empty() {
        last
    } else {
        end.parse::<u64>().map_err(|_| invalid())?.min(last)
    };

    if start > end {
        return Err(invalid());
    }

    Ok(ByteRange { start, end })
}
