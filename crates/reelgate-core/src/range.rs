//! Byte-range math for partial playback.
//!
//! A `StreamRange` is a request-scoped value derived from the blob's total
//! size and the request's `Range` header. Both offsets are inclusive, as in
//! `Content-Range` semantics.

use crate::error::AppError;

/// A validated inclusive byte range within a blob of known total size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl StreamRange {
    /// Parse an optional `Range` header against a blob of `total` bytes.
    ///
    /// Returns `Ok(None)` when no header is present (serve the full blob).
    /// Accepts the single-range form `bytes=<start>-[<end>]`; `start` is
    /// required, `end` defaults to the last byte offset. Anything malformed
    /// or outside `0 <= start <= end < total` is `RangeNotSatisfiable`.
    pub fn parse(header: Option<&str>, total: u64) -> Result<Option<Self>, AppError> {
        let header = match header {
            Some(h) => h,
            None => return Ok(None),
        };

        let unsatisfiable = || AppError::RangeNotSatisfiable { total };

        let spec = header.strip_prefix("bytes=").ok_or_else(unsatisfiable)?;
        // Multi-range requests are not supported for media playback.
        if spec.contains(',') {
            return Err(unsatisfiable());
        }

        let (start_str, end_str) = spec.split_once('-').ok_or_else(unsatisfiable)?;
        let start: u64 = start_str.trim().parse().map_err(|_| unsatisfiable())?;
        let end: u64 = match end_str.trim() {
            "" => total.checked_sub(1).ok_or_else(unsatisfiable)?,
            s => s.parse().map_err(|_| unsatisfiable())?,
        };

        if start > end || end >= total {
            return Err(unsatisfiable());
        }

        Ok(Some(StreamRange { start, end, total }))
    }

    /// Number of bytes covered by the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a 206 response.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }

    /// `Content-Range` header value for a 416 response.
    pub fn unsatisfiable_content_range(total: u64) -> String {
        format!("bytes */{}", total)
    }
}
