//! Scan payload parsing.
//!
//! A scanned code is either a link whose last path segment is the café id
//! (`https://example.com/cafe/42`) or the bare id itself.

use thiserror::Error;
use url::Url;

use coffee_compass_core::CafeId;

/// A scan that could not produce a café id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Payload was empty or only whitespace.
    #[error("Scanned code is empty")]
    Empty,

    /// Payload was a link without a usable path segment.
    #[error("No café id in scanned link: {0}")]
    MissingId(String),

    /// Scanner reported a failure instead of a payload.
    #[error("Scanner error: {0}")]
    Scanner(String),
}

/// Extract a café id from a scanned payload.
///
/// # Errors
///
/// Returns [`ScanError::Empty`] for a blank payload and
/// [`ScanError::MissingId`] for a link with no non-empty path segment.
pub fn parse_scan_payload(payload: &str) -> Result<CafeId, ScanError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(ScanError::Empty);
    }

    match Url::parse(trimmed) {
        Ok(url) if url.host().is_some() => last_path_segment(&url)
            .map(CafeId::new)
            .ok_or_else(|| ScanError::MissingId(trimmed.to_string())),
        _ => Ok(CafeId::new(trimmed)),
    }
}

fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}
