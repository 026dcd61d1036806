//! Mtime-based freshness detection.
//!
//! Used in three places:
//! - asset `Last-Modified` (newest source mtime)
//! - skipping writes of outputs that are already up to date
//! - reusing cached formulae while the template has not changed
//!
//! Timestamps are compared at whole-second resolution because that is all
//! HTTP dates can carry.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Modification time in whole seconds since the unix epoch.
pub fn mtime_secs(path: &Path) -> Option<u64> {
    get_mtime(path)
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
}

/// Check if output file is at least as new as the given source mtime
///
/// Returns `true` if the output exists and `output_mtime >= source_secs`,
/// meaning the output is fresh and processing can be skipped. An unknown
/// source mtime is never fresh.
pub fn is_output_fresh(output: &Path, source_secs: Option<u64>) -> bool {
    let Some(source) = source_secs else {
        return false;
    };

    mtime_secs(output).is_some_and(|output| output >= source)
}
