//! Freshness detection by modification time.

mod mtime;

pub use mtime::{is_output_fresh, mtime_secs};
