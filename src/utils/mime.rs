//! MIME type detection for served assets.
//!
//! Asset routes only announce a content type for the two formats the
//! pipeline produces. Anything else is served without `Content-Type` and
//! left to the client to sniff.

use std::path::Path;

/// MIME type constants.
pub mod types {
    pub const CSS: &str = "text/css";
    pub const JAVASCRIPT: &str = "application/javascript";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
}

/// Content type for an asset target path, if the extension is known.
pub fn from_path(path: &str) -> Option<&'static str> {
    from_extension(Path::new(path).extension().and_then(|e| e.to_str()))
}

/// Content type for an extension string.
pub fn from_extension(ext: Option<&str>) -> Option<&'static str> {
    match ext {
        Some("js") => Some(types::JAVASCRIPT),
        Some("css") => Some(types::CSS),
        _ => None,
    }
}
