//! Request URL to route path.

use percent_encoding::percent_decode_str;

/// Decode a raw request URL into the path routes are matched against.
///
/// Strips the query string and fragment and percent-decodes the rest.
/// Returns `None` for paths that are not valid UTF-8 after decoding.
pub fn normalize_url(url: &str) -> Option<String> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let decoded = percent_decode_str(&url[..end]).decode_utf8().ok()?;

    if decoded.starts_with('/') {
        Some(decoded.into_owned())
    } else {
        Some(format!("/{decoded}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/css/app.css").as_deref(), Some("/css/app.css"));
        assert_eq!(normalize_url("/css/app.css?v=3").as_deref(), Some("/css/app.css"));
        assert_eq!(normalize_url("/css/my%20app.css").as_deref(), Some("/css/my app.css"));
        assert_eq!(normalize_url("js/app.js#x").as_deref(), Some("/js/app.js"));
        assert_eq!(normalize_url("/%FF.css"), None);
    }
}
