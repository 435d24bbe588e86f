//! Web URL filter applied to every record before it leaves a collector.

use serde_json::Value;
use url::Url;

/// True only for absolute URLs whose scheme is exactly `http` or `https`.
///
/// This is a filter, not a validator: malformed input and other schemes
/// (`chrome:`, `file:`, `ftp:` ...) are simply rejected.
pub fn is_web_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Same as [`is_web_url`] for untyped input; anything that is not a JSON
/// string is rejected.
pub fn is_web_url_value(value: &Value) -> bool {
    value.as_str().map(is_web_url).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(is_web_url("http://example.com"));
        assert!(is_web_url("https://example.com/path?q=1#frag"));
        assert!(is_web_url("HTTPS://EXAMPLE.COM"));
        assert!(is_web_url("http://localhost:8000/tabs"));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(!is_web_url("ftp://x"));
        assert!(!is_web_url("chrome://settings"));
        assert!(!is_web_url("file:///etc/hosts"));
        assert!(!is_web_url("javascript:alert(1)"));
        assert!(!is_web_url("about:blank"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_web_url(""));
        assert!(!is_web_url("example.com"));
        assert!(!is_web_url("/relative/path"));
        assert!(!is_web_url("http://"));
        assert!(!is_web_url("not a url"));
    }

    #[test]
    fn test_rejects_non_strings() {
        assert!(!is_web_url_value(&json!(null)));
        assert!(!is_web_url_value(&json!(42)));
        assert!(!is_web_url_value(&json!(["https://example.com"])));
        assert!(!is_web_url_value(&json!({"url": "https://example.com"})));
        assert!(is_web_url_value(&json!("https://example.com")));
    }
}
