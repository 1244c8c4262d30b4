//! URL validation and metadata heuristics.
//!
//! Links carry a derived title, domain and favicon URL so a board stays
//! presentable without any network round trip. The heuristics favor the
//! URL path over the hostname, and fall back to the raw URL when nothing
//! better is available.

use url::Url;

/// Domain recorded when the URL cannot be parsed at all.
pub const UNKNOWN_DOMAIN: &str = "Unknown";

/// Default favicon service prefix. The final URL is
/// `{base}?domain={host}&sz=32`.
pub const DEFAULT_FAVICON_BASE: &str = "https://www.google.com/s2/favicons";

/// True when `input` parses as an absolute URL.
pub fn is_valid_url(input: &str) -> bool {
    Url::parse(input).is_ok()
}

/// True when `url` is an http(s) URL a metadata fetcher could reach.
pub fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Hostname of `url`, the empty string for host-less URLs, or
/// [`UNKNOWN_DOMAIN`] when the URL does not parse.
pub fn domain_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_string(),
        Err(_) => UNKNOWN_DOMAIN.to_string(),
    }
}

/// Favicon service URL for `url`, or `None` when `url` does not parse.
pub fn favicon_url_for(url: &str, base: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().unwrap_or_default();
    Some(format!("{}?domain={}&sz=32", base, urlencoding::encode(host)))
}

/// Derive a human-readable title from a URL.
///
/// The path (minus leading slashes and a trailing file extension) is
/// word-capitalized with hyphens and underscores turned into spaces. An
/// empty path falls back to the hostname without a leading `www.`, and an
/// unparseable URL is returned verbatim.
pub fn extract_title_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let stem = strip_extension(parsed.path().trim_start_matches('/'));
    let title = capitalize_words(&stem.replace(['-', '_'], " "));
    if !title.is_empty() {
        return title;
    }

    let host = parsed
        .host_str()
        .map(|h| h.strip_prefix("www.").unwrap_or(h))
        .unwrap_or_default();
    if host.is_empty() {
        url.to_string()
    } else {
        host.to_string()
    }
}

/// Drop a trailing `.ext` segment, where the extension contains no slash.
fn strip_extension(path: &str) -> &str {
    if let Some(idx) = path.rfind('.') {
        let ext = &path[idx + 1..];
        if !ext.is_empty() && !ext.contains('/') {
            return &path[..idx];
        }
    }
    path
}

/// Uppercase the first alphanumeric character of each word.
fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_word = false;
    for ch in text.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !prev_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_word = is_word;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url_accepts_absolute() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("ftp://files.example.com"));
        assert!(is_valid_url("https://example.com/path?q=1#frag"));
    }

    #[test]
    fn test_is_valid_url_rejects_relative_and_empty() {
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_is_web_url_requires_http_scheme() {
        assert!(is_web_url("https://example.com"));
        assert!(is_web_url("http://example.com"));
        assert!(!is_web_url("ftp://files.example.com"));
        assert!(!is_web_url("example.com"));
    }

    #[test]
    fn test_extract_title_from_path() {
        assert_eq!(
            extract_title_from_url("https://example.com/about-us"),
            "About Us"
        );
        assert_eq!(
            extract_title_from_url("https://example.com/docs/getting-started.html"),
            "Docs/Getting Started"
        );
        assert_eq!(
            extract_title_from_url("https://example.com/annual_report.pdf"),
            "Annual Report"
        );
    }

    #[test]
    fn test_extract_title_falls_back_to_host() {
        assert_eq!(extract_title_from_url("https://www.test.com"), "test.com");
        assert_eq!(extract_title_from_url("https://example.com/"), "example.com");
        // Only a leading `www.` is stripped.
        assert_eq!(
            extract_title_from_url("https://docs.www.example.com/"),
            "docs.www.example.com"
        );
    }

    #[test]
    fn test_extract_title_unparseable_returns_input() {
        assert_eq!(extract_title_from_url("not a url"), "not a url");
    }

    #[test]
    fn test_extension_strip_requires_trailing_segment() {
        // The dot is not in the final segment, so nothing is stripped.
        assert_eq!(
            extract_title_from_url("https://example.com/v1.2/page"),
            "V1.2/Page"
        );
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://sub.example.com/x"), "sub.example.com");
        assert_eq!(domain_of("garbage"), UNKNOWN_DOMAIN);
    }

    #[test]
    fn test_favicon_url() {
        assert_eq!(
            favicon_url_for("https://example.com/page", DEFAULT_FAVICON_BASE),
            Some("https://www.google.com/s2/favicons?domain=example.com&sz=32".to_string())
        );
        assert_eq!(favicon_url_for("garbage", DEFAULT_FAVICON_BASE), None);
    }
}
