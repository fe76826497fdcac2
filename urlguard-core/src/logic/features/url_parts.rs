//! Raw URL splitting
//!
//! Splits a URL into `scheme://netloc/path?query#fragment` WITHOUT any
//! normalization of the parts. Features are counted on the literal text,
//! so percent-encoding, case and trailing slashes must survive untouched.
//! Only the derived `hostname` is lower-cased.

/// Components of a raw URL string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Lower-cased scheme, empty when absent
    pub scheme: String,
    /// Authority as written: `user@host:port`
    pub netloc: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl UrlParts {
    /// Split a URL. Never fails: unrecognised input ends up in `path`.
    pub fn split(raw: &str) -> Self {
        // Tabs and newlines are dropped before parsing, like browsers do
        let cleaned: String = raw.chars().filter(|c| !matches!(c, '\t' | '\r' | '\n')).collect();
        let mut rest = cleaned.as_str();
        let mut parts = UrlParts::default();

        if let Some(colon) = rest.find(':') {
            let candidate = &rest[..colon];
            if is_scheme(candidate) {
                parts.scheme = candidate.to_ascii_lowercase();
                rest = &rest[colon + 1..];
            }
        }

        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            parts.netloc = after[..end].to_string();
            rest = &after[end..];
        }

        if let Some(hash) = rest.find('#') {
            parts.fragment = rest[hash + 1..].to_string();
            rest = &rest[..hash];
        }

        if let Some(question) = rest.find('?') {
            parts.query = rest[question + 1..].to_string();
            rest = &rest[..question];
        }

        parts.path = rest.to_string();
        parts
    }

    /// Host without userinfo, port or IPv6 brackets, lower-cased.
    /// Empty when the URL has no authority.
    pub fn hostname(&self) -> String {
        let host_port = match self.netloc.rfind('@') {
            Some(at) => &self.netloc[at + 1..],
            None => self.netloc.as_str(),
        };

        let host = if let Some(open) = host_port.find('[') {
            let inner = &host_port[open + 1..];
            match inner.find(']') {
                Some(close) => &inner[..close],
                None => inner,
            }
        } else {
            host_port.split(':').next().unwrap_or("")
        };

        host.to_lowercase()
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        let parts = UrlParts::split("HTTPS://User@Example.COM:8443/a/b.html?x=1&y=2#top");
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.netloc, "User@Example.COM:8443");
        assert_eq!(parts.path, "/a/b.html");
        assert_eq!(parts.query, "x=1&y=2");
        assert_eq!(parts.fragment, "top");
        assert_eq!(parts.hostname(), "example.com");
    }

    #[test]
    fn test_no_path() {
        let parts = UrlParts::split("https://example.com");
        assert_eq!(parts.netloc, "example.com");
        assert_eq!(parts.path, "");
    }

    #[test]
    fn test_ipv6_host() {
        let parts = UrlParts::split("http://[2001:DB8::1]:8080/x");
        assert_eq!(parts.netloc, "[2001:DB8::1]:8080");
        assert_eq!(parts.hostname(), "2001:db8::1");
    }

    #[test]
    fn test_no_scheme() {
        let parts = UrlParts::split("example.com/login");
        assert_eq!(parts.scheme, "");
        assert_eq!(parts.netloc, "");
        assert_eq!(parts.path, "example.com/login");
        assert_eq!(parts.hostname(), "");
    }

    #[test]
    fn test_embedded_url_stays_in_path() {
        let parts = UrlParts::split("https://evil.test/redirect//https://bank.test/");
        assert_eq!(parts.netloc, "evil.test");
        assert_eq!(parts.path, "/redirect//https://bank.test/");
    }

    #[test]
    fn test_empty_and_garbage() {
        assert_eq!(UrlParts::split(""), UrlParts::default());
        let parts = UrlParts::split("://%%%");
        assert_eq!(parts.scheme, "");
        assert_eq!(parts.path, "://%%%");
    }
}
