//! URL normalization
//!
//! Scheme defaulting, protocol detection and the trust-comparison domain.

use std::fmt;

use serde::Serialize;

use super::features::UrlParts;

/// Transport of the normalized URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Protocol::Https)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and default the scheme to `https://` when no http(s) scheme is present
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_web_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn has_web_scheme(url: &str) -> bool {
    let starts_with = |prefix: &str| {
        url.get(..prefix.len())
            .map(|head| head.eq_ignore_ascii_case(prefix))
            .unwrap_or(false)
    };
    starts_with("http://") || starts_with("https://")
}

/// Protocol of an already-normalized URL
pub fn protocol_of(url: &str) -> Protocol {
    match UrlParts::split(url).scheme.as_str() {
        "http" => Protocol::Http,
        _ => Protocol::Https,
    }
}

/// Lower-cased hostname, port and userinfo dropped; empty when absent
pub fn host_of(url: &str) -> String {
    UrlParts::split(url).hostname()
}

/// Removes at most one leading `www.`; the domain reported and compared for trust
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
