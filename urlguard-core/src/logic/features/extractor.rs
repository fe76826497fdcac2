//! URL Feature Extractor
//!
//! Pure, total transformation: raw URL string → [`FeatureRecord`].
//! Nothing in here can fail. Components that cannot be computed are
//! encoded as defaults or as [`SENTINEL`].

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::layout::{chart_label, feature_description, CHART_FEATURES, FEATURE_COUNT, FEATURE_LAYOUT, SENTINEL};
use super::url_parts::UrlParts;
use super::vector::FeatureVector;

// ============================================================================
// PATTERNS
// ============================================================================

static IP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])\.",
        r"([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])/)|",
        r"((0x[0-9a-fA-F]{1,2})\.(0x[0-9a-fA-F]{1,2})\.(0x[0-9a-fA-F]{1,2})\.(0x[0-9a-fA-F]{1,2})/)|",
        r"(?:[a-fA-F0-9]{1,4}:){7}[a-fA-F0-9]{1,4}",
    ))
    .expect("static IP pattern")
});

/// Keywords phishing kits like to put in URLs
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "paypal", "login", "signin", "bank", "account", "update", "free", "lucky", "service", "bonus",
    "ebayisapi", "webscr",
];

/// Known URL shortener hosts
pub const SHORTENER_DOMAINS: &[&str] = &[
    "bit.ly", "goo.gl", "shorte.st", "go2l.ink", "x.co", "ow.ly", "t.co", "tinyurl", "tr.im",
    "is.gd", "cli.gs", "yfrog.com", "migre.me", "ff.im", "tiny.cc", "url4.eu", "twit.ac", "su.pr",
    "twurl.nl", "snipurl.com", "short.to", "BudURL.com", "ping.fm", "post.ly", "Just.as",
    "bkite.com", "snipr.com", "fic.kr", "loopt.us", "doiop.com", "short.ie", "kl.am", "wp.me",
    "rubyurl.com", "om.ly", "to.ly", "bit.do", "lnkd.in", "db.tt", "qr.ae", "adf.ly", "bitly.com",
    "cur.lv", "tinyurl.com", "ity.im", "q.gs", "po.st", "bc.vc", "twitthis.com", "u.to", "j.mp",
    "buzurl.com", "cutt.us", "u.bb", "yourls.org", "prettylinkpro.com", "scrnch.me",
    "filoops.info", "vzturl.com", "qr.net", "1url.com", "tweez.me", "v.gd", "link.zip.net",
];

/// Decimal digits (Nd) and letters (L*), by Unicode general category
static DIGIT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Nd}").expect("static digit pattern"));
static LETTER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}").expect("static letter pattern"));

static SUSPICIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| alternation(SUSPICIOUS_KEYWORDS));
static SHORTENER_PATTERN: Lazy<Regex> = Lazy::new(|| alternation(SHORTENER_DOMAINS));

/// Case-insensitive `a|b|c` over literal words
fn alternation(words: &[&str]) -> Regex {
    let pattern = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("static keyword pattern")
}

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// The 20 lexical features of one URL.
///
/// Serializes as a JSON object whose keys follow [`FEATURE_LAYOUT`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureRecord {
    pub use_of_ip: i64,
    pub abnormal_url: i64,
    pub count_dot: i64,
    pub count_www: i64,
    pub count_at: i64,
    pub count_dir: i64,
    pub count_embed_domain: i64,
    pub short_url: i64,
    pub count_https: i64,
    pub count_http: i64,
    pub count_percent: i64,
    pub count_hyphen: i64,
    pub count_equals: i64,
    pub url_length: i64,
    pub hostname_length: i64,
    pub sus_url: i64,
    pub fd_length: i64,
    pub tld_length: i64,
    pub count_digits: i64,
    pub count_letters: i64,
}

impl FeatureRecord {
    /// Values in canonical column order
    pub fn values(&self) -> [i64; FEATURE_COUNT] {
        [
            self.use_of_ip,
            self.abnormal_url,
            self.count_dot,
            self.count_www,
            self.count_at,
            self.count_dir,
            self.count_embed_domain,
            self.short_url,
            self.count_https,
            self.count_http,
            self.count_percent,
            self.count_hyphen,
            self.count_equals,
            self.url_length,
            self.hostname_length,
            self.sus_url,
            self.fd_length,
            self.tld_length,
            self.count_digits,
            self.count_letters,
        ]
    }

    /// `(column name, value)` pairs in canonical order
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, i64)> {
        FEATURE_LAYOUT.iter().copied().zip(self.values())
    }

    /// Value by canonical column name
    pub fn get(&self, name: &str) -> Option<i64> {
        self.named_values().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Positional vector for model consumption
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::from_record(self)
    }

    /// Counter features as bar-chart points
    pub fn chart_data(&self) -> Vec<ChartPoint> {
        CHART_FEATURES
            .iter()
            .map(|&key| ChartPoint {
                name: chart_label(key),
                value: self.get(key).unwrap_or(0),
                full_name: feature_description(key).unwrap_or(key),
            })
            .collect()
    }
}

/// One bar of the feature chart
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub value: i64,
    pub full_name: &'static str,
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.named_values() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract all 20 features from a URL.
///
/// `url` is expected to be the scheme-defaulted URL; nothing else about it
/// is normalized before counting.
pub fn extract_features(url: &str) -> FeatureRecord {
    let parts = UrlParts::split(url);
    let hostname = parts.hostname();
    let path = parts.path.as_str();

    FeatureRecord {
        use_of_ip: flag(IP_PATTERN.is_match(url)),
        abnormal_url: flag(hostname.is_empty() || !url.contains(hostname.as_str())),
        count_dot: count_char(url, '.'),
        count_www: count_substr(url, "www"),
        count_at: count_char(url, '@'),
        count_dir: count_char(path, '/'),
        count_embed_domain: count_substr(path, "//"),
        short_url: flag(SHORTENER_PATTERN.is_match(url)),
        count_https: count_substr(url, "https"),
        count_http: count_substr(url, "http"),
        count_percent: count_char(url, '%'),
        count_hyphen: count_char(url, '-'),
        count_equals: count_char(url, '='),
        url_length: char_len(url),
        hostname_length: char_len(&parts.netloc),
        sus_url: flag(SUSPICIOUS_PATTERN.is_match(url)),
        fd_length: first_directory_length(path),
        tld_length: tld_length(&hostname),
        count_digits: DIGIT_PATTERN.find_iter(url).count() as i64,
        count_letters: LETTER_PATTERN.find_iter(url).count() as i64,
    }
}

fn flag(condition: bool) -> i64 {
    i64::from(condition)
}

fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

fn count_char(haystack: &str, needle: char) -> i64 {
    haystack.matches(needle).count() as i64
}

/// Non-overlapping occurrences, scanning left to right
fn count_substr(haystack: &str, needle: &str) -> i64 {
    haystack.matches(needle).count() as i64
}

fn first_directory_length(path: &str) -> i64 {
    path.split('/').nth(1).map(char_len).unwrap_or(0)
}

/// Length of the last dot-separated label; needs at least two labels
fn tld_length(hostname: &str) -> i64 {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 {
        return SENTINEL;
    }
    labels.last().map(|tld| char_len(tld)).unwrap_or(SENTINEL)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_https_url() {
        let f = extract_features("https://www.example.com/login/index.html?user=1");

        assert_eq!(f.use_of_ip, 0);
        assert_eq!(f.abnormal_url, 0);
        assert_eq!(f.count_dot, 3);
        assert_eq!(f.count_www, 1);
        assert_eq!(f.count_dir, 2);
        assert_eq!(f.count_embed_domain, 0);
        assert_eq!(f.sus_url, 1);
        assert_eq!(f.count_https, 1);
        assert_eq!(f.count_http, 1);
        assert_eq!(f.count_equals, 1);
        assert_eq!(f.url_length, 47);
        assert_eq!(f.hostname_length, 15);
        assert_eq!(f.fd_length, 5);
        assert_eq!(f.tld_length, 3);
        assert_eq!(f.count_digits, 1);
    }

    #[test]
    fn test_http_counter_overlaps_https() {
        let f = extract_features("https://a.test/?next=http://b.test");
        assert_eq!(f.count_https, 1);
        assert_eq!(f.count_http, 2);
    }

    #[test]
    fn test_ipv4_requires_trailing_slash() {
        assert_eq!(extract_features("http://192.168.10.5/admin").use_of_ip, 1);
        assert_eq!(extract_features("http://192.168.10.5").use_of_ip, 0);
    }

    #[test]
    fn test_hex_ipv4_and_ipv6() {
        assert_eq!(extract_features("http://0xC0.0xA8.0x0A.0x05/x").use_of_ip, 1);
        assert_eq!(
            extract_features("http://[2001:0db8:85a3:0000:0000:8a2e:0370:7334]/").use_of_ip,
            1
        );
        assert_eq!(extract_features("http://[2001:db8::1]/").use_of_ip, 0);
    }

    #[test]
    fn test_abnormal_url_is_case_sensitive() {
        // hostname is lower-cased by parsing, the raw URL is not
        assert_eq!(extract_features("https://Example.com/").abnormal_url, 1);
        assert_eq!(extract_features("https://example.com/").abnormal_url, 0);
        assert_eq!(extract_features("no-authority-here").abnormal_url, 1);
    }

    #[test]
    fn test_embedded_domain_and_dirs() {
        let f = extract_features("https://evil.test/r//https://bank.test/a");
        assert_eq!(f.count_embed_domain, 2);
        assert_eq!(f.count_dir, 6);
        assert_eq!(f.fd_length, 1);
    }

    #[test]
    fn test_shortener_detection() {
        assert_eq!(extract_features("https://bit.ly/3xyz").short_url, 1);
        assert_eq!(extract_features("https://BUDURL.com/abc").short_url, 1);
        assert_eq!(extract_features("https://example.org/").short_url, 0);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(extract_features("https://PAYPAL.example.net/").sus_url, 1);
        assert_eq!(extract_features("https://example.net/WebScr").sus_url, 1);
        assert_eq!(extract_features("https://example.net/about").sus_url, 0);
    }

    #[test]
    fn test_authority_length_includes_port_and_userinfo() {
        let f = extract_features("https://user@host.test:8080/");
        assert_eq!(f.hostname_length, 19);
        assert_eq!(f.count_at, 1);
        assert_eq!(f.tld_length, 4);
    }

    #[test]
    fn test_tld_sentinel() {
        assert_eq!(extract_features("http://localhost/").tld_length, SENTINEL);
        assert_eq!(extract_features("").tld_length, SENTINEL);
        assert_eq!(extract_features("https://co.uk/").tld_length, 2);
    }

    #[test]
    fn test_record_order_and_lookup() {
        let f = extract_features("https://example.com/");
        let names: Vec<&str> = f.named_values().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_LAYOUT);
        assert_eq!(f.get("url_length"), Some(20));
        assert_eq!(f.get("missing"), None);
    }

    #[test]
    fn test_serialized_key_order() {
        let f = extract_features("https://example.com/");
        let json = serde_json::to_string(&f).unwrap();
        let mut last = 0;
        for name in FEATURE_LAYOUT {
            let key = format!("\"{}\":", name);
            let pos = json.find(&key).expect("key present");
            assert!(pos >= last, "{} out of order", name);
            last = pos;
        }
    }

    #[test]
    fn test_chart_data() {
        let f = extract_features("https://www.a-b.com/x?y=1");
        let chart = f.chart_data();

        assert_eq!(chart.len(), CHART_FEATURES.len());
        assert_eq!(chart[0], ChartPoint { name: "Dots".to_string(), value: 2, full_name: "Number of dots" });
        assert_eq!(chart[1].name, "www");
        assert_eq!(chart[1].value, 1);

        let hyphen = chart.iter().find(|p| p.full_name == "Hyphen count").unwrap();
        assert_eq!(hyphen.name, "count-");
        assert_eq!(hyphen.value, 1);

        let json = serde_json::to_value(&chart[2]).unwrap();
        assert_eq!(json["name"], "At");
        assert_eq!(json["fullName"], "@ symbol count (suspicious)");
    }
}
