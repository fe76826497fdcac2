//! Trust Module - Trusted Domain Matcher
//!
//! Exact, case-insensitive membership test of a hostname against a fixed
//! allow-list. One leading `www.` is stripped from both entries and
//! candidates, so pass the raw hostname: `www.www.google.com` is compared
//! as `www.google.com`. Parent domains are NOT matched: `mail.google.com`
//! is only trusted if listed itself.
//!
//! The set is built once at startup and never mutated while serving.

mod builtin;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::normalize::strip_www;

pub use builtin::BUILTIN_TRUSTED_DOMAINS;

#[derive(Debug, Clone, Default)]
pub struct TrustedDomains {
    domains: HashSet<String>,
}

impl TrustedDomains {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in allow-list
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.extend(BUILTIN_TRUSTED_DOMAINS.iter().copied());
        set
    }

    /// Built-in list plus the entries of `path`
    pub fn builtin_with_file(path: &Path) -> Result<Self, std::io::Error> {
        let mut set = Self::builtin();
        let added = set.load_file(path)?;
        log::info!("Loaded {} trusted domains from {}", added, path.display());
        Ok(set)
    }

    /// One domain per line; blank lines and `#` comments skipped.
    /// Returns the number of entries read.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, std::io::Error> {
        let content = fs::read_to_string(path)?;
        Ok(self.parse_list(&content))
    }

    fn parse_list(&mut self, content: &str) -> usize {
        let mut count = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if self.insert(line) {
                count += 1;
            }
        }
        count
    }

    /// Add one domain; false if it normalizes to nothing
    pub fn insert(&mut self, domain: &str) -> bool {
        let domain = canonical(domain);
        if domain.is_empty() {
            return false;
        }
        self.domains.insert(domain);
        true
    }

    pub fn extend<'a>(&mut self, domains: impl IntoIterator<Item = &'a str>) {
        for domain in domains {
            self.insert(domain);
        }
    }

    pub fn is_trusted(&self, host: &str) -> bool {
        let domain = canonical(host);
        !domain.is_empty() && self.domains.contains(&domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

fn canonical(domain: &str) -> String {
    strip_www(&domain.trim().to_lowercase()).to_string()
}
