//! Built-in trusted domains

/// Well-known domains resolved without model inference.
/// Entries are lower-case and carry no `www.` prefix.
pub const BUILTIN_TRUSTED_DOMAINS: &[&str] = &[
    // Search & portals
    "google.com",
    "bing.com",
    "duckduckgo.com",
    "yahoo.com",
    "baidu.com",
    "yandex.ru",
    // Social
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "reddit.com",
    "pinterest.com",
    "tiktok.com",
    "whatsapp.com",
    "telegram.org",
    "discord.com",
    // Media
    "youtube.com",
    "netflix.com",
    "spotify.com",
    "twitch.tv",
    "bbc.co.uk",
    "bbc.com",
    "cnn.com",
    "nytimes.com",
    "theguardian.com",
    "reuters.com",
    // Reference
    "wikipedia.org",
    "wikimedia.org",
    "stackoverflow.com",
    "stackexchange.com",
    "medium.com",
    // Developer
    "github.com",
    "gitlab.com",
    "bitbucket.org",
    "npmjs.com",
    "crates.io",
    "docs.rs",
    "rust-lang.org",
    "python.org",
    "pypi.org",
    "mozilla.org",
    "developer.mozilla.org",
    // Vendors & cloud
    "microsoft.com",
    "live.com",
    "office.com",
    "outlook.com",
    "apple.com",
    "icloud.com",
    "amazon.com",
    "aws.amazon.com",
    "cloudflare.com",
    "adobe.com",
    "dropbox.com",
    "zoom.us",
    "slack.com",
    "salesforce.com",
    "oracle.com",
    "ibm.com",
    "intel.com",
    "nvidia.com",
    // Commerce & payments
    "ebay.com",
    "paypal.com",
    "stripe.com",
    "shopify.com",
    "etsy.com",
    "walmart.com",
    "alibaba.com",
    "aliexpress.com",
];
