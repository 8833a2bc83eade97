use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The meta tag keys a preview records. Each key appears at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaKey {
    Url,
    Title,
    Description,
    Image,
}

impl MetaKey {
    pub const ALL: [MetaKey; 4] = [
        MetaKey::Url,
        MetaKey::Title,
        MetaKey::Description,
        MetaKey::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetaKey::Url => "url",
            MetaKey::Title => "title",
            MetaKey::Description => "description",
            MetaKey::Image => "image",
        }
    }

    /// The OpenGraph `property` value that maps to this key.
    pub fn og_property(self) -> &'static str {
        match self {
            MetaKey::Url => "og:url",
            MetaKey::Title => "og:title",
            MetaKey::Description => "og:description",
            MetaKey::Image => "og:image",
        }
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetaKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetaKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown meta key: {s}"))
    }
}

pub type MetaTags = BTreeMap<MetaKey, String>;

/// Preview data for one URL.
///
/// Every string defaults to empty; `meta_tags` only holds keys that were
/// actually found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    /// Absolute URL after normalization and redirects.
    pub full_url: String,
    /// Host of `full_url` without a leading `www.`.
    pub canonical_url: String,
    /// Parsed document, re-serialized. Empty for non-HTML content.
    pub raw_html: String,
    pub meta_tags: MetaTags,
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl PreviewResult {
    /// True for the result produced from blank input, where nothing was fetched.
    pub fn is_empty(&self) -> bool {
        *self == PreviewResult::default()
    }

    pub fn meta(&self, key: MetaKey) -> Option<&str> {
        self.meta_tags.get(&key).map(String::as_str)
    }
}
