//! Shared catalogue, comparison, post, and sitemap models.

use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pricing model advertised for a catalogue entry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Pricing {
    /// No paid tier.
    Free,
    /// Free tier with paid upgrades.
    #[default]
    Freemium,
    /// Paid subscription or licence.
    Paid,
    /// Metered billing.
    #[serde(rename = "Pay-as-you-go", alias = "pay-as-you-go")]
    PayAsYouGo,
    /// Included with another product.
    Bundled,
    /// Charged per call or per unit of work.
    #[serde(rename = "Pay per use", alias = "pay-per-use")]
    PayPerUse,
}

impl Pricing {
    /// Display label used in generated content and JSON output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Freemium => "Freemium",
            Self::Paid => "Paid",
            Self::PayAsYouGo => "Pay-as-you-go",
            Self::Bundled => "Bundled",
            Self::PayPerUse => "Pay per use",
        }
    }
}

impl Display for Pricing {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pricing {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "freemium" => Ok(Self::Freemium),
            "paid" => Ok(Self::Paid),
            "pay-as-you-go" | "pay as you go" => Ok(Self::PayAsYouGo),
            "bundled" => Ok(Self::Bundled),
            "pay per use" | "pay-per-use" => Ok(Self::PayPerUse),
            other => Err(format!("unknown pricing model `{other}`")),
        }
    }
}

/// One product/tool record in the compiled catalogue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    /// Globally unique, URL-safe identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Category label as authored (for example `SEO Suite`).
    pub category: String,
    /// One-line pitch.
    pub headline: String,
    /// Longer description.
    pub description: String,
    /// Outbound link for the tool.
    pub target_url: String,
    /// Pricing model.
    pub pricing: Pricing,
    /// Deduplicated tags in first-seen order.
    pub tags: Vec<String>,
    /// Audiences the tool suits best.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub best_for: Vec<String>,
    /// Notable features.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    /// Typical use cases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub use_cases: Vec<String>,
    /// Known integrations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,
}

/// Drop repeated tags while keeping first-seen order.
///
/// Tags are a set for equality purposes, but comparison synthesis reads "the first three tags", so
/// order must stay stable.
pub fn dedup_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// A compiled catalogue: entries in claim order, slugs unique.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Catalogue {
    /// Entries in the order their slugs were claimed.
    pub entries: Vec<CatalogueEntry>,
}

impl Catalogue {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by slug with a linear scan.
    ///
    /// Use [`CatalogueIndex`](crate::comparison::CatalogueIndex) for repeated lookups.
    pub fn get(&self, slug: &str) -> Option<&CatalogueEntry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }
}

/// Scores for one criterion across the contenders of a comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingRow {
    /// Criterion label, e.g. `Ease of use`.
    pub criterion: String,
    /// Contender slug to score on the table's scale.
    pub scores: BTreeMap<String, f64>,
    /// Free-text note shown under the row.
    #[serde(default)]
    pub note: String,
}

/// Rating grid for a comparison on a declared numeric scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingTable {
    /// Maximum score on the scale (scores run from zero to this value).
    pub scale: f64,
    /// Criterion rows in display order.
    pub rows: Vec<RatingRow>,
}

/// Situational recommendation: when `condition` holds, pick `choice`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    /// Situation, e.g. `You need backlink data`.
    pub condition: String,
    /// Contender slug recommended for the situation.
    pub choice: String,
}

/// Question and answer pair rendered on a comparison page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
}

/// A head-to-head page between two or more catalogue entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    /// Contender slugs joined by `-vs-`.
    pub slug: String,
    /// Page title, e.g. `Semrush vs Ahrefs`.
    pub title: String,
    /// Short summary paragraph.
    pub summary: String,
    /// Tag the page is filed under first.
    pub primary_tag: String,
    /// All tags for the page.
    pub tags: Vec<String>,
    /// Catalogue slugs being compared, in display order.
    pub contenders: Vec<String>,
    /// Optional hand-tuned rating grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<RatingTable>,
    /// Situational picks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub picks: Vec<Pick>,
    /// Frequently asked questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faqs: Vec<Faq>,
}

/// Metadata scraped from one blog post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    /// Post slug.
    pub slug: String,
    /// Taxonomy category slug.
    pub category: String,
    /// Optional sub-category slug within `category`.
    pub sub_category: Option<String>,
    /// Publication date as written in the post.
    pub date: Option<String>,
    /// Last update date as written in the post.
    pub updated: Option<String>,
}

/// One `<url>` in the emitted sitemap.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SitemapEntry {
    /// Site path with a single leading `/`.
    pub path: String,
    /// ISO-8601 timestamp.
    pub lastmod: String,
}

/// Site route prefixes shared by the route index and the sitemap.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoutePrefixes {
    /// Prefix for catalogue entry pages.
    pub tools: String,
    /// Prefix for comparison pages.
    pub compare: String,
    /// Prefix for tag listing pages.
    pub tags: String,
    /// Prefix for blog taxonomy and post pages.
    pub blog: String,
}

impl Default for RoutePrefixes {
    fn default() -> Self {
        Self {
            tools: "/tools".into(),
            compare: "/compare".into(),
            tags: "/tags".into(),
            blog: "/blog".into(),
        }
    }
}

impl RoutePrefixes {
    /// Join a prefix and a slug into a route path.
    pub fn join(prefix: &str, slug: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), slug.trim_start_matches('/'))
    }
}
