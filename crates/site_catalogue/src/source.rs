//! Catalogue source files and the catalogue compile pass.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{CatalogueError, CatalogueResult};
use crate::model::{dedup_tags, Catalogue, CatalogueEntry, Faq, Pick, Pricing, RatingTable};
use crate::slug::{slugify, SlugRegistry};
use crate::synth::{synthesize, BulkList, UrlOverrides};

/// Hand-authored catalogue entry. Only `slug` and the list fields may be omitted.
///
/// Multi-word keys are accepted in snake_case or camelCase.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AuthoredEntry {
    /// Explicit slug; derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// One-line pitch.
    pub headline: String,
    /// Longer description.
    pub description: String,
    /// Outbound URL.
    #[serde(alias = "targetUrl")]
    pub target_url: String,
    /// Pricing model.
    pub pricing: Pricing,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Audiences the tool suits best.
    #[serde(default, alias = "bestFor")]
    pub best_for: Vec<String>,
    /// Notable features.
    #[serde(default)]
    pub features: Vec<String>,
    /// Typical use cases.
    #[serde(default, alias = "useCases")]
    pub use_cases: Vec<String>,
    /// Known integrations.
    #[serde(default)]
    pub integrations: Vec<String>,
}

impl AuthoredEntry {
    /// Slug this entry claims: the explicit slug or the slugified name, normalized.
    pub fn resolved_slug(&self) -> String {
        slugify(self.slug.as_deref().unwrap_or(&self.name))
    }

    fn into_entry(self, slug: String) -> CatalogueEntry {
        CatalogueEntry {
            slug,
            name: self.name,
            category: self.category,
            headline: self.headline,
            description: self.description,
            target_url: self.target_url,
            pricing: self.pricing,
            tags: dedup_tags(self.tags),
            best_for: self.best_for,
            features: self.features,
            use_cases: self.use_cases,
            integrations: self.integrations,
        }
    }
}

/// Hand-authored comparison. Anything omitted is derived from the catalogue.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthoredComparison {
    /// Explicit slug; joined from `contenders` when absent.
    pub slug: Option<String>,
    /// Page title; derived from contender names when absent.
    pub title: Option<String>,
    /// Summary paragraph; derived from the title when absent.
    pub summary: Option<String>,
    /// Primary tag; derived from the first contender when absent.
    #[serde(alias = "primaryTag")]
    pub primary_tag: Option<String>,
    /// Tags; derived from the contenders when absent.
    pub tags: Option<Vec<String>>,
    /// Contender slugs; parsed from `slug` when empty.
    pub contenders: Vec<String>,
    /// Hand-tuned rating grid.
    pub ratings: Option<RatingTable>,
    /// Situational picks.
    pub picks: Vec<Pick>,
    /// Frequently asked questions.
    pub faqs: Vec<Faq>,
}

/// Everything a catalogue build reads from its source file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogueSource {
    /// Hand-authored entries; claimed before any bulk list.
    ///
    /// Also read from `entries`, so compiled catalogue JSON loads back as a source.
    #[serde(alias = "entries")]
    pub tools: Vec<AuthoredEntry>,
    /// Bulk-import lists in declaration order.
    pub bulk: Vec<BulkList>,
    /// Known slug to canonical URL overrides for synthesized entries.
    #[serde(alias = "urlOverrides")]
    pub url_overrides: UrlOverrides,
    /// Hand-authored comparisons; never re-synthesized.
    pub comparisons: Vec<AuthoredComparison>,
    /// Every comparison slug the site should carry.
    #[serde(alias = "desiredComparisons")]
    pub desired_comparisons: Vec<String>,
}

impl CatalogueSource {
    /// Load a source file, choosing the format from its extension.
    ///
    /// `.toml` (or no extension) is TOML, `.yaml`/`.yml` is YAML, `.json` is JSON.
    pub fn load(path: &Path) -> CatalogueResult<Self> {
        let text =
            fs::read_to_string(path).map_err(|err| CatalogueError::io("read", path, err))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("toml")
            .to_ascii_lowercase();

        match extension.as_str() {
            "toml" => toml::from_str(&text).map_err(|err| CatalogueError::parse(path, err)),
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|err| CatalogueError::parse(path, err))
            }
            "json" => serde_json::from_str(&text).map_err(|err| CatalogueError::parse(path, err)),
            _ => Err(CatalogueError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Compile the catalogue: hand-authored entries first, then bulk lists in order.
///
/// One [`SlugRegistry`] is threaded through every pass, so the first claimant of a slug wins
/// across the whole build.
pub fn compile_catalogue(source: &CatalogueSource) -> Catalogue {
    let mut claimed = SlugRegistry::new();
    let mut entries = Vec::with_capacity(source.tools.len());

    for authored in source.tools.iter().cloned() {
        let slug = authored.resolved_slug();
        if slug.is_empty() {
            warn!(name = %authored.name, "hand-authored entry has no usable slug; skipped");
            continue;
        }
        if !claimed.claim(&slug) {
            warn!(slug = %slug, "duplicate hand-authored slug; keeping the first entry");
            continue;
        }
        entries.push(authored.into_entry(slug));
    }
    let authored_count = entries.len();

    for list in &source.bulk {
        let synthesized = synthesize(list, &source.url_overrides, &mut claimed);
        info!(
            category = %list.category,
            declared = list.items.len(),
            added = synthesized.len(),
            "bulk list expanded"
        );
        entries.extend(synthesized);
    }

    info!(
        authored = authored_count,
        total = entries.len(),
        "catalogue compiled"
    );
    Catalogue { entries }
}
