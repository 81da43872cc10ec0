//! Bulk-import expansion of terse name lists into full catalogue entries.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::model::{dedup_tags, CatalogueEntry, Pricing};
use crate::slug::{slugify, SlugRegistry};
use crate::template::{resolve_template, FieldChain, Template};

const SEARCH_URL_BASE: &str = "https://www.google.com/search?q=";

/// Known slug to canonical URL overrides, consulted before the search URL fallback.
pub type UrlOverrides = BTreeMap<String, String>;

/// Per-item overrides for a bulk-imported entry. Every field is optional.
///
/// Multi-word keys are accepted in snake_case or camelCase.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PartialEntry {
    /// Display name; items without one are dropped.
    pub name: Option<String>,
    /// Explicit slug (normalized through [`slugify`]).
    pub slug: Option<String>,
    /// Category override for this item.
    pub category: Option<String>,
    /// Headline override.
    pub headline: Option<String>,
    /// Description override.
    pub description: Option<String>,
    /// Outbound URL override.
    #[serde(alias = "targetUrl")]
    pub target_url: Option<String>,
    /// Pricing override.
    pub pricing: Option<Pricing>,
    /// Tag override.
    pub tags: Option<Vec<String>>,
    /// `best_for` override.
    #[serde(alias = "bestFor")]
    pub best_for: Option<Vec<String>>,
    /// Feature list override.
    pub features: Option<Vec<String>>,
    /// Use-case override.
    #[serde(alias = "useCases")]
    pub use_cases: Option<Vec<String>>,
    /// Integration list override.
    pub integrations: Option<Vec<String>>,
}

/// One bulk-list item: a bare display name or a partial override object.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BulkItem {
    /// Bare display name.
    Name(String),
    /// Name plus field overrides.
    Partial(PartialEntry),
}

impl BulkItem {
    fn into_partial(self) -> PartialEntry {
        match self {
            Self::Name(name) => PartialEntry {
                name: Some(name),
                ..PartialEntry::default()
            },
            Self::Partial(partial) => partial,
        }
    }
}

impl From<&str> for BulkItem {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Category-wide defaults applied when an item leaves a field unset.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryDefaults {
    /// Default headline text.
    pub headline: Option<String>,
    /// Default description text.
    pub description: Option<String>,
    /// Default pricing model.
    pub pricing: Option<Pricing>,
    /// Default tags.
    pub tags: Option<Vec<String>>,
    /// Default `best_for`.
    #[serde(alias = "bestFor")]
    pub best_for: Option<Vec<String>>,
    /// Default features.
    pub features: Option<Vec<String>>,
    /// Default use cases.
    #[serde(alias = "useCases")]
    pub use_cases: Option<Vec<String>>,
    /// Default integrations.
    pub integrations: Option<Vec<String>>,
}

/// A terse list of names sharing one category, its defaults, and its templates.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BulkList {
    /// Category applied to every item that does not override it.
    pub category: String,
    /// Category defaults.
    #[serde(default)]
    pub defaults: CategoryDefaults,
    /// Headline template.
    #[serde(default, alias = "headlineTemplate")]
    pub headline_template: Option<Template>,
    /// Description template.
    #[serde(default, alias = "descriptionTemplate")]
    pub description_template: Option<Template>,
    /// Items in declaration order.
    #[serde(default)]
    pub items: Vec<BulkItem>,
}

/// Deterministic search URL for a tool without a known canonical URL.
pub fn search_url(name: &str, category: &str) -> String {
    let query = format!("{name} {category}");
    format!("{SEARCH_URL_BASE}{}", urlencoding::encode(&query))
}

/// Expand one bulk list into catalogue entries, claiming slugs in `claimed`.
///
/// Items whose slug is already claimed are dropped whole, never renamed, so earlier sources
/// always win. Items without a usable name are dropped too.
pub fn synthesize(
    list: &BulkList,
    url_overrides: &UrlOverrides,
    claimed: &mut SlugRegistry,
) -> Vec<CatalogueEntry> {
    let mut out = Vec::new();

    for item in list.items.iter().cloned() {
        let partial = item.into_partial();
        let Some(name) = partial
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        else {
            debug!(category = %list.category, "bulk item without a name dropped");
            continue;
        };

        let slug = slugify(partial.slug.as_deref().unwrap_or(name));
        if slug.is_empty() {
            debug!(name, "bulk item name produces an empty slug; dropped");
            continue;
        }
        if !claimed.claim(&slug) {
            debug!(
                slug = %slug,
                category = %list.category,
                "bulk item collides with a claimed slug; dropped"
            );
            continue;
        }

        let entry = expand_entry(list, &partial, name, slug, url_overrides);
        out.push(entry);
    }

    out
}

fn expand_entry(
    list: &BulkList,
    partial: &PartialEntry,
    name: &str,
    slug: String,
    url_overrides: &UrlOverrides,
) -> CatalogueEntry {
    let defaults = &list.defaults;
    let category = partial
        .category
        .clone()
        .unwrap_or_else(|| list.category.clone());

    let headline = FieldChain::new()
        .or_else(|| partial.headline.clone())
        .or_else(|| defaults.headline.clone())
        .or_else(|| resolve_template(list.headline_template.as_ref(), name, &category))
        .resolve_or(format!("{name} for {category}"));

    let description = FieldChain::new()
        .or_else(|| partial.description.clone())
        .or_else(|| defaults.description.clone())
        .or_else(|| resolve_template(list.description_template.as_ref(), name, &category))
        .resolve_or(format!("{name} {category} platform."));

    let pricing = FieldChain::new()
        .or_else(|| partial.pricing)
        .or_else(|| defaults.pricing)
        .resolve_or(Pricing::Freemium);

    let tags = FieldChain::new()
        .or_else(|| partial.tags.clone())
        .or_else(|| defaults.tags.clone())
        .resolve_or(vec![category.to_lowercase()]);

    let target_url = FieldChain::new()
        .or_else(|| partial.target_url.clone())
        .or_else(|| url_overrides.get(&slug).cloned())
        .resolve_or(search_url(name, &category));

    let list_field = |explicit: &Option<Vec<String>>, default: &Option<Vec<String>>| {
        FieldChain::new()
            .or_else(|| explicit.clone())
            .or_else(|| default.clone())
            .resolve_or(Vec::new())
    };

    CatalogueEntry {
        best_for: list_field(&partial.best_for, &defaults.best_for),
        features: list_field(&partial.features, &defaults.features),
        use_cases: list_field(&partial.use_cases, &defaults.use_cases),
        integrations: list_field(&partial.integrations, &defaults.integrations),
        slug,
        name: name.to_string(),
        category,
        headline,
        description,
        target_url,
        pricing,
        tags: dedup_tags(tags),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(category: &str, items: Vec<BulkItem>) -> BulkList {
        BulkList {
            category: category.into(),
            items,
            ..BulkList::default()
        }
    }

    #[test]
    fn bare_names_expand_with_static_fallbacks() {
        let mut claimed = SlugRegistry::new();
        let entries = synthesize(
            &list("Email Marketing", vec!["Mail Rocket".into()]),
            &UrlOverrides::new(),
            &mut claimed,
        );

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.slug, "mail-rocket");
        assert_eq!(entry.headline, "Mail Rocket for Email Marketing");
        assert_eq!(entry.description, "Mail Rocket Email Marketing platform.");
        assert_eq!(entry.pricing, Pricing::Freemium);
        assert_eq!(entry.tags, vec!["email marketing"]);
        assert_eq!(
            entry.target_url,
            "https://www.google.com/search?q=Mail%20Rocket%20Email%20Marketing"
        );
        assert!(entry.features.is_empty());
        assert!(claimed.contains("mail-rocket"));
    }

    #[test]
    fn bulk_import_skips_already_claimed_slug() {
        let mut claimed = SlugRegistry::with_claimed(["foo-tool"]);
        let entries = synthesize(
            &list("CRM", vec!["Foo Tool".into()]),
            &UrlOverrides::new(),
            &mut claimed,
        );
        assert!(entries.is_empty());
    }

    #[test]
    fn duplicates_within_one_list_keep_the_first() {
        let mut claimed = SlugRegistry::new();
        let entries = synthesize(
            &list(
                "CRM",
                vec![
                    "Pipe Drive".into(),
                    BulkItem::Partial(PartialEntry {
                        name: Some("PipeDrive Pro".into()),
                        slug: Some("pipe-drive".into()),
                        ..PartialEntry::default()
                    }),
                ],
            ),
            &UrlOverrides::new(),
            &mut claimed,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Pipe Drive");
    }

    #[test]
    fn nameless_items_are_dropped() {
        let mut claimed = SlugRegistry::new();
        let entries = synthesize(
            &list(
                "CRM",
                vec![
                    BulkItem::Partial(PartialEntry::default()),
                    "   ".into(),
                    "!!!".into(),
                ],
            ),
            &UrlOverrides::new(),
            &mut claimed,
        );
        assert!(entries.is_empty());
        assert!(claimed.is_empty());
    }

    #[test]
    fn precedence_is_item_then_default_then_template_then_fallback() {
        let mut bulk = list(
            "SEO Suite",
            vec![
                BulkItem::Partial(PartialEntry {
                    name: Some("Explicit".into()),
                    headline: Some("Item headline".into()),
                    pricing: Some(Pricing::Paid),
                    ..PartialEntry::default()
                }),
                "Defaulted".into(),
            ],
        );
        bulk.defaults.description = Some("Default description".into());
        bulk.defaults.pricing = Some(Pricing::Free);
        bulk.defaults.features = Some(vec!["Rank tracking".into()]);
        bulk.headline_template = Some(Template::pattern("{name}: the {category} pick"));
        bulk.description_template = Some(Template::Literal("unused".into()));

        let mut claimed = SlugRegistry::new();
        let entries = synthesize(&bulk, &UrlOverrides::new(), &mut claimed);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].headline, "Item headline");
        assert_eq!(entries[0].description, "Default description");
        assert_eq!(entries[0].pricing, Pricing::Paid);

        assert_eq!(entries[1].headline, "Defaulted: the SEO Suite pick");
        assert_eq!(entries[1].pricing, Pricing::Free);
        assert_eq!(entries[1].features, vec!["Rank tracking"]);
    }

    #[test]
    fn url_override_beats_search_url_but_not_explicit_url() {
        let mut overrides = UrlOverrides::new();
        overrides.insert("surfer-seo".into(), "https://surferseo.com".into());
        overrides.insert("clearscope".into(), "https://www.clearscope.io".into());

        let bulk = list(
            "Content Optimization",
            vec![
                "Surfer SEO".into(),
                BulkItem::Partial(PartialEntry {
                    name: Some("Clearscope".into()),
                    target_url: Some("https://clearscope.io/pricing".into()),
                    ..PartialEntry::default()
                }),
            ],
        );
        let mut claimed = SlugRegistry::new();
        let entries = synthesize(&bulk, &overrides, &mut claimed);
        assert_eq!(entries[0].target_url, "https://surferseo.com");
        assert_eq!(entries[1].target_url, "https://clearscope.io/pricing");
    }

    #[test]
    fn bulk_items_deserialize_from_names_and_tables() {
        let bulk: BulkList = toml::from_str(
            r#"
            category = "CRM"
            headline_template = { pattern = "{name} keeps your {category} tidy" }
            items = ["Alpha", { name = "Beta", pricing = "Paid", tags = ["sales"] }]

            [defaults]
            pricing = "Free"
            "#,
        )
        .expect("parse bulk list");

        let mut claimed = SlugRegistry::new();
        let entries = synthesize(&bulk, &UrlOverrides::new(), &mut claimed);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].headline, "Alpha keeps your CRM tidy");
        assert_eq!(entries[0].pricing, Pricing::Free);
        assert_eq!(entries[1].pricing, Pricing::Paid);
        assert_eq!(entries[1].tags, vec!["sales"]);
    }
}
