//! Comparison resolution: explicit definitions plus synthesis from bare `a-vs-b` slugs.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::error::{CatalogueError, CatalogueResult};
use crate::model::{dedup_tags, Catalogue, CatalogueEntry, ComparisonEntry};
use crate::slug::{slugify, title_case_slug};
use crate::source::AuthoredComparison;
use crate::template::FieldChain;

/// Separator between contender slugs in a comparison slug.
pub const CONTENDER_SEPARATOR: &str = "-vs-";

const TAGS_PER_CONTENDER: usize = 3;
const MAX_DERIVED_TAGS: usize = 5;
const EMPTY_TAGS_FALLBACK: &str = "comparison";
const PRIMARY_TAG_FALLBACK: &str = "tools";

/// Slug lookup over a compiled catalogue.
#[derive(Clone, Debug, Default)]
pub struct CatalogueIndex<'a> {
    by_slug: HashMap<&'a str, &'a CatalogueEntry>,
}

impl<'a> CatalogueIndex<'a> {
    /// Index every entry of `catalogue` by slug.
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self::from_entries(&catalogue.entries)
    }

    /// Index a slice of entries by slug. Later duplicates never replace earlier ones.
    pub fn from_entries(entries: &'a [CatalogueEntry]) -> Self {
        let mut by_slug = HashMap::with_capacity(entries.len());
        for entry in entries {
            by_slug.entry(entry.slug.as_str()).or_insert(entry);
        }
        Self { by_slug }
    }

    /// Entry for `slug`, if catalogued.
    pub fn get(&self, slug: &str) -> Option<&'a CatalogueEntry> {
        self.by_slug.get(slug).copied()
    }

    /// Display name for `slug`: the catalogue name, else the title-cased slug.
    pub fn display_name(&self, slug: &str) -> String {
        self.get(slug)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| title_case_slug(slug))
    }
}

/// Split a comparison slug into its contender slugs.
///
/// Matching on the separator is case-insensitive and every contender is slugified, so the
/// result only ever holds `[a-z0-9-]` slugs. A contender that slugifies to nothing rejects the
/// whole slug.
pub fn parse_contenders(raw_slug: &str) -> CatalogueResult<Vec<String>> {
    let lowered = raw_slug.trim().to_ascii_lowercase();
    normalize_contenders(lowered.split(CONTENDER_SEPARATOR), raw_slug)
}

fn normalize_contenders<I, S>(raw: I, original: &str) -> CatalogueResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let contenders: Vec<String> = raw.into_iter().map(|c| slugify(c.as_ref())).collect();
    if contenders.len() < 2 || contenders.iter().any(String::is_empty) {
        return Err(CatalogueError::InvalidComparisonSlug(original.to_string()));
    }
    Ok(contenders)
}

/// Canonical comparison slug for `raw_slug`: its normalized contenders joined by `-vs-`.
pub fn normalize_comparison_slug(raw_slug: &str) -> CatalogueResult<String> {
    Ok(parse_contenders(raw_slug)?.join(CONTENDER_SEPARATOR))
}

fn derive_title(contenders: &[String], index: &CatalogueIndex<'_>) -> String {
    contenders
        .iter()
        .map(|slug| index.display_name(slug))
        .collect::<Vec<_>>()
        .join(" vs ")
}

fn derive_tags(contenders: &[String], index: &CatalogueIndex<'_>) -> Vec<String> {
    let pooled = contenders
        .iter()
        .filter_map(|slug| index.get(slug))
        .flat_map(|entry| {
            entry
                .tags
                .iter()
                .take(TAGS_PER_CONTENDER)
                .cloned()
                .chain(std::iter::once(entry.category.to_lowercase()))
        });
    let mut tags = dedup_tags(pooled);
    tags.truncate(MAX_DERIVED_TAGS);
    if tags.is_empty() {
        tags.push(EMPTY_TAGS_FALLBACK.to_string());
    }
    tags
}

fn derive_primary_tag(
    contenders: &[String],
    tags: &[String],
    index: &CatalogueIndex<'_>,
) -> String {
    FieldChain::new()
        .or_else(|| {
            contenders
                .first()
                .and_then(|slug| index.get(slug))
                .map(|entry| entry.category.to_lowercase())
        })
        .or_else(|| tags.first().cloned())
        .resolve_or(PRIMARY_TAG_FALLBACK.to_string())
}

fn derive_summary(title: &str) -> String {
    format!("{title}: pricing and features side by side.")
}

/// Synthesize a comparison entry from a bare `a-vs-b[-vs-c...]` slug.
///
/// Contenders missing from the catalogue degrade to their title-cased slug and contribute no
/// tags; they never fail resolution.
pub fn resolve(raw_slug: &str, index: &CatalogueIndex<'_>) -> CatalogueResult<ComparisonEntry> {
    let contenders = parse_contenders(raw_slug)?;
    let title = derive_title(&contenders, index);
    let tags = derive_tags(&contenders, index);
    let primary_tag = derive_primary_tag(&contenders, &tags, index);

    Ok(ComparisonEntry {
        slug: contenders.join(CONTENDER_SEPARATOR),
        summary: derive_summary(&title),
        title,
        primary_tag,
        tags,
        contenders,
        ratings: None,
        picks: Vec::new(),
        faqs: Vec::new(),
    })
}

/// Turn a hand-authored comparison into an entry, deriving only what was left out.
pub fn complete_authored(
    authored: &AuthoredComparison,
    index: &CatalogueIndex<'_>,
) -> CatalogueResult<ComparisonEntry> {
    let raw_slug = authored.slug.as_deref().unwrap_or_default();
    let contenders = if authored.contenders.is_empty() {
        parse_contenders(raw_slug)?
    } else {
        let original = authored
            .slug
            .clone()
            .unwrap_or_else(|| authored.contenders.join(CONTENDER_SEPARATOR));
        normalize_contenders(&authored.contenders, &original)?
    };

    let slug = match authored.slug.as_deref() {
        Some(raw) => normalize_comparison_slug(raw)?,
        None => contenders.join(CONTENDER_SEPARATOR),
    };
    let title = authored
        .title
        .clone()
        .unwrap_or_else(|| derive_title(&contenders, index));
    let tags = authored
        .tags
        .clone()
        .map(|tags| dedup_tags(tags))
        .filter(|tags| !tags.is_empty())
        .unwrap_or_else(|| derive_tags(&contenders, index));
    let primary_tag = authored
        .primary_tag
        .clone()
        .unwrap_or_else(|| derive_primary_tag(&contenders, &tags, index));

    Ok(ComparisonEntry {
        slug,
        summary: authored
            .summary
            .clone()
            .unwrap_or_else(|| derive_summary(&title)),
        title,
        primary_tag,
        tags,
        contenders,
        ratings: authored.ratings.clone(),
        picks: authored.picks.clone(),
        faqs: authored.faqs.clone(),
    })
}

/// Contender slugs of `entry` that are missing from the catalogue.
pub fn unresolved_contenders<'e>(
    entry: &'e ComparisonEntry,
    index: &CatalogueIndex<'_>,
) -> Vec<&'e str> {
    entry
        .contenders
        .iter()
        .map(String::as_str)
        .filter(|slug| index.get(slug).is_none())
        .collect()
}

/// Build the full comparison list.
///
/// Explicit comparisons come first, verbatim apart from derived gaps. Only desired slugs absent
/// from the explicit set are synthesized, so hand-tuned ratings, picks, and FAQs are never
/// replaced. Invalid slugs are skipped with a warning.
pub fn build_comparisons(
    explicit: &[AuthoredComparison],
    desired: &[String],
    index: &CatalogueIndex<'_>,
) -> Vec<ComparisonEntry> {
    let mut out = Vec::with_capacity(explicit.len() + desired.len());
    let mut taken = HashSet::new();

    for authored in explicit {
        match complete_authored(authored, index) {
            Ok(entry) => {
                if taken.insert(entry.slug.clone()) {
                    out.push(entry);
                } else {
                    warn!(slug = %entry.slug, "duplicate explicit comparison; keeping the first");
                }
            }
            Err(err) => warn!(error = %err, "explicit comparison skipped"),
        }
    }
    let explicit_count = out.len();

    for raw in desired {
        match resolve(raw, index) {
            Ok(entry) => {
                if taken.insert(entry.slug.clone()) {
                    out.push(entry);
                }
            }
            Err(err) => warn!(error = %err, "desired comparison skipped"),
        }
    }

    for entry in &out {
        let missing = unresolved_contenders(entry, index);
        if !missing.is_empty() {
            warn!(
                slug = %entry.slug,
                missing = ?missing,
                "comparison references contenders missing from the catalogue"
            );
        }
    }

    info!(
        explicit = explicit_count,
        synthesized = out.len() - explicit_count,
        "comparisons resolved"
    );
    out
}
