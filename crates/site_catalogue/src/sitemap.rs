//! Sitemap route merging and `sitemap.xml` rendering.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Deserialize;
use tracing::{debug, info};

use crate::model::{Catalogue, ComparisonEntry, PostMeta, RoutePrefixes, SitemapEntry};
use crate::slug::slugify;
use crate::timestamps::{effective_timestamp, BuildClock, LastmodWatermarks};

const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGEFREQ: &str = "weekly";
const PRIORITY: &str = "0.7";

/// One blog category and the sub-categories under it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaxonomyCategory {
    /// Category slug.
    pub slug: String,
    /// Sub-category slugs.
    pub sub_categories: Vec<String>,
}

impl TaxonomyCategory {
    /// Taxonomy implied by the posts themselves, sorted by slug.
    pub fn from_posts(posts: &[PostMeta]) -> Vec<Self> {
        let mut tree: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for post in posts {
            let subs = tree.entry(post.category.as_str()).or_default();
            if let Some(sub) = post.sub_category.as_deref() {
                subs.insert(sub);
            }
        }
        tree.into_iter()
            .map(|(slug, subs)| Self {
                slug: slug.to_string(),
                sub_categories: subs.into_iter().map(str::to_string).collect(),
            })
            .collect()
    }
}

/// Path to lastmod accumulator. The latest timestamp for a path wins regardless of insert order.
#[derive(Clone, Debug, Default)]
pub struct SitemapBuilder {
    entries: BTreeMap<String, String>,
}

impl SitemapBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate. Keeps the stored lastmod unless `lastmod` is lexically greater.
    pub fn add(&mut self, path: &str, lastmod: &str) {
        let path = normalize_path(path);
        match self.entries.get_mut(&path) {
            Some(current) if current.as_str() >= lastmod => {}
            Some(current) => *current = lastmod.to_string(),
            None => {
                self.entries.insert(path, lastmod.to_string());
            }
        }
    }

    /// Record every entry from one route source.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = SitemapEntry>) {
        for entry in entries {
            self.add(&entry.path, &entry.lastmod);
        }
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by path.
    pub fn into_entries(self) -> Vec<SitemapEntry> {
        self.entries
            .into_iter()
            .map(|(path, lastmod)| SitemapEntry { path, lastmod })
            .collect()
    }
}

/// Ensure exactly one leading `/`.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

/// Trim whitespace and trailing slashes from a base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn entry(path: String, lastmod: &str) -> SitemapEntry {
    SitemapEntry {
        path,
        lastmod: lastmod.to_string(),
    }
}

/// Fixed site routes stamped with the build time.
pub fn static_routes(routes: &[String], clock: &BuildClock) -> Vec<SitemapEntry> {
    routes
        .iter()
        .map(|route| entry(route.clone(), clock.now_iso()))
        .collect()
}

/// One route per catalogue entry.
pub fn catalogue_routes(
    catalogue: &Catalogue,
    prefixes: &RoutePrefixes,
    clock: &BuildClock,
) -> Vec<SitemapEntry> {
    catalogue
        .entries
        .iter()
        .map(|item| entry(RoutePrefixes::join(&prefixes.tools, &item.slug), clock.now_iso()))
        .collect()
}

/// One route per comparison.
pub fn comparison_routes(
    comparisons: &[ComparisonEntry],
    prefixes: &RoutePrefixes,
    clock: &BuildClock,
) -> Vec<SitemapEntry> {
    comparisons
        .iter()
        .map(|item| entry(RoutePrefixes::join(&prefixes.compare, &item.slug), clock.now_iso()))
        .collect()
}

/// One route per distinct slugified tag across the catalogue and comparisons.
pub fn tag_routes(
    catalogue: &Catalogue,
    comparisons: &[ComparisonEntry],
    prefixes: &RoutePrefixes,
    clock: &BuildClock,
) -> Vec<SitemapEntry> {
    let tags: BTreeSet<String> = catalogue
        .entries
        .iter()
        .flat_map(|item| item.tags.iter())
        .chain(comparisons.iter().flat_map(|item| item.tags.iter()))
        .map(|tag| slugify(tag))
        .filter(|tag| !tag.is_empty())
        .collect();
    tags.into_iter()
        .map(|tag| entry(RoutePrefixes::join(&prefixes.tags, &tag), clock.now_iso()))
        .collect()
}

/// Category and sub-category listing routes.
///
/// A category takes its watermark, else the build time. A sub-category takes its own watermark,
/// else its category's, else the build time. Path segments are slugified; a category or
/// sub-category that slugifies to nothing gets no route.
pub fn taxonomy_routes(
    taxonomy: &[TaxonomyCategory],
    watermarks: &LastmodWatermarks,
    prefixes: &RoutePrefixes,
    clock: &BuildClock,
) -> Vec<SitemapEntry> {
    let mut out = Vec::new();
    for category in taxonomy {
        let segment = slugify(&category.slug);
        if segment.is_empty() {
            continue;
        }
        let category_mark = watermarks.category(&category.slug);
        let category_path = RoutePrefixes::join(&prefixes.blog, &segment);
        out.push(entry(
            category_path.clone(),
            category_mark.unwrap_or(clock.now_iso()),
        ));
        for sub in &category.sub_categories {
            let sub_segment = slugify(sub);
            if sub_segment.is_empty() {
                continue;
            }
            let lastmod = watermarks
                .sub_category(&category.slug, sub)
                .or(category_mark)
                .unwrap_or(clock.now_iso());
            out.push(entry(RoutePrefixes::join(&category_path, &sub_segment), lastmod));
        }
    }
    out
}

/// One route per post at `{blog}/{category}/{slug}`, both segments slugified.
///
/// Posts whose category or slug slugifies to nothing are left out.
pub fn post_routes(
    posts: &[PostMeta],
    prefixes: &RoutePrefixes,
    clock: &BuildClock,
) -> Vec<SitemapEntry> {
    posts
        .iter()
        .filter_map(|post| {
            let category = slugify(&post.category);
            let slug = slugify(&post.slug);
            if category.is_empty() || slug.is_empty() {
                debug!(slug = %post.slug, "post path has no usable segments; no route");
                return None;
            }
            let category_path = RoutePrefixes::join(&prefixes.blog, &category);
            Some(SitemapEntry {
                path: RoutePrefixes::join(&category_path, &slug),
                lastmod: effective_timestamp(post, clock),
            })
        })
        .collect()
}

/// Inputs for one sitemap emission.
#[derive(Clone, Copy, Debug)]
pub struct SitemapSources<'a> {
    /// Fixed site routes such as `/` and `/tools`.
    pub static_routes: &'a [String],
    /// Compiled catalogue.
    pub catalogue: &'a Catalogue,
    /// Resolved comparisons.
    pub comparisons: &'a [ComparisonEntry],
    /// Blog taxonomy.
    pub taxonomy: &'a [TaxonomyCategory],
    /// Scanned posts.
    pub posts: &'a [PostMeta],
    /// Aggregated post watermarks.
    pub watermarks: &'a LastmodWatermarks,
    /// Route prefixes.
    pub prefixes: &'a RoutePrefixes,
    /// Build clock used for every fallback.
    pub clock: &'a BuildClock,
}

impl SitemapSources<'_> {
    /// Merge every route source into one deduplicated, sorted entry list.
    pub fn entries(&self) -> Vec<SitemapEntry> {
        let mut builder = SitemapBuilder::new();
        builder.extend(static_routes(self.static_routes, self.clock));
        builder.extend(catalogue_routes(self.catalogue, self.prefixes, self.clock));
        builder.extend(tag_routes(
            self.catalogue,
            self.comparisons,
            self.prefixes,
            self.clock,
        ));
        builder.extend(comparison_routes(self.comparisons, self.prefixes, self.clock));
        builder.extend(taxonomy_routes(
            self.taxonomy,
            self.watermarks,
            self.prefixes,
            self.clock,
        ));
        builder.extend(post_routes(self.posts, self.prefixes, self.clock));
        builder.into_entries()
    }
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render `sitemap.xml` for `sources` under `base_url`.
pub fn emit(sources: &SitemapSources<'_>, base_url: &str) -> String {
    let base_url = normalize_base_url(base_url);
    let entries = sources.entries();

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_XMLNS}\">");
    for item in &entries {
        let loc = escape_xml(&format!("{base_url}{}", item.path));
        let _ = writeln!(
            xml,
            "  <url>\n    <loc>{loc}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{CHANGEFREQ}</changefreq>\n    <priority>{PRIORITY}</priority>\n  </url>",
            escape_xml(&item.lastmod)
        );
    }
    xml.push_str("</urlset>\n");

    info!(urls = entries.len(), base_url = %base_url, "sitemap rendered");
    xml
}
