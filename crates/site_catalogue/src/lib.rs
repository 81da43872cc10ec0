//! Content catalogue compiler for the tool directory site.
//!
//! The crate turns a hand-maintained catalogue source into the artifacts the static site is built
//! from: a deduplicated catalogue, synthesized comparison entries, idempotently materialized page
//! wrappers with a regenerated lazy route index, and a `sitemap.xml` whose `lastmod` values are
//! aggregated across the catalogue and the blog corpus.
//!
//! Stages are plain functions over owned data. Anything stateful (the claimed-slug set, the build
//! clock, the artifact store) is passed in explicitly so independent builds never share state.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod artifacts;
pub mod comparison;
pub mod error;
pub mod materialize;
pub mod model;
pub mod posts;
pub mod sitemap;
pub mod slug;
pub mod source;
pub mod synth;
pub mod template;
pub mod timestamps;

pub use artifacts::{ArtifactStatus, ArtifactStore, DiskArtifactStore, MemoryArtifactStore};
pub use comparison::{
    build_comparisons, normalize_comparison_slug, parse_contenders, resolve,
    unresolved_contenders, CatalogueIndex,
};
pub use error::{CatalogueError, CatalogueResult};
pub use materialize::{materialize, script_identifier, write_index, MaterializeReport, PageLayout};
pub use model::{
    Catalogue, CatalogueEntry, ComparisonEntry, Faq, Pick, PostMeta, Pricing, RatingRow,
    RatingTable, RoutePrefixes, SitemapEntry,
};
pub use posts::{collect_posts, scrape_post_meta};
pub use sitemap::{emit, normalize_base_url, SitemapBuilder, SitemapSources, TaxonomyCategory};
pub use slug::{slugify, title_case_slug, SlugRegistry};
pub use source::{compile_catalogue, AuthoredComparison, AuthoredEntry, CatalogueSource};
pub use synth::{synthesize, BulkItem, BulkList, CategoryDefaults, PartialEntry, UrlOverrides};
pub use template::{resolve_template, FieldChain, Template};
pub use timestamps::{
    aggregate, effective_timestamp, normalize_timestamp, BuildClock, LastmodWatermarks,
};
