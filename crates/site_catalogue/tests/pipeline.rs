use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use site_catalogue::{
    aggregate, build_comparisons, collect_posts, compile_catalogue, emit, materialize,
    write_index, BuildClock, CatalogueIndex, CatalogueSource, DiskArtifactStore, PageLayout,
    RoutePrefixes, SitemapSources, TaxonomyCategory,
};

const SOURCE: &str = r#"
desired_comparisons = ["semrush-vs-ahrefs", "semrush-vs-mystery-tool"]

[[tools]]
name = "Semrush"
category = "SEO Suite"
headline = "All-in-one visibility platform"
description = "Keyword research and audits."
target_url = "https://www.semrush.com"
pricing = "Paid"
tags = ["seo", "keywords"]

[[tools]]
name = "Ahrefs"
category = "SEO Suite"
headline = "Backlink index"
description = "Backlinks and content explorer."
target_url = "https://ahrefs.com"
pricing = "Paid"
tags = ["seo", "backlinks"]

[[comparisons]]
contenders = ["semrush", "ahrefs"]
summary = "Hand-written summary."

[[bulk]]
category = "SEO Suite"
headline_template = { pattern = "{name} for {category} teams" }
items = ["Semrush", "Moz Pro"]
"#;

fn write_post(dir: &Path, name: &str, body: &str) {
    fs::create_dir_all(dir).expect("mkdir posts");
    fs::write(dir.join(name), body).expect("write post");
}

#[test]
fn full_pipeline_is_idempotent_and_emits_a_deduplicated_sitemap() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let source_path = root.join("catalogue.toml");
    fs::write(&source_path, SOURCE).expect("write source");

    let source = CatalogueSource::load(&source_path).expect("load source");
    let catalogue = compile_catalogue(&source);
    let slugs: Vec<_> = catalogue.entries.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["semrush", "ahrefs", "moz-pro"]);
    assert_eq!(
        catalogue.get("moz-pro").map(|e| e.headline.as_str()),
        Some("Moz Pro for SEO Suite teams")
    );

    let index = CatalogueIndex::new(&catalogue);
    let comparisons =
        build_comparisons(&source.comparisons, &source.desired_comparisons, &index);
    let comparison_slugs: Vec<_> = comparisons.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(
        comparison_slugs,
        vec!["semrush-vs-ahrefs", "semrush-vs-mystery-tool"]
    );
    assert_eq!(comparisons[0].summary, "Hand-written summary.");
    assert_eq!(comparisons[1].title, "Semrush vs Mystery Tool");

    let layout = PageLayout::default().anchored_at(root);
    let store = DiskArtifactStore;
    let first = materialize(&store, &catalogue.entries, &comparisons, &layout).expect("first run");
    assert_eq!(first.created, 5);
    assert_eq!(first.total, 5);
    write_index(&store, &catalogue.entries, &comparisons, &layout).expect("index");

    let custom = layout.tool_page_path("semrush");
    fs::write(&custom, "// customized by hand\n").expect("customize page");

    let second = materialize(&store, &catalogue.entries, &comparisons, &layout).expect("rerun");
    assert_eq!(second.created, 0);
    assert_eq!(second.total, 5);
    assert_eq!(
        fs::read_to_string(&custom).expect("read custom"),
        "// customized by hand\n"
    );
    let routes = fs::read_to_string(&layout.index_path).expect("read index");
    assert!(routes.contains("export const toolRoutes"));
    assert!(routes.contains("'/compare/semrush-vs-ahrefs'"));

    let content = root.join("content/blog");
    write_post(
        &content.join("seo"),
        "early.md",
        "---\ncategory: seo\ndate: 2024-01-01\nupdated: null\n---\n",
    );
    write_post(
        &content.join("seo"),
        "late.mdx",
        "---\ncategory: seo\nsubCategory: audits\ndate: 2024-06-01\n---\n",
    );
    let posts = collect_posts(&content).expect("collect posts");
    assert_eq!(posts.len(), 2);

    let clock = BuildClock::fixed(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    let watermarks = aggregate(&posts, &clock);
    let taxonomy = TaxonomyCategory::from_posts(&posts);
    let prefixes = RoutePrefixes::default();
    let statics = vec!["/".to_string(), "/tools".to_string()];
    let sources = SitemapSources {
        static_routes: &statics,
        catalogue: &catalogue,
        comparisons: &comparisons,
        taxonomy: &taxonomy,
        posts: &posts,
        watermarks: &watermarks,
        prefixes: &prefixes,
        clock: &clock,
    };
    let xml = emit(&sources, "https://tools.example.com///");

    assert!(xml.contains(
        "<loc>https://tools.example.com/blog/seo</loc>\n    <lastmod>2024-06-01T00:00:00.000Z</lastmod>"
    ));
    assert!(xml.contains(
        "<loc>https://tools.example.com/blog/seo/early</loc>\n    <lastmod>2024-01-01T00:00:00.000Z</lastmod>"
    ));
    assert_eq!(xml.matches("<loc>https://tools.example.com/tags/seo</loc>").count(), 1);
    assert!(!xml.contains("example.com//"));
}
