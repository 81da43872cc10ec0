//! `cargo xtask emit-sitemap`: aggregate post timestamps and write `sitemap.xml`.

use crate::cli::parse_flags;
use crate::commands::catalogue::{compile_site, CompiledSite};
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use crate::site_config::{base_url_from_env, SiteConfig};
use crate::XtaskCommand;
use clap::Parser;
use site_catalogue::{aggregate, collect_posts, emit, SitemapSources, TaxonomyCategory};
use std::path::PathBuf;
use tracing::info;

/// Scan the blog corpus, render the sitemap for `site`, and write it to the public directory.
pub fn emit_site_sitemap(
    ctx: &CommandContext,
    config: &SiteConfig,
    site: &CompiledSite,
    base_url: &str,
) -> XtaskResult<PathBuf> {
    let content_dir = ctx.artifacts().resolve_path(&config.content_dir);
    let posts = collect_posts(&content_dir).map_err(|err| {
        XtaskError::from(err)
            .with_operation("scan blog corpus")
            .with_hint("set content_dir in site.toml to an existing directory")
    })?;
    let watermarks = aggregate(&posts, ctx.clock());
    info!(
        categories = watermarks.category_count(),
        sub_categories = watermarks.sub_category_count(),
        "post timestamps aggregated"
    );

    let taxonomy = if config.taxonomy.is_empty() {
        TaxonomyCategory::from_posts(&posts)
    } else {
        config.taxonomy.clone()
    };
    let sources = SitemapSources {
        static_routes: &config.static_routes,
        catalogue: &site.catalogue,
        comparisons: &site.comparisons,
        taxonomy: &taxonomy,
        posts: &posts,
        watermarks: &watermarks,
        prefixes: &config.routes,
        clock: ctx.clock(),
    };
    let xml = emit(&sources, base_url);

    let path = ctx.artifacts().sitemap_path(&config.public_dir);
    ctx.artifacts()
        .write_text(&path, &xml)
        .map_err(|err| err.with_operation("write sitemap"))?;
    Ok(path)
}

/// Flags for `emit-sitemap`.
#[derive(Clone, Debug, Default, Parser)]
#[command(about = "Aggregate post timestamps and write sitemap.xml")]
pub struct EmitSitemapOptions {
    /// Base URL for `<loc>` values. Falls back to SITE_BASE_URL, then the config default.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

/// `cargo xtask emit-sitemap`
pub struct EmitSitemapCommand;

impl XtaskCommand for EmitSitemapCommand {
    type Options = Option<EmitSitemapOptions>;

    fn parse(args: &[String]) -> XtaskResult<Self::Options> {
        parse_flags("emit-sitemap", args)
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()> {
        let Some(options) = options else {
            return Ok(());
        };
        let config = SiteConfig::load(ctx)?;
        let base_url = base_url_from_env(options.base_url.as_deref(), &config);
        let site = compile_site(ctx, &config)?;
        let path = emit_site_sitemap(ctx, &config, &site, &base_url)?;
        println!("wrote {}", path.display());
        Ok(())
    }
}
