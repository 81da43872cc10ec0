//! `cargo xtask compile-catalogue`: compile the catalogue and resolve comparisons.

use crate::cli::parse_flags;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use crate::site_config::SiteConfig;
use crate::XtaskCommand;
use clap::Parser;
use serde::Serialize;
use site_catalogue::{
    build_comparisons, compile_catalogue, unresolved_contenders, Catalogue, CatalogueIndex,
    CatalogueSource, ComparisonEntry,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Compiled catalogue plus every resolved comparison.
#[derive(Clone, Debug, Serialize)]
pub struct CompiledSite {
    /// Deduplicated catalogue.
    #[serde(flatten)]
    pub catalogue: Catalogue,
    /// Explicit and synthesized comparisons.
    pub comparisons: Vec<ComparisonEntry>,
}

/// Load the configured catalogue source and run the compile pass.
pub fn compile_site(ctx: &CommandContext, config: &SiteConfig) -> XtaskResult<CompiledSite> {
    let source_path = ctx.artifacts().resolve_path(&config.catalogue_source);
    let source = CatalogueSource::load(&source_path)
        .map_err(|err| XtaskError::from(err).with_operation("load catalogue source"))?;

    let catalogue = compile_catalogue(&source);
    let index = CatalogueIndex::new(&catalogue);
    let comparisons =
        build_comparisons(&source.comparisons, &source.desired_comparisons, &index);
    let dangling: usize = comparisons
        .iter()
        .map(|entry| unresolved_contenders(entry, &index).len())
        .sum();

    info!(
        entries = catalogue.len(),
        comparisons = comparisons.len(),
        unresolved_contenders = dangling,
        source = %source_path.display(),
        "catalogue ready"
    );
    Ok(CompiledSite {
        catalogue,
        comparisons,
    })
}

/// Flags for `compile-catalogue`.
#[derive(Clone, Debug, Default, Parser)]
#[command(about = "Compile the catalogue and comparisons")]
pub struct CompileCatalogueOptions {
    /// Write the compiled catalogue and comparisons as pretty JSON.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// `cargo xtask compile-catalogue`
pub struct CompileCatalogueCommand;

impl XtaskCommand for CompileCatalogueCommand {
    /// `None` when help was printed.
    type Options = Option<CompileCatalogueOptions>;

    fn parse(args: &[String]) -> XtaskResult<Self::Options> {
        parse_flags("compile-catalogue", args)
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()> {
        let Some(options) = options else {
            return Ok(());
        };
        let config = SiteConfig::load(ctx)?;
        let site = compile_site(ctx, &config)?;
        println!(
            "compiled {} catalogue entries and {} comparisons",
            site.catalogue.len(),
            site.comparisons.len()
        );
        if let Some(output) = options.output {
            write_compiled(ctx, &site, &output)?;
        }
        Ok(())
    }
}

/// Write `site` as pretty JSON to `output`, resolved against the workspace root.
pub fn write_compiled(
    ctx: &CommandContext,
    site: &CompiledSite,
    output: &Path,
) -> XtaskResult<()> {
    let path = ctx.artifacts().resolve_path(output);
    let json = serde_json::to_string_pretty(site).map_err(|err| {
        XtaskError::io(format!("failed to serialize compiled catalogue: {err}"))
    })?;
    ctx.artifacts().write_text(&path, &json)?;
    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::XtaskErrorCategory;
    use site_catalogue::BuildClock;
    use std::fs;

    fn context(root: &Path) -> CommandContext {
        CommandContext::with_root(root.to_path_buf(), BuildClock::capture())
    }

    #[test]
    fn compile_site_resolves_desired_comparisons() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("content")).expect("mkdir");
        fs::write(
            temp.path().join("content/catalogue.toml"),
            "desired_comparisons = [\"alpha-vs-beta\"]\n\n[[bulk]]\ncategory = \"CRM\"\nitems = [\"Alpha\", \"Beta\", \"Alpha\"]\n",
        )
        .expect("write source");

        let site = compile_site(&context(temp.path()), &SiteConfig::default()).expect("compile");
        assert_eq!(site.catalogue.len(), 2);
        assert_eq!(site.comparisons[0].title, "Alpha vs Beta");
        assert_eq!(site.comparisons[0].primary_tag, "crm");
    }

    #[test]
    fn missing_source_is_an_io_error_with_target() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = compile_site(&context(temp.path()), &SiteConfig::default()).expect_err("missing");
        assert_eq!(err.category, XtaskErrorCategory::Io);
        assert_eq!(err.operation.as_deref(), Some("load catalogue source"));
        assert!(err
            .target
            .as_deref()
            .is_some_and(|target| target.ends_with("catalogue.toml")));
    }

    #[test]
    fn compiled_json_has_entries_and_comparisons() {
        let temp = tempfile::tempdir().expect("tempdir");
        let ctx = context(temp.path());
        let site = CompiledSite {
            catalogue: Catalogue::default(),
            comparisons: Vec::new(),
        };
        write_compiled(&ctx, &site, Path::new("out/catalogue.json")).expect("write");
        let json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("out/catalogue.json")).expect("read"),
        )
        .expect("json");
        assert!(json["entries"].is_array());
        assert!(json["comparisons"].is_array());
    }

    #[test]
    fn shipped_site_fixture_compiles() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .expect("workspace root");
        let config = SiteConfig::load_from(root, Path::new("site.toml")).expect("site config");
        let site = compile_site(&context(root), &config).expect("compile shipped catalogue");

        let slugs: Vec<_> = site.catalogue.entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["semrush", "ahrefs", "hubspot", "moz-pro", "se-ranking", "pipedrive", "close"]
        );
        let comparisons: Vec<_> = site.comparisons.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(
            comparisons,
            vec!["semrush-vs-ahrefs", "ahrefs-vs-moz-pro", "hubspot-vs-pipedrive-vs-close"]
        );
        assert!(site.comparisons[0].ratings.is_some());
    }

    #[test]
    fn output_flag_is_optional() {
        let parsed = CompileCatalogueCommand::parse(&["--output".into(), "dist/c.json".into()])
            .expect("parse")
            .expect("options");
        assert_eq!(parsed.output, Some(PathBuf::from("dist/c.json")));
        let parsed = CompileCatalogueCommand::parse(&[]).expect("parse").expect("options");
        assert_eq!(parsed.output, None);
    }
}
