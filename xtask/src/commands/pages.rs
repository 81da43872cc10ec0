//! `cargo xtask materialize-pages`: write missing page files and rebuild the route index.

use crate::cli::parse_flags;
use crate::commands::catalogue::{compile_site, CompiledSite};
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use crate::site_config::SiteConfig;
use crate::XtaskCommand;
use clap::Parser;
use site_catalogue::{materialize, write_index, DiskArtifactStore, MaterializeReport};

/// Materialize pages for `site` under the configured layout, then regenerate the index.
///
/// Page batches finish before the index is written.
pub fn materialize_site(
    ctx: &CommandContext,
    config: &SiteConfig,
    site: &CompiledSite,
) -> XtaskResult<MaterializeReport> {
    let layout = config.page_layout(ctx);
    let store = DiskArtifactStore;
    let report = materialize(&store, &site.catalogue.entries, &site.comparisons, &layout)
        .map_err(|err| {
            XtaskError::from(err)
                .with_operation("materialize pages")
                .with_hint("check that the page directories are writable")
        })?;
    write_index(&store, &site.catalogue.entries, &site.comparisons, &layout)
        .map_err(|err| XtaskError::from(err).with_operation("write route index"))?;
    Ok(report)
}

/// Flags for `materialize-pages`. None beyond `--help`.
#[derive(Clone, Debug, Default, Parser)]
#[command(about = "Write missing page files and rebuild the route index")]
pub struct MaterializePagesOptions {}

/// `cargo xtask materialize-pages`
pub struct MaterializePagesCommand;

impl XtaskCommand for MaterializePagesCommand {
    type Options = Option<MaterializePagesOptions>;

    fn parse(args: &[String]) -> XtaskResult<Self::Options> {
        parse_flags("materialize-pages", args)
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()> {
        if options.is_none() {
            return Ok(());
        }
        let config = SiteConfig::load(ctx)?;
        let site = compile_site(ctx, &config)?;
        let report = materialize_site(ctx, &config, &site)?;
        println!("created {}/{} pages", report.created, report.total);
        Ok(())
    }
}
