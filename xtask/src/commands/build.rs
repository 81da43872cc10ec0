//! `cargo xtask build`: every catalogue stage inside one recorded workflow run.

use crate::cli::parse_flags;
use crate::commands::catalogue::compile_site;
use crate::commands::pages::materialize_site;
use crate::commands::sitemap::emit_site_sitemap;
use crate::runtime::context::CommandContext;
use crate::runtime::error::XtaskResult;
use crate::site_config::{base_url_from_env, SiteConfig};
use crate::XtaskCommand;
use clap::Parser;

/// Flags for `build`.
#[derive(Clone, Debug, Default, Parser)]
#[command(about = "Compile, materialize pages, and emit the sitemap")]
pub struct BuildOptions {
    /// Base URL for sitemap `<loc>` values.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

/// `cargo xtask build`
pub struct BuildCommand;

impl XtaskCommand for BuildCommand {
    type Options = Option<BuildOptions>;

    fn parse(args: &[String]) -> XtaskResult<Self::Options> {
        parse_flags("build", args)
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()> {
        let Some(options) = options else {
            return Ok(());
        };
        let config = SiteConfig::load(ctx)?;
        let base_url = base_url_from_env(options.base_url.as_deref(), &config);
        run_build(ctx, &config, &base_url)
    }
}

/// Run the three stages in order under the `build` workflow.
pub fn run_build(ctx: &CommandContext, config: &SiteConfig, base_url: &str) -> XtaskResult<()> {
    let workflow = ctx.workflow();
    workflow.with_workflow_run("build", || {
        let site = workflow.run_timed_stage("compile catalogue", || compile_site(ctx, config))?;
        let report = workflow.run_timed_stage("materialize pages", || {
            materialize_site(ctx, config, &site)
        })?;
        let sitemap = workflow.run_timed_stage("emit sitemap", || {
            emit_site_sitemap(ctx, config, &site, base_url)
        })?;
        println!(
            "built {} entries, {} comparisons; created {}/{} pages; wrote {}",
            site.catalogue.len(),
            site.comparisons.len(),
            report.created,
            report.total,
            sitemap.display()
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_catalogue::BuildClock;
    use std::fs;

    #[test]
    fn build_runs_every_stage_and_records_the_workflow() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("content/blog/crm")).expect("mkdir");
        fs::write(
            root.join("content/catalogue.toml"),
            "desired_comparisons = [\"alpha-vs-beta\"]\n\n[[bulk]]\ncategory = \"CRM\"\nitems = [\"Alpha\", \"Beta\"]\n",
        )
        .expect("write source");
        fs::write(
            root.join("content/blog/crm/pipelines.md"),
            "---\ncategory: crm\ndate: 2024-03-01\n---\n",
        )
        .expect("write post");

        let ctx = CommandContext::with_root(root.to_path_buf(), BuildClock::capture());
        run_build(&ctx, &SiteConfig::default(), "https://x.dev").expect("build");

        assert!(root.join("src/pages/tools/alpha.jsx").is_file());
        assert!(root.join("src/pages/compare/alpha-vs-beta.jsx").is_file());
        assert!(root.join("src/routes.generated.js").is_file());
        let xml = fs::read_to_string(root.join("public/sitemap.xml")).expect("sitemap");
        assert!(xml.contains("<loc>https://x.dev/compare/alpha-vs-beta</loc>"));

        let runs: Vec<_> = fs::read_dir(ctx.artifacts().workflow_runs_dir())
            .expect("runs")
            .map(|entry| entry.expect("entry").path())
            .collect();
        assert_eq!(runs.len(), 1);
        let manifest = fs::read_to_string(runs[0].join("manifest.json")).expect("manifest");
        assert!(manifest.contains("\"status\": \"ok\""));
        assert!(manifest.contains("emit sitemap"));
    }
}
