//! Site catalogue build commands (`cargo xtask`).
//!
//! A small CLI layer over the `site_catalogue` library. Command modules own stage policy while
//! [`runtime`] owns configuration loading, artifact paths, logging, and workflow recording.

pub mod cli;
pub mod commands;
pub mod runtime;
pub mod site_config;

use crate::cli::TopLevelCommand;
use crate::commands::build::BuildCommand;
use crate::commands::catalogue::CompileCatalogueCommand;
use crate::commands::pages::MaterializePagesCommand;
use crate::commands::sitemap::EmitSitemapCommand;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};

/// Shared command contract for top-level xtask command families.
///
/// Each family owns its typed option parsing while sharing runtime services through
/// [`CommandContext`]. [`XtaskCommand::parse`] is a pure translation from raw CLI arguments into
/// options; side effects belong in [`XtaskCommand::run`].
pub trait XtaskCommand {
    /// Typed options produced by CLI parsing for the command family.
    type Options;

    /// Parse command-line arguments into typed options.
    ///
    /// Invalid argument shapes are reported as
    /// [`XtaskError::validation`](crate::runtime::error::XtaskError::validation).
    fn parse(args: &[String]) -> XtaskResult<Self::Options>;

    /// Execute the command family using the shared runtime context.
    fn run(ctx: &CommandContext, options: Self::Options) -> XtaskResult<()>;
}

/// Run the `xtask` binary against the current process arguments.
pub fn execute_from_env() -> XtaskResult<()> {
    execute(std::env::args().skip(1).collect())
}

/// Parse the top-level command, build a fresh [`CommandContext`], and dispatch.
pub fn execute(args: Vec<String>) -> XtaskResult<()> {
    let parsed = cli::parse(args)?;
    if parsed == TopLevelCommand::Help {
        cli::print_usage();
        return Ok(());
    }
    let ctx = CommandContext::new()?;

    match parsed {
        TopLevelCommand::CompileCatalogue(args) => {
            CompileCatalogueCommand::run(&ctx, CompileCatalogueCommand::parse(&args)?)
        }
        TopLevelCommand::MaterializePages(args) => {
            MaterializePagesCommand::run(&ctx, MaterializePagesCommand::parse(&args)?)
        }
        TopLevelCommand::EmitSitemap(args) => {
            EmitSitemapCommand::run(&ctx, EmitSitemapCommand::parse(&args)?)
        }
        TopLevelCommand::Build(args) => BuildCommand::run(&ctx, BuildCommand::parse(&args)?),
        TopLevelCommand::Help => Ok(()),
    }
}

/// Convert an xtask result into a process exit code.
///
/// Every failure maps to exit code `1` after printing the formatted [`XtaskError`] to stderr.
pub fn exit_code(result: XtaskResult<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::from(1)
        }
    }
}
