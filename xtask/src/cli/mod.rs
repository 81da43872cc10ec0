//! Top-level CLI parsing and help output.

use crate::runtime::error::{XtaskError, XtaskResult};
use clap::error::ErrorKind;
use clap::Parser;

/// Top-level `xtask` command families.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TopLevelCommand {
    CompileCatalogue(Vec<String>),
    MaterializePages(Vec<String>),
    EmitSitemap(Vec<String>),
    Build(Vec<String>),
    Help,
}

/// Parse raw command-line arguments into a top-level command selection.
pub fn parse(args: Vec<String>) -> XtaskResult<TopLevelCommand> {
    let Some(cmd) = args.first().cloned() else {
        return Ok(TopLevelCommand::Help);
    };

    let rest = args[1..].to_vec();
    match cmd.as_str() {
        "compile-catalogue" => Ok(TopLevelCommand::CompileCatalogue(rest)),
        "materialize-pages" => Ok(TopLevelCommand::MaterializePages(rest)),
        "emit-sitemap" => Ok(TopLevelCommand::EmitSitemap(rest)),
        "build" => Ok(TopLevelCommand::Build(rest)),
        "help" | "--help" | "-h" => Ok(TopLevelCommand::Help),
        other => Err(XtaskError::validation(format!(
            "unknown xtask command: {other}"
        ))
        .with_hint("run `cargo xtask help` for the command list")),
    }
}

/// Parse one command family's flags with clap.
///
/// Returns `Ok(None)` after printing help or version output.
pub fn parse_flags<T: Parser>(command: &str, args: &[String]) -> XtaskResult<Option<T>> {
    let argv = std::iter::once(format!("cargo xtask {command}")).chain(args.iter().cloned());
    match T::try_parse_from(argv) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                Ok(None)
            }
            _ => Err(XtaskError::validation(err.render().to_string().trim_end().to_string())
                .with_operation(format!("parse {command} arguments"))),
        },
    }
}

/// Print the canonical top-level usage text.
pub fn print_usage() {
    eprintln!(
        "Usage: cargo xtask <command> [args]\n\
         \n\
         Commands:\n\
           compile-catalogue [--output <path>]   Compile the catalogue and comparisons\n\
           materialize-pages                     Write missing page files and rebuild the route index\n\
           emit-sitemap [--base-url <url>]       Aggregate post timestamps and write sitemap.xml\n\
           build [--base-url <url>]              Run all stages as one recorded workflow\n\
           help                                  Show this message\n\
         \n\
         Environment:\n\
           SITE_ROOT       Site directory (default: the workspace root)\n\
           SITE_CONFIG     Config file relative to the root (default: site.toml)\n\
           SITE_BASE_URL   Sitemap base URL when --base-url is absent\n\
           RUST_LOG        Log filter (default: info)\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[derive(Debug, Parser)]
    struct Flags {
        #[arg(long)]
        base_url: Option<String>,
    }

    #[test]
    fn empty_args_show_help() {
        assert_eq!(parse(Vec::new()).expect("parse"), TopLevelCommand::Help);
    }

    #[test]
    fn command_word_is_split_from_its_flags() {
        assert_eq!(
            parse(args(&["emit-sitemap", "--base-url", "https://x.dev"])).expect("parse"),
            TopLevelCommand::EmitSitemap(args(&["--base-url", "https://x.dev"]))
        );
        assert_eq!(
            parse(args(&["build"])).expect("parse"),
            TopLevelCommand::Build(Vec::new())
        );
    }

    #[test]
    fn unknown_commands_are_validation_errors() {
        let err = parse(args(&["deploy"])).expect_err("unknown");
        assert!(err.to_string().contains("unknown xtask command: deploy"));
    }

    #[test]
    fn flags_parse_through_clap() {
        let flags: Flags = parse_flags("emit-sitemap", &args(&["--base-url", "https://x.dev"]))
            .expect("parse")
            .expect("flags");
        assert_eq!(flags.base_url.as_deref(), Some("https://x.dev"));

        let err = parse_flags::<Flags>("emit-sitemap", &args(&["--bogus"])).expect_err("bad flag");
        assert!(err.to_string().contains("--bogus"));
    }
}
