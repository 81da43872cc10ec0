//! Site build configuration and base-URL resolution.

use crate::runtime::config::ConfigLoader;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{XtaskError, XtaskResult};
use serde::Deserialize;
use site_catalogue::{normalize_base_url, PageLayout, RoutePrefixes, TaxonomyCategory};
use std::env;
use std::path::{Path, PathBuf};

const SITE_CONFIG_PATH: &str = "site.toml";
/// Overrides the config file location.
pub const SITE_CONFIG_ENV: &str = "SITE_CONFIG";
/// Overrides the configured sitemap base URL.
pub const SITE_BASE_URL_ENV: &str = "SITE_BASE_URL";

/// Versioned configuration describing where the site's inputs and outputs live.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Catalogue source file (`.toml`, `.yaml`, `.yml`, or `.json`).
    pub catalogue_source: PathBuf,
    /// Blog corpus directory.
    pub content_dir: PathBuf,
    /// Public output directory that receives `sitemap.xml`.
    pub public_dir: PathBuf,
    /// Base URL used when neither the flag nor the environment provides one.
    pub default_base_url: String,
    /// Fixed routes always present in the sitemap.
    pub static_routes: Vec<String>,
    /// Generated page layout.
    pub pages: PageLayout,
    /// Route prefixes shared by the route index and the sitemap.
    pub routes: RoutePrefixes,
    /// Blog taxonomy. Derived from the posts when empty.
    pub taxonomy: Vec<TaxonomyCategory>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            catalogue_source: PathBuf::from("content/catalogue.toml"),
            content_dir: PathBuf::from("content/blog"),
            public_dir: PathBuf::from("public"),
            default_base_url: "https://example.com".into(),
            static_routes: vec![
                "/".into(),
                "/tools".into(),
                "/compare".into(),
                "/blog".into(),
            ],
            pages: PageLayout::default(),
            routes: RoutePrefixes::default(),
            taxonomy: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Load `site.toml` (or `SITE_CONFIG`) relative to the context root.
    pub fn load(ctx: &CommandContext) -> XtaskResult<Self> {
        let relative = env::var(SITE_CONFIG_ENV)
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SITE_CONFIG_PATH));
        Self::load_from(ctx.root(), &relative)
    }

    /// Load a config file at `path`, anchored at `root` when relative.
    pub fn load_from(root: &Path, path: &Path) -> XtaskResult<Self> {
        let loader = ConfigLoader::<Self>::new(root, path);
        let config = loader
            .load()
            .map_err(|err| err.with_operation("load site config"))?;
        config.validate().map_err(|err| err.with_path(loader.path()))?;
        Ok(config)
    }

    fn validate(&self) -> XtaskResult<()> {
        if self.pages.extension.trim().is_empty() {
            return Err(XtaskError::config("pages.extension must not be empty"));
        }
        if self.pages.tools_dir == self.pages.comparisons_dir {
            return Err(XtaskError::config(
                "pages.tools_dir and pages.comparisons_dir must differ",
            )
            .with_hint("each page batch needs its own output directory"));
        }
        Ok(())
    }

    /// Page layout anchored at the workspace root, carrying the configured route prefixes.
    pub fn page_layout(&self, ctx: &CommandContext) -> PageLayout {
        let mut layout = self.pages.anchored_at(ctx.root());
        layout.routes = self.routes.clone();
        layout
    }
}

/// Pick the sitemap base URL: flag, then `SITE_BASE_URL`, then the configured default.
///
/// Blank values are skipped and trailing slashes are stripped from the winner.
pub fn resolve_base_url(flag: Option<&str>, env_value: Option<&str>, default: &str) -> String {
    let chosen = [flag, env_value]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or(default);
    normalize_base_url(chosen)
}

/// [`resolve_base_url`] reading `SITE_BASE_URL` from the process environment.
pub fn base_url_from_env(flag: Option<&str>, config: &SiteConfig) -> String {
    let env_value = env::var(SITE_BASE_URL_ENV).ok();
    resolve_base_url(flag, env_value.as_deref(), &config.default_base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn base_url_precedence_is_flag_env_default() {
        assert_eq!(
            resolve_base_url(Some("https://flag.dev/"), Some("https://env.dev"), "https://cfg.dev"),
            "https://flag.dev"
        );
        assert_eq!(
            resolve_base_url(None, Some("https://env.dev//"), "https://cfg.dev"),
            "https://env.dev"
        );
        assert_eq!(
            resolve_base_url(Some("  "), None, "https://cfg.dev/"),
            "https://cfg.dev"
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join("site.toml"),
            "default_base_url = \"https://tools.example.org\"\n\n[pages]\nextension = \"tsx\"\n\n[routes]\ntools = \"/apps\"\n\n[[taxonomy]]\nslug = \"seo\"\nsub_categories = [\"audits\"]\n",
        )
        .expect("write config");

        let config = SiteConfig::load_from(temp.path(), Path::new("site.toml")).expect("load");
        assert_eq!(config.default_base_url, "https://tools.example.org");
        assert_eq!(config.pages.extension, "tsx");
        assert_eq!(config.pages.tools_dir, PathBuf::from("src/pages/tools"));
        assert_eq!(config.routes.tools, "/apps");
        assert_eq!(config.routes.compare, "/compare");
        assert_eq!(config.taxonomy[0].sub_categories, vec!["audits"]);
        assert_eq!(config.catalogue_source, PathBuf::from("content/catalogue.toml"));
    }

    #[test]
    fn page_layout_is_anchored_and_carries_routes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let ctx = CommandContext::with_root(
            temp.path().to_path_buf(),
            site_catalogue::BuildClock::capture(),
        );
        let mut config = SiteConfig::default();
        config.routes.tools = "/apps".into();
        let layout = config.page_layout(&ctx);
        assert_eq!(layout.tools_dir, temp.path().join("src/pages/tools"));
        assert_eq!(layout.routes.tools, "/apps");
    }

    #[test]
    fn shared_page_directories_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join("site.toml"),
            "[pages]\ntools_dir = \"pages\"\ncomparisons_dir = \"pages\"\n",
        )
        .expect("write config");
        let err = SiteConfig::load_from(temp.path(), Path::new("site.toml")).expect_err("invalid");
        assert!(err.to_string().contains("must differ"));
    }
}
