//! Route materialization: thin per-entity page files plus the lazy route index.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

use crate::artifacts::{ArtifactStatus, ArtifactStore};
use crate::error::CatalogueResult;
use crate::model::{CatalogueEntry, ComparisonEntry, RoutePrefixes};

const PAGE_HEADER: &str =
    "// Generated once by `cargo xtask materialize-pages`. Edits here are preserved.";
const INDEX_HEADER: &str =
    "// Generated by `cargo xtask materialize-pages`. Rebuilt on every run; do not edit.";

/// Where generated pages and the route index live, and what they import.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageLayout {
    /// Directory for per-tool pages.
    pub tools_dir: PathBuf,
    /// Directory for per-comparison pages.
    pub comparisons_dir: PathBuf,
    /// Route index file.
    pub index_path: PathBuf,
    /// Page file extension without the dot.
    pub extension: String,
    /// Module specifier of the tool detail component, as seen from a tool page.
    pub tool_component: String,
    /// Module specifier of the comparison detail component, as seen from a comparison page.
    pub comparison_component: String,
    /// Module specifier prefix for tool pages, as seen from the index.
    pub tool_import_prefix: String,
    /// Module specifier prefix for comparison pages, as seen from the index.
    pub comparison_import_prefix: String,
    /// Route prefixes used for index paths. Supplied by the site config, not the `[pages]` table.
    #[serde(skip)]
    pub routes: RoutePrefixes,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("src/pages/tools"),
            comparisons_dir: PathBuf::from("src/pages/compare"),
            index_path: PathBuf::from("src/routes.generated.js"),
            extension: "jsx".into(),
            tool_component: "../../components/ToolDetail".into(),
            comparison_component: "../../components/ComparisonDetail".into(),
            tool_import_prefix: "./pages/tools".into(),
            comparison_import_prefix: "./pages/compare".into(),
            routes: RoutePrefixes::default(),
        }
    }
}

impl PageLayout {
    /// Anchor every relative path in the layout at `root`.
    pub fn anchored_at(&self, root: &Path) -> Self {
        let anchor = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        };
        Self {
            tools_dir: anchor(&self.tools_dir),
            comparisons_dir: anchor(&self.comparisons_dir),
            index_path: anchor(&self.index_path),
            ..self.clone()
        }
    }

    fn page_file_name(&self, slug: &str) -> String {
        format!("{slug}.{}", self.extension)
    }

    /// Deterministic page path for a tool slug.
    pub fn tool_page_path(&self, slug: &str) -> PathBuf {
        self.tools_dir.join(self.page_file_name(slug))
    }

    /// Deterministic page path for a comparison slug.
    pub fn comparison_page_path(&self, slug: &str) -> PathBuf {
        self.comparisons_dir.join(self.page_file_name(slug))
    }
}

/// Counts from one materialization run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MaterializeReport {
    /// Pages written because they were missing.
    pub created: usize,
    /// Pages considered (catalogue plus comparisons).
    pub total: usize,
}

impl MaterializeReport {
    fn merge(self, other: Self) -> Self {
        Self {
            created: self.created + other.created,
            total: self.total + other.total,
        }
    }
}

struct PageJob {
    path: PathBuf,
    contents: String,
}

/// Make a string usable as a script identifier.
///
/// Characters outside `[A-Za-z0-9_$]` become `_`, and a leading digit gets a `_` prefix.
pub fn script_identifier(raw: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn render_page(component_import: &str, component: &str, slug: &str) -> String {
    format!(
        "{PAGE_HEADER}\n\
         import {component} from {import};\n\
         \n\
         export default function Page() {{\n  \
           return <{component} slug={{{slug}}} />;\n\
         }}\n",
        import = js_string(component_import),
        slug = js_string(slug),
    )
}

/// Render the thin wrapper page for a catalogue entry.
pub fn render_tool_page(layout: &PageLayout, slug: &str) -> String {
    render_page(&layout.tool_component, "ToolDetail", slug)
}

/// Render the thin wrapper page for a comparison.
pub fn render_comparison_page(layout: &PageLayout, slug: &str) -> String {
    render_page(&layout.comparison_component, "ComparisonDetail", slug)
}

fn materialize_batch<S>(
    store: &S,
    dir: &Path,
    jobs: Vec<PageJob>,
) -> CatalogueResult<MaterializeReport>
where
    S: ArtifactStore + ?Sized,
{
    store.ensure_dir(dir)?;
    let total = jobs.len();
    let created = jobs
        .into_par_iter()
        .map(|job| -> CatalogueResult<usize> {
            match store.probe(&job.path)? {
                ArtifactStatus::Exists => {
                    debug!(path = %job.path.display(), "page exists; left untouched");
                    Ok(0)
                }
                ArtifactStatus::Missing => {
                    store.write(&job.path, &job.contents)?;
                    Ok(1)
                }
            }
        })
        .collect::<CatalogueResult<Vec<_>>>()?
        .into_iter()
        .sum();
    Ok(MaterializeReport { created, total })
}

/// Write a page for every catalogue entry and comparison whose page is missing.
///
/// Existing pages are never touched, so hand-customized pages survive every build and a second
/// run over an unchanged catalogue writes nothing. Each output directory is one parallel batch
/// that finishes before the next starts.
pub fn materialize<S>(
    store: &S,
    catalogue: &[CatalogueEntry],
    comparisons: &[ComparisonEntry],
    layout: &PageLayout,
) -> CatalogueResult<MaterializeReport>
where
    S: ArtifactStore + ?Sized,
{
    let tool_jobs = catalogue
        .iter()
        .map(|entry| PageJob {
            path: layout.tool_page_path(&entry.slug),
            contents: render_tool_page(layout, &entry.slug),
        })
        .collect();
    let tools = materialize_batch(store, &layout.tools_dir, tool_jobs)?;
    info!(
        created = tools.created,
        total = tools.total,
        dir = %layout.tools_dir.display(),
        "tool pages materialized"
    );

    let comparison_jobs = comparisons
        .iter()
        .map(|entry| PageJob {
            path: layout.comparison_page_path(&entry.slug),
            contents: render_comparison_page(layout, &entry.slug),
        })
        .collect();
    let compared = materialize_batch(store, &layout.comparisons_dir, comparison_jobs)?;
    info!(
        created = compared.created,
        total = compared.total,
        dir = %layout.comparisons_dir.display(),
        "comparison pages materialized"
    );

    Ok(tools.merge(compared))
}

/// Render the lazy route index for the full entry set.
pub fn render_index(
    catalogue: &[CatalogueEntry],
    comparisons: &[ComparisonEntry],
    layout: &PageLayout,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{INDEX_HEADER}");
    let _ = writeln!(out, "import {{ lazy }} from 'react';");
    out.push('\n');

    let tool_rows: Vec<(String, String)> = catalogue
        .iter()
        .map(|entry| {
            let ident = script_identifier(&format!("tool-{}", entry.slug));
            let module = format!(
                "{}/{}",
                layout.tool_import_prefix.trim_end_matches('/'),
                layout.page_file_name(&entry.slug)
            );
            let _ = writeln!(out, "const {ident} = lazy(() => import({}));", js_string(&module));
            (RoutePrefixes::join(&layout.routes.tools, &entry.slug), ident)
        })
        .collect();

    let comparison_rows: Vec<(String, String)> = comparisons
        .iter()
        .map(|entry| {
            let ident = script_identifier(&format!("compare-{}", entry.slug));
            let module = format!(
                "{}/{}",
                layout.comparison_import_prefix.trim_end_matches('/'),
                layout.page_file_name(&entry.slug)
            );
            let _ = writeln!(out, "const {ident} = lazy(() => import({}));", js_string(&module));
            (RoutePrefixes::join(&layout.routes.compare, &entry.slug), ident)
        })
        .collect();

    for (name, rows) in [("toolRoutes", tool_rows), ("comparisonRoutes", comparison_rows)] {
        out.push('\n');
        let _ = writeln!(out, "export const {name} = [");
        for (path, ident) in rows {
            let _ = writeln!(out, "  {{ path: {}, component: {ident} }},", js_string(&path));
        }
        let _ = writeln!(out, "];");
    }

    out
}

/// Regenerate the route index from scratch.
///
/// Unlike pages, the index always reflects the full current entry set, so it is overwritten on
/// every run.
pub fn write_index<S>(
    store: &S,
    catalogue: &[CatalogueEntry],
    comparisons: &[ComparisonEntry],
    layout: &PageLayout,
) -> CatalogueResult<()>
where
    S: ArtifactStore + ?Sized,
{
    if let Some(parent) = layout.index_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        store.ensure_dir(parent)?;
    }
    store.write(&layout.index_path, &render_index(catalogue, comparisons, layout))?;
    info!(
        path = %layout.index_path.display(),
        tools = catalogue.len(),
        comparisons = comparisons.len(),
        "route index regenerated"
    );
    Ok(())
}
