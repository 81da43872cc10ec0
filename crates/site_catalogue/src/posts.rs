//! Blog corpus scanning: frontmatter field scraping over `.md`/`.mdx` files.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CatalogueError, CatalogueResult};
use crate::model::PostMeta;

const FRONTMATTER_DELIM: &str = "---";
const POST_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Scrape the fields the sitemap needs from a post's leading frontmatter block.
///
/// Only flat `key: value` lines are read; nested or list values are ignored. Returns `None`
/// when the post has no category.
pub fn scrape_post_meta(text: &str, fallback_slug: &str) -> Option<PostMeta> {
    let mut slug = None;
    let mut category = None;
    let mut sub_category = None;
    let mut date = None;
    let mut updated = None;

    for line in frontmatter_lines(text) {
        let Some((key, value)) = parse_key_value(line) else {
            continue;
        };
        let value = scalar(value);
        match key {
            "slug" => slug = value,
            "category" => category = value,
            "subCategory" | "sub_category" => sub_category = value,
            "date" => date = value,
            "updated" => updated = value,
            _ => {}
        }
    }

    Some(PostMeta {
        slug: slug.unwrap_or_else(|| fallback_slug.to_string()),
        category: category?,
        sub_category,
        date,
        updated,
    })
}

/// Lines between the opening and closing delimiters. Empty unless both are present.
fn frontmatter_lines(text: &str) -> Vec<&str> {
    let mut lines = text.trim_start_matches('\u{feff}').lines();
    if !lines
        .next()
        .is_some_and(|first| first.trim() == FRONTMATTER_DELIM)
    {
        return Vec::new();
    }
    let mut block = Vec::new();
    for line in lines {
        if line.trim() == FRONTMATTER_DELIM {
            return block;
        }
        block.push(line);
    }
    Vec::new()
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return None;
    }
    Some((key, value))
}

fn scalar(value: &str) -> Option<String> {
    let value = strip_quotes(value.trim());
    if value.is_empty() || value == "~" || value.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(value.to_string())
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if value.len() >= 2
        && ((bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\''))
    {
        return value[1..value.len() - 1].trim();
    }
    value
}

fn is_post_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| POST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Walk `content_dir` and scrape every post, sorted by category then slug.
///
/// A missing or unreadable content directory is an error; posts without a category are skipped.
pub fn collect_posts(content_dir: &Path) -> CatalogueResult<Vec<PostMeta>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(content_dir).follow_links(true) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(content_dir).to_path_buf();
            let io = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            CatalogueError::io("scan", path, io)
        })?;
        if entry.file_type().is_file() && is_post_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    let scraped = files
        .par_iter()
        .map(|path| -> CatalogueResult<Option<PostMeta>> {
            let text =
                fs::read_to_string(path).map_err(|err| CatalogueError::io("read", path, err))?;
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            let meta = scrape_post_meta(&text, stem);
            if meta.is_none() {
                debug!(path = %path.display(), "post has no category; skipped");
            }
            Ok(meta)
        })
        .collect::<CatalogueResult<Vec<_>>>()?;

    let mut posts: Vec<PostMeta> = scraped.into_iter().flatten().collect();
    posts.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    info!(
        dir = %content_dir.display(),
        files = files.len(),
        posts = posts.len(),
        "blog corpus scanned"
    );
    Ok(posts)
}
