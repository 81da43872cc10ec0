//! Build clock, date normalization, and per-taxonomy lastmod watermarks.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::model::PostMeta;

/// Wall-clock instant captured once per build.
///
/// Every unparseable date in a build falls back to the same value, so a sitemap emitted twice
/// from one clock is byte-identical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildClock {
    now: DateTime<Utc>,
    now_iso: String,
}

impl BuildClock {
    /// Capture the current time.
    pub fn capture() -> Self {
        Self::fixed(Utc::now())
    }

    /// Use a fixed instant.
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self {
            now_iso: format_iso(now),
            now,
        }
    }

    /// The captured instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The captured instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub fn now_iso(&self) -> &str {
        &self.now_iso
    }
}

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn format_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a date as written in content into the sitemap timestamp format.
///
/// RFC 3339 date-times are converted to UTC. Date-times without an offset (`T` or space
/// separated, optional fractional seconds) are read as UTC, and bare `YYYY-MM-DD` dates are
/// midnight UTC. Anything else yields `None`.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_iso(parsed.with_timezone(&Utc)));
    }
    if let Some(naive) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(format_iso(naive.and_utc()));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(format_iso(midnight.and_utc()))
}

/// The timestamp a post contributes: `updated`, then `date`, then the build clock.
pub fn effective_timestamp(post: &PostMeta, clock: &BuildClock) -> String {
    post.updated
        .as_deref()
        .and_then(normalize_timestamp)
        .or_else(|| post.date.as_deref().and_then(normalize_timestamp))
        .unwrap_or_else(|| {
            debug!(slug = %post.slug, "post has no parseable date; using build time");
            clock.now_iso().to_string()
        })
}

/// Latest post timestamp per category and per category/sub-category pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LastmodWatermarks {
    categories: BTreeMap<String, String>,
    sub_categories: BTreeMap<String, String>,
}

impl LastmodWatermarks {
    /// Watermark for a category.
    pub fn category(&self, category: &str) -> Option<&str> {
        self.categories.get(category).map(String::as_str)
    }

    /// Watermark for a sub-category within a category.
    pub fn sub_category(&self, category: &str, sub_category: &str) -> Option<&str> {
        self.sub_categories
            .get(&sub_category_key(category, sub_category))
            .map(String::as_str)
    }

    /// Number of category watermarks.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of sub-category watermarks.
    pub fn sub_category_count(&self) -> usize {
        self.sub_categories.len()
    }

    fn observe(&mut self, category: &str, sub_category: Option<&str>, stamp: &str) {
        raise(&mut self.categories, category.to_string(), stamp);
        if let Some(sub) = sub_category {
            raise(&mut self.sub_categories, sub_category_key(category, sub), stamp);
        }
    }
}

fn sub_category_key(category: &str, sub_category: &str) -> String {
    format!("{category}::{sub_category}")
}

fn raise(map: &mut BTreeMap<String, String>, key: String, stamp: &str) {
    match map.get_mut(&key) {
        Some(current) if current.as_str() >= stamp => {}
        Some(current) => *current = stamp.to_string(),
        None => {
            map.insert(key, stamp.to_string());
        }
    }
}

/// Fold posts into watermarks. Timestamps share one format, so lexical max is chronological max.
pub fn aggregate(posts: &[PostMeta], clock: &BuildClock) -> LastmodWatermarks {
    let mut watermarks = LastmodWatermarks::default();
    for post in posts {
        let stamp = effective_timestamp(post, clock);
        watermarks.observe(&post.category, post.sub_category.as_deref(), &stamp);
    }
    watermarks
}
