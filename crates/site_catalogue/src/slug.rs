//! Slug normalization and the claimed-slug accumulator.

use std::collections::HashSet;

use tracing::debug;

/// Normalize a display name into a URL-safe slug.
///
/// The name is ASCII-lowercased, every run of characters outside `[a-z0-9]` collapses into a
/// single `-`, and leading/trailing hyphens are trimmed. Idempotent.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Title-case the hyphen-separated segments of a slug (`foo-bar` -> `Foo Bar`).
pub fn title_case_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Slugs already claimed during one catalogue build.
///
/// A registry is threaded by `&mut` through every synthesis pass. The first claimant of a slug
/// keeps it; later claims are refused and the caller drops the candidate instead of renaming it.
#[derive(Clone, Debug, Default)]
pub struct SlugRegistry {
    claimed: HashSet<String>,
}

impl SlugRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with existing slugs.
    pub fn with_claimed<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            claimed: slugs.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `slug` is already taken.
    pub fn contains(&self, slug: &str) -> bool {
        self.claimed.contains(slug)
    }

    /// Claim `slug`, returning `false` when it was already taken.
    pub fn claim(&mut self, slug: &str) -> bool {
        if self.claimed.contains(slug) {
            debug!(slug, "slug already claimed");
            return false;
        }
        self.claimed.insert(slug.to_string());
        true
    }

    /// Number of claimed slugs.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing has been claimed yet.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_slug_shaped(value: &str) -> bool {
        value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !value.starts_with('-')
            && !value.ends_with('-')
            && !value.contains("--")
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Foo Tool"), "foo-tool");
        assert_eq!(slugify("  Jasper.ai -- Writer!! "), "jasper-ai-writer");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
        assert_eq!(slugify("Café Über"), "caf-ber");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn slugify_is_idempotent_and_slug_shaped() {
        let samples = [
            "Semrush",
            "Surfer SEO (2024)",
            "__weird__name__",
            "1Password Teams",
            "ÆØÅ mixed 42",
            "already-a-slug",
            "",
        ];
        for sample in samples {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "not idempotent for {sample:?}");
            assert!(is_slug_shaped(&once), "bad slug {once:?} for {sample:?}");
        }
    }

    #[test]
    fn title_case_slug_capitalizes_each_segment() {
        assert_eq!(title_case_slug("foo-bar"), "Foo Bar");
        assert_eq!(title_case_slug("seo"), "Seo");
        assert_eq!(title_case_slug("a--b"), "A B");
    }

    #[test]
    fn registry_refuses_second_claim() {
        let mut registry = SlugRegistry::with_claimed(["foo-tool"]);
        assert!(!registry.claim("foo-tool"));
        assert!(registry.claim("bar-tool"));
        assert!(!registry.claim("bar-tool"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registries_are_isolated() {
        let mut first = SlugRegistry::new();
        let mut second = SlugRegistry::new();
        assert!(first.claim("shared"));
        assert!(second.claim("shared"));
    }
}
