//! Error type shared by every compiler stage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a compiler stage.
///
/// Data-shape problems (bad dates, unknown contenders, colliding slugs) are not errors; they are
/// resolved by fallbacks inside the stages. Only environment failures and unreadable sources
/// surface here.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Filesystem access failed for a specific path.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Short verb phrase describing the attempted operation.
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A source or content file could not be deserialized.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// The catalogue source has an extension no loader understands.
    #[error("unsupported catalogue source format `{extension}` for {}", path.display())]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
        /// Extension as found on disk.
        extension: String,
    },
    /// A comparison slug does not name at least two contenders.
    #[error("invalid comparison slug `{0}`: expected `<slug>-vs-<slug>[-vs-<slug>...]`")]
    InvalidComparisonSlug(String),
}

impl CatalogueError {
    /// Build an [`CatalogueError::Io`] for `path`.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Build a [`CatalogueError::Parse`] for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Convenience result alias for compiler stages.
pub type CatalogueResult<T> = Result<T, CatalogueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_action_and_path() {
        let err = CatalogueError::io(
            "write",
            "/tmp/out/page.jsx",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let text = err.to_string();
        assert!(text.starts_with("failed to write /tmp/out/page.jsx"));
        assert!(text.ends_with("denied"));
    }

    #[test]
    fn invalid_comparison_slug_mentions_expected_shape() {
        let err = CatalogueError::InvalidComparisonSlug("semrush".into());
        assert!(err.to_string().contains("`semrush`"));
        assert!(err.to_string().contains("-vs-"));
    }
}
