//! Error types for publishing.

use std::path::PathBuf;

use dox_confluence::ConfluenceError;
use dox_source::SourceError;

/// Error aborting a publish run.
///
/// Nothing is retried or rolled back; pages and identities written before
/// the failure stay in place and the next run resumes from them.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A source document could not be read, parsed, or rewritten.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// No `.git` entry in the start directory or any parent.
    #[error("{}: not inside a git repository", .0.display())]
    RepoRootNotFound(PathBuf),

    /// Directory walk failed.
    #[error("failed to walk repository: {0}")]
    Walk(#[from] ignore::Error),

    /// More than one document claims to be the root.
    #[error("multiple root documents: {}", format_paths(.0))]
    MultipleRoots(Vec<PathBuf>),

    /// A remote call failed.
    #[error("failed to {operation} for {target}: {source}")]
    Remote {
        /// Operation attempted, e.g. `create page`.
        operation: &'static str,
        /// Document or page the operation was for.
        target: String,
        #[source]
        source: ConfluenceError,
    },

    /// Local file error outside of document parsing (e.g. reading an image).
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendered markup could not be scanned.
    #[error("{}: malformed rendered markup: {source}", .path.display())]
    Markup {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    /// A child page needs a parent but the root has no identity.
    #[error("root document has no identity; cannot parent {0}")]
    UnpersistedRoot(String),
}

impl PublishError {
    pub(crate) fn remote(
        operation: &'static str,
        target: impl Into<String>,
        source: ConfluenceError,
    ) -> Self {
        Self::Remote {
            operation,
            target: target.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
