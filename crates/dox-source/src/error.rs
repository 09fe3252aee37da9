//! Error types for source documents.

use std::path::PathBuf;

/// Error while reading, parsing, or rewriting a source document.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error on the document file.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No source kind handles this file extension.
    #[error("{}: no supported source kind for this file", .0.display())]
    UnsupportedKind(PathBuf),

    /// Input ended before the header and title could be read.
    #[error("{}: unexpected end of input before title", .0.display())]
    UnexpectedEof(PathBuf),

    /// `ignore` or an identity token is not the first directive.
    #[error("{}: invalid dox header format; {directive} should be first", .path.display())]
    DirectiveOrder {
        /// Document path.
        path: PathBuf,
        /// Offending directive description.
        directive: &'static str,
    },

    /// Document is not ignored but has no `# ` title line.
    #[error("{}: title not found", .0.display())]
    MissingTitle(PathBuf),

    /// Identity was already assigned; identities are write-once.
    #[error("{}: source already has an identity ({identity})", .path.display())]
    IdentityAlreadySet {
        /// Document path.
        path: PathBuf,
        /// Existing identity.
        identity: String,
    },

    /// Writing the rewritten document failed; the original file is untouched.
    #[error("{}: failed to persist identity: {source}", .path.display())]
    Persist {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
