//! The closed set of document kinds.

use std::path::Path;

use crate::error::SourceError;
use crate::markdown::{MARKDOWN_EXTENSIONS, MarkdownSource};
use crate::parser::ParseOptions;
use crate::root::DefaultRoot;

/// A publishable document.
#[derive(Debug, Clone)]
pub enum Source {
    /// File-backed markdown document.
    Markdown(MarkdownSource),
    /// Synthesized root used when no `ROOT.md` exists.
    DefaultRoot(DefaultRoot),
}

impl Source {
    /// File extensions any file-backed kind accepts.
    pub fn extensions() -> &'static [&'static str] {
        MARKDOWN_EXTENSIONS
    }

    /// Whether some file-backed kind handles `path`.
    pub fn matches(path: &Path) -> bool {
        MarkdownSource::matches(path)
    }

    /// Open `path` with the kind selected by its extension.
    ///
    /// # Errors
    ///
    /// [`SourceError::UnsupportedKind`] when no kind matches, otherwise any
    /// read or parse error of the selected kind.
    pub fn open(path: &Path, options: ParseOptions) -> Result<Self, SourceError> {
        if MarkdownSource::matches(path) {
            return MarkdownSource::open(path, options).map(Self::Markdown);
        }
        Err(SourceError::UnsupportedKind(path.to_path_buf()))
    }

    /// Synthesize the default root document.
    pub fn default_root(title: impl Into<String>, identity: Option<String>) -> Self {
        Self::DefaultRoot(DefaultRoot::new(title, identity))
    }

    /// Backing file, `None` for the synthesized root.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Markdown(doc) => Some(doc.path()),
            Self::DefaultRoot(_) => None,
        }
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Markdown(doc) => doc.identity(),
            Self::DefaultRoot(root) => root.identity(),
        }
    }

    /// Assign a remote identity, persisting it when the document has a file.
    pub fn set_identity(&mut self, identity: &str) -> Result<(), SourceError> {
        match self {
            Self::Markdown(doc) => doc.set_identity(identity),
            Self::DefaultRoot(root) => root.set_identity(identity),
        }
    }

    /// Page title. Empty only for ignored documents without a title line.
    pub fn title(&self) -> &str {
        match self {
            Self::Markdown(doc) => doc.title().unwrap_or_default(),
            Self::DefaultRoot(root) => root.title(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        match self {
            Self::Markdown(doc) => doc.is_ignored(),
            Self::DefaultRoot(_) => false,
        }
    }

    pub fn is_root(&self) -> bool {
        match self {
            Self::Markdown(doc) => doc.is_root(),
            Self::DefaultRoot(_) => true,
        }
    }

    pub fn omit_notice(&self) -> bool {
        match self {
            Self::Markdown(doc) => doc.omit_notice(),
            Self::DefaultRoot(_) => true,
        }
    }

    /// Rendered storage markup. `source_url` is linked from the notice banner.
    pub fn render(&self, source_url: &str) -> String {
        match self {
            Self::Markdown(doc) => doc.render(source_url),
            Self::DefaultRoot(_) => String::new(),
        }
    }

    /// Human-readable location for logs and reports.
    pub fn display_name(&self) -> String {
        match self {
            Self::Markdown(doc) => doc.path().display().to_string(),
            Self::DefaultRoot(root) => format!("<default root: {}>", root.title()),
        }
    }
}
