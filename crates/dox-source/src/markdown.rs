//! File-backed markdown documents.

use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::directive::Directives;
use crate::error::SourceError;
use crate::parser::{self, ParseOptions};
use crate::render;

/// File name marking the root document of a tree.
pub const ROOT_FILENAME: &str = "ROOT.md";

/// Extensions handled by [`MarkdownSource`].
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// A markdown document backed by a file on disk.
#[derive(Debug, Clone)]
pub struct MarkdownSource {
    path: PathBuf,
    directives: Directives,
    title: Option<String>,
    preamble: String,
    body: String,
    options: ParseOptions,
}

impl MarkdownSource {
    /// Whether `path` has a markdown extension.
    pub fn matches(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
    }

    /// Read and parse the document at `path`.
    pub fn open(path: &Path, options: ParseOptions) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
        let parsed = parser::parse(&text, path, options)?;

        Ok(Self {
            path: path.to_path_buf(),
            directives: parsed.directives,
            title: parsed.title,
            preamble: parsed.preamble,
            body: parsed.body,
            options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directives(&self) -> &Directives {
        &self.directives
    }

    pub fn identity(&self) -> Option<&str> {
        self.directives.identity()
    }

    /// Title, if the document has one. Only ignored documents may lack it.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_ignored(&self) -> bool {
        self.directives.ignore()
    }

    pub fn omit_notice(&self) -> bool {
        self.directives.omit_notice()
    }

    pub fn is_root(&self) -> bool {
        self.path
            .file_name()
            .is_some_and(|name| name == ROOT_FILENAME)
    }

    /// Rendered body with the notice banner unless suppressed.
    pub fn render(&self, source_url: &str) -> String {
        let mut out = render::markdown_to_xhtml(&self.body, self.options.trim_space);
        if !self.omit_notice() {
            out.insert_str(0, &render::notice_banner(source_url));
        }
        out
    }

    /// Assign the remote identity and write it into the file header.
    ///
    /// The file is rewritten through a temporary file next to it, so a
    /// failed write leaves the original untouched.
    pub fn set_identity(&mut self, identity: &str) -> Result<(), SourceError> {
        if let Some(existing) = self.identity() {
            return Err(SourceError::IdentityAlreadySet {
                path: self.path.clone(),
                identity: existing.to_owned(),
            });
        }

        let directives = self.directives.with_identity(identity);
        let text = fs::read_to_string(&self.path).map_err(|e| SourceError::io(&self.path, e))?;
        let current = parser::parse(&text, &self.path, self.options)?;
        let rewritten = rewrite_header(&text, current.header_span, &directives.to_header());
        persist(&self.path, &rewritten)?;

        tracing::info!(path = %self.path.display(), identity, "Recorded page identity");
        self.directives = directives;
        Ok(())
    }
}

/// Replace the header line at `span`, or prepend a header when there is none.
///
/// Every other byte of `text` is preserved, including line endings.
fn rewrite_header(text: &str, span: Option<Range<usize>>, header: &str) -> String {
    if let Some(span) = span {
        let mut out = String::with_capacity(text.len() + header.len());
        out.push_str(&text[..span.start]);
        out.push_str(header);
        out.push_str(&text[span.end..]);
        return out;
    }

    let newline = if text.split('\n').next().is_some_and(|l| l.ends_with('\r')) {
        "\r\n"
    } else {
        "\n"
    };
    format!("{header}{newline}{text}")
}

fn persist(path: &Path, contents: &str) -> Result<(), SourceError> {
    let to_persist_error = |source| SourceError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(to_persist_error)?;
    tmp.write_all(contents.as_bytes())
        .map_err(to_persist_error)?;
    tmp.as_file().sync_all().map_err(to_persist_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(to_persist_error)?;
    }
    tmp.persist(path).map_err(|e| to_persist_error(e.error))?;
    Ok(())
}
