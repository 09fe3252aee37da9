//! The `<!-- dox: ... -->` directive header.
//!
//! A document carries at most one header line before its title. The payload
//! is a comma-separated token list:
//!
//! | Token | Meaning | Position |
//! |-------|---------|----------|
//! | digits (e.g. `98765`) | remote page identity | first |
//! | `ignore` | never publish this document | first |
//! | `omit-notice` | no "generated content" banner | any |
//!
//! Unknown tokens are kept verbatim so that newer headers survive a rewrite.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SourceError;

/// Marker that opens the directive list inside the comment.
pub const DIRECTIVE_MARKER: &str = "dox";

/// Token excluding a document from publishing.
pub const IGNORE: &str = "ignore";

/// Token suppressing the notice banner.
pub const OMIT_NOTICE: &str = "omit-notice";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<!--\s*dox:\s*(.*?)\s*-->\s*$").unwrap());

static IDENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Whether `token` is a remote page identity.
pub fn is_identity(token: &str) -> bool {
    IDENTITY_RE.is_match(token)
}

/// Payload of a directive header line, or `None` if `line` is not one.
pub fn header_payload(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    HEADER_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parsed directive tokens of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    tokens: Vec<String>,
    identity: Option<String>,
    ignore: bool,
    omit_notice: bool,
}

impl Directives {
    /// Parse a header payload such as `"1234, omit-notice"`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::DirectiveOrder`] if `ignore` or an identity
    /// appears anywhere but first. Both present means one of them is not
    /// first, so they can never be combined.
    pub fn parse(payload: &str, path: &Path) -> Result<Self, SourceError> {
        let tokens: Vec<String> = SEPARATOR_RE
            .split(payload.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();

        for token in tokens.iter().skip(1) {
            if token == IGNORE {
                return Err(SourceError::DirectiveOrder {
                    path: path.to_path_buf(),
                    directive: "ignore",
                });
            }
            if is_identity(token) {
                return Err(SourceError::DirectiveOrder {
                    path: path.to_path_buf(),
                    directive: "Confluence ID",
                });
            }
        }

        let first = tokens.first().map(String::as_str);
        let ignore = first == Some(IGNORE);
        let identity = first.filter(|t| is_identity(t)).map(str::to_owned);
        // An ignored document is never rendered, so nothing else applies.
        let omit_notice = !ignore && tokens.iter().any(|t| t == OMIT_NOTICE);

        Ok(Self {
            tokens,
            identity,
            ignore,
            omit_notice,
        })
    }

    /// Remote page identity, if declared.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether the document is excluded from publishing.
    pub fn ignore(&self) -> bool {
        self.ignore
    }

    /// Whether the notice banner is suppressed.
    pub fn omit_notice(&self) -> bool {
        self.omit_notice
    }

    /// Tokens in header order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Copy of these directives with `identity` inserted as the first token.
    pub(crate) fn with_identity(&self, identity: &str) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.push(identity.to_owned());
        tokens.extend(self.tokens.iter().cloned());
        Self {
            tokens,
            identity: Some(identity.to_owned()),
            ignore: false,
            omit_notice: self.omit_notice,
        }
    }

    /// Header line (without newline) carrying these directives.
    pub fn to_header(&self) -> String {
        format!("<!-- {DIRECTIVE_MARKER}: {} -->", self.tokens.join(", "))
    }
}
