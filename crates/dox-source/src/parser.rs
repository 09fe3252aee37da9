//! Line scanner splitting a document into header, preamble, title and body.

use std::ops::Range;
use std::path::Path;

use crate::directive::{self, Directives};
use crate::error::SourceError;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const TITLE_PREFIX: &str = "# ";

/// Meaningful pre-title lines after which the scan gives up on a title.
const MAX_PREAMBLE_LINES: usize = 2;

/// Options controlling how a document is parsed and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop comment lines before the title instead of keeping them in the preamble.
    pub strip_comments: bool,
    /// Trim surrounding whitespace from rendered output.
    pub trim_space: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_comments: true,
            trim_space: true,
        }
    }
}

/// Result of scanning one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub directives: Directives,
    /// `None` only for ignored documents without a title line.
    pub title: Option<String>,
    /// Pre-title lines that are neither the header nor stripped comments.
    pub preamble: String,
    /// Everything after the title line, verbatim.
    pub body: String,
    /// Byte range of the directive header line, without its line ending.
    pub header_span: Option<Range<usize>>,
}

/// Title carried by a `# ` heading line.
pub(crate) fn heading_title(line: &str) -> Option<&str> {
    line.strip_prefix(TITLE_PREFIX).map(str::trim)
}

/// Scan `text` read from `path`.
///
/// The scan stops at the first `# ` heading, or once two meaningful lines
/// have gone by without one. Running out of input before either happens is
/// [`SourceError::UnexpectedEof`].
pub fn parse(text: &str, path: &Path, options: ParseOptions) -> Result<ParsedDocument, SourceError> {
    let mut directives: Option<Directives> = None;
    let mut header_span = None;
    let mut preamble = String::new();
    let mut title = None;
    let mut in_comment = false;
    let mut meaningful = 0;
    let mut consumed = 0;
    let mut finished = false;

    for raw in text.split_inclusive('\n') {
        consumed += raw.len();
        let mut line = raw;

        if in_comment {
            let Some(end) = line.find(COMMENT_CLOSE) else {
                if !options.strip_comments {
                    preamble.push_str(line);
                }
                continue;
            };
            in_comment = false;
            let (comment, rest) = line.split_at(end + COMMENT_CLOSE.len());
            if !options.strip_comments {
                preamble.push_str(comment);
            }
            if rest.trim().is_empty() {
                if !options.strip_comments {
                    preamble.push_str(rest);
                }
                continue;
            }
            line = rest;
        } else {
            if directives.is_none()
                && let Some(payload) = directive::header_payload(line)
            {
                directives = Some(Directives::parse(payload, path)?);
                let start = consumed - raw.len();
                header_span = Some(start..start + raw.trim_end_matches(['\n', '\r']).len());
                continue;
            }

            if let Some(after_open) = line.trim_start().strip_prefix(COMMENT_OPEN) {
                if !after_open.contains(COMMENT_CLOSE) {
                    in_comment = true;
                }
                if !options.strip_comments {
                    preamble.push_str(line);
                }
                continue;
            }
        }

        if let Some(heading) = heading_title(line) {
            title = Some(heading.to_owned());
            finished = true;
            break;
        }

        if !line.trim().is_empty() {
            meaningful += 1;
        }
        preamble.push_str(line);
        if meaningful >= MAX_PREAMBLE_LINES {
            finished = true;
            break;
        }
    }

    if !finished {
        return Err(SourceError::UnexpectedEof(path.to_path_buf()));
    }

    let directives = directives.unwrap_or_default();
    let title = title.filter(|t| !t.is_empty());
    if title.is_none() && !directives.ignore() {
        return Err(SourceError::MissingTitle(path.to_path_buf()));
    }

    Ok(ParsedDocument {
        directives,
        title,
        preamble,
        body: text[consumed..].to_owned(),
        header_span,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_default(text: &str) -> Result<ParsedDocument, SourceError> {
        parse(text, Path::new("/repo/doc.md"), ParseOptions::default())
    }

    #[test]
    fn test_parse_header_title_body() {
        let doc = parse_default("<!-- dox: 42 -->\n# Guide\n\nHello *world*.\n").unwrap();

        assert_eq!(doc.directives.identity(), Some("42"));
        assert_eq!(doc.title.as_deref(), Some("Guide"));
        assert_eq!(doc.body, "\nHello *world*.\n");
        assert_eq!(doc.preamble, "");
        assert_eq!(doc.header_span, Some(0..16));
    }

    #[test]
    fn test_header_span_skips_commented_heading() {
        let text = "<!--\n# not a title\n-->\r\n<!-- dox: omit-notice -->\r\n# Title\r\n";
        let doc = parse_default(text).unwrap();

        let span = doc.header_span.unwrap();
        assert_eq!(&text[span], "<!-- dox: omit-notice -->");
        assert_eq!(doc.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_parse_without_header() {
        let doc = parse_default("# Plain\nbody\n").unwrap();

        assert_eq!(doc.directives, Directives::default());
        assert_eq!(doc.title.as_deref(), Some("Plain"));
        assert_eq!(doc.body, "body\n");
    }

    #[test]
    fn test_title_without_trailing_newline() {
        let doc = parse_default("# Only title").unwrap();

        assert_eq!(doc.title.as_deref(), Some("Only title"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_title_is_trimmed() {
        let doc = parse_default("#   Spaced out  \r\nbody\r\n").unwrap();
        assert_eq!(doc.title.as_deref(), Some("Spaced out"));
        assert_eq!(doc.body, "body\r\n");
    }

    #[test]
    fn test_deeper_heading_is_not_title() {
        let err = parse_default("## Section\nparagraph\n# Late title\n").unwrap_err();
        assert!(matches!(err, SourceError::MissingTitle(_)));
    }

    #[test]
    fn test_multiline_comment_stripped() {
        let text = "<!--\nlicense text\nmore license\n-->\n# Title\nbody\n";
        let doc = parse_default(text).unwrap();

        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert_eq!(doc.preamble, "");
        assert_eq!(doc.body, "body\n");
    }

    #[test]
    fn test_multiline_comment_kept_when_not_stripping() {
        let text = "<!--\nnote\n-->\n# Title\nbody\n";
        let options = ParseOptions {
            strip_comments: false,
            trim_space: true,
        };
        let doc = parse(text, Path::new("/repo/doc.md"), options).unwrap();

        assert_eq!(doc.preamble, "<!--\nnote\n-->\n");
        assert_eq!(doc.body, "body\n");
    }

    #[test]
    fn test_single_line_comment_closes_on_same_line() {
        let text = "<!-- dox: omit-notice -->\n<!-- generated -->\n# Title\n";
        let doc = parse_default(text).unwrap();

        assert!(doc.directives.omit_notice());
        assert_eq!(doc.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_second_header_is_plain_comment() {
        let text = "<!-- dox: 1 -->\n<!-- dox: 2 -->\n# Title\n";
        let doc = parse_default(text).unwrap();
        assert_eq!(doc.directives.identity(), Some("1"));
    }

    #[test]
    fn test_text_after_comment_close_counts() {
        let text = "<!-- a\nb --> # Not a title\n# Title\n";
        let doc = parse_default(text).unwrap();
        assert_eq!(doc.preamble, " # Not a title\n");
        assert_eq!(doc.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_preamble_line_before_title() {
        let doc = parse_default("Draft\n\n# Title\nbody").unwrap();

        assert_eq!(doc.preamble, "Draft\n\n");
        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_missing_title_after_two_lines() {
        let err = parse_default("first\nsecond\n# Title\n").unwrap_err();
        assert!(matches!(err, SourceError::MissingTitle(_)));
        assert!(err.to_string().contains("/repo/doc.md"));
    }

    #[test]
    fn test_ignored_document_needs_no_title() {
        let doc = parse_default("<!-- dox: ignore -->\nfirst\nsecond\nthird\n").unwrap();

        assert!(doc.directives.ignore());
        assert_eq!(doc.title, None);
        assert_eq!(doc.body, "third\n");
    }

    #[test]
    fn test_ignored_document_with_title() {
        let doc = parse_default("<!-- dox: ignore -->\n# Internal notes\n").unwrap();
        assert!(doc.directives.ignore());
        assert_eq!(doc.title.as_deref(), Some("Internal notes"));
    }

    #[test]
    fn test_unexpected_eof() {
        assert!(matches!(
            parse_default("").unwrap_err(),
            SourceError::UnexpectedEof(_)
        ));
        assert!(matches!(
            parse_default("<!-- dox: 7 -->\njust one line\n").unwrap_err(),
            SourceError::UnexpectedEof(_)
        ));
        assert!(matches!(
            parse_default("<!--\nunterminated comment\n").unwrap_err(),
            SourceError::UnexpectedEof(_)
        ));
    }

    #[test]
    fn test_empty_title_is_missing() {
        let err = parse_default("# \nbody\nmore\n").unwrap_err();
        assert!(matches!(err, SourceError::MissingTitle(_)));
    }

    #[test]
    fn test_directive_order_error_propagates() {
        let err = parse_default("<!-- dox: omit-notice, 12 -->\n# Title\n").unwrap_err();
        assert!(matches!(err, SourceError::DirectiveOrder { .. }));
    }
}
