//! Markdown to Confluence storage XHTML.

use pulldown_cmark::{Options, Parser, html};

/// Title of the notice macro prepended to published pages.
pub const NOTICE_TITLE: &str = "This page was published by dox";

/// Parser extensions enabled for every document.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Render markdown to XHTML.
///
/// pulldown-cmark closes void elements (`<img ... />`, `<br />`), which
/// Confluence storage format requires.
pub fn markdown_to_xhtml(markdown: &str, trim_space: bool) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);

    if trim_space {
        let trimmed = out.trim();
        if trimmed.len() != out.len() {
            return trimmed.to_owned();
        }
    }
    out
}

/// Confluence `info` macro warning readers that the page is generated.
///
/// `source_url` points back at the document in version control.
pub fn notice_banner(source_url: &str) -> String {
    format!(
        "<p>\n  <ac:structured-macro ac:name=\"info\" ac:schema-version=\"1\">\n    \
         <ac:parameter ac:name=\"title\">{NOTICE_TITLE}</ac:parameter>\n    \
         <ac:rich-text-body>\n      \
         <p>Changes made to this page directly will be overwritten. \
         This page was generated from <a href=\"{}\">source</a>.</p>\n    \
         </ac:rich-text-body>\n  </ac:structured-macro>\n</p>",
        escape_attr(source_url)
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_paragraph_trimmed() {
        assert_eq!(markdown_to_xhtml("\nHello *world*\n", true), "<p>Hello <em>world</em></p>");
    }

    #[test]
    fn test_render_untrimmed_keeps_newline() {
        assert_eq!(markdown_to_xhtml("Hello", false), "<p>Hello</p>\n");
    }

    #[test]
    fn test_render_image_is_self_closing() {
        let out = markdown_to_xhtml("![diagram](img/diagram.png)", true);
        assert_eq!(out, r#"<p><img src="img/diagram.png" alt="diagram" /></p>"#);
    }

    #[test]
    fn test_render_extensions() {
        let out = markdown_to_xhtml("| a |\n|---|\n| b |\n\n~~gone~~\n\n- [x] done\n", true);
        assert!(out.contains("<table>"));
        assert!(out.contains("<del>gone</del>"));
        assert!(out.contains("checkbox"));
    }

    #[test]
    fn test_notice_banner_links_source() {
        let banner = notice_banner("https://git.example.com/blob/main/docs/a.md?x=1&y=2");

        assert!(banner.contains(r#"ac:name="info""#));
        assert!(banner.contains(NOTICE_TITLE));
        assert!(banner.contains(r#"href="https://git.example.com/blob/main/docs/a.md?x=1&amp;y=2""#));
    }
}
