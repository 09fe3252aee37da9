//! Reference extraction from rendered storage markup.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// One attribute value found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Attribute text exactly as written, entities still escaped.
    pub raw: String,
    /// Unescaped and percent-decoded value, used to resolve the target.
    pub value: String,
}

impl Reference {
    /// Target path without any `#fragment` or `?query`.
    pub fn path_part(&self) -> &str {
        self.value
            .split(['#', '?'])
            .next()
            .unwrap_or_default()
    }
}

/// Whether `value` points outside the repository and must be left alone.
///
/// URLs with a scheme, absolute paths and fragment-only anchors qualify.
pub fn is_absolute(value: &str) -> bool {
    value.is_empty()
        || value.starts_with('/')
        || value.starts_with('#')
        || SCHEME_RE.is_match(value)
}

/// `src` attributes of every `img` element.
pub fn image_sources(markup: &str) -> Result<Vec<Reference>, quick_xml::Error> {
    collect_attributes(markup, b"img", b"src")
}

/// `href` attributes of every `a` element.
pub fn link_targets(markup: &str) -> Result<Vec<Reference>, quick_xml::Error> {
    collect_attributes(markup, b"a", b"href")
}

fn collect_attributes(
    markup: &str,
    element: &[u8],
    attribute: &[u8],
) -> Result<Vec<Reference>, quick_xml::Error> {
    let mut reader = Reader::from_str(markup);
    // Raw HTML passed through from markdown need not be balanced.
    reader.config_mut().check_end_names = false;

    let mut found = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == element => {
                if let Some(reference) = attribute_reference(&e, attribute) {
                    found.push(reference);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(found)
}

fn attribute_reference(e: &BytesStart, attribute: &[u8]) -> Option<Reference> {
    let attr = e
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == attribute)?;

    let raw = String::from_utf8_lossy(&attr.value).into_owned();
    let unescaped = attr
        .unescape_value()
        .map_or_else(|_| raw.clone(), std::borrow::Cow::into_owned);
    let value = percent_decode_str(&unescaped).decode_utf8_lossy().into_owned();

    Some(Reference { raw, value })
}

/// Escape a value for a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}

/// Replace every `attribute="raw"` occurrence with `attribute="replacement"`.
///
/// `replacement` is escaped here; `raw` must be the text as written.
pub fn replace_attribute(markup: &str, attribute: &str, raw: &str, replacement: &str) -> String {
    markup.replace(
        &format!("{attribute}=\"{raw}\""),
        &format!("{attribute}=\"{}\"", escape_attribute(replacement)),
    )
}
