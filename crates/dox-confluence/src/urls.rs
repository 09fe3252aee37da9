//! Canonical URLs for pages and attachments.

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in a URL path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in a query parameter value: all but RFC 3986 unreserved.
const QUERY_VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a query parameter value.
pub(crate) fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE_ENCODE_SET).to_string()
}

/// Percent-encode a single path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string()
}

/// URL of the page viewer for `page_id`.
///
/// ```
/// assert_eq!(
///     dox_confluence::view_page_url("https://wiki.example.com", "42"),
///     "https://wiki.example.com/pages/viewpage.action?pageId=42"
/// );
/// ```
#[must_use]
pub fn view_page_url(base_url: &str, page_id: &str) -> String {
    format!(
        "{}/pages/viewpage.action?pageId={page_id}",
        base_url.trim_end_matches('/')
    )
}

/// Download URL of the attachment `filename` on `page_id`.
#[must_use]
pub fn attachment_download_url(base_url: &str, page_id: &str, filename: &str) -> String {
    format!(
        "{}/download/attachments/{page_id}/{}",
        base_url.trim_end_matches('/'),
        encode_segment(filename)
    )
}
