//! Attachment payloads.

use serde::{Deserialize, Serialize};

/// A file attached to a page. Titles are unique per page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Attachment {
    pub id: String,
    pub title: String,
}

/// Envelope of `child/attachment` listings and uploads.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    pub results: Vec<Attachment>,
}
