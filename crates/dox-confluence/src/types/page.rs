//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type (always "page").
    #[serde(rename = "type")]
    pub content_type: String,
    /// Page title.
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Owning space, present when expanded.
    #[serde(default)]
    pub space: Option<SpaceRef>,
    /// Parent chain, present when expanded.
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Storage-format body, or `""` when the body was not expanded.
    #[must_use]
    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map_or("", |s| s.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Page body content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Storage {
    /// HTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

impl Storage {
    /// Storage-format representation of `value`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            representation: "storage".to_owned(),
        }
    }
}

/// Space reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpaceRef {
    /// Space key.
    pub key: String,
}

/// Ancestor reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ancestor {
    /// Ancestor page ID.
    pub id: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Envelope of a content search such as `GET /content?spaceKey=…&title=…`.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesResponse {
    pub results: Vec<Page>,
}

/// Page to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    /// Page title (unique within the space).
    pub title: String,
    /// Space key.
    pub space: String,
    /// Storage-format body.
    pub body: String,
    /// Parent page, or `None` for a top-level page.
    pub parent_id: Option<String>,
}
