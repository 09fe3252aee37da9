//! Failures talking to Confluence.

/// Everything a [`ContentStore`](crate::ContentStore) call can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// Transport-level failure: DNS, TLS, timeout, connection reset.
    #[error("request to Confluence failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// The server answered with a 4xx or 5xx status.
    #[error("Confluence returned {status}: {body}")]
    HttpResponse { status: u16, body: String },

    /// A payload could not be encoded or a response decoded.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A 2xx response that lacked the entity it should carry.
    #[error("empty response: {0}")]
    EmptyResponse(String),
}

impl ConfluenceError {
    /// True for a 404, i.e. the page or attachment does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpResponse { status: 404, .. })
    }
}
