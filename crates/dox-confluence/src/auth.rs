//! HTTP Basic authentication.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use dox_config::Credentials;

/// Precomputed `Authorization` header for HTTP Basic auth.
pub(crate) struct BasicAuth {
    header: String,
}

impl BasicAuth {
    /// Encode `username:password` once for all requests.
    pub(crate) fn new(credentials: &Credentials) -> Self {
        let token = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.username, credentials.password
        ));
        Self {
            header: format!("Basic {token}"),
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) fn header(&self) -> &str {
        &self.header
    }
}
