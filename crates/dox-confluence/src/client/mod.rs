//! Blocking client for the Confluence Server / Data Center REST API.

mod attachments;
mod pages;

use std::time::Duration;

use dox_config::Credentials;
use serde::de::DeserializeOwned;
use ureq::http::Response;
use ureq::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::auth::BasicAuth;
use crate::error::ConfluenceError;

/// Per-request deadline covering connect, send and receive.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const JSON: &str = "application/json";

/// REST client bound to one Confluence instance and one set of credentials.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth: BasicAuth,
}

impl ConfluenceClient {
    #[must_use]
    pub fn new(base_url: &str, credentials: &Credentials) -> Self {
        // Statuses are inspected by `into_checked_body` so the server's
        // error text ends up in the error.
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth: BasicAuth::new(credentials),
        }
    }

    /// Instance URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/rest/api/content` followed by `path`.
    fn content_url(&self, path: &str) -> String {
        format!("{}/rest/api/content{path}", self.base_url)
    }

    fn authorized<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        request
            .header(AUTHORIZATION, self.auth.header())
            .header(ACCEPT, JSON)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let response = self.authorized(self.agent.get(url)).call()?;
        Ok(into_checked_body(response)?.read_json()?)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder<WithBody>,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let bytes = serde_json::to_vec(payload)?;
        let response = self
            .authorized(request)
            .header(CONTENT_TYPE, JSON)
            .send(&bytes[..])?;
        Ok(into_checked_body(response)?.read_json()?)
    }
}

/// Body of a successful response; 4xx/5xx become [`ConfluenceError::HttpResponse`].
fn into_checked_body(response: Response<Body>) -> Result<Body, ConfluenceError> {
    let status = response.status();
    let mut body = response.into_body();
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(body);
    }

    let detail = match body.read_to_string() {
        Ok(text) => text,
        Err(e) => format!("<unreadable body: {e}>"),
    };
    Err(ConfluenceError::HttpResponse {
        status: status.as_u16(),
        body: detail,
    })
}
