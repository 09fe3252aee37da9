//! `/content` endpoints for pages.

use serde_json::{Value, json};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{NewPage, Page, PagesResponse};
use crate::urls::encode_query_value;

/// `body` object carrying storage-format markup.
fn storage_body(markup: &str) -> Value {
    json!({ "storage": { "value": markup, "representation": "storage" } })
}

impl ConfluenceClient {
    /// Create a page; the server assigns the id and version 1.
    pub fn create_page(&self, page: &NewPage) -> Result<Page, ConfluenceError> {
        let mut payload = json!({
            "type": "page",
            "title": page.title,
            "space": { "key": page.space },
            "body": storage_body(&page.body),
        });
        if let Some(parent) = &page.parent_id {
            payload["ancestors"] = json!([{ "id": parent }]);
        }

        tracing::debug!(space = %page.space, title = %page.title, "POST content");
        let created: Page = self.send_json(self.agent.post(&self.content_url("")), &payload)?;
        tracing::info!(page_id = %created.id, title = %created.title, "Page created");
        Ok(created)
    }

    /// Fetch a page, asking the server to inline the `expand` fields.
    pub fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let query = if expand.is_empty() {
            String::new()
        } else {
            format!("?expand={}", expand.join(","))
        };

        tracing::debug!(page_id, ?expand, "GET content");
        self.get_json(&self.content_url(&format!("/{page_id}{query}")))
    }

    /// Page titled exactly `title` in `space`, if any.
    pub fn find_page_by_title(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        tracing::debug!(space, title, "GET content by title");
        let found: PagesResponse = self.get_json(&self.title_lookup_url(space, title))?;
        Ok(found.results.into_iter().find(|p| p.title == title))
    }

    fn title_lookup_url(&self, space: &str, title: &str) -> String {
        self.content_url(&format!(
            "?type=page&spaceKey={}&title={}&expand=version",
            encode_query_value(space),
            encode_query_value(title)
        ))
    }

    /// Replace title and body, publishing `current_version + 1`.
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError> {
        let next = current_version + 1;
        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "body": storage_body(body),
            "version": { "number": next },
        });

        tracing::debug!(page_id, from = current_version, to = next, "PUT content");
        let url = self.content_url(&format!("/{page_id}"));
        let updated: Page = self.send_json(self.agent.put(&url), &payload)?;
        tracing::info!(page_id, version = updated.version.number, "Page updated");
        Ok(updated)
    }
}
