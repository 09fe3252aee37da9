//! The [`ContentStore`] trait: the remote operations the publisher relies on.

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Attachment, NewPage, Page};

/// Synchronous remote content store keyed by page identity.
///
/// All calls block; none are retried.
pub trait ContentStore {
    /// Base URL used to build view-page and attachment URLs.
    fn base_url(&self) -> &str;

    /// Create a page at version 1.
    fn create_page(&self, page: &NewPage) -> Result<Page, ConfluenceError>;

    /// Fetch a page, expanding the given fields (e.g. `body.storage`, `space`, `version`).
    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError>;

    /// Page titled exactly `title` in `space`, if any. Titles are unique per space.
    fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError>;

    /// Replace title and body, publishing `current_version + 1`.
    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError>;

    /// Attachment named `filename` on `page_id`, if any.
    fn find_attachment(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError>;

    /// Upload a new attachment.
    fn create_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError>;

    /// Replace the data of an existing attachment.
    fn update_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError>;

    /// Current bytes of the attachment named `filename`.
    fn attachment_data(&self, page_id: &str, filename: &str) -> Result<Vec<u8>, ConfluenceError>;
}

impl ContentStore for ConfluenceClient {
    fn base_url(&self) -> &str {
        ConfluenceClient::base_url(self)
    }

    fn create_page(&self, page: &NewPage) -> Result<Page, ConfluenceError> {
        ConfluenceClient::create_page(self, page)
    }

    fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        ConfluenceClient::get_page(self, page_id, expand)
    }

    fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError> {
        ConfluenceClient::find_page_by_title(self, space, title)
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::update_page(self, page_id, title, body, current_version)
    }

    fn find_attachment(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        ConfluenceClient::find_attachment(self, page_id, filename)
    }

    fn create_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        ConfluenceClient::create_attachment(self, page_id, filename, data, content_type)
    }

    fn update_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        ConfluenceClient::update_attachment(
            self,
            page_id,
            attachment_id,
            filename,
            data,
            content_type,
        )
    }

    fn attachment_data(&self, page_id: &str, filename: &str) -> Result<Vec<u8>, ConfluenceError> {
        ConfluenceClient::attachment_data(self, page_id, filename)
    }
}
