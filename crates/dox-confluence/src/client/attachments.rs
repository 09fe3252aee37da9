//! `/content/{id}/child/attachment` endpoints.

use rand::RngExt;
use ureq::http::header::{AUTHORIZATION, CONTENT_TYPE};

use super::{ConfluenceClient, into_checked_body};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};
use crate::urls::{attachment_download_url, encode_query_value};

/// One-part `multipart/form-data` body holding a file under the field `file`.
struct FilePart {
    boundary: String,
    bytes: Vec<u8>,
}

impl FilePart {
    fn new(filename: &str, data: &[u8], content_type: &str) -> Self {
        let boundary = format!("dox-{:032x}", rand::rng().random::<u128>());
        let head = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        );
        let tail = format!("\r\n--{boundary}--\r\n");

        let mut bytes = Vec::with_capacity(head.len() + data.len() + tail.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(data);
        bytes.extend_from_slice(tail.as_bytes());
        Self { boundary, bytes }
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

impl ConfluenceClient {
    /// Attachment named `filename` on `page_id`, if any.
    pub fn find_attachment(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        tracing::debug!(page_id, filename, "GET attachments");
        let listing: AttachmentsResponse =
            self.get_json(&self.attachment_lookup_url(page_id, filename))?;
        Ok(listing.results.into_iter().find(|a| a.title == filename))
    }

    fn attachment_lookup_url(&self, page_id: &str, filename: &str) -> String {
        self.content_url(&format!(
            "/{page_id}/child/attachment?filename={}",
            encode_query_value(filename)
        ))
    }

    /// Upload `data` as a new attachment.
    pub fn create_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let url = self.content_url(&format!("/{page_id}/child/attachment"));
        let part = FilePart::new(filename, data, content_type);

        tracing::info!(page_id, filename, bytes = data.len(), "Uploading attachment");
        // New uploads answer with a result list.
        let listing: AttachmentsResponse = self.upload(&url, &part)?;
        listing
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ConfluenceError::EmptyResponse(format!("attachment '{filename}'")))
    }

    /// Replace the bytes of attachment `attachment_id`.
    pub fn update_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let url = self.content_url(&format!(
            "/{page_id}/child/attachment/{attachment_id}/data"
        ));
        let part = FilePart::new(filename, data, content_type);

        tracing::info!(page_id, attachment_id, filename, bytes = data.len(), "Replacing attachment");
        self.upload(&url, &part)
    }

    /// Current bytes of `filename` via the download URL.
    pub fn attachment_data(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Vec<u8>, ConfluenceError> {
        let url = attachment_download_url(&self.base_url, page_id, filename);

        tracing::debug!(page_id, filename, "Downloading attachment");
        let response = self
            .agent
            .get(&url)
            .header(AUTHORIZATION, self.auth.header())
            .call()?;
        let bytes = into_checked_body(response)?
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        Ok(bytes)
    }

    fn upload<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        part: &FilePart,
    ) -> Result<T, ConfluenceError> {
        let response = self
            .authorized(self.agent.post(url))
            .header(CONTENT_TYPE, part.content_type())
            .header("X-Atlassian-Token", "nocheck")
            .send(&part.bytes[..])?;
        Ok(into_checked_body(response)?.read_json()?)
    }
}
