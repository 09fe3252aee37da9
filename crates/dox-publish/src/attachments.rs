//! Mirroring of locally referenced images as page attachments.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use dox_confluence::{ContentStore, attachment_download_url};
use sha2::{Digest, Sha256};

use crate::error::PublishError;
use crate::markup;
use crate::report::PublishReport;

/// Hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Uploads images referenced by one page and points their `src` at the attachment.
pub(crate) struct AttachmentReconciler<'a, S: ContentStore> {
    store: &'a S,
    dry_run: bool,
}

impl<'a, S: ContentStore> AttachmentReconciler<'a, S> {
    pub fn new(store: &'a S, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    /// Sync images in `markup` (rendered from `source_path`) to `page_id`.
    ///
    /// Attachments are keyed by file name, so two different files with the
    /// same name cannot both live on one page: the first reference wins and
    /// later ones are reported and left untouched.
    pub fn reconcile(
        &self,
        markup: &str,
        source_path: &Path,
        page_id: &str,
        report: &mut PublishReport,
    ) -> Result<String, PublishError> {
        let references = markup::image_sources(markup).map_err(|source| PublishError::Markup {
            path: source_path.to_path_buf(),
            source,
        })?;
        let source_dir = source_path.parent().unwrap_or(Path::new(""));

        // filename -> canonical local file
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        let mut rewritten: HashMap<String, String> = HashMap::new();
        let mut out = markup.to_owned();

        for reference in references {
            if markup::is_absolute(&reference.value) || rewritten.contains_key(&reference.raw) {
                continue;
            }

            let local = source_dir.join(reference.path_part());
            let Some(canonical) = local.canonicalize().ok().filter(|p| p.is_file()) else {
                report.warn(format!(
                    "{}: image not found: {}",
                    source_path.display(),
                    local.display()
                ));
                continue;
            };
            let Some(filename) = canonical
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };

            match claimed.get(&filename) {
                Some(existing) if *existing != canonical => {
                    report.warn(format!(
                        "{}: {} and {} share the attachment name {filename}; keeping the first",
                        source_path.display(),
                        existing.display(),
                        canonical.display()
                    ));
                    continue;
                }
                Some(_) => {}
                None => {
                    self.sync_file(&canonical, &filename, page_id, report)?;
                    claimed.insert(filename.clone(), canonical);
                }
            }

            let url = attachment_download_url(self.store.base_url(), page_id, &filename);
            out = markup::replace_attribute(&out, "src", &reference.raw, &url);
            rewritten.insert(reference.raw, url);
        }

        Ok(out)
    }

    /// Create or update one attachment; unchanged content is left alone.
    fn sync_file(
        &self,
        local: &Path,
        filename: &str,
        page_id: &str,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let data = fs::read(local).map_err(|e| PublishError::io(local, e))?;
        let content_type = mime_guess::from_path(local).first_or_octet_stream();

        let existing = self
            .store
            .find_attachment(page_id, filename)
            .map_err(|e| PublishError::remote("find attachment", filename, e))?;

        let Some(attachment) = existing else {
            if !self.dry_run {
                self.store
                    .create_attachment(page_id, filename, &data, content_type.essence_str())
                    .map_err(|e| PublishError::remote("create attachment", filename, e))?;
            }
            tracing::info!(page_id, filename, dry_run = self.dry_run, "Created attachment");
            report.attachments.created += 1;
            return Ok(());
        };

        let remote = self
            .store
            .attachment_data(page_id, filename)
            .map_err(|e| PublishError::remote("download attachment", filename, e))?;

        if sha256_hex(&remote) == sha256_hex(&data) {
            report.attachments.unchanged += 1;
            return Ok(());
        }

        if !self.dry_run {
            self.store
                .update_attachment(
                    page_id,
                    &attachment.id,
                    filename,
                    &data,
                    content_type.essence_str(),
                )
                .map_err(|e| PublishError::remote("update attachment", filename, e))?;
        }
        tracing::info!(page_id, filename, dry_run = self.dry_run, "Updated attachment");
        report.attachments.updated += 1;
        Ok(())
    }
}
