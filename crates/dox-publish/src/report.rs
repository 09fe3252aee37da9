//! Outcome of a publish run.

use std::fmt;

/// What the stub phase did for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOutcome {
    /// The document already had an identity.
    Existing,
    /// A placeholder page was created and its identity recorded.
    Created,
    /// The synthesized root matched an existing page by title.
    Adopted,
    /// Dry run: a placeholder page would be created.
    WouldCreate,
}

/// What the sync phase did for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Body or title changed; the page now has this version.
    Updated { version: u32 },
    /// Remote page already matched.
    Unchanged,
    /// Dry run: the page differs and would be updated.
    WouldUpdate,
    /// Dry run: the page does not exist yet, so there is nothing to compare.
    NotPublished,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated { version } => write!(f, "updated to version {version}"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::WouldUpdate => f.write_str("would update"),
            Self::NotPublished => f.write_str("would publish"),
        }
    }
}

/// Per-document result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// File path, or a label for the synthesized root.
    pub name: String,
    pub title: String,
    pub identity: Option<String>,
    pub stub: StubOutcome,
    pub sync: SyncOutcome,
}

/// Attachment reconciliation counters across all pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Everything a publish run did or, in a dry run, would do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub dry_run: bool,
    pub documents: Vec<DocumentReport>,
    /// Paths of documents skipped because of the `ignore` directive.
    pub ignored: Vec<String>,
    pub attachments: AttachmentCounts,
    /// Non-fatal problems, in the order they were found.
    pub warnings: Vec<String>,
}

impl PublishReport {
    /// Record a warning and emit it through `tracing`.
    pub(crate) fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Documents whose page was created this run.
    pub fn created(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.stub == StubOutcome::Created)
            .count()
    }

    /// Documents whose page body was updated this run.
    pub fn updated(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.sync, SyncOutcome::Updated { .. }))
            .count()
    }

    /// Documents whose page was already current.
    pub fn unchanged(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.sync == SyncOutcome::Unchanged)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(name: &str, stub: StubOutcome, sync: SyncOutcome) -> DocumentReport {
        DocumentReport {
            name: name.to_owned(),
            title: name.to_owned(),
            identity: None,
            stub,
            sync,
        }
    }

    #[test]
    fn test_counts() {
        let report = PublishReport {
            documents: vec![
                doc("a", StubOutcome::Created, SyncOutcome::Updated { version: 2 }),
                doc("b", StubOutcome::Existing, SyncOutcome::Unchanged),
                doc("c", StubOutcome::Existing, SyncOutcome::Updated { version: 7 }),
            ],
            ..PublishReport::default()
        };

        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 2);
        assert_eq!(report.unchanged(), 1);
    }

    #[test]
    fn test_warn_collects() {
        let mut report = PublishReport::default();
        report.warn("first".to_owned());
        report.warn("second".to_owned());
        assert_eq!(report.warnings, ["first", "second"]);
    }

    #[test]
    fn test_sync_outcome_display() {
        assert_eq!(SyncOutcome::Updated { version: 3 }.to_string(), "updated to version 3");
        assert_eq!(SyncOutcome::NotPublished.to_string(), "would publish");
    }
}
