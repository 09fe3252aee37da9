//! The two-phase publish protocol.
//!
//! 1. **Stub**: every publishable document without an identity gets a
//!    placeholder page, and the new identity is written into its header.
//!    The root goes first so that other pages can be created beneath it.
//! 2. **Sync**: every publishable document is rendered, its images are
//!    mirrored as attachments, its links are rewritten, and the page is
//!    updated only if the body or title changed.
//!
//! Because all identities exist before any body is rendered, links between
//! documents resolve in a single sync pass.

use std::path::{Path, PathBuf};

use dox_config::PublishConfig;
use dox_confluence::{ContentStore, NewPage};
use dox_source::{ParseOptions, Source};

use crate::attachments::AttachmentReconciler;
use crate::discover;
use crate::documents::{DefaultRootSettings, DocumentSet};
use crate::error::PublishError;
use crate::links::{self, LinkContext};
use crate::report::{DocumentReport, PublishReport, StubOutcome, SyncOutcome};

/// Body of a page created by the stub phase.
pub const STUB_BODY: &str = "<p>This page is being published by dox.</p>";

/// Fields requested when fetching a page for comparison.
const PAGE_FIELDS: &[&str] = &["body.storage", "space", "version"];

/// Publish run options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Perform reads only; nothing is created, updated, or written locally.
    pub dry_run: bool,
    pub parse: ParseOptions,
}

/// Drives a publish run against a content store.
pub struct Publisher<'a, S: ContentStore> {
    store: &'a S,
    config: &'a PublishConfig,
    options: PublishOptions,
}

impl<'a, S: ContentStore> Publisher<'a, S> {
    pub fn new(store: &'a S, config: &'a PublishConfig, options: PublishOptions) -> Self {
        Self {
            store,
            config,
            options,
        }
    }

    /// Discover sources under `repo_root` and publish them.
    pub fn publish_repo(&self, repo_root: &Path) -> Result<PublishReport, PublishError> {
        let paths = discover::find_sources(repo_root)?;
        self.publish(repo_root, &paths)
    }

    /// Publish the documents at `paths`.
    ///
    /// Fails fast: the first error aborts the run. Pages and identities
    /// written before that point are kept.
    pub fn publish(
        &self,
        repo_root: &Path,
        paths: &[PathBuf],
    ) -> Result<PublishReport, PublishError> {
        tracing::info!(count = paths.len(), dry_run = self.options.dry_run, "Discover phase");
        let default_root = DefaultRootSettings::from_config(self.config, repo_root);
        let mut documents = DocumentSet::load(repo_root, paths, self.options.parse, &default_root)?;

        let mut report = PublishReport {
            dry_run: self.options.dry_run,
            ignored: documents.ignored().map(Source::display_name).collect(),
            ..PublishReport::default()
        };

        tracing::info!("Stub phase");
        self.stub_all(&mut documents, &mut report)?;

        tracing::info!("Sync phase");
        self.sync_all(&documents, &mut report)?;

        tracing::info!(
            created = report.created(),
            updated = report.updated(),
            unchanged = report.unchanged(),
            warnings = report.warnings.len(),
            "Publish complete"
        );
        Ok(report)
    }

    /// Give every publishable document an identity.
    fn stub_all(
        &self,
        documents: &mut DocumentSet,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let root = documents.root_index();
        for index in documents.publish_order() {
            let parent_id = if index == root {
                None
            } else {
                documents.root().identity().map(str::to_owned)
            };
            let outcome = self.stub(documents.get_mut(index), parent_id, index == root, report)?;

            let source = documents.get(index);
            report.documents.push(DocumentReport {
                name: source.display_name(),
                title: source.title().to_owned(),
                identity: source.identity().map(str::to_owned),
                stub: outcome,
                sync: SyncOutcome::NotPublished,
            });
        }
        Ok(())
    }

    fn stub(
        &self,
        source: &mut Source,
        parent_id: Option<String>,
        is_root: bool,
        report: &mut PublishReport,
    ) -> Result<StubOutcome, PublishError> {
        if source.identity().is_some() {
            return Ok(StubOutcome::Existing);
        }
        // The default root has no file to remember its identity in, so a
        // page left by an earlier run is found again by its title.
        if matches!(source, Source::DefaultRoot(_)) {
            let found = self
                .store
                .find_page_by_title(&self.config.space, source.title())
                .map_err(|e| PublishError::remote("find page", source.display_name(), e))?;
            if let Some(page) = found {
                source.set_identity(&page.id)?;
                tracing::info!(page_id = %page.id, title = %page.title, "Reusing default root page");
                report.warn(format!(
                    "reusing default root page {} found by title; add root_id = \"{}\" to dox.toml to pin it",
                    page.id, page.id
                ));
                return Ok(StubOutcome::Adopted);
            }
        }
        if self.options.dry_run {
            tracing::info!(source = %source.display_name(), "Would create page");
            return Ok(StubOutcome::WouldCreate);
        }
        if !is_root && parent_id.is_none() {
            return Err(PublishError::UnpersistedRoot(source.display_name()));
        }

        let page = self
            .store
            .create_page(&NewPage {
                title: source.title().to_owned(),
                space: self.config.space.clone(),
                body: STUB_BODY.to_owned(),
                parent_id,
            })
            .map_err(|e| PublishError::remote("create page", source.display_name(), e))?;
        source.set_identity(&page.id)?;

        tracing::info!(source = %source.display_name(), page_id = %page.id, "Created page");
        if matches!(source, Source::DefaultRoot(_)) {
            report.warn(format!(
                "created default root page {}; add root_id = \"{}\" to dox.toml to reuse it",
                page.id, page.id
            ));
        }
        Ok(StubOutcome::Created)
    }

    /// Render and push every publishable document.
    fn sync_all(
        &self,
        documents: &DocumentSet,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let ctx = LinkContext {
            documents,
            browse_url_base: &self.config.browse_url_base,
            base_url: self.store.base_url(),
            parse_options: self.options.parse,
        };

        for (slot, index) in documents.publish_order().into_iter().enumerate() {
            let outcome = self.sync(documents.get(index), &ctx, report)?;
            report.documents[slot].sync = outcome;
        }
        Ok(())
    }

    fn sync(
        &self,
        source: &Source,
        ctx: &LinkContext<'_>,
        report: &mut PublishReport,
    ) -> Result<SyncOutcome, PublishError> {
        let Some(page_id) = source.identity() else {
            return Ok(SyncOutcome::NotPublished);
        };

        let source_url = source
            .path()
            .map(|path| {
                let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
                links::browse_url(ctx.browse_url_base, ctx.documents.repo_root(), &path)
            })
            .unwrap_or_default();
        let mut body = source.render(&source_url);

        if let Some(path) = source.path() {
            body = AttachmentReconciler::new(self.store, self.options.dry_run)
                .reconcile(&body, path, page_id, report)?;
            body = links::rewrite_links(&body, path, ctx, report)?;
        }

        let page = self
            .store
            .get_page(page_id, PAGE_FIELDS)
            .map_err(|e| PublishError::remote("get page", source.display_name(), e))?;

        if page.storage_value() == body && page.title == source.title() {
            tracing::info!(source = %source.display_name(), page_id, "Page unchanged");
            return Ok(SyncOutcome::Unchanged);
        }
        if self.options.dry_run {
            tracing::info!(source = %source.display_name(), page_id, "Would update page");
            return Ok(SyncOutcome::WouldUpdate);
        }

        let updated = self
            .store
            .update_page(page_id, source.title(), &body, page.version.number)
            .map_err(|e| PublishError::remote("update page", source.display_name(), e))?;
        tracing::info!(
            source = %source.display_name(),
            page_id,
            version = updated.version.number,
            "Updated page"
        );
        Ok(SyncOutcome::Updated {
            version: updated.version.number,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dox_confluence::{MockStore, attachment_download_url, view_page_url};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\ndiagram";

    fn config() -> PublishConfig {
        PublishConfig::from_toml(
            r#"
uri = "https://wiki.example.com"
space = "ENG"
browse_url_base = "https://git.example.com/handbook/blob/main/%s"
"#,
        )
        .unwrap()
    }

    struct Repo {
        dir: TempDir,
    }

    impl Repo {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join(".git")).unwrap();
            Self { dir }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().canonicalize().unwrap()
        }

        fn write(&self, rel: &str, contents: &[u8]) -> PathBuf {
            let path = self.root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.root().join(rel)).unwrap()
        }
    }

    fn publish(
        store: &MockStore,
        repo: &Repo,
        options: PublishOptions,
    ) -> Result<PublishReport, PublishError> {
        let config = config();
        Publisher::new(store, &config, options).publish_repo(&repo.root())
    }

    fn guide_repo() -> Repo {
        let repo = Repo::new();
        repo.write("ROOT.md", b"# Handbook\n\nWelcome.\n");
        repo.write(
            "guide.md",
            b"# Guide\n\n![diagram](img/diagram.png)\n\nBack to [home](ROOT.md).\n",
        );
        repo.write("img/diagram.png", PNG);
        repo
    }

    #[test]
    fn test_end_to_end_root_and_guide() {
        let repo = guide_repo();
        let store = MockStore::new();

        let report = publish(&store, &repo, PublishOptions::default()).unwrap();

        // Stub phase: root first, then guide.
        assert_eq!(store.calls().create_page, 2);
        assert!(repo.read("ROOT.md").starts_with("<!-- dox: 1001 -->\n# Handbook\n"));
        assert!(repo.read("guide.md").starts_with("<!-- dox: 1002 -->\n# Guide\n"));
        let guide = store.page("1002").unwrap();
        assert_eq!(guide.ancestors[0].id, "1001");

        // Sync phase.
        assert_eq!(store.attachment("1002", "diagram.png").unwrap(), PNG);
        let body = guide.storage_value();
        assert!(body.contains(&format!(
            r#"src="{}""#,
            attachment_download_url("https://wiki.example.com", "1002", "diagram.png")
        )));
        assert!(body.contains(&format!(
            r#"href="{}""#,
            view_page_url("https://wiki.example.com", "1001")
        )));
        assert!(body.contains("https://git.example.com/handbook/blob/main/guide.md"));
        assert_eq!(guide.version.number, 2);
        assert_eq!(store.page("1001").unwrap().version.number, 2);

        assert_eq!(report.created(), 2);
        assert_eq!(report.updated(), 2);
        assert_eq!(report.attachments.created, 1);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let repo = guide_repo();
        let store = MockStore::new();
        publish(&store, &repo, PublishOptions::default()).unwrap();
        let root_file = repo.read("ROOT.md");
        store.reset_calls();

        let report = publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.calls().mutations(), 0);
        assert_eq!(report.unchanged(), 2);
        assert_eq!(repo.read("ROOT.md"), root_file);
    }

    #[test]
    fn test_local_edit_updates_only_that_page() {
        let repo = guide_repo();
        let store = MockStore::new();
        publish(&store, &repo, PublishOptions::default()).unwrap();
        let guide = repo.read("guide.md");
        repo.write("guide.md", format!("{guide}\nOne more line.\n").as_bytes());
        store.reset_calls();

        let report = publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.calls().update_page, 1);
        assert_eq!(store.calls().create_page, 0);
        assert_eq!(store.page("1002").unwrap().version.number, 3);
        assert_eq!(report.documents[1].sync, SyncOutcome::Updated { version: 3 });
    }

    #[test]
    fn test_title_change_updates_page() {
        let repo = guide_repo();
        let store = MockStore::new();
        publish(&store, &repo, PublishOptions::default()).unwrap();
        let guide = repo.read("guide.md").replace("# Guide", "# User guide");
        repo.write("guide.md", guide.as_bytes());

        publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.page("1002").unwrap().title, "User guide");
    }

    #[test]
    fn test_ignored_document_never_published_and_linked_by_browse_url() {
        let repo = Repo::new();
        repo.write("ROOT.md", b"# Handbook\n\nSee the [draft](notes/draft.md).\n");
        repo.write("notes/draft.md", b"<!-- dox: ignore -->\n# Draft\n\nWork in progress.\n");
        let store = MockStore::new();

        let report = publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.calls().create_page, 1);
        assert_eq!(store.pages().len(), 1);
        assert_eq!(report.ignored.len(), 1);
        assert!(repo.read("notes/draft.md").starts_with("<!-- dox: ignore -->"));

        let body = store.page("1001").unwrap().storage_value().to_owned();
        assert!(body.contains(
            r#"href="https://git.example.com/handbook/blob/main/notes/draft.md""#
        ));
        assert!(!body.contains("viewpage.action"));
    }

    #[test]
    fn test_multiple_roots_fail_before_remote_calls() {
        let repo = Repo::new();
        let first = repo.write("ROOT.md", b"# One\n");
        let second = repo.write("team/ROOT.md", b"# Two\n");
        let store = MockStore::new();

        let err = publish(&store, &repo, PublishOptions::default()).unwrap_err();

        let PublishError::MultipleRoots(paths) = err else {
            panic!("expected MultipleRoots");
        };
        assert_eq!(paths, vec![first, second]);
        assert_eq!(store.calls(), dox_confluence::CallCounts::default());
    }

    #[test]
    fn test_default_root_from_config_parents_pages() {
        let repo = Repo::new();
        repo.write("guide.md", b"# Guide\n\nText.\n");
        let store = MockStore::new().with_page("500", "Handbook", "", 1);
        let mut config = config();
        config.root_id = Some("500".to_owned());
        config.root_title = Some("Handbook".to_owned());

        let report = Publisher::new(&store, &config, PublishOptions::default())
            .publish_repo(&repo.root())
            .unwrap();

        assert_eq!(store.calls().create_page, 1);
        assert_eq!(store.page("1001").unwrap().ancestors[0].id, "500");
        // The default root renders an empty body, matching the seeded page.
        assert_eq!(report.documents[0].sync, SyncOutcome::Unchanged);
    }

    #[test]
    fn test_default_root_created_with_warning() {
        let repo = Repo::new();
        repo.write("guide.md", b"# Guide\n");
        let store = MockStore::new();

        let report = publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.calls().create_page, 2);
        assert_eq!(report.documents[0].identity.as_deref(), Some("1001"));
        assert!(report.warnings.iter().any(|w| w.contains("root_id = \"1001\"")));
    }

    #[test]
    fn test_default_root_without_root_id_survives_rerun() {
        let repo = Repo::new();
        repo.write("guide.md", b"# Guide\n\nText.\n");
        let store = MockStore::new();
        publish(&store, &repo, PublishOptions::default()).unwrap();
        store.reset_calls();

        let report = publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.calls().mutations(), 0);
        assert_eq!(store.calls().find_page_by_title, 1);
        assert_eq!(store.pages().len(), 2);
        assert_eq!(report.documents[0].stub, StubOutcome::Adopted);
        assert_eq!(report.documents[0].identity.as_deref(), Some("1001"));
        assert_eq!(report.unchanged(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("root_id = \"1001\"")));
    }

    #[test]
    fn test_default_root_found_by_title_in_dry_run() {
        let repo = Repo::new();
        repo.write("guide.md", b"# Guide\n");
        let store = MockStore::new().with_page("77", "Handbook", "", 1);
        let mut config = config();
        config.root_title = Some("Handbook".to_owned());
        let options = PublishOptions {
            dry_run: true,
            ..PublishOptions::default()
        };

        let report = Publisher::new(&store, &config, options)
            .publish_repo(&repo.root())
            .unwrap();

        assert_eq!(store.calls().mutations(), 0);
        assert_eq!(report.documents[0].stub, StubOutcome::Adopted);
        assert_eq!(report.documents[0].sync, SyncOutcome::Unchanged);
        assert_eq!(report.documents[1].stub, StubOutcome::WouldCreate);
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let repo = guide_repo();
        let before = repo.read("guide.md");
        let store = MockStore::new();

        let options = PublishOptions {
            dry_run: true,
            ..PublishOptions::default()
        };

        let report = publish(&store, &repo, options).unwrap();

        assert_eq!(store.calls().mutations(), 0);
        assert_eq!(repo.read("guide.md"), before);
        assert!(report.dry_run);
        assert!(report.documents.iter().all(|d| d.stub == StubOutcome::WouldCreate));
        assert!(report.documents.iter().all(|d| d.sync == SyncOutcome::NotPublished));
    }

    #[test]
    fn test_dry_run_reports_pending_update() {
        let repo = guide_repo();
        let store = MockStore::new();
        publish(&store, &repo, PublishOptions::default()).unwrap();
        repo.write("img/diagram.png", b"new diagram");
        store.reset_calls();

        let options = PublishOptions {
            dry_run: true,
            ..PublishOptions::default()
        };

        let report = publish(&store, &repo, options).unwrap();

        assert_eq!(store.calls().mutations(), 0);
        assert_eq!(report.attachments.updated, 1);
        // The body only references the attachment URL, which did not change.
        assert_eq!(report.documents[1].sync, SyncOutcome::Unchanged);
    }

    #[test]
    fn test_deleted_remote_page_is_fatal() {
        let repo = Repo::new();
        repo.write("ROOT.md", b"<!-- dox: 999 -->\n# Handbook\n");
        let store = MockStore::new();

        let err = publish(&store, &repo, PublishOptions::default()).unwrap_err();

        let PublishError::Remote { operation, source, .. } = &err else {
            panic!("expected Remote, got {err:?}");
        };
        assert_eq!(*operation, "get page");
        assert!(source.is_not_found());
    }

    #[test]
    fn test_parse_error_aborts_before_remote_calls() {
        let repo = Repo::new();
        repo.write("ROOT.md", b"# Handbook\n");
        repo.write("broken.md", b"<!-- dox: omit-notice, 12 -->\n# Broken\n");
        let store = MockStore::new();

        let err = publish(&store, &repo, PublishOptions::default()).unwrap_err();

        assert!(matches!(err, PublishError::Source(_)));
        assert_eq!(store.calls(), dox_confluence::CallCounts::default());
    }

    #[test]
    fn test_omit_notice_skips_banner() {
        let repo = Repo::new();
        repo.write("ROOT.md", b"<!-- dox: omit-notice -->\n# Handbook\n\nPlain.\n");
        let store = MockStore::new();

        publish(&store, &repo, PublishOptions::default()).unwrap();

        assert_eq!(store.page("1001").unwrap().storage_value(), "<p>Plain.</p>");
        assert!(repo.read("ROOT.md").starts_with("<!-- dox: 1001, omit-notice -->\n"));
    }
}
