//! In-memory content store for testing.
//!
//! Provides [`MockStore`] for exercising publish workflows without a server.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::ConfluenceError;
use crate::store::ContentStore;
use crate::types::{Ancestor, Attachment, Body, NewPage, Page, SpaceRef, Storage, Version};

/// Number of calls made to each mutating or reading operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub create_page: usize,
    pub get_page: usize,
    pub find_page_by_title: usize,
    pub update_page: usize,
    pub find_attachment: usize,
    pub create_attachment: usize,
    pub update_attachment: usize,
    pub attachment_data: usize,
}

impl CallCounts {
    /// Total number of calls that changed remote state.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.create_page + self.update_page + self.create_attachment + self.update_attachment
    }
}

#[derive(Debug, Default)]
struct State {
    pages: BTreeMap<String, Page>,
    /// Keyed by (page id, filename).
    attachments: BTreeMap<(String, String), (Attachment, Vec<u8>)>,
    next_id: u64,
    calls: CallCounts,
}

impl State {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// Mock content store.
///
/// Pages and attachments live in memory. Identities are assigned from a
/// counter starting at 1001 so they are easy to tell apart in assertions.
///
/// # Example
///
/// ```ignore
/// use dox_confluence::{ContentStore, MockStore, NewPage};
///
/// let store = MockStore::new();
/// let page = store
///     .create_page(&NewPage {
///         title: "Guide".to_owned(),
///         space: "ENG".to_owned(),
///         body: "<p>stub</p>".to_owned(),
///         parent_id: None,
///     })
///     .unwrap();
/// assert_eq!(page.version.number, 1);
/// assert_eq!(store.calls().create_page, 1);
/// ```
#[derive(Debug)]
pub struct MockStore {
    base_url: String,
    state: RwLock<State>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            base_url: "https://wiki.example.com".to_owned(),
            state: RwLock::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }
}

impl MockStore {
    /// Create an empty mock store at `https://wiki.example.com`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, id: &str, title: &str, body: &str, version: u32) -> Self {
        let page = make_page(id, title, body, version, "ENG", None);
        self.state.write().unwrap().pages.insert(id.to_owned(), page);
        self
    }

    /// Seed an existing attachment.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_attachment(self, page_id: &str, filename: &str, data: &[u8]) -> Self {
        {
            let mut state = self.state.write().unwrap();
            let id = format!("att{}", state.allocate_id());
            state.attachments.insert(
                (page_id.to_owned(), filename.to_owned()),
                (
                    Attachment {
                        id,
                        title: filename.to_owned(),
                    },
                    data.to_vec(),
                ),
            );
        }
        self
    }

    /// Snapshot of a stored page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<Page> {
        self.state.read().unwrap().pages.get(id).cloned()
    }

    /// All stored pages ordered by identity.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn pages(&self) -> Vec<Page> {
        self.state.read().unwrap().pages.values().cloned().collect()
    }

    /// Bytes of a stored attachment.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachment(&self, page_id: &str, filename: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .unwrap()
            .attachments
            .get(&(page_id.to_owned(), filename.to_owned()))
            .map(|(_, data)| data.clone())
    }

    /// Call counters since creation (or the last [`reset_calls`](Self::reset_calls)).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.state.read().unwrap().calls
    }

    /// Zero the call counters, keeping stored content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reset_calls(&self) {
        self.state.write().unwrap().calls = CallCounts::default();
    }
}

fn make_page(
    id: &str,
    title: &str,
    body: &str,
    version: u32,
    space: &str,
    parent_id: Option<&str>,
) -> Page {
    Page {
        id: id.to_owned(),
        content_type: "page".to_owned(),
        title: title.to_owned(),
        version: Version { number: version },
        body: Some(Body {
            storage: Some(Storage::new(body)),
        }),
        space: Some(SpaceRef {
            key: space.to_owned(),
        }),
        ancestors: parent_id
            .map(|id| Ancestor { id: id.to_owned() })
            .into_iter()
            .collect(),
        links: None,
    }
}

fn not_found(what: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("No content found with id: {what}"),
    }
}

impl ContentStore for MockStore {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_page(&self, page: &NewPage) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.create_page += 1;

        if state
            .pages
            .values()
            .any(|p| p.title == page.title && p.space.as_ref().is_some_and(|s| s.key == page.space))
        {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: format!(
                    "A page with this title already exists: {}",
                    page.title
                ),
            });
        }
        if let Some(parent) = &page.parent_id
            && !state.pages.contains_key(parent)
        {
            return Err(not_found(parent));
        }

        let id = state.allocate_id();
        let created = make_page(
            &id,
            &page.title,
            &page.body,
            1,
            &page.space,
            page.parent_id.as_deref(),
        );
        state.pages.insert(id, created.clone());
        Ok(created)
    }

    fn get_page(&self, page_id: &str, _expand: &[&str]) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.get_page += 1;
        state.pages.get(page_id).cloned().ok_or_else(|| not_found(page_id))
    }

    fn find_page_by_title(&self, space: &str, title: &str) -> Result<Option<Page>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.find_page_by_title += 1;
        Ok(state
            .pages
            .values()
            .find(|p| p.title == title && p.space.as_ref().is_some_and(|s| s.key == space))
            .cloned())
    }

    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.update_page += 1;

        let page = state.pages.get_mut(page_id).ok_or_else(|| not_found(page_id))?;
        if page.version.number != current_version {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!(
                    "Version must be incremented on update. Current version is: {}",
                    page.version.number
                ),
            });
        }
        page.title = title.to_owned();
        page.body = Some(Body {
            storage: Some(Storage::new(body)),
        });
        page.version.number = current_version + 1;
        Ok(page.clone())
    }

    fn find_attachment(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.find_attachment += 1;
        if !state.pages.contains_key(page_id) {
            return Err(not_found(page_id));
        }
        Ok(state
            .attachments
            .get(&(page_id.to_owned(), filename.to_owned()))
            .map(|(att, _)| att.clone()))
    }

    fn create_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.create_attachment += 1;
        if !state.pages.contains_key(page_id) {
            return Err(not_found(page_id));
        }
        let key = (page_id.to_owned(), filename.to_owned());
        if state.attachments.contains_key(&key) {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: format!("Cannot add a new attachment with same file name: {filename}"),
            });
        }
        let attachment = Attachment {
            id: format!("att{}", state.allocate_id()),
            title: filename.to_owned(),
        };
        state
            .attachments
            .insert(key, (attachment.clone(), data.to_vec()));
        Ok(attachment)
    }

    fn update_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        filename: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<Attachment, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.update_attachment += 1;
        match state
            .attachments
            .get_mut(&(page_id.to_owned(), filename.to_owned()))
        {
            Some((att, bytes)) if att.id == attachment_id => {
                *bytes = data.to_vec();
                Ok(att.clone())
            }
            _ => Err(not_found(attachment_id)),
        }
    }

    fn attachment_data(&self, page_id: &str, filename: &str) -> Result<Vec<u8>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        state.calls.attachment_data += 1;
        state
            .attachments
            .get(&(page_id.to_owned(), filename.to_owned()))
            .map(|(_, data)| data.clone())
            .ok_or_else(|| not_found(filename))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn new_page(title: &str, parent_id: Option<&str>) -> NewPage {
        NewPage {
            title: title.to_owned(),
            space: "ENG".to_owned(),
            body: "<p>stub</p>".to_owned(),
            parent_id: parent_id.map(str::to_owned),
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids_at_version_one() {
        let store = MockStore::new();
        let root = store.create_page(&new_page("Root", None)).unwrap();
        let child = store.create_page(&new_page("Child", Some(&root.id))).unwrap();

        assert_eq!(root.id, "1001");
        assert_eq!(child.id, "1002");
        assert_eq!(child.version.number, 1);
        assert_eq!(child.ancestors, vec![Ancestor { id: root.id }]);
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let store = MockStore::new();
        store.create_page(&new_page("Guide", None)).unwrap();
        let err = store.create_page(&new_page("Guide", None)).unwrap_err();
        assert!(matches!(err, ConfluenceError::HttpResponse { status: 400, .. }));
    }

    #[test]
    fn test_find_page_by_title_scoped_to_space() {
        let store = MockStore::new();
        let created = store.create_page(&new_page("Docs", None)).unwrap();

        assert_eq!(store.find_page_by_title("ENG", "Docs").unwrap(), Some(created));
        assert_eq!(store.find_page_by_title("OPS", "Docs").unwrap(), None);
        assert_eq!(store.find_page_by_title("ENG", "Other").unwrap(), None);
        assert_eq!(store.calls().find_page_by_title, 3);
        assert_eq!(store.calls().mutations(), 1);
    }

    #[test]
    fn test_update_increments_version_by_one() {
        let store = MockStore::new().with_page("7", "Guide", "<p>old</p>", 3);
        let page = store.update_page("7", "Guide", "<p>new</p>", 3).unwrap();
        assert_eq!(page.version.number, 4);
        assert_eq!(store.page("7").unwrap().storage_value(), "<p>new</p>");
    }

    #[test]
    fn test_update_with_stale_version_conflicts() {
        let store = MockStore::new().with_page("7", "Guide", "<p>old</p>", 3);
        let err = store.update_page("7", "Guide", "<p>new</p>", 2).unwrap_err();
        assert!(matches!(err, ConfluenceError::HttpResponse { status: 409, .. }));
    }

    #[test]
    fn test_get_missing_page_is_not_found() {
        let store = MockStore::new();
        let err = store.get_page("404", &[]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_attachment_lifecycle() {
        let store = MockStore::new().with_page("7", "Guide", "", 1);
        assert_eq!(store.find_attachment("7", "a.png").unwrap(), None);

        let att = store.create_attachment("7", "a.png", b"one", "image/png").unwrap();
        assert_eq!(store.find_attachment("7", "a.png").unwrap(), Some(att.clone()));

        store
            .update_attachment("7", &att.id, "a.png", b"two", "image/png")
            .unwrap();
        assert_eq!(store.attachment_data("7", "a.png").unwrap(), b"two".to_vec());

        let calls = store.calls();
        assert_eq!(calls.create_attachment, 1);
        assert_eq!(calls.update_attachment, 1);
        assert_eq!(calls.mutations(), 2);
    }
}
