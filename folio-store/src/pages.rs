//! Versioned page store.
//!
//! Every write is a compare-and-swap on the page's `version`:
//!
//! ```text
//!  editor (saw v3)            PageStore                 backend
//!       │  save(.., expected=3)  │                          │
//!       │───────────────────────►│  get_page ──────────────►│
//!       │                        │◄──────────── record v3   │
//!       │                        │  v3 == 3 → build v4      │
//!       │                        │  conditional_put(v4, 3) ►│
//!       │◄── Accepted { 4 } ─────│◄──────────── Committed   │
//! ```
//!
//! A writer holding a stale version gets `Conflict` with the current record
//! and must reconcile and resubmit. Nothing is retried here: a blind retry
//! would overwrite the concurrent edit the version check exists to protect.

use std::sync::Arc;

use folio_core::{now_micros, search_text, Identity, Node, PageRecord};
use uuid::Uuid;

use crate::error::PageError;
use crate::storage::{CasOutcome, DocumentBackend};

/// Result of a conflict-checked save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The save committed; the page is now at `new_version`.
    Accepted { new_version: u64 },
    /// The caller's view was stale. Nothing was written.
    Conflict {
        current_version: u64,
        /// Server state the caller must reconcile against
        current: PageRecord,
    },
}

impl SaveOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SaveOutcome::Accepted { .. })
    }

    fn conflict(current: PageRecord) -> Self {
        SaveOutcome::Conflict {
            current_version: current.version,
            current,
        }
    }
}

/// Owns page titles, content and version counters.
pub struct PageStore<B> {
    backend: Arc<B>,
}

impl<B: DocumentBackend> PageStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Create a page at version 1 owned by `owner`.
    pub fn create(
        &self,
        owner: &Identity,
        section_id: Uuid,
        title: &str,
        content: Node,
    ) -> Result<PageRecord, PageError> {
        validate_title(title)?;
        let page = PageRecord::new(owner, section_id, title, content);
        self.backend.insert_page(&page)?;
        log::info!("Created page {} in section {section_id}", page.id);
        Ok(page)
    }

    /// Read a page the caller owns.
    pub fn get(&self, page_id: Uuid, caller: &Identity) -> Result<PageRecord, PageError> {
        load_accessible(self.backend.as_ref(), page_id, caller)
    }

    /// Conflict-checked save.
    ///
    /// With `content` absent only the title and bookkeeping fields change;
    /// `search_text` keeps its previous value. With `content` present the
    /// search text is recomputed from the new title and content and
    /// committed in the same atomic unit as the record.
    pub fn save(
        &self,
        page_id: Uuid,
        title: &str,
        content: Option<Node>,
        expected_version: u64,
        editor: &Identity,
    ) -> Result<SaveOutcome, PageError> {
        validate_title(title)?;
        let current = load_accessible(self.backend.as_ref(), page_id, editor)?;

        if current.version != expected_version {
            log::warn!(
                "Save of page {page_id} rejected: expected v{expected_version}, stored v{}",
                current.version
            );
            return Ok(SaveOutcome::conflict(current));
        }

        let new_version = current.version + 1;
        let mut next = current;
        next.title = title.to_owned();
        if let Some(content) = content {
            next.search_text = search_text(&next.title, &content);
            next.content = content;
        }
        next.version = new_version;
        next.updated_at = now_micros().max(next.updated_at);
        next.last_edited_by = editor.user_id;

        let outcome = self
            .backend
            .conditional_put(&next, expected_version)
            .map_err(|e| {
                log::error!("Save of page {page_id} failed: {e}");
                PageError::from(e)
            })?;

        match outcome {
            CasOutcome::Committed => {
                log::info!("Page {page_id} saved at v{new_version}");
                Ok(SaveOutcome::Accepted { new_version })
            }
            CasOutcome::VersionMismatch(latest) => {
                log::warn!(
                    "Save of page {page_id} lost a race: v{expected_version} superseded by v{}",
                    latest.version
                );
                Ok(SaveOutcome::conflict(latest))
            }
            CasOutcome::Missing => Err(PageError::NotFound(page_id)),
        }
    }
}

/// Load a page and check the caller may touch it. Pages of other tenants
/// are reported as missing.
pub(crate) fn load_accessible<B: DocumentBackend + ?Sized>(
    backend: &B,
    page_id: Uuid,
    caller: &Identity,
) -> Result<PageRecord, PageError> {
    match backend.get_page(page_id)? {
        Some(page) if page.is_accessible_to(caller) => Ok(page),
        _ => Err(PageError::NotFound(page_id)),
    }
}

fn validate_title(title: &str) -> Result<(), PageError> {
    if title.trim().is_empty() {
        return Err(PageError::InvalidInput("title must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use folio_core::INITIAL_VERSION;

    fn setup() -> (PageStore<MemoryBackend>, Identity) {
        let store = PageStore::new(Arc::new(MemoryBackend::new()));
        (store, Identity::new(Uuid::new_v4()))
    }

    #[test]
    fn test_save_then_stale_save_conflicts() {
        let (store, me) = setup();
        let page = store.create(&me, Uuid::new_v4(), "Untitled", Node::empty()).unwrap();
        assert_eq!(page.version, INITIAL_VERSION);

        let content = Node::container([Node::text("Hello World")]);
        let outcome = store.save(page.id, "Notes", Some(content), 1, &me).unwrap();
        assert_eq!(outcome, SaveOutcome::Accepted { new_version: 2 });

        let stored = store.get(page.id, &me).unwrap();
        assert_eq!(stored.search_text, "notes hello world");
        assert_eq!(stored.title, "Notes");

        match store.save(page.id, "Notes v2", None, 1, &me).unwrap() {
            SaveOutcome::Conflict { current_version, current } => {
                assert_eq!(current_version, 2);
                assert_eq!(current, stored);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        // The rejected save changed nothing.
        assert_eq!(store.get(page.id, &me).unwrap(), stored);
    }

    #[test]
    fn test_versions_are_gap_free() {
        let (store, me) = setup();
        let page = store.create(&me, Uuid::new_v4(), "Log", Node::empty()).unwrap();

        for n in 1..=25u64 {
            let expected = INITIAL_VERSION + n - 1;
            let outcome = store
                .save(page.id, "Log", Some(Node::paragraphs([&*format!("entry {n}")])), expected, &me)
                .unwrap();
            assert_eq!(outcome, SaveOutcome::Accepted { new_version: INITIAL_VERSION + n });
        }
        assert_eq!(store.get(page.id, &me).unwrap().version, INITIAL_VERSION + 25);
    }

    #[test]
    fn test_title_only_save_keeps_search_text() {
        let (store, me) = setup();
        let page = store
            .create(&me, Uuid::new_v4(), "Recipes", Node::paragraphs(["Pancakes"]))
            .unwrap();
        assert_eq!(page.search_text, "recipes pancakes");

        store.save(page.id, "Desserts", None, 1, &me).unwrap();
        let stored = store.get(page.id, &me).unwrap();
        assert_eq!(stored.title, "Desserts");
        assert_eq!(stored.search_text, "recipes pancakes");
        assert_eq!(stored.content, Node::paragraphs(["Pancakes"]));

        store
            .save(page.id, "Desserts", Some(Node::paragraphs(["Waffles"])), 2, &me)
            .unwrap();
        assert_eq!(store.get(page.id, &me).unwrap().search_text, "desserts waffles");
    }

    #[test]
    fn test_save_records_editor_and_timestamp() {
        let (store, me) = setup();
        let page = store.create(&me, Uuid::new_v4(), "Plan", Node::empty()).unwrap();
        store.save(page.id, "Plan", None, 1, &me).unwrap();
        let stored = store.get(page.id, &me).unwrap();
        assert_eq!(stored.last_edited_by, me.user_id);
        assert!(stored.updated_at >= page.updated_at);
        assert_eq!(stored.created_at, page.created_at);
    }

    #[test]
    fn test_foreign_and_missing_pages_are_not_found() {
        let (store, me) = setup();
        let page = store.create(&me, Uuid::new_v4(), "Private", Node::empty()).unwrap();
        let stranger = Identity::new(Uuid::new_v4());

        assert!(matches!(store.get(page.id, &stranger), Err(PageError::NotFound(_))));
        assert!(matches!(
            store.save(page.id, "Mine now", None, 1, &stranger),
            Err(PageError::NotFound(_))
        ));
        assert!(matches!(
            store.save(Uuid::new_v4(), "Nothing", None, 1, &me),
            Err(PageError::NotFound(_))
        ));
        assert_eq!(store.get(page.id, &me).unwrap().version, 1);
    }

    #[test]
    fn test_empty_title_rejected() {
        let (store, me) = setup();
        let page = store.create(&me, Uuid::new_v4(), "Kept", Node::empty()).unwrap();
        assert!(matches!(
            store.save(page.id, "   ", None, 1, &me),
            Err(PageError::InvalidInput(_))
        ));
        assert!(matches!(
            store.create(&me, Uuid::new_v4(), "", Node::empty()),
            Err(PageError::InvalidInput(_))
        ));
        assert_eq!(store.get(page.id, &me).unwrap().version, 1);
    }
}
