//! Request-handler surface.
//!
//! [`PageService`] is what an HTTP or RPC layer calls. It resolves the caller
//! (`None` means the identity provider could not establish one), converts
//! editor JSON into content trees and dispatches to the three components.
//! Every call is an independent unit of work; dropping a future before it
//! reaches its conditional write leaves storage untouched.

use std::sync::Arc;

use folio_core::{Identity, Node, PageRecord, RevisionSummary};
use serde_json::Value;
use uuid::Uuid;

use crate::error::PageError;
use crate::hierarchy::HierarchyService;
use crate::pages::{PageStore, SaveOutcome};
use crate::revisions::{RevisionManager, RevisionPolicy};
use crate::search::{SearchConfig, SearchHit, SearchIndex};
use crate::storage::DocumentBackend;

/// Service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub revisions: RevisionPolicy,
    pub search: SearchConfig,
}

impl ServiceConfig {
    pub fn for_testing() -> Self {
        Self {
            revisions: RevisionPolicy::for_testing(),
            search: SearchConfig::for_testing(),
        }
    }
}

/// Async façade over pages, revisions and search.
pub struct PageService<B, H> {
    pages: PageStore<B>,
    revisions: RevisionManager<B>,
    search: SearchIndex<B, H>,
}

impl<B: DocumentBackend, H: HierarchyService> PageService<B, H> {
    pub fn new(backend: Arc<B>, hierarchy: Arc<H>, config: ServiceConfig) -> Result<Self, PageError> {
        Ok(Self {
            pages: PageStore::new(backend.clone()),
            revisions: RevisionManager::new(backend.clone(), config.revisions)?,
            search: SearchIndex::new(backend, hierarchy, config.search),
        })
    }

    pub async fn create_page(
        &self,
        caller: Option<&Identity>,
        section_id: Uuid,
        title: &str,
        content: &Value,
    ) -> Result<PageRecord, PageError> {
        let caller = authenticated(caller)?;
        self.pages
            .create(caller, section_id, title, Node::from_editor_json(content))
    }

    pub async fn open_page(
        &self,
        caller: Option<&Identity>,
        page_id: Uuid,
    ) -> Result<PageRecord, PageError> {
        let caller = authenticated(caller)?;
        self.pages.get(page_id, caller)
    }

    /// Save from the editor. `content: None` is a title-only save.
    pub async fn save_page(
        &self,
        caller: Option<&Identity>,
        page_id: Uuid,
        title: &str,
        content: Option<&Value>,
        expected_version: u64,
    ) -> Result<SaveOutcome, PageError> {
        let caller = authenticated(caller)?;
        let content = content.map(Node::from_editor_json);
        self.pages
            .save(page_id, title, content, expected_version, caller)
    }

    pub async fn capture_revision(
        &self,
        caller: Option<&Identity>,
        page_id: Uuid,
        title: &str,
        snapshot: &Value,
    ) -> Result<Uuid, PageError> {
        let caller = authenticated(caller)?;
        self.revisions
            .capture(page_id, title, Node::from_editor_json(snapshot), caller)
    }

    pub async fn list_revisions(
        &self,
        caller: Option<&Identity>,
        page_id: Uuid,
    ) -> Result<Vec<RevisionSummary>, PageError> {
        let caller = authenticated(caller)?;
        self.revisions.list(page_id, caller)
    }

    /// Write a revision's title and snapshot back onto its page.
    ///
    /// This is an ordinary conflict-checked save: the caller supplies the
    /// version it last observed and may get `Conflict` back.
    pub async fn restore_revision(
        &self,
        caller: Option<&Identity>,
        page_id: Uuid,
        revision_id: Uuid,
        expected_version: u64,
    ) -> Result<SaveOutcome, PageError> {
        let caller = authenticated(caller)?;
        let revision = self.revisions.get(page_id, revision_id, caller)?;
        let outcome = self.pages.save(
            page_id,
            &revision.title,
            Some(revision.snapshot),
            expected_version,
            caller,
        )?;
        if let SaveOutcome::Accepted { new_version } = outcome {
            log::info!("Restored page {page_id} from revision {revision_id} at v{new_version}");
        }
        Ok(outcome)
    }

    pub async fn search(
        &self,
        caller: Option<&Identity>,
        query: &str,
    ) -> Result<Vec<SearchHit>, PageError> {
        let caller = authenticated(caller)?;
        self.search.query(caller, query).await
    }
}

fn authenticated(caller: Option<&Identity>) -> Result<&Identity, PageError> {
    caller.ok_or_else(|| {
        log::warn!("Rejected request without an established identity");
        PageError::Unauthorized
    })
}
