//! Bounded page history.
//!
//! A revision is an immutable snapshot of a page's title and content. After
//! every capture the manager reads the newest `fetch_window` revisions and
//! deletes everything past the first `retention` of them in one batch, so a
//! page never keeps more than `retention` revisions for longer than one
//! failed prune.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use folio_core::{now_micros, Identity, Node, Revision, RevisionSummary};
use uuid::Uuid;

use crate::error::PageError;
use crate::pages::load_accessible;
use crate::storage::DocumentBackend;

/// Default number of revisions kept per page.
pub const DEFAULT_RETENTION: usize = 20;
/// Default number of newest revisions read when pruning.
pub const DEFAULT_FETCH_WINDOW: usize = 50;

/// Retention configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionPolicy {
    /// Revisions kept per page (K)
    pub retention: usize,
    /// Newest revisions inspected per prune; must exceed `retention`
    pub fetch_window: usize,
}

impl Default for RevisionPolicy {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            fetch_window: DEFAULT_FETCH_WINDOW,
        }
    }
}

impl RevisionPolicy {
    /// Small bounds so tests reach the pruning path quickly.
    pub fn for_testing() -> Self {
        Self {
            retention: 3,
            fetch_window: 8,
        }
    }

    pub fn validate(&self) -> Result<(), PageError> {
        if self.retention == 0 {
            return Err(PageError::InvalidInput(
                "revision retention must be at least 1".into(),
            ));
        }
        if self.fetch_window <= self.retention {
            return Err(PageError::InvalidInput(format!(
                "fetch window {} must exceed retention {}",
                self.fetch_window, self.retention
            )));
        }
        Ok(())
    }
}

/// The entries of a newest-first listing that fall outside the retention
/// bound. Empty when the listing holds `retention` entries or fewer.
pub fn revisions_beyond_retention<T>(newest_first: &[T], retention: usize) -> &[T] {
    newest_first.get(retention..).unwrap_or(&[])
}

/// Captures, lists and prunes revisions.
pub struct RevisionManager<B> {
    backend: Arc<B>,
    policy: RevisionPolicy,
    /// Last issued `created_at`; keeps timestamps strictly increasing even
    /// when the wall clock stalls or steps back.
    clock: AtomicU64,
}

impl<B: DocumentBackend> RevisionManager<B> {
    pub fn new(backend: Arc<B>, policy: RevisionPolicy) -> Result<Self, PageError> {
        policy.validate()?;
        Ok(Self {
            backend,
            policy,
            clock: AtomicU64::new(0),
        })
    }

    /// Store a snapshot of a page, then prune its history.
    ///
    /// The returned id is valid even if the follow-up prune failed; that
    /// failure is logged and the next capture catches up.
    pub fn capture(
        &self,
        page_id: Uuid,
        title: &str,
        snapshot: Node,
        author: &Identity,
    ) -> Result<Uuid, PageError> {
        load_accessible(self.backend.as_ref(), page_id, author)?;

        let revision = Revision {
            id: Uuid::new_v4(),
            page_id,
            title: title.to_owned(),
            snapshot,
            created_at: self.next_timestamp(),
            author_id: author.user_id,
        };
        self.backend.put_revision(&revision).map_err(|e| {
            log::error!("Revision insert for page {page_id} failed: {e}");
            PageError::from(e)
        })?;
        log::info!("Captured revision {} of page {page_id}", revision.id);

        if let Err(e) = self.prune(page_id) {
            log::warn!("Pruning revisions of page {page_id} failed, will retry on next capture: {e}");
        }
        Ok(revision.id)
    }

    /// Delete every revision of `page_id` past the retention bound.
    /// Returns how many were removed. Idempotent.
    pub fn prune(&self, page_id: Uuid) -> Result<usize, PageError> {
        let keys = self
            .backend
            .recent_revision_keys(page_id, self.policy.fetch_window)?;
        let excess = revisions_beyond_retention(&keys, self.policy.retention);
        if excess.is_empty() {
            return Ok(0);
        }
        self.backend.delete_revisions(excess)?;
        log::debug!("Pruned {} revisions of page {page_id}", excess.len());
        Ok(excess.len())
    }

    /// History of a page, newest first.
    pub fn list(&self, page_id: Uuid, caller: &Identity) -> Result<Vec<RevisionSummary>, PageError> {
        load_accessible(self.backend.as_ref(), page_id, caller)?;
        let revisions = self
            .backend
            .recent_revisions(page_id, self.policy.fetch_window)?;
        Ok(revisions.iter().map(Revision::summary).collect())
    }

    pub fn get(
        &self,
        page_id: Uuid,
        revision_id: Uuid,
        caller: &Identity,
    ) -> Result<Revision, PageError> {
        load_accessible(self.backend.as_ref(), page_id, caller)?;
        self.backend
            .recent_revisions(page_id, self.policy.fetch_window)?
            .into_iter()
            .find(|r| r.id == revision_id)
            .ok_or(PageError::RevisionNotFound(revision_id))
    }

    fn next_timestamp(&self) -> u64 {
        let now = now_micros();
        // fetch_update never fails when the closure always returns Some.
        let previous = self
            .clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }
}
