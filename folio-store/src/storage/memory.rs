//! In-process storage engine.
//!
//! Same semantics as [`super::RocksBackend`] with everything held in
//! ordered maps behind a single `RwLock`. The write lock is held across the
//! version comparison and the write, which is what makes
//! `conditional_put` atomic. Used by tests and by embedders that do not need
//! durability.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use folio_core::{PageRecord, Revision};
use uuid::Uuid;

use super::{CasOutcome, DocumentBackend, RevisionKey};
use crate::error::StoreError;

/// Search entry: (owner, search_text, page_id).
type SearchEntry = (Uuid, String, Uuid);

#[derive(Default)]
struct MemoryState {
    pages: HashMap<Uuid, PageRecord>,
    search: BTreeSet<SearchEntry>,
    revisions: BTreeMap<RevisionKey, Revision>,
}

impl MemoryState {
    fn index(&mut self, page: &PageRecord) {
        self.search
            .insert((page.owner_id, page.search_text.clone(), page.id));
    }

    fn unindex(&mut self, page: &PageRecord) {
        self.search
            .remove(&(page.owner_id, page.search_text.clone(), page.id));
    }

    /// Revision keys of one page, oldest first.
    fn page_revisions(&self, page_id: Uuid) -> impl DoubleEndedIterator<Item = (&RevisionKey, &Revision)> {
        let start = RevisionKey {
            page_id,
            created_at: 0,
            revision_id: Uuid::nil(),
        };
        let end = RevisionKey {
            page_id,
            created_at: u64::MAX,
            revision_id: Uuid::from_bytes([0xFF; 16]),
        };
        self.revisions.range(start..=end)
    }
}

/// Volatile [`DocumentBackend`].
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored revisions of a page.
    pub fn revision_count(&self, page_id: Uuid) -> Result<usize, StoreError> {
        Ok(self.read()?.page_revisions(page_id).count())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl DocumentBackend for MemoryBackend {
    fn get_page(&self, page_id: Uuid) -> Result<Option<PageRecord>, StoreError> {
        Ok(self.read()?.pages.get(&page_id).cloned())
    }

    fn insert_page(&self, page: &PageRecord) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if let Some(previous) = state.pages.insert(page.id, page.clone()) {
            state.unindex(&previous);
        }
        state.index(page);
        Ok(())
    }

    fn conditional_put(
        &self,
        page: &PageRecord,
        expected_version: u64,
    ) -> Result<CasOutcome, StoreError> {
        let mut state = self.write()?;
        let current = match state.pages.get(&page.id) {
            Some(current) => current.clone(),
            None => return Ok(CasOutcome::Missing),
        };
        if current.version != expected_version {
            return Ok(CasOutcome::VersionMismatch(current));
        }

        if current.search_text != page.search_text || current.owner_id != page.owner_id {
            state.unindex(&current);
            state.index(page);
        }
        state.pages.insert(page.id, page.clone());
        Ok(CasOutcome::Committed)
    }

    fn scan_search_range(
        &self,
        owner_id: Uuid,
        lower: &str,
        upper: &str,
        limit: usize,
    ) -> Result<Vec<PageRecord>, StoreError> {
        if lower >= upper || limit == 0 {
            return Ok(Vec::new());
        }
        let state = self.read()?;
        let from = (owner_id, lower.to_owned(), Uuid::nil());
        let to = (owner_id, upper.to_owned(), Uuid::nil());

        let pages = state
            .search
            .range(from..to)
            .filter_map(|(_, _, page_id)| state.pages.get(page_id).cloned())
            .take(limit)
            .collect();
        Ok(pages)
    }

    fn put_revision(&self, revision: &Revision) -> Result<(), StoreError> {
        self.write()?
            .revisions
            .insert(RevisionKey::of(revision), revision.clone());
        Ok(())
    }

    fn recent_revision_keys(
        &self,
        page_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RevisionKey>, StoreError> {
        Ok(self
            .read()?
            .page_revisions(page_id)
            .rev()
            .take(limit)
            .map(|(key, _)| *key)
            .collect())
    }

    fn recent_revisions(&self, page_id: Uuid, limit: usize) -> Result<Vec<Revision>, StoreError> {
        Ok(self
            .read()?
            .page_revisions(page_id)
            .rev()
            .take(limit)
            .map(|(_, revision)| revision.clone())
            .collect())
    }

    fn delete_revisions(&self, keys: &[RevisionKey]) -> Result<(), StoreError> {
        let mut state = self.write()?;
        for key in keys {
            state.revisions.remove(key);
        }
        Ok(())
    }
}
