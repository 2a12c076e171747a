//! Prefix search over the denormalized `search_text` field.
//!
//! A query `q` matches every page of the caller whose search text starts
//! with `q`. Matching is a single ordered range scan over
//! `[q, q + SENTINEL)`; because `search_text` is title followed by body,
//! a page is found by a prefix of its title (or of its whole text), not by
//! a word in the middle of the body.
//!
//! Hits are then joined to their section and notebook through the
//! [`HierarchyService`]; pages whose parents no longer resolve are dropped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use folio_core::{Identity, Notebook, PageRecord, Section};
use futures_util::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

use crate::error::PageError;
use crate::hierarchy::HierarchyService;
use crate::storage::DocumentBackend;

/// Upper-bound marker appended to a prefix. The largest scalar value sorts
/// after any character a real search string can continue with.
pub const SENTINEL: char = char::MAX;

/// Search tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) return nothing
    pub min_query_chars: usize,
    /// Maximum pages read per query, before parent resolution
    pub result_limit: usize,
    /// Ids per hierarchy lookup call
    pub hierarchy_batch: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            result_limit: 20,
            hierarchy_batch: 10,
        }
    }
}

impl SearchConfig {
    pub fn for_testing() -> Self {
        Self {
            result_limit: 5,
            hierarchy_batch: 2,
            ..Self::default()
        }
    }
}

/// A page together with its resolved parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub page: PageRecord,
    pub section: Section,
    pub notebook: Notebook,
}

/// Trim and lowercase a raw query the same way search text is built.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Exclusive upper bound of the range holding every string with `prefix`.
pub fn prefix_upper_bound(prefix: &str) -> String {
    let mut upper = String::with_capacity(prefix.len() + SENTINEL.len_utf8());
    upper.push_str(prefix);
    upper.push(SENTINEL);
    upper
}

/// Read path over the search field maintained by [`crate::PageStore`].
pub struct SearchIndex<B, H> {
    backend: Arc<B>,
    hierarchy: Arc<H>,
    config: SearchConfig,
}

impl<B: DocumentBackend, H: HierarchyService> SearchIndex<B, H> {
    pub fn new(backend: Arc<B>, hierarchy: Arc<H>, config: SearchConfig) -> Self {
        Self {
            backend,
            hierarchy,
            config,
        }
    }

    /// Pages of `owner` whose search text starts with `query`, in ascending
    /// search-text order. Short queries and queries with no match return an
    /// empty list.
    pub async fn query(&self, owner: &Identity, query: &str) -> Result<Vec<SearchHit>, PageError> {
        let prefix = normalize_query(query);
        if prefix.chars().count() < self.config.min_query_chars {
            return Ok(Vec::new());
        }

        let upper = prefix_upper_bound(&prefix);
        let pages = self
            .backend
            .scan_search_range(owner.user_id, &prefix, &upper, self.config.result_limit)
            .map_err(|e| {
                log::error!("Search scan for {:?} failed: {e}", prefix);
                PageError::from(e)
            })?;
        log::debug!("Search {:?} matched {} pages", prefix, pages.len());
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let section_ids = distinct(pages.iter().map(|p| p.section_id));
        let sections = self.resolve_sections(&section_ids).await?;
        let notebook_ids = distinct(sections.values().map(|s| s.notebook_id));
        let notebooks = self.resolve_notebooks(&notebook_ids).await?;

        let total = pages.len();
        let hits: Vec<SearchHit> = pages
            .into_iter()
            .filter_map(|page| {
                let section = sections.get(&page.section_id)?.clone();
                let notebook = notebooks.get(&section.notebook_id)?.clone();
                Some(SearchHit {
                    page,
                    section,
                    notebook,
                })
            })
            .collect();
        if hits.len() < total {
            log::debug!("Dropped {} orphaned search hits", total - hits.len());
        }
        Ok(hits)
    }

    async fn resolve_sections(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Section>, PageError> {
        let lookups = ids
            .chunks(self.config.hierarchy_batch.max(1))
            .map(|chunk| self.hierarchy.sections(chunk));
        let batches = try_join_all(lookups).await.map_err(|e| {
            log::error!("Section lookup failed: {e}");
            PageError::from(e)
        })?;
        Ok(batches.into_iter().flatten().collect())
    }

    async fn resolve_notebooks(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Notebook>, PageError> {
        let lookups = ids
            .chunks(self.config.hierarchy_batch.max(1))
            .map(|chunk| self.hierarchy.notebooks(chunk));
        let batches = try_join_all(lookups).await.map_err(|e| {
            log::error!("Notebook lookup failed: {e}");
            PageError::from(e)
        })?;
        Ok(batches.into_iter().flatten().collect())
    }
}

/// Ids in first-seen order without repeats.
fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
