//! Storage engines for pages and revisions.
//!
//! Architecture:
//! ```text
//! ┌───────────┐ ┌─────────────────┐ ┌─────────────┐
//! │ PageStore │ │ RevisionManager │ │ SearchIndex │
//! └─────┬─────┘ └────────┬────────┘ └──────┬──────┘
//!       │ get / conditional_put            │ range scan
//!       ▼                ▼                 ▼
//! ┌──────────────────────────────────────────────────┐
//! │            DocumentBackend (trait)               │
//! ├────────────────────────┬─────────────────────────┤
//! │ RocksBackend           │ MemoryBackend           │
//! │ CF "pages"             │ HashMap + BTreeSet      │
//! │ CF "search"            │ behind one RwLock       │
//! │ CF "revisions"         │                         │
//! └────────────────────────┴─────────────────────────┘
//! ```
//!
//! The search index lives inside the engine and is only ever written by
//! `insert_page` and `conditional_put`, in the same atomic unit as the page
//! record it describes.

pub mod codec;
pub mod memory;
pub mod rocks;

pub use codec::CompressedSnapshot;
pub use memory::MemoryBackend;
pub use rocks::{RocksBackend, StoreConfig};

use folio_core::{PageRecord, Revision};
use uuid::Uuid;

use crate::error::StoreError;

/// Result of an atomic compare-and-swap on a page record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The stored version matched and the new record is durable.
    Committed,
    /// The stored version differed; nothing was written.
    VersionMismatch(PageRecord),
    /// No record exists under that id.
    Missing,
}

/// Identity of a stored revision, ordered the way revisions are laid out:
/// by page, then capture time, then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevisionKey {
    pub page_id: Uuid,
    pub created_at: u64,
    pub revision_id: Uuid,
}

impl RevisionKey {
    /// Encoded length: page_id (16) + created_at (8) + revision_id (16).
    pub const LEN: usize = 40;

    pub fn of(revision: &Revision) -> Self {
        Self {
            page_id: revision.page_id,
            created_at: revision.created_at,
            revision_id: revision.id,
        }
    }

    /// `<page_id:16><created_at:8 big-endian><revision_id:16>`
    pub fn encode(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(Self::LEN);
        key.extend_from_slice(self.page_id.as_bytes());
        key.extend_from_slice(&self.created_at.to_be_bytes());
        key.extend_from_slice(self.revision_id.as_bytes());
        key
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::LEN {
            return Err(StoreError::DeserializationError(format!(
                "Revision key has {} bytes, expected {}",
                bytes.len(),
                Self::LEN
            )));
        }
        let page_id = uuid_at(bytes, 0)?;
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[16..24]);
        let revision_id = uuid_at(bytes, 24)?;
        Ok(Self {
            page_id,
            created_at: u64::from_be_bytes(ts),
            revision_id,
        })
    }
}

/// Read a UUID from 16 bytes starting at `offset`.
pub(crate) fn uuid_at(bytes: &[u8], offset: usize) -> Result<Uuid, StoreError> {
    bytes
        .get(offset..offset + 16)
        .and_then(|slice| <[u8; 16]>::try_from(slice).ok())
        .map(Uuid::from_bytes)
        .ok_or_else(|| StoreError::DeserializationError("Invalid UUID in key".into()))
}

/// The storage boundary shared by every component.
///
/// Implementations must make `conditional_put` atomic with respect to every
/// other write of the same page: the version comparison and the write
/// (record plus search-index entry) either both happen or neither does.
pub trait DocumentBackend: Send + Sync {
    /// Point lookup of a page record.
    fn get_page(&self, page_id: Uuid) -> Result<Option<PageRecord>, StoreError>;

    /// Store a brand-new page and index its search text.
    fn insert_page(&self, page: &PageRecord) -> Result<(), StoreError>;

    /// Replace the stored page with `page` if and only if the stored version
    /// equals `expected_version`.
    fn conditional_put(
        &self,
        page: &PageRecord,
        expected_version: u64,
    ) -> Result<CasOutcome, StoreError>;

    /// Pages of `owner_id` whose search text falls in `[lower, upper)`, in
    /// ascending search-text order, at most `limit` of them.
    fn scan_search_range(
        &self,
        owner_id: Uuid,
        lower: &str,
        upper: &str,
        limit: usize,
    ) -> Result<Vec<PageRecord>, StoreError>;

    /// Store an immutable revision.
    fn put_revision(&self, revision: &Revision) -> Result<(), StoreError>;

    /// Keys of the newest `limit` revisions of a page, newest first.
    fn recent_revision_keys(
        &self,
        page_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RevisionKey>, StoreError>;

    /// The newest `limit` revisions of a page, newest first.
    fn recent_revisions(&self, page_id: Uuid, limit: usize) -> Result<Vec<Revision>, StoreError>;

    /// Delete the given revisions as one batch. Missing keys are ignored.
    fn delete_revisions(&self, keys: &[RevisionKey]) -> Result<(), StoreError>;
}
