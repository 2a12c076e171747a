//! # folio-store: Page persistence for Folio
//!
//! Conflict-checked page saves, bounded revision history and prefix search,
//! all over one pluggable storage engine:
//!
//! - [`pages`]: `PageStore`, optimistic concurrency on a per-page version
//! - [`revisions`]: `RevisionManager`, capture and retention pruning
//! - [`search`]: `SearchIndex`, prefix range scan joined to the hierarchy
//! - [`hierarchy`]: section/notebook lookup boundary
//! - [`service`]: async `PageService` façade for request handlers
//! - [`storage`]: `DocumentBackend` trait, RocksDB and in-memory engines
//! - [`error`]: `StoreError` and `PageError`

pub mod error;
pub mod hierarchy;
pub mod pages;
pub mod revisions;
pub mod search;
pub mod service;
pub mod storage;

pub use error::{PageError, StoreError};
pub use hierarchy::{HierarchyService, InMemoryHierarchy};
pub use pages::{PageStore, SaveOutcome};
pub use revisions::{revisions_beyond_retention, RevisionManager, RevisionPolicy};
pub use search::{SearchConfig, SearchHit, SearchIndex, SENTINEL};
pub use service::{PageService, ServiceConfig};
pub use storage::{CasOutcome, DocumentBackend, MemoryBackend, RocksBackend, StoreConfig};
