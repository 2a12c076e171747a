//! RocksDB-backed persistent page store.
//!
//! Column families:
//! - `pages`    : page records (bincode), keyed by page id
//! - `search`   : search index, `<owner:16><search_text prefix><0x00><page_id:16>` → empty.
//!   Only the first [`SEARCH_KEY_TEXT_BYTES`] bytes of the text go into the
//!   key; scans confirm each candidate against the stored record.
//! - `revisions`: revision records (bincode, LZ4 snapshot), keyed by
//!   `<page_id:16><created_at:8 BE><revision_id:16>`
//!
//! Writes to a page go through an optimistic transaction: the record is read
//! with `get_for_update`, and RocksDB refuses the commit (`Busy`/`TryAgain`)
//! if it cannot prove no other writer touched the key in between. A refused
//! commit re-reads the record: a changed version is a version mismatch, an
//! unchanged one reruns the transaction, version check included.
//!
//! Reference: Kleppmann: DDIA, Chapter 7 (Preventing Lost Updates, compare-and-set)

use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamilyDescriptor, DBCompressionType, Direction, ErrorKind,
    IteratorMode, OptimisticTransactionDB, OptimisticTransactionOptions, Options, SingleThreaded,
    WriteOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use folio_core::{PageRecord, Revision};
use uuid::Uuid;

use super::codec::{self, CompressedSnapshot};
use super::{uuid_at, CasOutcome, DocumentBackend, RevisionKey};
use crate::error::StoreError;

/// Column family names.
const CF_PAGES: &str = "pages";
const CF_SEARCH: &str = "search";
const CF_REVISIONS: &str = "revisions";

/// All column family names for initialization.
const COLUMN_FAMILIES: &[&str] = &[CF_PAGES, CF_SEARCH, CF_REVISIONS];

/// Separates search text from the trailing page id in search keys. Sorts
/// below every byte a scan bound can end with, so the id never leaks past
/// the upper bound of a prefix range.
const SEARCH_KEY_SEPARATOR: u8 = 0x00;

/// Bytes of search text stored in an index key, cut back to a char boundary.
pub const SEARCH_KEY_TEXT_BYTES: usize = 1500;

/// Commit attempts for one conditional put before giving up.
const MAX_COMMIT_ATTEMPTS: usize = 8;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database directory path
    pub path: PathBuf,
    /// Block cache size in bytes (default: 128MB)
    pub block_cache_size: usize,
    /// Bloom filter bits per key (default: 10)
    pub bloom_filter_bits: i32,
    /// fsync every commit (default: true, accepted saves must survive a crash)
    pub sync_writes: bool,
    /// Max open files for RocksDB (default: 512)
    pub max_open_files: i32,
    /// Write buffer size per column family (default: 32MB)
    pub write_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("folio_data"),
            block_cache_size: 128 * 1024 * 1024, // 128MB
            bloom_filter_bits: 10,
            sync_writes: true,
            max_open_files: 512,
            write_buffer_size: 32 * 1024 * 1024, // 32MB
        }
    }
}

impl StoreConfig {
    /// Create config for testing (small caches, no fsync).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024, // 8MB
            bloom_filter_bits: 10,
            sync_writes: false,
            max_open_files: 64,
            write_buffer_size: 4 * 1024 * 1024, // 4MB
        }
    }
}

/// Revision as laid out on disk: header fields plus compressed snapshot.
#[derive(Serialize, Deserialize)]
struct StoredRevision {
    id: Uuid,
    page_id: Uuid,
    title: String,
    created_at: u64,
    author_id: Uuid,
    snapshot: CompressedSnapshot,
}

impl StoredRevision {
    fn from_revision(revision: &Revision) -> Result<Self, StoreError> {
        Ok(Self {
            id: revision.id,
            page_id: revision.page_id,
            title: revision.title.clone(),
            created_at: revision.created_at,
            author_id: revision.author_id,
            snapshot: CompressedSnapshot::compress(&revision.snapshot)?,
        })
    }

    fn into_revision(self) -> Result<Revision, StoreError> {
        Ok(Revision {
            snapshot: self.snapshot.decompress()?,
            id: self.id,
            page_id: self.page_id,
            title: self.title,
            created_at: self.created_at,
            author_id: self.author_id,
        })
    }
}

/// RocksDB-backed [`DocumentBackend`].
pub struct RocksBackend {
    /// Optimistic-transaction RocksDB (single-threaded CF management; shared via `Arc`)
    db: OptimisticTransactionDB<SingleThreaded>,
    /// Store configuration
    config: StoreConfig,
}

impl RocksBackend {
    /// Open the store at the configured path, creating the database and
    /// column families if they don't exist.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_keep_log_file_num(5);
        db_opts.increase_parallelism(num_cpus());

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Self::cf_options(name, &config)))
            .collect();

        let db = OptimisticTransactionDB::<SingleThreaded>::open_cf_descriptors(
            &db_opts,
            &config.path,
            cf_descriptors,
        )?;

        log::info!("Opened page store at {}", config.path.display());
        Ok(Self { db, config })
    }

    /// Build column-family-specific options.
    fn cf_options(name: &str, config: &StoreConfig) -> Options {
        let mut opts = Options::default();

        let mut block_opts = BlockBasedOptions::default();
        let cache = Cache::new_lru_cache(config.block_cache_size);
        block_opts.set_block_cache(&cache);
        block_opts.set_bloom_filter(config.bloom_filter_bits as f64, false);
        block_opts.set_block_size(16 * 1024); // 16KB blocks
        opts.set_block_based_table_factory(&block_opts);

        opts.set_compression_type(DBCompressionType::Lz4);
        opts.set_write_buffer_size(config.write_buffer_size);

        match name {
            CF_PAGES => {
                // Point lookups by page id. Flushed memtables are kept around
                // so optimistic commits can still check for conflicts after a
                // flush instead of failing with `TryAgain`.
                opts.set_max_write_buffer_number(2);
                opts.set_max_write_buffer_size_to_maintain(
                    (config.write_buffer_size as i64).saturating_mul(4),
                );
            }
            CF_SEARCH | CF_REVISIONS => {
                // Range scans within one 16-byte owner / page prefix
                opts.set_max_write_buffer_number(4);
                opts.set_prefix_extractor(rocksdb::SliceTransform::create_fixed_prefix(16));
            }
            _ => {}
        }

        opts
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Force a flush of every column family's memtables to disk.
    pub fn sync(&self) -> Result<(), StoreError> {
        for name in COLUMN_FAMILIES {
            self.db.flush_cf(self.cf(name)?)?;
        }
        Ok(())
    }

    /// Count the revisions stored for a page.
    pub fn revision_count(&self, page_id: Uuid) -> Result<usize, StoreError> {
        Ok(self.recent_revision_keys(page_id, usize::MAX)?.len())
    }

    // ─── Helpers ──────────────────────────────────────────────────────

    /// One optimistic transaction. `None` when RocksDB refused the commit.
    fn try_conditional_put(
        &self,
        page: &PageRecord,
        expected_version: u64,
    ) -> Result<Option<CasOutcome>, StoreError> {
        let cf_pages = self.cf(CF_PAGES)?;
        let cf_search = self.cf(CF_SEARCH)?;

        let txn = self
            .db
            .transaction_opt(&self.write_options(), &OptimisticTransactionOptions::new());

        let current: PageRecord = match txn.get_for_update_cf(cf_pages, page.id.as_bytes(), true)? {
            Some(bytes) => codec::decode(&bytes)?,
            None => return Ok(Some(CasOutcome::Missing)),
        };
        if current.version != expected_version {
            return Ok(Some(CasOutcome::VersionMismatch(current)));
        }

        txn.put_cf(cf_pages, page.id.as_bytes(), codec::encode(page)?)?;
        if current.search_text != page.search_text || current.owner_id != page.owner_id {
            txn.delete_cf(
                cf_search,
                Self::search_key(current.owner_id, &current.search_text, current.id),
            )?;
            txn.put_cf(
                cf_search,
                Self::search_key(page.owner_id, &page.search_text, page.id),
                b"",
            )?;
        }

        match txn.commit() {
            Ok(()) => Ok(Some(CasOutcome::Committed)),
            Err(e) if matches!(e.kind(), ErrorKind::Busy | ErrorKind::TryAgain) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::DatabaseError(format!("Column family '{name}' not found")))
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }

    /// Build a search key: owner (16) + capped search text + separator + page id (16).
    fn search_key(owner_id: Uuid, search_text: &str, page_id: Uuid) -> Vec<u8> {
        let text = truncate_at_char_boundary(search_text, SEARCH_KEY_TEXT_BYTES);
        let mut key = Self::search_bound(owner_id, text);
        key.push(SEARCH_KEY_SEPARATOR);
        key.extend_from_slice(page_id.as_bytes());
        key
    }

    /// Build a search scan bound: owner (16) + text.
    fn search_bound(owner_id: Uuid, text: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(16 + text.len() + 17);
        key.extend_from_slice(owner_id.as_bytes());
        key.extend_from_slice(text.as_bytes());
        key
    }

    /// Walk a page's revision keys newest first, calling `visit` with each
    /// raw key/value until it returns `false` or the page prefix ends.
    fn walk_revisions_newest_first(
        &self,
        page_id: Uuid,
        mut visit: impl FnMut(&[u8], &[u8]) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        let cf = self.cf(CF_REVISIONS)?;
        let mut seek = Vec::with_capacity(RevisionKey::LEN);
        seek.extend_from_slice(page_id.as_bytes());
        seek.extend_from_slice(&[0xFF; RevisionKey::LEN - 16]);

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&seek, Direction::Reverse));
        for item in iter {
            let (key, value) = item?;
            if key.len() != RevisionKey::LEN || &key[..16] != page_id.as_bytes() {
                break;
            }
            if !visit(&key, &value)? {
                break;
            }
        }
        Ok(())
    }
}

impl DocumentBackend for RocksBackend {
    fn get_page(&self, page_id: Uuid) -> Result<Option<PageRecord>, StoreError> {
        let cf = self.cf(CF_PAGES)?;
        match self.db.get_cf(cf, page_id.as_bytes())? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn insert_page(&self, page: &PageRecord) -> Result<(), StoreError> {
        let cf_pages = self.cf(CF_PAGES)?;
        let cf_search = self.cf(CF_SEARCH)?;

        let txn = self
            .db
            .transaction_opt(&self.write_options(), &OptimisticTransactionOptions::new());
        txn.put_cf(cf_pages, page.id.as_bytes(), codec::encode(page)?)?;
        txn.put_cf(
            cf_search,
            Self::search_key(page.owner_id, &page.search_text, page.id),
            b"",
        )?;
        txn.commit()?;
        Ok(())
    }

    fn conditional_put(
        &self,
        page: &PageRecord,
        expected_version: u64,
    ) -> Result<CasOutcome, StoreError> {
        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            if let Some(outcome) = self.try_conditional_put(page, expected_version)? {
                return Ok(outcome);
            }
            // Commit refused. Only a changed version is a conflict.
            match self.get_page(page.id)? {
                None => return Ok(CasOutcome::Missing),
                Some(latest) if latest.version != expected_version => {
                    return Ok(CasOutcome::VersionMismatch(latest));
                }
                Some(_) => log::debug!(
                    "Commit of page {} refused with v{expected_version} unchanged (attempt {attempt})",
                    page.id
                ),
            }
        }
        Err(StoreError::DatabaseError(format!(
            "Commit of page {} refused {MAX_COMMIT_ATTEMPTS} times",
            page.id
        )))
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
        let cf = self.cf(CF_SEARCH)?;
        // Keys hold at most SEARCH_KEY_TEXT_BYTES of text, cut at a char
        // boundary up to 3 bytes earlier. A lower bound cut shorter still
        // sorts at or below the key of every page whose text is >= `lower`.
        let start = Self::search_bound(
            owner_id,
            truncate_at_char_boundary(lower, SEARCH_KEY_TEXT_BYTES - 4),
        );
        let end = Self::search_bound(owner_id, upper);

        let mut pages = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if key.as_ref() >= end.as_slice() {
                break;
            }
            if key.len() < 33 {
                continue;
            }
            let page_id = uuid_at(&key, key.len() - 16)?;
            // The index is written in the same transaction as the record, so
            // a dangling entry means the record was removed out of band.
            let Some(page) = self.get_page(page_id)? else {
                log::warn!("Search entry points at missing page {page_id}");
                continue;
            };
            // A capped key can match a range its full text falls outside of.
            let text = page.search_text.as_str();
            if text < lower || text >= upper {
                continue;
            }
            pages.push(page);
            if pages.len() >= limit {
                break;
            }
        }
        Ok(pages)
    }

    fn put_revision(&self, revision: &Revision) -> Result<(), StoreError> {
        let cf = self.cf(CF_REVISIONS)?;
        let stored = StoredRevision::from_revision(revision)?;
        self.db.put_cf_opt(
            cf,
            RevisionKey::of(revision).encode(),
            codec::encode(&stored)?,
            &self.write_options(),
        )?;
        Ok(())
    }

    fn recent_revision_keys(
        &self,
        page_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RevisionKey>, StoreError> {
        let mut keys = Vec::new();
        if limit == 0 {
            return Ok(keys);
        }
        self.walk_revisions_newest_first(page_id, |key, _| {
            keys.push(RevisionKey::decode(key)?);
            Ok(keys.len() < limit)
        })?;
        Ok(keys)
    }

    fn recent_revisions(&self, page_id: Uuid, limit: usize) -> Result<Vec<Revision>, StoreError> {
        let mut revisions = Vec::new();
        if limit == 0 {
            return Ok(revisions);
        }
        self.walk_revisions_newest_first(page_id, |_, value| {
            let stored: StoredRevision = codec::decode(value)?;
            revisions.push(stored.into_revision()?);
            Ok(revisions.len() < limit)
        })?;
        Ok(revisions)
    }

    fn delete_revisions(&self, keys: &[RevisionKey]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        let cf = self.cf(CF_REVISIONS)?;
        let txn = self
            .db
            .transaction_opt(&self.write_options(), &OptimisticTransactionOptions::new());
        for key in keys {
            txn.delete_cf(cf, key.encode())?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// Longest prefix of `text` that fits in `max_bytes` and ends on a char boundary.
fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Get number of CPU cores for RocksDB parallelism.
fn num_cpus() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as i32)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Identity, Node};
    use std::fs;

    /// Create a temp directory for test database.
    fn temp_db_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("folio_test_rocks_{name}_{}", Uuid::new_v4()))
    }

    /// Clean up test database.
    fn cleanup(path: &Path) {
        let _ = fs::remove_dir_all(path);
    }

    fn revision(page_id: Uuid, created_at: u64, title: &str) -> Revision {
        Revision {
            id: Uuid::new_v4(),
            page_id,
            title: title.into(),
            snapshot: Node::paragraphs([title]),
            created_at,
            author_id: Uuid::nil(),
        }
    }

    #[test]
    fn test_store_open_close() {
        let path = temp_db_path("open_close");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();
        assert!(store.path().exists());
        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_page_insert_get() {
        let path = temp_db_path("page");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let owner = Identity::new(Uuid::new_v4());
        let page = PageRecord::new(&owner, Uuid::new_v4(), "Reading list", Node::paragraphs(["Dune"]));
        store.insert_page(&page).unwrap();

        assert_eq!(store.get_page(page.id).unwrap(), Some(page));
        assert_eq!(store.get_page(Uuid::new_v4()).unwrap(), None);

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_conditional_put_and_reindex() {
        let path = temp_db_path("cas");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let owner = Identity::new(Uuid::new_v4());
        let page = PageRecord::new(&owner, Uuid::new_v4(), "Alpha", Node::empty());
        store.insert_page(&page).unwrap();

        let mut next = page.clone();
        next.version = 2;
        next.search_text = "beta".into();
        assert_eq!(store.conditional_put(&next, 1).unwrap(), CasOutcome::Committed);

        match store.conditional_put(&next, 1).unwrap() {
            CasOutcome::VersionMismatch(current) => assert_eq!(current.version, 2),
            other => panic!("expected mismatch, got {other:?}"),
        }

        let old = store.scan_search_range(owner.user_id, "alpha", "alpha\u{10FFFF}", 10).unwrap();
        assert!(old.is_empty());
        let new = store.scan_search_range(owner.user_id, "beta", "beta\u{10FFFF}", 10).unwrap();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].id, page.id);

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_conditional_put_missing() {
        let path = temp_db_path("cas_missing");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let owner = Identity::new(Uuid::new_v4());
        let ghost = PageRecord::new(&owner, Uuid::new_v4(), "Ghost", Node::empty());
        assert_eq!(store.conditional_put(&ghost, 1).unwrap(), CasOutcome::Missing);
        assert_eq!(store.get_page(ghost.id).unwrap(), None);

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_search_range_bounds_with_extreme_page_ids() {
        let path = temp_db_path("search_bounds");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let owner = Identity::new(Uuid::new_v4());
        // Page ids made of 0xFF bytes must not escape the upper bound.
        let mut page = PageRecord::new(&owner, Uuid::new_v4(), "ab", Node::empty());
        page.id = Uuid::from_bytes([0xFF; 16]);
        store.insert_page(&page).unwrap();
        let other = PageRecord::new(&owner, Uuid::new_v4(), "abz", Node::empty());
        store.insert_page(&other).unwrap();
        let outside = PageRecord::new(&owner, Uuid::new_v4(), "ac", Node::empty());
        store.insert_page(&outside).unwrap();

        let hits = store.scan_search_range(owner.user_id, "ab", "ab\u{10FFFF}", 10).unwrap();
        let texts: Vec<&str> = hits.iter().map(|p| p.search_text.as_str()).collect();
        assert_eq!(texts, vec!["ab", "abz"]);

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_truncate_at_char_boundary() {
        assert_eq!(truncate_at_char_boundary("short", 10), "short");
        // "é" is two bytes; a cut inside it backs off to the char start.
        assert_eq!(truncate_at_char_boundary("aéb", 2), "a");
        assert_eq!(truncate_at_char_boundary("aéb", 3), "aé");

        let long = format!("x{}", "é".repeat(1000));
        let cut = truncate_at_char_boundary(&long, SEARCH_KEY_TEXT_BYTES);
        assert_eq!(cut.len(), SEARCH_KEY_TEXT_BYTES - 1);
        assert!(long.starts_with(cut));
    }

    #[test]
    fn test_long_search_text_is_capped_in_key() {
        let path = temp_db_path("search_cap");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let owner = Identity::new(Uuid::new_v4());
        // 2001 shared bytes, so the texts only differ past the key cap.
        let shared = format!("x{}", "é".repeat(1000));
        let apple = PageRecord::new(&owner, Uuid::new_v4(), &format!("{shared}apple"), Node::empty());
        let banana = PageRecord::new(&owner, Uuid::new_v4(), &format!("{shared}banana"), Node::empty());
        store.insert_page(&apple).unwrap();
        store.insert_page(&banana).unwrap();

        let key = RocksBackend::search_key(owner.user_id, &apple.search_text, apple.id);
        assert!(key.len() <= 16 + SEARCH_KEY_TEXT_BYTES + 1 + 16);

        let scan = |lower: &str| {
            let upper = format!("{lower}\u{10FFFF}");
            store
                .scan_search_range(owner.user_id, lower, &upper, 10)
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect::<Vec<_>>()
        };
        let both = scan("xé");
        assert_eq!(both.len(), 2);
        assert_eq!(scan(&format!("{shared}app")), vec![apple.id]);
        assert_eq!(scan(&format!("{shared}b")), vec![banana.id]);
        assert!(scan(&format!("{shared}c")).is_empty());

        // Re-indexing removes the capped key of the old text.
        let mut renamed = apple.clone();
        renamed.version = 2;
        renamed.search_text = "apple".into();
        assert_eq!(store.conditional_put(&renamed, 1).unwrap(), CasOutcome::Committed);
        assert_eq!(scan("xé"), vec![banana.id]);
        assert_eq!(scan("apple"), vec![apple.id]);

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_revisions_newest_first() {
        let path = temp_db_path("revisions");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let page_id = Uuid::new_v4();
        let neighbour = Uuid::new_v4();
        for ts in 1..=10u64 {
            store.put_revision(&revision(page_id, ts, &format!("v{ts}"))).unwrap();
            store.put_revision(&revision(neighbour, ts, "n")).unwrap();
        }

        let keys = store.recent_revision_keys(page_id, 4).unwrap();
        let stamps: Vec<u64> = keys.iter().map(|k| k.created_at).collect();
        assert_eq!(stamps, vec![10, 9, 8, 7]);

        let revisions = store.recent_revisions(page_id, 2).unwrap();
        assert_eq!(revisions[0].title, "v10");
        assert_eq!(revisions[0].snapshot, Node::paragraphs(["v10"]));
        assert_eq!(revisions[1].title, "v9");

        assert_eq!(store.revision_count(page_id).unwrap(), 10);
        assert_eq!(store.revision_count(neighbour).unwrap(), 10);

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_delete_revisions_batch() {
        let path = temp_db_path("revision_delete");
        let store = RocksBackend::open(StoreConfig::for_testing(&path)).unwrap();

        let page_id = Uuid::new_v4();
        for ts in 1..=6u64 {
            store.put_revision(&revision(page_id, ts, "r")).unwrap();
        }
        let all = store.recent_revision_keys(page_id, usize::MAX).unwrap();
        store.delete_revisions(&all[3..]).unwrap();
        // Deleting again is a no-op.
        store.delete_revisions(&all[3..]).unwrap();

        let remaining = store.recent_revision_keys(page_id, usize::MAX).unwrap();
        assert_eq!(remaining, all[..3].to_vec());

        drop(store);
        cleanup(&path);
    }

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.block_cache_size, 128 * 1024 * 1024);
        assert_eq!(config.bloom_filter_bits, 10);
        assert!(config.sync_writes);
        assert!(!StoreConfig::for_testing("x").sync_writes);
    }
}
