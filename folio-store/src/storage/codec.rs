//! On-disk encoding.
//!
//! Records are bincode-encoded (serde mode, standard config). Revision
//! snapshots are additionally LZ4-compressed: a page history holds up to
//! `K` near-identical copies of the same body, which compresses well.

use folio_core::Node;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Encode a record with bincode.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| StoreError::SerializationError(e.to_string()))
}

/// Decode a bincode record.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| StoreError::DeserializationError(e.to_string()))?;
    Ok(value)
}

/// An LZ4-compressed content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedSnapshot {
    /// Encoded size before compression
    pub original_size: u32,
    /// LZ4 block with prepended size
    pub compressed: Vec<u8>,
}

impl CompressedSnapshot {
    pub fn compress(snapshot: &Node) -> Result<Self, StoreError> {
        let encoded = encode(snapshot)?;
        Ok(Self {
            original_size: encoded.len() as u32,
            compressed: lz4_flex::compress_prepend_size(&encoded),
        })
    }

    pub fn decompress(&self) -> Result<Node, StoreError> {
        let encoded = lz4_flex::decompress_size_prepended(&self.compressed)
            .map_err(|e| StoreError::CompressionError(e.to_string()))?;
        decode(&encoded)
    }

    /// Compression ratio (original / compressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed.is_empty() {
            return 0.0;
        }
        self.original_size as f64 / self.compressed.len() as f64
    }
}
