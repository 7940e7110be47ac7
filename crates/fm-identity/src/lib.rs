//! fm-identity
//!
//! Stable identifiers for vector-index entries.
//!
//! Ids are pure functions of (entity key, position, content) so re-indexing
//! unchanged artifacts overwrites the same entries instead of duplicating
//! them. Identical across runs, processes and machines.

use fm_schemas::EntityKey;
use sha2::{Digest, Sha256};

/// Hex characters of the content hash embedded in a chunk id.
pub const FINGERPRINT_LEN: usize = 12;

/// First `len` lowercase hex chars of SHA-256(`text`).
///
/// `len` is capped at the full 64-char digest.
pub fn content_fingerprint(text: &str, len: usize) -> String {
    let mut h = Sha256::new();
    h.update(text.as_bytes());
    let mut full = hex::encode(h.finalize());
    full.truncate(len.min(full.len()));
    full
}

/// Id of the `idx`-th chunk of a narrative document: `{KEY}_{idx}_{fp}`.
pub fn chunk_id(key: &EntityKey, idx: usize, text: &str) -> String {
    format!(
        "{}_{}_{}",
        key.as_str(),
        idx,
        content_fingerprint(text, FINGERPRINT_LEN)
    )
}

/// Id of one statement period: `{KEY}_{report_type}_{fiscal_date}`.
///
/// Content is deliberately not part of the id: a restated period replaces
/// the previous entry.
pub fn statement_id(key: &EntityKey, report_type: &str, fiscal_date: &str) -> String {
    format!("{}_{}_{}", key.as_str(), report_type, fiscal_date)
}
