//! On-disk artifact document shapes.
//!
//! Every artifact embeds exactly one fetched-at timestamp:
//! - structured artifacts under `_meta.fetched_at`
//! - the US filing document at top-level `fetched_at`
//!
//! Timestamps are stored as strings (not `DateTime`) so a malformed value
//! still deserializes and can be judged stale instead of failing the read.

use serde::{Deserialize, Serialize};

use crate::{Component, EntityKey, Jurisdiction};

/// JSON pointer of the fetched-at field inside a structured artifact.
pub const FETCHED_AT_POINTER: &str = "/_meta/fetched_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub fetched_at: String,
    #[serde(default)]
    pub source: String,
    pub component: Component,
}

/// Descriptive metadata for one narrated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Statement / report type (`income_stmt`, `price`, ...).
    pub report_type: String,
    /// Fiscal period or observation date, `YYYY-MM-DD`.
    pub date: String,
}

/// A single narrated line of structured data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarratedRecord {
    pub text: String,
    pub metadata: RecordMetadata,
}

/// `structured/<component>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredArtifact {
    #[serde(rename = "_meta")]
    pub meta: ArtifactMeta,
    #[serde(default)]
    pub records: Vec<NarratedRecord>,
}

/// `unstructured/data.json`: one filing with its extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingDocument {
    pub ticker: EntityKey,
    pub source: String,
    pub jurisdiction: Jurisdiction,
    pub fetched_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<String>,
    pub text: String,
}
