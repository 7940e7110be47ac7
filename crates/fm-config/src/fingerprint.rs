use anyhow::{Context, Result};
use fm_identity::content_fingerprint;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Full SHA-256 hex length.
const HASH_LEN: usize = 64;
/// Prefix used in log lines.
const SHORT_LEN: usize = 12;

/// Identity of a merged configuration.
///
/// `canonical_json` is the compact serialization with object keys sorted
/// (serde_json's default map), so key order in the YAML never matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFingerprint {
    pub hash: String,
    pub canonical_json: String,
}

impl ConfigFingerprint {
    pub fn of(config: &Value) -> Result<Self> {
        let canonical_json =
            serde_json::to_string(config).context("canonical config serialization failed")?;
        Ok(Self {
            hash: content_fingerprint(&canonical_json, HASH_LEN),
            canonical_json,
        })
    }

    pub fn short(&self) -> &str {
        &self.hash[..SHORT_LEN.min(self.hash.len())]
    }
}

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}
