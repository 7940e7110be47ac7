use fm_identity::{chunk_id, statement_id};
use fm_schemas::{
    filing_date_from_name, Component, EntityKey, EntityLayout, FilingDocument, StructuredArtifact,
};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{
    chunk_text, ChunkConfig, DataCategory, Embedder, EntryMetadata, IndexEntry, IndexError,
    VectorStore,
};

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Re-projects one entity's artifacts into the index.
///
/// Implementations must be idempotent: indexing unchanged artifacts twice
/// leaves the index as after the first call.
pub trait MirrorIndexer: Send + Sync {
    fn index_entity(&self, key: &EntityKey) -> Result<IndexSummary, IndexError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub namespace: String,
    pub narrative_entries: usize,
    pub statement_entries: usize,
    /// Units dropped for being too short to be meaningful.
    pub skipped_units: usize,
    /// Artifacts that could not be parsed and were left out of the projection.
    pub malformed_artifacts: usize,
}

impl IndexSummary {
    pub fn total_entries(&self) -> usize {
        self.narrative_entries + self.statement_entries
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexerConfig {
    pub chunk: ChunkConfig,
    /// Texts per embedder call / store upsert.
    pub batch_size: usize,
    /// Units whose trimmed length is at most this many chars are skipped.
    pub min_text_chars: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            batch_size: 32,
            min_text_chars: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// DiskMirrorIndexer
// ---------------------------------------------------------------------------

struct Unit {
    id: String,
    text: String,
    source: Option<String>,
    category: DataCategory,
    report_type: Option<String>,
    fiscal_date: Option<String>,
}

/// Scans `<data_dir>/<KEY>/` and upserts every derivable entry.
pub struct DiskMirrorIndexer<E, S> {
    layout: EntityLayout,
    embedder: E,
    store: S,
    config: IndexerConfig,
}

impl<E: Embedder, S: VectorStore> DiskMirrorIndexer<E, S> {
    pub fn new(layout: EntityLayout, embedder: E, store: S, config: IndexerConfig) -> Self {
        Self {
            layout,
            embedder,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &EntityLayout {
        &self.layout
    }

    fn narrative_units(
        &self,
        key: &EntityKey,
        text: &str,
        source: Option<String>,
        fiscal_date: Option<String>,
    ) -> Vec<Unit> {
        chunk_text(text, &self.config.chunk)
            .into_iter()
            .enumerate()
            .map(|(idx, chunk)| Unit {
                id: chunk_id(key, idx, &chunk),
                text: chunk,
                source: source.clone(),
                category: DataCategory::Narrative,
                report_type: None,
                fiscal_date: fiscal_date.clone(),
            })
            .collect()
    }

    fn filing_document_units(
        &self,
        key: &EntityKey,
        malformed: &mut usize,
    ) -> Result<Vec<Unit>, IndexError> {
        let path = self.layout.filing_document(key);
        let Some(raw) = read_optional(&path)? else {
            debug!(ticker = %key, "no filing document; skipping");
            return Ok(Vec::new());
        };
        let doc: FilingDocument = match serde_json::from_slice(&raw) {
            Ok(d) => d,
            Err(e) => {
                skip_malformed(&path, &e, malformed);
                return Ok(Vec::new());
            }
        };
        Ok(self.narrative_units(key, &doc.text, Some(doc.source), doc.filing_date))
    }

    fn raw_text_units(
        &self,
        key: &EntityKey,
        malformed: &mut usize,
    ) -> Result<Vec<Unit>, IndexError> {
        let dir = self.layout.raw_filings_dir(key);
        let entries = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(ticker = %key, "no raw filings; skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(IndexError::Io { path: dir, source: e }),
        };

        let mut sidecars: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| IndexError::Io {
                    path: dir.clone(),
                    source: e,
                })?
                .path();
            let is_txt = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
            if is_txt && path.is_file() {
                sidecars.push(path);
            }
        }
        sidecars.sort();

        let mut units = Vec::new();
        for path in sidecars {
            let text = match fs::read_to_string(&path) {
                Ok(t) => t,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    skip_malformed(&path, &e, malformed);
                    continue;
                }
                Err(e) => return Err(IndexError::Io { path, source: e }),
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let date = filing_date_from_name(&path).map(|d| d.format("%Y-%m-%d").to_string());
            units.extend(self.narrative_units(key, &text, name, date));
        }
        Ok(units)
    }

    /// One unit per (report_type, date) across every structured artifact.
    fn statement_units(
        &self,
        key: &EntityKey,
        malformed: &mut usize,
    ) -> Result<Vec<Unit>, IndexError> {
        // First-seen order; the source of a group is the first artifact to contribute.
        let mut groups: Vec<((String, String), Option<String>, Vec<String>)> = Vec::new();
        for component in Component::STRUCTURED {
            let path = self.layout.structured_artifact(key, component);
            let Some(raw) = read_optional(&path)? else {
                continue;
            };
            let artifact: StructuredArtifact = match serde_json::from_slice(&raw) {
                Ok(a) => a,
                Err(e) => {
                    skip_malformed(&path, &e, malformed);
                    continue;
                }
            };

            let source = (!artifact.meta.source.is_empty()).then(|| artifact.meta.source.clone());
            for rec in artifact.records {
                let k = (rec.metadata.report_type, rec.metadata.date);
                match groups.iter_mut().find(|(gk, _, _)| *gk == k) {
                    Some((_, _, texts)) => texts.push(rec.text),
                    None => groups.push((k, source.clone(), vec![rec.text])),
                }
            }
        }

        Ok(groups
            .into_iter()
            .map(|((report_type, date), source, texts)| Unit {
                id: statement_id(key, &report_type, &date),
                text: texts.join("\n"),
                source,
                category: DataCategory::NarratedNumeric,
                report_type: Some(report_type),
                fiscal_date: Some(date),
            })
            .collect())
    }

    fn upsert_batch(&self, key: &EntityKey, batch: Vec<Unit>) -> Result<usize, IndexError> {
        let texts: Vec<String> = batch.iter().map(|u| u.text.clone()).collect();
        let vectors = self.embedder.embed(&texts)?;
        if vectors.len() != batch.len() {
            return Err(IndexError::Embed(format!(
                "expected {} vectors, got {}",
                batch.len(),
                vectors.len()
            )));
        }

        let entries: Vec<IndexEntry> = batch
            .into_iter()
            .zip(vectors)
            .map(|(u, vector)| IndexEntry {
                id: u.id,
                namespace: key.as_str().to_string(),
                vector,
                metadata: EntryMetadata {
                    ticker: key.as_str().to_string(),
                    text: u.text,
                    source: u.source,
                    data_category: u.category,
                    report_type: u.report_type,
                    fiscal_date: u.fiscal_date,
                },
            })
            .collect();
        self.store.upsert(key.as_str(), entries)
    }
}

impl<E: Embedder, S: VectorStore> MirrorIndexer for DiskMirrorIndexer<E, S> {
    fn index_entity(&self, key: &EntityKey) -> Result<IndexSummary, IndexError> {
        let mut malformed = 0;
        let mut units = self.filing_document_units(key, &mut malformed)?;
        units.extend(self.raw_text_units(key, &mut malformed)?);
        units.extend(self.statement_units(key, &mut malformed)?);

        let mut summary = IndexSummary {
            namespace: key.as_str().to_string(),
            malformed_artifacts: malformed,
            ..IndexSummary::default()
        };

        let min = self.config.min_text_chars;
        let mut kept = Vec::with_capacity(units.len());
        for u in units {
            if u.text.trim().chars().count() <= min {
                summary.skipped_units += 1;
                continue;
            }
            match u.category {
                DataCategory::Narrative => summary.narrative_entries += 1,
                DataCategory::NarratedNumeric => summary.statement_entries += 1,
            }
            kept.push(u);
        }

        let batch_size = self.config.batch_size.max(1);
        let mut iter = kept.into_iter().peekable();
        while iter.peek().is_some() {
            let batch: Vec<Unit> = iter.by_ref().take(batch_size).collect();
            self.upsert_batch(key, batch)?;
        }

        info!(
            ticker = %key,
            narrative = summary.narrative_entries,
            statements = summary.statement_entries,
            skipped = summary.skipped_units,
            malformed = summary.malformed_artifacts,
            "entity indexed"
        );
        Ok(summary)
    }
}

fn skip_malformed(path: &Path, err: &dyn std::fmt::Display, malformed: &mut usize) {
    warn!(path = %path.display(), error = %err, "malformed artifact left out of the index");
    *malformed += 1;
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, IndexError> {
    match fs::read(path) {
        Ok(b) => Ok(Some(b)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IndexError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
