use chrono::{DateTime, Utc};
use fm_schemas::{Component, ComponentKind, Jurisdiction, NarratedRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::writer::{write_filing_document, write_structured_artifact};
use crate::{FetchError, FetchReceipt, FetchRequest, Fetcher};

/// Imports payloads that were downloaded out of band into a staging inbox.
///
/// ```text
/// <staging>/<KEY>/<component>.json   JSON array of narrated records
/// <staging>/<KEY>/filing.txt         US filing text
/// <staging>/<KEY>/raw/*              India filings, copied as-is
/// ```
///
/// Artifacts are stamped with the import time. A missing payload is an
/// upstream "no data" error for that component only.
#[derive(Debug, Clone)]
pub struct StagingFetcher {
    root: PathBuf,
    fixed_now: Option<DateTime<Utc>>,
}

impl StagingFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fixed_now: None,
        }
    }

    /// Stamp every import with `now` instead of the wall clock.
    pub fn with_fixed_time(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    fn read_staged(path: &Path) -> Result<Vec<u8>, FetchError> {
        fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::Api {
                code: None,
                message: format!("no staged payload at {}", path.display()),
            },
            _ => FetchError::Io(format!("read {} failed: {e}", path.display())),
        })
    }

    fn import_structured(&self, req: &FetchRequest<'_>, dir: &Path) -> Result<FetchReceipt, FetchError> {
        let src = dir.join(format!("{}.json", req.component.as_str()));
        let raw = Self::read_staged(&src)?;
        let records: Vec<NarratedRecord> = serde_json::from_slice(&raw)
            .map_err(|e| FetchError::Decode(format!("{}: {e}", src.display())))?;

        let now = self.now();
        let items = records.len();
        let path = write_structured_artifact(
            req.layout,
            &req.entity.ticker,
            req.component,
            self.source_name(),
            records,
            now,
        )?;
        Ok(FetchReceipt {
            component: req.component,
            source: self.source_name().to_string(),
            paths: vec![path],
            items,
            fetched_at: now,
        })
    }

    fn import_us_filing(&self, req: &FetchRequest<'_>, dir: &Path) -> Result<FetchReceipt, FetchError> {
        let src = dir.join("filing.txt");
        let raw = Self::read_staged(&src)?;
        let text = String::from_utf8(raw)
            .map_err(|e| FetchError::Decode(format!("{}: {e}", src.display())))?;

        let now = self.now();
        let path = write_filing_document(
            req.layout,
            &req.entity.ticker,
            self.source_name(),
            &text,
            None,
            now,
        )?;
        Ok(FetchReceipt {
            component: req.component,
            source: self.source_name().to_string(),
            paths: vec![path],
            items: 1,
            fetched_at: now,
        })
    }

    fn import_india_filings(&self, req: &FetchRequest<'_>, dir: &Path) -> Result<FetchReceipt, FetchError> {
        let src = dir.join("raw");
        let entries = match fs::read_dir(&src) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FetchError::Api {
                    code: None,
                    message: format!("no staged filings at {}", src.display()),
                })
            }
            Err(e) => return Err(FetchError::Io(format!("read {} failed: {e}", src.display()))),
        };

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FetchError::Io(e.to_string()))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        if files.is_empty() {
            return Err(FetchError::Api {
                code: None,
                message: format!("no staged filings at {}", src.display()),
            });
        }

        let dest_dir = req.layout.raw_filings_dir(&req.entity.ticker);
        fs::create_dir_all(&dest_dir)
            .map_err(|e| FetchError::Io(format!("create {} failed: {e}", dest_dir.display())))?;

        let mut paths = Vec::with_capacity(files.len());
        for file in &files {
            let Some(name) = file.file_name() else { continue };
            let dest = dest_dir.join(name);
            let tmp = dest_dir.join(format!(".{}.tmp-{}", name.to_string_lossy(), std::process::id()));
            fs::copy(file, &tmp)
                .and_then(|_| fs::rename(&tmp, &dest))
                .map_err(|e| {
                    let _ = fs::remove_file(&tmp);
                    FetchError::Io(format!("import {} failed: {e}", file.display()))
                })?;
            paths.push(dest);
        }

        let items = paths
            .iter()
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
            })
            .count();
        info!(ticker = %req.entity.ticker, files = paths.len(), pdfs = items, "staged india filings imported");

        Ok(FetchReceipt {
            component: req.component,
            source: self.source_name().to_string(),
            paths,
            items,
            fetched_at: self.now(),
        })
    }
}

impl Fetcher for StagingFetcher {
    fn source_name(&self) -> &'static str {
        "staging"
    }

    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchReceipt, FetchError> {
        let dir = self.root.join(req.entity.ticker.as_str());
        match (req.component.kind(), req.entity.jurisdiction) {
            (ComponentKind::TimeSeries, _)
            | (ComponentKind::PeriodicStatement, _)
            | (ComponentKind::Profile, _) => self.import_structured(req, &dir),
            (ComponentKind::Document, Jurisdiction::Us) => self.import_us_filing(req, &dir),
            (ComponentKind::Document, Jurisdiction::India) => self.import_india_filings(req, &dir),
        }
    }
}

impl StagingFetcher {
    /// Components with a staged payload for `key`, in canonical order.
    pub fn staged_components(&self, key: &fm_schemas::EntityKey) -> Vec<Component> {
        let dir = self.root.join(key.as_str());
        let mut out: Vec<Component> = Component::STRUCTURED
            .iter()
            .copied()
            .filter(|c| dir.join(format!("{}.json", c.as_str())).is_file())
            .collect();
        if dir.join("filing.txt").is_file() || dir.join("raw").is_dir() {
            out.push(Component::Unstructured);
        }
        out
    }
}
