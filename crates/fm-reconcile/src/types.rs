use fm_freshness::FreshnessResult;
use fm_index::IndexSummary;
use fm_registry::Overrides;
use fm_schemas::{Component, Jurisdiction};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::Checklist;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// Raw ticker as supplied by the caller; normalized by the engine.
    pub ticker: String,
    /// `None` means every component.
    pub checklist: Option<Checklist>,
    pub overrides: Overrides,
    /// Treat every checklisted component as stale.
    pub force_refresh: bool,
}

impl ReconcileRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    pub fn with_checklist(mut self, checklist: Checklist) -> Self {
        self.checklist = Some(checklist);
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn force(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Entity folder did not exist.
    FullOnboarding,
    /// Folder existed, caller forced a refresh.
    ForcedRefresh,
    /// Folder existed, only missing/stale components fetched.
    Incremental,
}

impl ReconcileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileMode::FullOnboarding => "full_onboarding",
            ReconcileMode::ForcedRefresh => "forced_refresh",
            ReconcileMode::Incremental => "incremental",
        }
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of one reconciliation call. Returned, logged, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub run_id: Uuid,
    /// Hash of the configuration the engine was built from, when known.
    pub config_hash: Option<String>,
    /// Normalized ticker, even when it could not be resolved.
    pub ticker: String,
    pub jurisdiction: Option<Jurisdiction>,
    pub mode: Option<ReconcileMode>,
    pub folder_existed: bool,
    /// Component → was fresh. `false` everywhere on onboarding/forced runs.
    pub components_checked: BTreeMap<Component, bool>,
    /// Per-component freshness detail (incremental runs only).
    pub freshness: Vec<FreshnessResult>,
    pub components_updated: Vec<Component>,
    pub components_indexed: Vec<Component>,
    pub index_summary: Option<IndexSummary>,
    pub errors: Vec<String>,
}

impl ReconcileResult {
    pub(crate) fn empty(run_id: Uuid, ticker: String) -> Self {
        Self {
            run_id,
            config_hash: None,
            ticker,
            jurisdiction: None,
            mode: None,
            folder_existed: false,
            components_checked: BTreeMap::new(),
            freshness: Vec::new(),
            components_updated: Vec::new(),
            components_indexed: Vec::new(),
            index_summary: None,
            errors: Vec::new(),
        }
    }

    /// No errors, or at least something made it into the index.
    ///
    /// A run that indexed three components but failed a fourth counts as a
    /// success; `errors` carries the failure.
    pub fn success(&self) -> bool {
        self.errors.is_empty() || !self.components_indexed.is_empty()
    }

    /// Everything was already fresh.
    pub fn is_noop(&self) -> bool {
        self.errors.is_empty() && self.components_updated.is_empty()
    }

    /// Errors occurred and nothing was updated.
    pub fn is_total_failure(&self) -> bool {
        !self.errors.is_empty() && self.components_updated.is_empty()
    }
}
