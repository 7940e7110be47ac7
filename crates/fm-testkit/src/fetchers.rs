use chrono::{DateTime, Utc};
use fm_fetch::{FetchError, FetchReceipt, FetchRequest, Fetcher};
use fm_schemas::{Component, ComponentKind, EntityKey, Jurisdiction};
use std::collections::BTreeMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use crate::fixtures::{write_india_filing_fixture, write_structured_fixture, write_us_filing_fixture};

// ---------------------------------------------------------------------------
// ScriptedFetcher
// ---------------------------------------------------------------------------

/// Fetcher double that writes real fixture artifacts.
///
/// Components registered with [`fail_on`](Self::fail_on) return the given
/// error and write nothing. Every call is logged in order.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    failures: BTreeMap<Component, FetchError>,
    fixed_now: Option<DateTime<Utc>>,
    calls: Mutex<Vec<(EntityKey, Component)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, component: Component, err: FetchError) -> Self {
        self.failures.insert(component, err);
        self
    }

    pub fn with_fixed_time(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn calls(&self) -> Vec<(EntityKey, Component)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fetched_components(&self) -> Vec<Component> {
        self.calls().into_iter().map(|(_, c)| c).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Fetcher for ScriptedFetcher {
    fn source_name(&self) -> &'static str {
        "scripted"
    }

    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchReceipt, FetchError> {
        let key = &req.entity.ticker;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((key.clone(), req.component));

        if let Some(err) = self.failures.get(&req.component) {
            return Err(err.clone());
        }

        let now = self.fixed_now.unwrap_or_else(Utc::now);
        let paths = match (req.component.kind(), req.entity.jurisdiction) {
            (ComponentKind::TimeSeries, _)
            | (ComponentKind::PeriodicStatement, _)
            | (ComponentKind::Profile, _) => {
                vec![write_structured_fixture(req.layout, key, req.component, now)?]
            }
            (ComponentKind::Document, Jurisdiction::Us) => {
                vec![write_us_filing_fixture(req.layout, key, now)?]
            }
            (ComponentKind::Document, Jurisdiction::India) => {
                write_india_filing_fixture(req.layout, key, now.date_naive())?
            }
        };

        Ok(FetchReceipt {
            component: req.component,
            source: self.source_name().to_string(),
            paths,
            items: 1,
            fetched_at: now,
        })
    }
}

// ---------------------------------------------------------------------------
// GatedFetcher
// ---------------------------------------------------------------------------

/// Wraps a fetcher; each call announces itself on `entered` and then waits
/// for one message on `release` before delegating.
pub struct GatedFetcher<F> {
    inner: F,
    entered: Mutex<Sender<Component>>,
    release: Mutex<Receiver<()>>,
}

impl<F: Fetcher> GatedFetcher<F> {
    pub fn new(inner: F, entered: Sender<Component>, release: Receiver<()>) -> Self {
        Self {
            inner,
            entered: Mutex::new(entered),
            release: Mutex::new(release),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: Fetcher> Fetcher for GatedFetcher<F> {
    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }

    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchReceipt, FetchError> {
        let _ = self
            .entered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(req.component);
        self.release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv()
            .map_err(|_| FetchError::Transport("gate closed".into()))?;
        self.inner.fetch(req)
    }
}
