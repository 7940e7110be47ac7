use chrono::{DateTime, Utc};
use fm_fetch::{FetchRequest, FetcherSet};
use fm_freshness::{entity_folder_exists, evaluate_all};
use fm_index::MirrorIndexer;
use fm_registry::{EntityResolver, ResolvedEntity};
use fm_schemas::{Component, EntityKey, EntityLayout, FreshnessPolicies};
use std::sync::Arc;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::guard::InFlight;
use crate::{Checklist, ReconcileMode, ReconcileRequest, ReconcileResult};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Orchestrates resolve → freshness → fetch → index for one entity per call.
///
/// `Send + Sync`: one engine may serve many threads, each reconciling a
/// different entity.
pub struct ReconcileEngine {
    resolver: EntityResolver,
    layout: EntityLayout,
    policies: FreshnessPolicies,
    fetchers: FetcherSet,
    indexer: Arc<dyn MirrorIndexer>,
    clock: Clock,
    in_flight: InFlight,
    config_hash: Option<String>,
}

impl ReconcileEngine {
    pub fn new(
        resolver: EntityResolver,
        layout: EntityLayout,
        fetchers: FetcherSet,
        indexer: Arc<dyn MirrorIndexer>,
    ) -> Self {
        Self {
            resolver,
            layout,
            policies: FreshnessPolicies::default(),
            fetchers,
            indexer,
            clock: Arc::new(Utc::now),
            in_flight: InFlight::default(),
            config_hash: None,
        }
    }

    pub fn with_policies(mut self, policies: FreshnessPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Replace the wall clock used for freshness decisions.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Stamp every result with the hash of the configuration in effect.
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn layout(&self) -> &EntityLayout {
        &self.layout
    }

    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    pub fn policies(&self) -> &FreshnessPolicies {
        &self.policies
    }

    /// Bring one entity up to date. Never fails; see [`ReconcileResult`].
    pub fn reconcile(&self, req: &ReconcileRequest) -> ReconcileResult {
        let run_id = Uuid::new_v4();
        let normalized = req.ticker.trim().to_ascii_uppercase();
        let config = self.config_hash.as_deref().unwrap_or("none");
        let span = info_span!("reconcile", %run_id, ticker = %normalized, config);
        let _enter = span.enter();

        let mut result = ReconcileResult::empty(run_id, normalized);
        result.config_hash = self.config_hash.clone();

        let key = match EntityKey::new(&req.ticker) {
            Ok(k) => k,
            Err(e) => {
                warn!(error = %e, "invalid ticker");
                result.errors.push(e.to_string());
                return result;
            }
        };

        let entity = match self.resolver.resolve(&key, &req.overrides) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "entity could not be resolved");
                result.errors.push(e.to_string());
                return result;
            }
        };
        result.jurisdiction = Some(entity.jurisdiction);

        let Some(_claim) = self.in_flight.try_claim(&key) else {
            warn!("concurrent reconciliation refused");
            result
                .errors
                .push(format!("reconciliation already in progress for {key}"));
            return result;
        };

        let checklist = req.checklist.clone().unwrap_or_default();
        self.run(&entity, &checklist, req.force_refresh, &mut result);
        result
    }

    fn run(
        &self,
        entity: &ResolvedEntity,
        checklist: &Checklist,
        force_refresh: bool,
        result: &mut ReconcileResult,
    ) {
        let key = &entity.ticker;
        let components = checklist.components();

        result.folder_existed = entity_folder_exists(&self.layout, key);
        let mode = match (result.folder_existed, force_refresh) {
            (false, _) => ReconcileMode::FullOnboarding,
            (true, true) => ReconcileMode::ForcedRefresh,
            (true, false) => ReconcileMode::Incremental,
        };
        result.mode = Some(mode);
        info!(
            %mode,
            jurisdiction = %entity.jurisdiction,
            components = components.len(),
            "reconciliation started"
        );

        let to_fetch = match mode {
            ReconcileMode::FullOnboarding | ReconcileMode::ForcedRefresh => {
                for c in &components {
                    result.components_checked.insert(*c, false);
                }
                components
            }
            ReconcileMode::Incremental => self.stale_components(entity, &components, result),
        };

        for component in to_fetch {
            self.fetch_one(entity, component, result);
        }

        if result.components_updated.is_empty() {
            info!(errors = result.errors.len(), "nothing updated; index untouched");
            return;
        }

        match self.indexer.index_entity(key) {
            Ok(summary) => {
                result.components_indexed = result.components_updated.clone();
                info!(
                    entries = summary.total_entries(),
                    skipped = summary.skipped_units,
                    "index updated"
                );
                result.index_summary = Some(summary);
            }
            Err(e) => {
                warn!(error = %e, "indexing failed; artifacts kept on disk");
                result.errors.push(format!("Error indexing: {e}"));
            }
        }

        info!(
            updated = result.components_updated.len(),
            indexed = result.components_indexed.len(),
            errors = result.errors.len(),
            success = result.success(),
            "reconciliation finished"
        );
    }

    /// Evaluate freshness; return the components that need fetching.
    fn stale_components(
        &self,
        entity: &ResolvedEntity,
        components: &[Component],
        result: &mut ReconcileResult,
    ) -> Vec<Component> {
        let now = (self.clock)();
        let mut stale = Vec::new();

        let evaluated = evaluate_all(
            &self.layout,
            &entity.ticker,
            entity.jurisdiction,
            components,
            &self.policies,
            now,
        );
        for (component, outcome) in evaluated {
            match outcome {
                Ok(fr) => {
                    info!(component = component.as_str(), "{fr}");
                    result.components_checked.insert(component, fr.is_fresh);
                    if fr.needs_fetch() {
                        stale.push(component);
                    }
                    result.freshness.push(fr);
                }
                Err(e) => {
                    warn!(component = component.as_str(), error = %e, "freshness check failed");
                    result.components_checked.insert(component, false);
                    result.errors.push(format!("Error checking {component}: {e}"));
                }
            }
        }
        stale
    }

    fn fetch_one(&self, entity: &ResolvedEntity, component: Component, result: &mut ReconcileResult) {
        let req = FetchRequest {
            entity,
            component,
            layout: &self.layout,
        };
        match self.fetchers.fetch(&req) {
            Ok(receipt) => {
                info!(
                    component = component.as_str(),
                    source = %receipt.source,
                    items = receipt.items,
                    "component fetched"
                );
                result.components_updated.push(component);
            }
            Err(e) => {
                warn!(component = component.as_str(), error = %e, "fetch failed");
                result.errors.push(format!("Error fetching {component}: {e}"));
            }
        }
    }
}

impl std::fmt::Debug for ReconcileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileEngine")
            .field("layout", &self.layout)
            .field("policies", &self.policies)
            .field("fetchers", &self.fetchers)
            .field("config_hash", &self.config_hash)
            .finish_non_exhaustive()
    }
}
