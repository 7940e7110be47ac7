use chrono::{DateTime, Utc};
use fm_registry::ResolvedEntity;
use fm_schemas::{Component, ComponentKind, EntityLayout, Jurisdiction};
use std::path::PathBuf;
use std::sync::Arc;

use crate::FetchError;

// ---------------------------------------------------------------------------
// Request / receipt
// ---------------------------------------------------------------------------

/// One component of one resolved entity, to be written under `layout`.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub entity: &'a ResolvedEntity,
    pub component: Component,
    pub layout: &'a EntityLayout,
}

/// What a successful fetch wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReceipt {
    pub component: Component,
    pub source: String,
    /// Files written (or replaced), in write order.
    pub paths: Vec<PathBuf>,
    /// Records (structured) or documents (filings) written.
    pub items: usize,
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Fetcher trait
// ---------------------------------------------------------------------------

/// Upstream data source contract.
///
/// A fetch retrieves the latest version of one component and persists it as
/// a canonical on-disk artifact stamped with the fetch time. Partial writes
/// must not be observable: use the writers in this crate.
pub trait Fetcher: Send + Sync {
    /// Short name recorded in artifacts (e.g. `"yfinance"`, `"sec_edgar"`).
    fn source_name(&self) -> &'static str;

    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchReceipt, FetchError>;
}

// ---------------------------------------------------------------------------
// FetcherSet
// ---------------------------------------------------------------------------

/// The three upstreams, routed by component kind and jurisdiction.
#[derive(Clone)]
pub struct FetcherSet {
    /// Prices, statements and profile, both jurisdictions.
    pub market: Arc<dyn Fetcher>,
    /// US filing documents (SEC).
    pub us_filings: Arc<dyn Fetcher>,
    /// India filing documents (BSE).
    pub india_filings: Arc<dyn Fetcher>,
}

impl FetcherSet {
    /// One fetcher for every route. Handy for local staging imports and tests.
    pub fn uniform(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            market: Arc::clone(&fetcher),
            us_filings: Arc::clone(&fetcher),
            india_filings: fetcher,
        }
    }

    pub fn route(&self, component: Component, jurisdiction: Jurisdiction) -> &dyn Fetcher {
        match (component.kind(), jurisdiction) {
            (ComponentKind::TimeSeries, _)
            | (ComponentKind::PeriodicStatement, _)
            | (ComponentKind::Profile, _) => self.market.as_ref(),
            (ComponentKind::Document, Jurisdiction::Us) => self.us_filings.as_ref(),
            (ComponentKind::Document, Jurisdiction::India) => self.india_filings.as_ref(),
        }
    }

    /// Route and fetch. Filing fetches need the jurisdiction's identifier;
    /// without it the upstream is not called.
    pub fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchReceipt, FetchError> {
        let jurisdiction = req.entity.jurisdiction;
        if req.component.kind() == ComponentKind::Document
            && req.entity.identifiers.for_jurisdiction(jurisdiction).is_none()
        {
            return Err(FetchError::MissingIdentifier {
                ticker: req.entity.ticker.clone(),
                jurisdiction,
            });
        }
        self.route(req.component, jurisdiction).fetch(req)
    }
}

impl std::fmt::Debug for FetcherSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherSet")
            .field("market", &self.market.source_name())
            .field("us_filings", &self.us_filings.source_name())
            .field("india_filings", &self.india_filings.source_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_schemas::{EntityKey, Identifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Named(&'static str, AtomicUsize);

    impl Fetcher for Named {
        fn source_name(&self) -> &'static str {
            self.0
        }
        fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchReceipt, FetchError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Ok(FetchReceipt {
                component: req.component,
                source: self.0.to_string(),
                paths: Vec::new(),
                items: 0,
                fetched_at: Utc::now(),
            })
        }
    }

    fn set() -> (FetcherSet, [Arc<Named>; 3]) {
        let m = Arc::new(Named("market", AtomicUsize::new(0)));
        let u = Arc::new(Named("sec", AtomicUsize::new(0)));
        let i = Arc::new(Named("bse", AtomicUsize::new(0)));
        let s = FetcherSet {
            market: m.clone(),
            us_filings: u.clone(),
            india_filings: i.clone(),
        };
        (s, [m, u, i])
    }

    fn entity(ticker: &str, jurisdiction: Jurisdiction, ids: Identifiers) -> ResolvedEntity {
        ResolvedEntity {
            ticker: EntityKey::new(ticker).unwrap(),
            jurisdiction,
            identifiers: ids,
            from_registry: false,
        }
    }

    #[test]
    fn routes_by_kind_and_jurisdiction() {
        let (s, _) = set();
        assert_eq!(s.route(Component::Price, Jurisdiction::India).source_name(), "market");
        assert_eq!(s.route(Component::Info, Jurisdiction::Us).source_name(), "market");
        assert_eq!(s.route(Component::Unstructured, Jurisdiction::Us).source_name(), "sec");
        assert_eq!(
            s.route(Component::Unstructured, Jurisdiction::India).source_name(),
            "bse"
        );
    }

    #[test]
    fn document_fetch_without_identifier_skips_upstream() {
        let (s, [_, sec, _]) = set();
        let layout = EntityLayout::new("/nonexistent");
        let e = entity("ORCL", Jurisdiction::Us, Identifiers::scrip_code("1"));

        let err = s
            .fetch(&FetchRequest {
                entity: &e,
                component: Component::Unstructured,
                layout: &layout,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "CIK required for US company ORCL");
        assert_eq!(sec.1.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn structured_fetch_does_not_need_identifier() {
        let (s, [market, _, _]) = set();
        let layout = EntityLayout::new("/nonexistent");
        let e = entity("ORCL", Jurisdiction::Us, Identifiers::default());

        s.fetch(&FetchRequest {
            entity: &e,
            component: Component::Price,
            layout: &layout,
        })
        .unwrap();
        assert_eq!(market.1.load(Ordering::SeqCst), 1);
    }
}
