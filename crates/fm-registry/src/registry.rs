use fm_schemas::{EntityKey, Identifiers, Jurisdiction};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use tracing::info;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A registry entry: jurisdiction plus its external identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisteredEntity {
    pub ticker: EntityKey,
    pub jurisdiction: Jurisdiction,
    pub identifiers: Identifiers,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier mandated by the jurisdiction was not supplied.
    MissingIdentifier {
        ticker: EntityKey,
        jurisdiction: Jurisdiction,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentifier {
                ticker,
                jurisdiction,
            } => match jurisdiction {
                Jurisdiction::Us => write!(f, "CIK is required for US companies (ticker {ticker})"),
                Jurisdiction::India => write!(
                    f,
                    "Scrip code is required for Indian companies (ticker {ticker})"
                ),
            },
        }
    }
}

impl std::error::Error for RegistryError {}

// ---------------------------------------------------------------------------
// Built-in seed
// ---------------------------------------------------------------------------

const US_SEED: &[(&str, &str)] = &[
    ("AAPL", "0000320193"),
    ("MSFT", "0000789019"),
    ("GOOGL", "0001652044"),
    ("AMZN", "0001018724"),
    ("META", "0001326801"),
    ("NVDA", "0001045810"),
    ("TSLA", "0001318605"),
    ("JPM", "0000019617"),
    ("V", "0001403161"),
    ("JNJ", "0000200406"),
];

const INDIA_SEED: &[(&str, &str)] = &[
    ("TCS", "532540"),
    ("RELIANCE", "500325"),
    ("INFY", "500209"),
    ("HDFCBANK", "500180"),
    ("ICICIBANK", "532174"),
    ("HINDUNILVR", "500696"),
    ("ITC", "500875"),
    ("SBIN", "500112"),
    ("BHARTIARTL", "532454"),
    ("KOTAKBANK", "500247"),
];

// ---------------------------------------------------------------------------
// EntityRegistry
// ---------------------------------------------------------------------------

/// Thread-safe catalogue of known entities.
///
/// Reads take a shared lock; [`register`](Self::register) takes the write
/// lock, so one registry can be held in an `Arc` and mutated at runtime.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: RwLock<BTreeMap<EntityKey, RegisteredEntity>>,
}

impl EntityRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in US (SEC) and India (BSE) listings.
    pub fn with_defaults() -> Self {
        let mut map = BTreeMap::new();
        let seeds = US_SEED
            .iter()
            .map(|(t, id)| (*t, Jurisdiction::Us, Identifiers::cik(*id)))
            .chain(
                INDIA_SEED
                    .iter()
                    .map(|(t, id)| (*t, Jurisdiction::India, Identifiers::scrip_code(*id))),
            );
        for (ticker, jurisdiction, identifiers) in seeds {
            if let Ok(ticker) = EntityKey::new(ticker) {
                map.insert(
                    ticker.clone(),
                    RegisteredEntity {
                        ticker,
                        jurisdiction,
                        identifiers,
                    },
                );
            }
        }
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Register (or overwrite) an entity.
    ///
    /// # Errors
    /// [`RegistryError::MissingIdentifier`] when the identifier mandated by
    /// `jurisdiction` is absent or blank.
    pub fn register(
        &self,
        ticker: EntityKey,
        jurisdiction: Jurisdiction,
        identifiers: Identifiers,
    ) -> Result<RegisteredEntity, RegistryError> {
        let identifiers = identifiers.normalized();
        if identifiers.for_jurisdiction(jurisdiction).is_none() {
            return Err(RegistryError::MissingIdentifier {
                ticker,
                jurisdiction,
            });
        }

        let entry = RegisteredEntity {
            ticker: ticker.clone(),
            jurisdiction,
            identifiers,
        };
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = map.insert(ticker, entry.clone()).is_some();
        info!(
            ticker = %entry.ticker,
            jurisdiction = %entry.jurisdiction,
            replaced,
            "entity registered"
        );
        Ok(entry)
    }

    /// Register every seed in order. Stops at the first invalid seed; seeds
    /// before it stay registered.
    pub fn seed_from<I>(&self, seeds: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = (EntityKey, Jurisdiction, Identifiers)>,
    {
        let mut n = 0;
        for (ticker, jurisdiction, identifiers) in seeds {
            self.register(ticker, jurisdiction, identifiers)?;
            n += 1;
        }
        Ok(n)
    }

    pub fn get(&self, ticker: &EntityKey) -> Option<RegisteredEntity> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ticker)
            .cloned()
    }

    pub fn contains(&self, ticker: &EntityKey) -> bool {
        self.get(ticker).is_some()
    }

    /// All registered tickers, sorted.
    pub fn list_keys(&self) -> Vec<EntityKey> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of all entries, sorted by ticker.
    pub fn list(&self) -> Vec<RegisteredEntity> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
