//! fm-testkit
//!
//! Test doubles and fixtures for reconciliation scenarios:
//! - [`ScriptedFetcher`]: writes real artifacts, fails where told, logs calls.
//! - [`GatedFetcher`]: parks inside `fetch` until released.
//! - [`CountingIndexer`] / [`FailingIndexer`]: observe indexing calls.
//! - fixture writers with explicit fetched-at timestamps.

mod fetchers;
mod fixtures;
mod indexers;

pub use fetchers::{GatedFetcher, ScriptedFetcher};
pub use fixtures::{
    default_resolver, resolved, write_india_filing_fixture, write_structured_fixture,
    write_us_filing_fixture, LONG_NARRATIVE,
};
pub use indexers::{CountingIndexer, FailingIndexer};
