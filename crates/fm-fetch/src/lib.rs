//! fm-fetch
//!
//! Fetch boundary: the [`Fetcher`] contract, routing of components to the
//! right upstream ([`FetcherSet`]), canonical artifact writers, and the
//! [`StagingFetcher`] which imports pre-downloaded payloads.
//!
//! Concrete network clients (market data, SEC EDGAR, BSE) implement
//! [`Fetcher`] outside this crate.

mod error;
mod fetcher;
mod staging;
mod writer;

pub use error::FetchError;
pub use fetcher::{FetchReceipt, FetchRequest, Fetcher, FetcherSet};
pub use staging::StagingFetcher;
pub use writer::{
    write_filing_document, write_raw_filing, write_structured_artifact, RawFiling,
};
