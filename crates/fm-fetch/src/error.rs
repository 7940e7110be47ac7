use fm_schemas::{EntityKey, Jurisdiction};
use std::fmt;

/// Errors a [`Fetcher`](crate::Fetcher) may return.
///
/// Every variant is isolated to the component being fetched; the engine
/// records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or transport failure.
    Transport(String),
    /// The upstream returned an application-level error (or had no data).
    Api { code: Option<i64>, message: String },
    /// A payload could not be decoded.
    Decode(String),
    /// A required configuration value is missing or invalid.
    Config(String),
    /// The jurisdiction's identifier is needed for this fetch but absent.
    MissingIdentifier {
        ticker: EntityKey,
        jurisdiction: Jurisdiction,
    },
    /// Writing the artifact failed.
    Io(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchError::Api {
                code: Some(c),
                message,
            } => write!(f, "upstream api error code={c}: {message}"),
            FetchError::Api {
                code: None,
                message,
            } => write!(f, "upstream api error: {message}"),
            FetchError::Decode(msg) => write!(f, "decode error: {msg}"),
            FetchError::Config(msg) => write!(f, "config error: {msg}"),
            FetchError::MissingIdentifier {
                ticker,
                jurisdiction: Jurisdiction::Us,
            } => write!(f, "CIK required for US company {ticker}"),
            FetchError::MissingIdentifier {
                ticker,
                jurisdiction: Jurisdiction::India,
            } => write!(f, "Scrip code required for Indian company {ticker}"),
            FetchError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<anyhow::Error> for FetchError {
    fn from(e: anyhow::Error) -> Self {
        FetchError::Io(format!("{e:#}"))
    }
}
