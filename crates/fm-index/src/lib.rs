//! fm-index
//!
//! Projects an entity's on-disk artifacts into a vector index.
//!
//! The projection is a pure function of the artifacts: every entry id comes
//! from `fm-identity`, so re-indexing the same files overwrites the same
//! entries. Indexing is always whole-entity; there are no deltas.
//!
//! Seams:
//! - [`MirrorIndexer`]: what the reconciliation engine calls.
//! - [`Embedder`]: text → vectors ([`HashingEmbedder`] ships here).
//! - [`VectorStore`]: namespaced upsert ([`InMemoryVectorStore`],
//!   [`JsonFileVectorStore`]).

mod chunker;
mod embedder;
mod error;
mod indexer;
mod store;

pub use chunker::{chunk_text, ChunkConfig};
pub use embedder::{Embedder, HashingEmbedder};
pub use error::IndexError;
pub use indexer::{DiskMirrorIndexer, IndexSummary, IndexerConfig, MirrorIndexer};
pub use store::{
    DataCategory, EntryMetadata, IndexEntry, InMemoryVectorStore, JsonFileVectorStore, VectorStore,
};
