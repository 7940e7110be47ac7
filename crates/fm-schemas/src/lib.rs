//! fm-schemas
//!
//! Shared data model for the control plane: entity keys, jurisdictions,
//! data components, on-disk artifact shapes, the per-entity disk layout and
//! the fetched-at timestamp codec.
//!
//! Pure types. The only IO here is path construction; reading and writing
//! artifacts lives in `fm-freshness` and `fm-fetch`.

mod artifact;
mod component;
mod entity;
mod filing_date;
mod layout;
mod policy;
mod time;

pub use artifact::{
    ArtifactMeta, FilingDocument, NarratedRecord, RecordMetadata, StructuredArtifact,
    FETCHED_AT_POINTER,
};
pub use component::{Component, ComponentKind, ParseComponentError};
pub use entity::{EntityKey, Identifiers, InvalidEntityKey, Jurisdiction, ParseJurisdictionError};
pub use filing_date::filing_date_from_name;
pub use layout::EntityLayout;
pub use policy::{FreshnessPolicies, InvalidPolicy};
pub use time::{format_fetched_at, parse_fetched_at};
