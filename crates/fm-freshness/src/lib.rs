//! fm-freshness
//!
//! Decides, per entity and component, whether the on-disk artifact exists
//! and is still within its freshness policy.
//!
//! # Invariants
//!
//! - **Pure function of disk + `now`**: nothing is cached, nothing is written.
//! - **Fail-safe-stale**: an artifact whose fetched-at timestamp is absent,
//!   unparseable, or sits in a corrupt document is reported as existing but
//!   stale. Malformed content never produces an error.
//! - **Errors mean inaccessible storage**: only I/O failures other than
//!   not-found surface as [`FreshnessError`].

mod evaluate;
mod result;

pub use evaluate::{entity_folder_exists, evaluate, evaluate_all};
pub use result::{FreshnessError, FreshnessResult};
