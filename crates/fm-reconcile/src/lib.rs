//! fm-reconcile
//!
//! Reconciliation engine: brings one entity's on-disk mirror and its vector
//! index up to date.
//!
//! - Folder missing: full onboarding, fetch every checklisted component.
//! - Folder present: fetch only what is missing or stale, unless forced.
//! - Anything fetched: re-index the whole entity once.
//!
//! Failures are isolated per component and reported in the result;
//! [`ReconcileEngine::reconcile`] never returns `Err`. Artifacts already
//! written stay on disk when indexing fails.
//!
//! Concurrent calls for the same entity inside one process are refused by an
//! in-flight guard. Exclusion across processes sharing a data directory is
//! the operator's responsibility.

mod checklist;
mod engine;
mod guard;
mod types;

pub use checklist::{Checklist, ChecklistError};
pub use engine::ReconcileEngine;
pub use types::{ReconcileMode, ReconcileRequest, ReconcileResult};
