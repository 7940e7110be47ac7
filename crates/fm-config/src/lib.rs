//! fm-config
//!
//! Layered YAML configuration for the control plane.
//!
//! - Documents are merged in order; later layers override earlier ones key
//!   by key, and every leaf remembers which layer set it.
//! - The merged document gets a [`ConfigFingerprint`] that reconciliation
//!   results carry, so a run can be traced back to its configuration.
//! - Typed sections (paths, freshness, indexing, registry seeds) are
//!   extracted by [`Settings::from_config_json`]; anything else is reported
//!   by [`report_unused_keys`].

mod fingerprint;
mod layers;
mod settings;
mod unused;

pub use fingerprint::ConfigFingerprint;
pub use layers::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};
pub use settings::{IndexingSettings, PathSettings, RegistrySeed, Settings, ENV_DATA_DIR};
pub use unused::{report_unused_keys, UnusedKey, UnusedKeyPolicy, UnusedKeyReport, CONSUMED_POINTERS};
