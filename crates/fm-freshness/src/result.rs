use chrono::{DateTime, Duration, Utc};
use fm_schemas::Component;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// FreshnessResult
// ---------------------------------------------------------------------------

/// Outcome of one freshness check. Derived on demand, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FreshnessResult {
    pub component: Component,
    pub exists: bool,
    pub is_fresh: bool,
    /// Timestamp the verdict was based on, when one could be obtained.
    pub fetched_at: Option<DateTime<Utc>>,
    /// `now - fetched_at` in whole seconds; negative for future timestamps.
    pub age_secs: Option<i64>,
    pub max_age_secs: i64,
}

impl FreshnessResult {
    pub(crate) fn missing(component: Component, max_age: Duration) -> Self {
        Self {
            component,
            exists: false,
            is_fresh: false,
            fetched_at: None,
            age_secs: None,
            max_age_secs: max_age.num_seconds(),
        }
    }

    /// Present on disk, but no usable timestamp.
    pub(crate) fn undated(component: Component, max_age: Duration) -> Self {
        Self {
            exists: true,
            ..Self::missing(component, max_age)
        }
    }

    pub(crate) fn dated(
        component: Component,
        fetched_at: DateTime<Utc>,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let age = now - fetched_at;
        Self {
            component,
            exists: true,
            is_fresh: age < max_age,
            fetched_at: Some(fetched_at),
            age_secs: Some(age.num_seconds()),
            max_age_secs: max_age.num_seconds(),
        }
    }

    pub fn age(&self) -> Option<Duration> {
        self.age_secs.map(Duration::seconds)
    }

    pub fn max_age(&self) -> Duration {
        Duration::seconds(self.max_age_secs)
    }

    /// Missing or stale: the component should be fetched.
    pub fn needs_fetch(&self) -> bool {
        !self.exists || !self.is_fresh
    }
}

fn fmt_age(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    format!("{sign}{}h {}m", secs / 3600, (secs % 3600) / 60)
}

impl fmt::Display for FreshnessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.component.as_str();
        if !self.exists {
            return write!(f, "{name}: NOT FOUND");
        }
        let status = if self.is_fresh { "FRESH" } else { "STALE" };
        match self.age_secs {
            Some(secs) => write!(f, "{name}: {status} (age: {})", fmt_age(secs)),
            None => write!(f, "{name}: {status} (no timestamp)"),
        }
    }
}

// ---------------------------------------------------------------------------
// FreshnessError
// ---------------------------------------------------------------------------

/// Storage could not be inspected.
#[derive(Debug)]
pub enum FreshnessError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FreshnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for FreshnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for FreshnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}
