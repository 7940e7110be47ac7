use chrono::Duration;
use std::collections::BTreeMap;
use std::fmt;

use crate::Component;

/// Maximum artifact age per component before it is considered stale.
///
/// Built once (defaults or configuration) and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreshnessPolicies {
    max_age: BTreeMap<Component, Duration>,
}

impl FreshnessPolicies {
    /// Default cadence: prices daily, statements quarterly, profile weekly,
    /// filings yearly.
    pub fn default_for(component: Component) -> Duration {
        match component {
            Component::Price => Duration::hours(24),
            Component::IncomeStmt | Component::BalanceSheet | Component::CashFlow => {
                Duration::days(90)
            }
            Component::Info => Duration::days(7),
            Component::Unstructured => Duration::days(365),
        }
    }

    /// Start from defaults and replace the given components' max age.
    pub fn with_overrides(
        overrides: impl IntoIterator<Item = (Component, Duration)>,
    ) -> Result<Self, InvalidPolicy> {
        let mut p = Self::default();
        for (component, age) in overrides {
            if age <= Duration::zero() {
                return Err(InvalidPolicy { component, age });
            }
            p.max_age.insert(component, age);
        }
        Ok(p)
    }

    pub fn max_age(&self, component: Component) -> Duration {
        self.max_age
            .get(&component)
            .copied()
            .unwrap_or_else(|| Self::default_for(component))
    }
}

impl Default for FreshnessPolicies {
    fn default() -> Self {
        Self {
            max_age: Component::ALL
                .iter()
                .map(|c| (*c, Self::default_for(*c)))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidPolicy {
    pub component: Component,
    pub age: Duration,
}

impl fmt::Display for InvalidPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "freshness policy for '{}' must be positive (got {}s)",
            self.component,
            self.age.num_seconds()
        )
    }
}

impl std::error::Error for InvalidPolicy {}
