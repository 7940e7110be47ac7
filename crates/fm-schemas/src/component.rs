use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of derived data a component holds.
///
/// Freshness evaluation and fetch routing match on this exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Daily price history.
    TimeSeries,
    /// Periodic financial statements (one record set per fiscal period).
    PeriodicStatement,
    /// Company profile.
    Profile,
    /// Unstructured regulatory filings.
    Document,
}

impl ComponentKind {
    /// Structured kinds live as one JSON artifact under `structured/`.
    pub fn is_structured(&self) -> bool {
        match self {
            ComponentKind::TimeSeries | ComponentKind::PeriodicStatement | ComponentKind::Profile => {
                true
            }
            ComponentKind::Document => false,
        }
    }
}

/// Data component tracked per entity.
///
/// Declaration order is the canonical processing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Price,
    IncomeStmt,
    BalanceSheet,
    CashFlow,
    Info,
    Unstructured,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::Price,
        Component::IncomeStmt,
        Component::BalanceSheet,
        Component::CashFlow,
        Component::Info,
        Component::Unstructured,
    ];

    pub const STRUCTURED: [Component; 5] = [
        Component::Price,
        Component::IncomeStmt,
        Component::BalanceSheet,
        Component::CashFlow,
        Component::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Price => "price",
            Component::IncomeStmt => "income_stmt",
            Component::BalanceSheet => "balance_sheet",
            Component::CashFlow => "cash_flow",
            Component::Info => "info",
            Component::Unstructured => "unstructured",
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Price => ComponentKind::TimeSeries,
            Component::IncomeStmt | Component::BalanceSheet | Component::CashFlow => {
                ComponentKind::PeriodicStatement
            }
            Component::Info => ComponentKind::Profile,
            Component::Unstructured => ComponentKind::Document,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseComponentError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Component::Price),
            "income_stmt" => Ok(Component::IncomeStmt),
            "balance_sheet" => Ok(Component::BalanceSheet),
            "cash_flow" => Ok(Component::CashFlow),
            "info" => Ok(Component::Info),
            "unstructured" => Ok(Component::Unstructured),
            _ => Err(ParseComponentError(s.to_string())),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseComponentError(pub String);

impl fmt::Display for ParseComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid component '{}'. expected one of: price | income_stmt | balance_sheet | cash_flow | info | unstructured",
            self.0
        )
    }
}

impl std::error::Error for ParseComponentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_parse_round_trips_wire_names() {
        for c in Component::ALL {
            assert_eq!(Component::parse(c.as_str()).unwrap(), c);
        }
        assert_eq!(Component::parse(" Income_Stmt ").unwrap(), Component::IncomeStmt);
        assert!(Component::parse("dividends").is_err());
    }

    #[test]
    fn only_unstructured_is_a_document() {
        for c in Component::STRUCTURED {
            assert!(c.kind().is_structured(), "{c} should be structured");
        }
        assert_eq!(Component::Unstructured.kind(), ComponentKind::Document);
    }

    #[test]
    fn serde_uses_wire_names() {
        let s = serde_json::to_string(&Component::BalanceSheet).unwrap();
        assert_eq!(s, "\"balance_sheet\"");
    }
}
