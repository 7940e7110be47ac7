use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized entity key (a ticker symbol): trimmed and ASCII upper-cased.
///
/// The key doubles as the on-disk folder name and the vector-store namespace,
/// so two spellings of the same ticker must always collapse to one key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityKey(String);

impl EntityKey {
    pub fn new(raw: &str) -> Result<Self, InvalidEntityKey> {
        let norm = raw.trim().to_ascii_uppercase();
        if norm.is_empty() {
            return Err(InvalidEntityKey::Empty);
        }
        // The key becomes a directory name; refuse anything that could escape the data root.
        if norm.contains(['/', '\\']) || norm == "." || norm == ".." {
            return Err(InvalidEntityKey::PathLike(norm));
        }
        Ok(Self(norm))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityKey {
    type Error = InvalidEntityKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EntityKey::new(&value)
    }
}

impl From<EntityKey> for String {
    fn from(k: EntityKey) -> Self {
        k.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidEntityKey {
    Empty,
    PathLike(String),
}

impl fmt::Display for InvalidEntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidEntityKey::Empty => write!(f, "entity key must not be empty"),
            InvalidEntityKey::PathLike(k) => {
                write!(f, "entity key '{k}' must not contain path separators")
            }
        }
    }
}

impl std::error::Error for InvalidEntityKey {}

/// Regulatory jurisdiction. Closed set; adding one forces every `match` to be revisited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "INDIA")]
    India,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Jurisdiction::Us => "US",
            Jurisdiction::India => "INDIA",
        }
    }

    /// Name of the identifier this jurisdiction requires, for error messages.
    pub fn required_identifier(&self) -> &'static str {
        match self {
            Jurisdiction::Us => "CIK",
            Jurisdiction::India => "scrip_code",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ParseJurisdictionError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" | "USA" => Ok(Jurisdiction::Us),
            "INDIA" | "IN" => Ok(Jurisdiction::India),
            _ => Err(ParseJurisdictionError(s.to_string())),
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseJurisdictionError(pub String);

impl fmt::Display for ParseJurisdictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid jurisdiction '{}'. expected one of: US | INDIA",
            self.0
        )
    }
}

impl std::error::Error for ParseJurisdictionError {}

/// Jurisdiction-specific external identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    /// SEC EDGAR Central Index Key (US filers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    /// BSE scrip code (Indian listings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrip_code: Option<String>,
}

impl Identifiers {
    pub fn cik(cik: impl Into<String>) -> Self {
        Self {
            cik: Some(cik.into()),
            scrip_code: None,
        }
    }

    pub fn scrip_code(code: impl Into<String>) -> Self {
        Self {
            cik: None,
            scrip_code: Some(code.into()),
        }
    }

    /// Drop blank values so `Some("")` never counts as a supplied identifier.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            cik: clean(self.cik),
            scrip_code: clean(self.scrip_code),
        }
    }

    /// The identifier required by `jurisdiction`, if present.
    pub fn for_jurisdiction(&self, jurisdiction: Jurisdiction) -> Option<&str> {
        match jurisdiction {
            Jurisdiction::Us => self.cik.as_deref(),
            Jurisdiction::India => self.scrip_code.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cik.is_none() && self.scrip_code.is_none()
    }
}
