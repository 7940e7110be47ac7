use fm_schemas::{Component, ParseComponentError};
use serde::Serialize;
use std::fmt;

/// Which components a reconciliation call should cover.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Checklist {
    structured: Vec<Component>,
    unstructured: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecklistError {
    UnknownComponent(ParseComponentError),
    /// The document component is selected with the unstructured flag, not by name.
    DocumentInStructuredList,
}

impl fmt::Display for ChecklistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecklistError::UnknownComponent(e) => write!(f, "{e}"),
            ChecklistError::DocumentInStructuredList => {
                write!(f, "unstructured cannot be listed as a structured component")
            }
        }
    }
}

impl std::error::Error for ChecklistError {}

impl Checklist {
    /// Structured components are deduplicated keeping first occurrence.
    pub fn new(
        structured: impl IntoIterator<Item = Component>,
        unstructured: bool,
    ) -> Result<Self, ChecklistError> {
        let mut out: Vec<Component> = Vec::new();
        for c in structured {
            if !c.kind().is_structured() {
                return Err(ChecklistError::DocumentInStructuredList);
            }
            if !out.contains(&c) {
                out.push(c);
            }
        }
        Ok(Self {
            structured: out,
            unstructured,
        })
    }

    /// Parse a comma-separated list of structured component names.
    pub fn parse(list: &str, include_unstructured: bool) -> Result<Self, ChecklistError> {
        let components = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Component::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ChecklistError::UnknownComponent)?;
        Self::new(components, include_unstructured)
    }

    pub fn structured(&self) -> &[Component] {
        &self.structured
    }

    pub fn includes_unstructured(&self) -> bool {
        self.unstructured
    }

    /// Processing order: structured list as given, then the document.
    pub fn components(&self) -> Vec<Component> {
        let mut v = self.structured.clone();
        if self.unstructured {
            v.push(Component::Unstructured);
        }
        v
    }

    pub fn is_empty(&self) -> bool {
        self.structured.is_empty() && !self.unstructured
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self {
            structured: Component::STRUCTURED.to_vec(),
            unstructured: true,
        }
    }
}
