use fm_index::{IndexError, IndexSummary, MirrorIndexer};
use fm_schemas::EntityKey;
use std::sync::{Mutex, PoisonError};

/// Records every `index_entity` call and reports an empty projection.
#[derive(Debug, Default)]
pub struct CountingIndexer {
    calls: Mutex<Vec<EntityKey>>,
}

impl CountingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EntityKey> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl MirrorIndexer for CountingIndexer {
    fn index_entity(&self, key: &EntityKey) -> Result<IndexSummary, IndexError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());
        Ok(IndexSummary {
            namespace: key.as_str().to_string(),
            ..IndexSummary::default()
        })
    }
}

/// Always fails with a store error.
#[derive(Debug)]
pub struct FailingIndexer {
    message: String,
    calls: Mutex<usize>,
}

impl FailingIndexer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MirrorIndexer for FailingIndexer {
    fn index_entity(&self, _key: &EntityKey) -> Result<IndexSummary, IndexError> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Err(IndexError::Store(self.message.clone()))
    }
}
