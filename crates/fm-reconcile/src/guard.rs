use fm_schemas::EntityKey;
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

/// Set of entities currently being reconciled in this process.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    keys: Mutex<BTreeSet<EntityKey>>,
}

impl InFlight {
    /// Claim `key`; `None` when another call already holds it.
    pub(crate) fn try_claim(&self, key: &EntityKey) -> Option<InFlightGuard<'_>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if keys.insert(key.clone()) {
            Some(InFlightGuard {
                owner: self,
                key: key.clone(),
            })
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Releases the claim on drop, including on unwind.
pub(crate) struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: EntityKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive_per_key_and_released_on_drop() {
        let f = InFlight::default();
        let a = EntityKey::new("AAPL").unwrap();
        let b = EntityKey::new("TCS").unwrap();

        let ga = f.try_claim(&a).unwrap();
        assert!(f.try_claim(&a).is_none());
        let gb = f.try_claim(&b);
        assert!(gb.is_some(), "different keys do not contend");

        drop(ga);
        assert!(f.try_claim(&a).is_some());
        drop(gb);
        assert_eq!(f.len(), 0);
    }
}
