//! An in-memory reference implementation of [`StateAccess`].

use crate::state::{StateAccess, StateScanIter};
use meridian_types::error::StateError;
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

/// A `BTreeMap`-backed state store. Scans are key-ordered, which keeps
/// every operation over it deterministic. This is the store tests run
/// against and the default for embedders without a persistence layer.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries; used by tests asserting rollback behaviour.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StateAccess for MemoryState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let start = Included(prefix.to_vec());
        let end = match super::overlay_next_prefix(prefix) {
            Some(ub) => Excluded(ub),
            None => Unbounded,
        };
        Ok(Box::new(self.data.range((start, end)).map(|(k, v)| {
            Ok((Arc::from(k.as_slice()), Arc::from(v.as_slice())))
        })))
    }
}
