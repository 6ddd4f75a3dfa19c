//! A copy-on-write state overlay backing the transactional call discipline.

use crate::state::{StateAccess, StateKVPair, StateScanIter};
use meridian_types::error::StateError;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::iter::{Fuse, Peekable};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

/// A batch of key-value pairs to be inserted or updated in the state.
pub type StateInserts = Vec<(Vec<u8>, Vec<u8>)>;

/// A batch of keys to be deleted from the state.
pub type StateDeletes = Vec<Vec<u8>>;

/// A complete set of state changes (inserts/updates and deletes) from one
/// external call.
pub type StateChangeSet = (StateInserts, StateDeletes);

/// Calculates the smallest byte vector strictly greater than all keys
/// starting with the given prefix. Returns None if the prefix is all 0xFF.
pub(crate) fn next_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    if prefix.is_empty() {
        return None;
    }
    let mut ub = prefix.to_vec();
    for i in (0..ub.len()).rev() {
        if ub[i] != 0xFF {
            ub[i] += 1;
            ub.truncate(i + 1);
            return Some(ub);
        }
    }
    None
}

struct MergingIterator<'a> {
    base: Peekable<Fuse<StateScanIter<'a>>>,
    writes: Peekable<btree_map::Range<'a, Vec<u8>, Option<Vec<u8>>>>,
}

impl<'a> Iterator for MergingIterator<'a> {
    type Item = Result<StateKVPair, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let base_key = self
                .base
                .peek()
                .and_then(|res| res.as_ref().ok().map(|(k, _)| k.as_ref()));
            let write_key = self.writes.peek().map(|(k, _)| k.as_slice());

            let decision = match (base_key, write_key) {
                (Some(bk), Some(wk)) => Some(bk.cmp(wk)),
                (Some(_), None) => Some(std::cmp::Ordering::Less),
                (None, Some(_)) => Some(std::cmp::Ordering::Greater),
                (None, None) => None,
            };

            match decision {
                Some(std::cmp::Ordering::Less) => return self.base.next(),
                Some(std::cmp::Ordering::Greater) => {
                    if let Some((key, val_opt)) = self.writes.next() {
                        if let Some(val) = val_opt {
                            return Some(Ok((Arc::from(key.clone()), Arc::from(val.clone()))));
                        }
                    }
                }
                Some(std::cmp::Ordering::Equal) => {
                    self.base.next(); // overridden by the overlay write
                    if let Some((key, val_opt)) = self.writes.next() {
                        if let Some(val) = val_opt {
                            return Some(Ok((Arc::from(key.clone()), Arc::from(val.clone()))));
                        }
                    }
                }
                None => return None,
            }
        }
    }
}

/// An in-memory, copy-on-write overlay over any [`StateAccess`].
///
/// Reads check the local write set first and fall through to the base.
/// Writes never touch the base: they are captured locally and either
/// committed as one ordered batch or dropped with the overlay. Every
/// external kernel call runs against one of these, which is what makes a
/// failed call leave no trace, consumed authorization digests included.
#[derive(Clone)]
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>, // BTreeMap for a deterministic commit order.
}

impl<'a> StateOverlay<'a> {
    /// Creates a new, empty overlay on top of a base state accessor.
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Consumes the overlay and returns its writes in a deterministic order,
    /// ready for [`StateAccess::batch_apply`] on the base store.
    pub fn into_ordered_batch(self) -> StateChangeSet {
        let mut inserts = Vec::new();
        let mut deletes = Vec::new();

        for (key, value_opt) in self.writes {
            match value_opt {
                Some(value) => inserts.push((key, value)),
                None => deletes.push(key),
            }
        }
        (inserts, deletes)
    }
}

impl<'a> StateAccess for StateOverlay<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        match self.writes.get(key) {
            // Key is in the write set; the cached value may be a delete.
            Some(value_opt) => Ok(value_opt.clone()),
            None => self.base.get(key),
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<StateScanIter<'_>, StateError> {
        let base = self.base.prefix_scan(prefix)?.fuse().peekable();

        let start = Included(prefix.to_vec());
        let end = match next_prefix(prefix) {
            Some(ub) => Excluded(ub),
            None => Unbounded,
        };
        let writes = self.writes.range((start, end)).peekable();

        Ok(Box::new(MergingIterator { base, writes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryState;

    #[test]
    fn overlay_reads_fall_through_and_writes_stay_local() {
        let mut base = MemoryState::new();
        base.insert(b"a", b"1").unwrap();

        let mut overlay = StateOverlay::new(&base);
        assert_eq!(overlay.get(b"a").unwrap(), Some(b"1".to_vec()));

        overlay.insert(b"b", b"2").unwrap();
        overlay.delete(b"a").unwrap();
        assert_eq!(overlay.get(b"a").unwrap(), None);
        assert_eq!(overlay.get(b"b").unwrap(), Some(b"2".to_vec()));

        // The base is untouched until the batch is applied.
        assert_eq!(base.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(base.get(b"b").unwrap(), None);
    }

    #[test]
    fn ordered_batch_commits_exactly_the_write_set() {
        let mut base = MemoryState::new();
        base.insert(b"a", b"1").unwrap();

        let mut overlay = StateOverlay::new(&base);
        overlay.insert(b"b", b"2").unwrap();
        overlay.delete(b"a").unwrap();
        let (inserts, deletes) = overlay.into_ordered_batch();

        base.batch_apply(&inserts, &deletes).unwrap();
        assert_eq!(base.get(b"a").unwrap(), None);
        assert_eq!(base.get(b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn dropped_overlay_leaves_no_trace() {
        let mut base = MemoryState::new();
        base.insert(b"k", b"v").unwrap();
        {
            let mut overlay = StateOverlay::new(&base);
            overlay.insert(b"k", b"changed").unwrap();
            overlay.insert(b"other", b"x").unwrap();
            // dropped without into_ordered_batch: the failed-call path
        }
        assert_eq!(base.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(base.get(b"other").unwrap(), None);
    }

    #[test]
    fn prefix_scan_merges_base_and_overlay() {
        let mut base = MemoryState::new();
        base.insert(b"p::1", b"a").unwrap();
        base.insert(b"p::2", b"b").unwrap();
        base.insert(b"q::1", b"z").unwrap();

        let mut overlay = StateOverlay::new(&base);
        overlay.insert(b"p::3", b"c").unwrap();
        overlay.delete(b"p::1").unwrap();
        overlay.insert(b"p::2", b"B").unwrap();

        let pairs: Vec<_> = overlay
            .prefix_scan(b"p::")
            .unwrap()
            .map(|r| r.unwrap())
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (b"p::2".to_vec(), b"B".to_vec()),
                (b"p::3".to_vec(), b"c".to_vec()),
            ]
        );
    }
}
