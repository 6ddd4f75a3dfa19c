//! Core traits and helpers for state management.
//!
//! - [`StateAccess`]: basic key-value store operations, implemented by any
//!   persistent backend an embedder brings.
//! - [`StateOverlay`]: a copy-on-write buffer that captures one external
//!   call's writes so they can be committed or discarded atomically.
//! - [`MemoryState`]: the in-memory reference store used by tests and by
//!   embedders that do not need persistence.

use std::sync::Arc;

mod accessor;
mod memory;
mod overlay;

pub use accessor::StateAccess;
pub use memory::MemoryState;
pub use overlay::{StateChangeSet, StateDeletes, StateInserts, StateOverlay};

pub(crate) use overlay::next_prefix as overlay_next_prefix;

use meridian_types::error::StateError;

/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state, using cheap-to-clone Arcs.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs from the state.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;
