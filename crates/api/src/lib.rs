//! Interfaces between the Meridian services and their execution host.
//!
//! The kernel's guarantees rest on two abstractions defined here: an
//! abstract key-value state store with copy-on-write overlays (which gives
//! every external call all-or-nothing semantics), and capability interfaces
//! for the token bookkeeping the services treat as an external collaborator.

pub mod context;
pub mod state;
pub mod token;

pub use context::{LogicalClock, TxContext};
