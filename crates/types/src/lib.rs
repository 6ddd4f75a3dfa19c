//! Core types for the Meridian data-marketplace kernel.
//!
//! This crate is the base of the workspace: identifiers, the records that
//! services persist in the state store, the error taxonomy, well-known state
//! keys, and the canonical binary codec. It deliberately knows nothing about
//! the state store implementation or about service logic.

pub mod codec;
pub mod error;
pub mod ids;
pub mod keys;
pub mod records;

pub use ids::{Bytes32, DataHash, Principal, Timestamp, TokenId};
