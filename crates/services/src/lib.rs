//! The state-machine services of the Meridian data-marketplace kernel.
//!
//! Each module owns one subsystem's records and transition rules, written
//! against the abstract state store. Nothing here performs I/O: every entry
//! point takes the state handle and a [`meridian_api::TxContext`] and either
//! fully applies its writes or fails with a specific
//! [`meridian_types::error::TransactionError`]. The [`kernel::Kernel`]
//! façade supplies the all-or-nothing transaction wrapper around them.

pub mod admin;
pub mod agreement;
pub mod authorizer;
pub mod data_ledger;
pub mod governance;
pub mod identity;
pub mod kernel;
pub mod marketplace;
pub mod product_catalog;
pub mod profit;
pub mod settlement;
pub mod shards;

mod store;

pub use kernel::{Kernel, KernelConfig, ServiceSet};
