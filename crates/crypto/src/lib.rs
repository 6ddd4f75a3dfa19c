//! Byte-oriented hashing and signature recovery for the Meridian kernel.
//!
//! The authorization protocol is a pure digest/recover/compare pattern with
//! no host dependency: a canonical packed encoding of the operation's
//! fields is keccak-hashed, wrapped in the standard recovery prefix, and
//! signed with a recoverable ECDSA (secp256k1) signature. Verifiers recover
//! the signing principal from the signature alone and compare it to the
//! claim.
//!
//! [`message`] holds the typed builders for every signed-message schema in
//! the protocol; their field order is the interoperability contract with
//! off-ledger signers and must not change.

pub mod digest;
pub mod message;
pub mod recover;
pub mod signer;

pub use digest::{concatenated_data_hash, keccak256, recovery_digest, PackedMessage};
pub use recover::{principal_of, recover_signer, SIGNATURE_LENGTH};
pub use signer::LocalSigner;
