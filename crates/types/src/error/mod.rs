//! Error taxonomy for the Meridian kernel.
//!
//! Every failure is immediate, synchronous and terminal for the call that
//! raised it: the transactional wrapper discards all state changes and the
//! caller receives the specific precondition that failed. Nothing in the
//! kernel catches and retries.

use crate::records::SharePhase;
use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Errors from the abstract state store.
#[derive(Error, Debug)]
pub enum StateError {
    /// The requested key was not found in the state.
    #[error("Key not found in state")]
    KeyNotFound,
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// The stored value was invalid for its expected shape.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// A stored record failed canonical decoding.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "STATE_KEY_NOT_FOUND",
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::InvalidValue(_) => "STATE_INVALID_VALUE",
            Self::Decode(_) => "STATE_DECODE_ERROR",
        }
    }
}

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The signature material is malformed for the recovery scheme.
    #[error("Invalid signature format: {0}")]
    InvalidSignature(String),
    /// Public-key recovery failed for the given digest and signature.
    #[error("Signature recovery failed: {0}")]
    RecoveryFailed(String),
    /// A digest had an unexpected length.
    #[error("Invalid hash length: expected {expected}, got {got}")]
    InvalidHashLength {
        /// The expected length in bytes.
        expected: usize,
        /// The actual length in bytes.
        got: usize,
    },
    /// The provided key material is malformed.
    #[error("Invalid cryptographic key: {0}")]
    InvalidKey(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidSignature(_) => "CRYPTO_INVALID_SIGNATURE",
            Self::RecoveryFailed(_) => "CRYPTO_RECOVERY_FAILED",
            Self::InvalidHashLength { .. } => "CRYPTO_INVALID_HASH_LENGTH",
            Self::InvalidKey(_) => "CRYPTO_INVALID_KEY",
        }
    }
}

/// Failures of the signature authorization protocol.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The claimed signer is the null principal.
    #[error("Signer is the zero principal")]
    SignerZero,
    /// The message digest has already been consumed.
    #[error("Signature used already")]
    SignatureReused,
    /// Recovery failed or the recovered signer does not match the claim.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::SignerZero => "AUTH_SIGNER_ZERO",
            Self::SignatureReused => "AUTH_SIGNATURE_REUSED",
            Self::InvalidSignature(_) => "AUTH_INVALID_SIGNATURE",
        }
    }
}

impl From<CryptoError> for AuthError {
    fn from(e: CryptoError) -> Self {
        AuthError::InvalidSignature(e.to_string())
    }
}

/// Administrative gating failures.
#[derive(Error, Debug)]
pub enum AdminError {
    /// The operation was attempted while the service is halted.
    #[error("Service '{0}' is halted")]
    Halted(String),
    /// The caller does not hold the administrative role.
    #[error("Caller is not the admin")]
    CallerNotAdmin,
    /// No administrative principal has been configured.
    #[error("No admin configured")]
    AdminNotConfigured,
}

impl ErrorCode for AdminError {
    fn code(&self) -> &'static str {
        match self {
            Self::Halted(_) => "ADMIN_HALTED",
            Self::CallerNotAdmin => "ADMIN_CALLER_NOT_ADMIN",
            Self::AdminNotConfigured => "ADMIN_NOT_CONFIGURED",
        }
    }
}

/// Identity registry failures.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The principal already holds a live identity.
    #[error("One identity per principal")]
    AlreadyRegistered,
    /// The principal holds no live identity.
    #[error("Not registered")]
    NotRegistered,
    /// The caller does not own the identity it named.
    #[error("Caller is not the identity owner")]
    NotOwner,
    /// The identity id does not exist.
    #[error("Unknown identity: {0}")]
    UnknownIdentity(u64),
}

impl ErrorCode for IdentityError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered => "IDENTITY_ALREADY_REGISTERED",
            Self::NotRegistered => "IDENTITY_NOT_REGISTERED",
            Self::NotOwner => "IDENTITY_NOT_OWNER",
            Self::UnknownIdentity(_) => "IDENTITY_UNKNOWN",
        }
    }
}

/// Data ledger failures.
#[derive(Error, Debug)]
pub enum DataError {
    /// The signer's identity is not the recorded owner of the hash.
    #[error("Not a data owner")]
    NotDataOwner,
    /// The hash has already been recorded; records are immutable.
    #[error("Data hash tracked already")]
    AlreadyTracked,
    /// The hash has never been recorded.
    #[error("Unknown data hash")]
    UnknownData,
}

impl ErrorCode for DataError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotDataOwner => "DATA_NOT_OWNER",
            Self::AlreadyTracked => "DATA_ALREADY_TRACKED",
            Self::UnknownData => "DATA_UNKNOWN_HASH",
        }
    }
}

/// Product catalog failures.
#[derive(Error, Debug)]
pub enum ProductError {
    /// `data_hashes` and `credits` disagree in length.
    #[error("Not equal length: {hashes} hashes, {credits} credits")]
    LengthMismatch {
        /// Number of data hashes supplied.
        hashes: usize,
        /// Number of credit weights supplied.
        credits: usize,
    },
    /// A referenced `(hash, uid)` pair is not currently permitted.
    #[error("Data not permitted: 0x{0}")]
    DataNotPermitted(String),
    /// Only the product creator may perform this operation.
    #[error("Only product creator")]
    OnlyCreator,
    /// The product uid does not exist.
    #[error("Unknown product: {0}")]
    UnknownProduct(u64),
    /// The product uid is already taken.
    #[error("Product uid tracked already: {0}")]
    AlreadyTracked(u64),
    /// The catalog is configured with an attester and requires an
    /// attestation signature for product creation.
    #[error("Credit attestation required")]
    AttestationRequired,
}

impl ErrorCode for ProductError {
    fn code(&self) -> &'static str {
        match self {
            Self::LengthMismatch { .. } => "PRODUCT_LENGTH_MISMATCH",
            Self::DataNotPermitted(_) => "PRODUCT_DATA_NOT_PERMITTED",
            Self::OnlyCreator => "PRODUCT_ONLY_CREATOR",
            Self::UnknownProduct(_) => "PRODUCT_UNKNOWN",
            Self::AlreadyTracked(_) => "PRODUCT_ALREADY_TRACKED",
            Self::AttestationRequired => "PRODUCT_ATTESTATION_REQUIRED",
        }
    }
}

/// Share issuance and shard vault failures.
#[derive(Error, Debug)]
pub enum ShardError {
    /// The target supply must be non-zero.
    #[error("Target supply cannot be zero")]
    ZeroTargetSupply,
    /// A distribution percentage must be non-zero.
    #[error("Percentage cannot be zero")]
    ZeroPercent,
    /// The lock duration must be non-zero.
    #[error("Lock duration cannot be zero")]
    ZeroLockDuration,
    /// Issuance phases only move strictly forward.
    #[error("Phase out of order: expected {expected:?}, got {got:?}")]
    PhaseOutOfOrder {
        /// The phase the operation requires.
        expected: SharePhase,
        /// The phase actually stored.
        got: SharePhase,
    },
    /// The accumulated percentages would exceed 100.
    #[error("Distribution percentages exceed 100")]
    PercentOverflow,
    /// `credits` and `holders` disagree in length.
    #[error("Not equal length: {credits} credits, {holders} holders")]
    LengthMismatch {
        /// Number of credit weights supplied.
        credits: usize,
        /// Number of holders supplied.
        holders: usize,
    },
    /// A distribution round's credit total must be non-zero.
    #[error("Credit total cannot be zero")]
    ZeroCredit,
    /// A single transfer inside the lock window may move at most half of
    /// the holder's current balance in the product.
    #[error("Lock period active")]
    LockPeriodActive,
    /// The holder's shard balance cannot cover the operation.
    #[error("Insufficient shard balance")]
    InsufficientBalance,
    /// Minting would push the supply past the configured target.
    #[error("Mint exceeds target supply")]
    MintExceedsTarget,
    /// No issuance configuration exists for the product.
    #[error("Unknown shard configuration: {0}")]
    UnknownConfig(u64),
}

impl ErrorCode for ShardError {
    fn code(&self) -> &'static str {
        match self {
            Self::ZeroTargetSupply => "SHARD_ZERO_TARGET_SUPPLY",
            Self::ZeroPercent => "SHARD_ZERO_PERCENT",
            Self::ZeroLockDuration => "SHARD_ZERO_LOCK_DURATION",
            Self::PhaseOutOfOrder { .. } => "SHARD_PHASE_OUT_OF_ORDER",
            Self::PercentOverflow => "SHARD_PERCENT_OVERFLOW",
            Self::LengthMismatch { .. } => "SHARD_LENGTH_MISMATCH",
            Self::ZeroCredit => "SHARD_ZERO_CREDIT",
            Self::LockPeriodActive => "SHARD_LOCK_PERIOD_ACTIVE",
            Self::InsufficientBalance => "SHARD_INSUFFICIENT_BALANCE",
            Self::MintExceedsTarget => "SHARD_MINT_EXCEEDS_TARGET",
            Self::UnknownConfig(_) => "SHARD_UNKNOWN_CONFIG",
        }
    }
}

/// Profit distribution failures.
#[derive(Error, Debug)]
pub enum EarningError {
    /// Deposits of zero are rejected.
    #[error("Zero amount")]
    ZeroAmount,
    /// The caller holds no shards of the product.
    #[error("No shard balance")]
    NoShardBalance,
    /// Nothing has ever been deposited against the product.
    #[error("No product earning")]
    NoProductEarning,
    /// The caller's truncated share of the undistributed pool is zero.
    #[error("No user earning")]
    NoUserEarning,
    /// Withdrawals require the fixed supply snapshot taken at the
    /// `RemainingMinted` transition.
    #[error("Share supply not final")]
    SupplyNotFinal,
}

impl ErrorCode for EarningError {
    fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "EARNING_ZERO_AMOUNT",
            Self::NoShardBalance => "EARNING_NO_SHARD_BALANCE",
            Self::NoProductEarning => "EARNING_NO_PRODUCT_EARNING",
            Self::NoUserEarning => "EARNING_NO_USER_EARNING",
            Self::SupplyNotFinal => "EARNING_SUPPLY_NOT_FINAL",
        }
    }
}

/// Settlement ledger failures.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The account's balance cannot cover the transfer.
    #[error("Insufficient balance")]
    InsufficientBalance,
    /// The credit would overflow the balance representation.
    #[error("Balance overflow")]
    BalanceOverflow,
}

impl ErrorCode for TokenError {
    fn code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance => "TOKEN_INSUFFICIENT_BALANCE",
            Self::BalanceOverflow => "TOKEN_BALANCE_OVERFLOW",
        }
    }
}

/// Distributor agreement failures.
#[derive(Error, Debug)]
pub enum AgreementError {
    /// The distributor cannot be the null principal.
    #[error("Zero address")]
    ZeroAddress,
    /// Total units cannot be zero.
    #[error("Total units cannot be zero")]
    ZeroUnits,
    /// Unit price cannot be zero.
    #[error("Price cannot be zero")]
    ZeroPrice,
    /// The distributor percentage cannot be zero.
    #[error("Percentage cannot be zero")]
    ZeroPercent,
}

impl ErrorCode for AgreementError {
    fn code(&self) -> &'static str {
        match self {
            Self::ZeroAddress => "AGREEMENT_ZERO_ADDRESS",
            Self::ZeroUnits => "AGREEMENT_ZERO_UNITS",
            Self::ZeroPrice => "AGREEMENT_ZERO_PRICE",
            Self::ZeroPercent => "AGREEMENT_ZERO_PERCENT",
        }
    }
}

/// Shard marketplace failures.
#[derive(Error, Debug)]
pub enum MarketError {
    /// The seller already has an active listing for the product.
    #[error("Listed already")]
    AlreadyListed,
    /// The seller has no active listing for the product.
    #[error("Not listed")]
    NotListed,
    /// Listing price cannot be zero.
    #[error("Price cannot be zero")]
    ZeroPrice,
    /// Purchases of zero shards are rejected.
    #[error("Shard amount cannot be zero")]
    ZeroShardAmount,
}

impl ErrorCode for MarketError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyListed => "MARKET_ALREADY_LISTED",
            Self::NotListed => "MARKET_NOT_LISTED",
            Self::ZeroPrice => "MARKET_ZERO_PRICE",
            Self::ZeroShardAmount => "MARKET_ZERO_SHARD_AMOUNT",
        }
    }
}

/// Proposal board failures.
#[derive(Error, Debug)]
pub enum ProposalError {
    /// Total participants cannot be zero.
    #[error("Total participants cannot be zero")]
    ZeroParticipants,
    /// Proposal info cannot be empty.
    #[error("Proposal info cannot be empty")]
    EmptyProposalInfo,
    /// The proposal id does not exist.
    #[error("Unknown proposal: {0}")]
    UnknownProposal(u64),
}

impl ErrorCode for ProposalError {
    fn code(&self) -> &'static str {
        match self {
            Self::ZeroParticipants => "PROPOSAL_ZERO_PARTICIPANTS",
            Self::EmptyProposalInfo => "PROPOSAL_EMPTY_INFO",
            Self::UnknownProposal(_) => "PROPOSAL_UNKNOWN",
        }
    }
}

/// The umbrella error surfaced by every external entry point.
///
/// A `TransactionError` always means the call aborted and every one of its
/// state changes was discarded.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// An error occurred during record serialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error originating from the state store.
    #[error("State error: {0}")]
    State(#[from] StateError),
    /// An error originating from the authorization protocol.
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),
    /// An administrative gate rejected the call.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),
    /// An error originating from the identity registry.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
    /// An error originating from the data ledger.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// An error originating from the product catalog.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),
    /// An error originating from share issuance or the shard vault.
    #[error("Shard error: {0}")]
    Shard(#[from] ShardError),
    /// An error originating from the profit engine.
    #[error("Earning error: {0}")]
    Earning(#[from] EarningError),
    /// An error originating from the settlement ledger.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    /// An error originating from the distributor agreements service.
    #[error("Agreement error: {0}")]
    Agreement(#[from] AgreementError),
    /// An error originating from the shard marketplace.
    #[error("Market error: {0}")]
    Market(#[from] MarketError),
    /// An error originating from the proposal board.
    #[error("Proposal error: {0}")]
    Proposal(#[from] ProposalError),
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "TX_SERIALIZATION_ERROR",
            Self::State(e) => e.code(),
            Self::Auth(e) => e.code(),
            Self::Admin(e) => e.code(),
            Self::Identity(e) => e.code(),
            Self::Data(e) => e.code(),
            Self::Product(e) => e.code(),
            Self::Shard(e) => e.code(),
            Self::Earning(e) => e.code(),
            Self::Token(e) => e.code(),
            Self::Agreement(e) => e.code(),
            Self::Market(e) => e.code(),
            Self::Proposal(e) => e.code(),
        }
    }
}

impl From<CryptoError> for TransactionError {
    fn from(e: CryptoError) -> Self {
        TransactionError::Auth(AuthError::from(e))
    }
}

impl From<String> for TransactionError {
    fn from(s: String) -> Self {
        TransactionError::Serialization(s)
    }
}
