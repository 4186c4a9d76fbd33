//! PRCY network parameters and constants
//!
//! This crate provides the immutable per-network identity of a PRCY node:
//! the verified genesis block, consensus constants, address prefixes,
//! checkpoint data and the bootstrap seed directory. One profile is selected
//! at startup through [`registry`] and read by everything else afterwards.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checkpoints;
pub mod compact;
pub mod consensus;
pub mod genesis;
pub mod hash;
pub mod network;
pub mod registry;
pub mod seeds;

pub use checkpoints::{CheckpointData, CheckpointEntry};
pub use compact::{decode_compact, encode_compact};
pub use consensus::{
    ActivationHeights, Base58Prefixes, Capabilities, ChainParams, PoaSchedule, UpgradeMajority,
    COIN,
};
pub use genesis::{
    derive_genesis, DerivedGenesis, GenesisRecord, GenesisTemplate, NoProgress, SearchProgress,
    TracingProgress,
};
pub use hash::{DoubleSha256, Hash256, PowHasher};
pub use network::NetworkId;
pub use primitive_types::U256;
pub use registry::{
    active, profile_for, select, select_from_str, try_active, try_profile_for, Registry,
};
pub use seeds::{DnsSeed, SeedAddress, SeedSpec6, NODE_BLOOM, NODE_NETWORK};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognised network identifier
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Compact difficulty encoding that is negative or overflows 256 bits
    #[error("Invalid compact target: {0:#010x}")]
    InvalidCompact(u32),

    /// Malformed 256-bit hash literal
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Derived genesis hash disagrees with the hard-coded value
    #[error("{network} genesis hash mismatch: expected {expected}, derived {actual}")]
    GenesisHashMismatch {
        /// Network being built
        network: NetworkId,
        /// Hard-coded hash
        expected: Hash256,
        /// Hash derived from the template
        actual: Hash256,
    },

    /// Derived genesis Merkle root disagrees with the hard-coded value
    #[error("{network} genesis merkle root mismatch: expected {expected}, derived {actual}")]
    MerkleRootMismatch {
        /// Network being built
        network: NetworkId,
        /// Hard-coded Merkle root
        expected: Hash256,
        /// Merkle root derived from the template
        actual: Hash256,
    },

    /// Checkpoint table heights are not strictly increasing
    #[error("Checkpoint height {height} does not follow {previous}")]
    CheckpointOrder {
        /// Height of the preceding entry
        previous: u32,
        /// Offending height
        height: u32,
    },

    /// No network has been selected yet
    #[error("No network selected")]
    NotSelected,

    /// A different network is already active
    #[error("Network {active} already selected, refusing {requested}")]
    AlreadySelected {
        /// Currently active network
        active: NetworkId,
        /// Network the caller asked for
        requested: NetworkId,
    },
}

impl Error {
    /// Configuration-integrity failures: the node must not start.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidCompact(_)
                | Error::InvalidHash(_)
                | Error::GenesisHashMismatch { .. }
                | Error::MerkleRootMismatch { .. }
                | Error::CheckpointOrder { .. }
        )
    }
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
