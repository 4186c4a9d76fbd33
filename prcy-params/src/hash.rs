//! 256-bit hashes and the proof-of-work hashing seam

use crate::{Error, Result};
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A 256-bit hash in internal (little-endian) byte order.
///
/// Displayed and parsed as reversed hex, so `000007b4...` is the form that
/// appears in block explorers and checkpoint tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// All-zero hash (previous-block hash of a genesis block)
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// Wrap raw bytes in internal order
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes in internal order
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Interpret as a little-endian 256-bit integer for target comparison
    pub fn to_u256(&self) -> U256 {
        U256::from_little_endian(&self.0)
    }

    /// Inverse of [`Hash256::to_u256`]
    pub fn from_u256(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_little_endian(&mut bytes);
        Self(bytes)
    }

    /// Check whether this hash satisfies `target` (`hash <= target`)
    pub fn meets_target(&self, target: &U256) -> bool {
        self.to_u256() <= *target
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self)
    }
}

impl FromStr for Hash256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| Error::InvalidHash(s.to_string()))?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Content hash used for block headers, transactions and Merkle nodes.
pub trait PowHasher {
    /// Hash an arbitrary byte string
    fn hash(&self, data: &[u8]) -> Hash256;
}

/// SHA-256 applied twice
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleSha256;

impl PowHasher for DoubleSha256 {
    fn hash(&self, data: &[u8]) -> Hash256 {
        let first = Sha256::digest(data);
        Hash256(Sha256::digest(first).into())
    }
}

/// Merkle root over a list of leaf hashes.
///
/// Odd levels pair the last node with itself. An empty list yields
/// [`Hash256::ZERO`].
pub fn merkle_root<H: PowHasher + ?Sized>(hasher: &H, leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return Hash256::ZERO;
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(left.as_bytes());
                buf[32..].copy_from_slice(right.as_bytes());
                hasher.hash(&buf)
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_reversed_hex() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0xab;
        bytes[0] = 0x01;
        let hash = Hash256::from_bytes(bytes);
        let shown = hash.to_string();
        assert!(shown.starts_with("ab"));
        assert!(shown.ends_with("01"));
        assert_eq!(shown.parse::<Hash256>().unwrap(), hash);
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        assert!("zz".parse::<Hash256>().is_err());
        assert!("00".parse::<Hash256>().is_err());
    }

    #[test]
    fn test_double_sha256_empty() {
        // sha256d("") = 5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456
        let hash = DoubleSha256.hash(b"");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_merkle_single_leaf_is_identity() {
        let leaf = DoubleSha256.hash(b"leaf");
        assert_eq!(merkle_root(&DoubleSha256, &[leaf]), leaf);
    }

    #[test]
    fn test_merkle_odd_duplicates_last() {
        let a = DoubleSha256.hash(b"a");
        let b = DoubleSha256.hash(b"b");
        let c = DoubleSha256.hash(b"c");
        assert_eq!(
            merkle_root(&DoubleSha256, &[a, b, c]),
            merkle_root(&DoubleSha256, &[a, b, c, c])
        );
    }

    #[test]
    fn test_meets_target() {
        let hash = Hash256::from_u256(U256::from(100u64));
        assert!(hash.meets_target(&U256::from(100u64)));
        assert!(!hash.meets_target(&U256::from(99u64)));
    }
}
