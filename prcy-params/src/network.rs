//! PRCY network identifiers

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// Mainnet
    Main,
    /// Public testnet
    Test,
    /// Regression test (local development)
    RegTest,
}

impl NetworkId {
    /// All networks, in construction order
    pub const ALL: [NetworkId; 3] = [NetworkId::Main, NetworkId::Test, NetworkId::RegTest];

    /// Canonical string id as used on the command line and in data directories
    pub const fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Main => "main",
            NetworkId::Test => "test",
            NetworkId::RegTest => "regtest",
        }
    }

    /// Resolve the node's `-testnet` / `-regtest` switches.
    ///
    /// Setting both is rejected rather than silently preferring one.
    pub fn from_flags(testnet: bool, regtest: bool) -> Result<Self> {
        match (testnet, regtest) {
            (true, true) => Err(Error::InvalidNetwork(
                "-testnet and -regtest are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(NetworkId::Test),
            (false, true) => Ok(NetworkId::RegTest),
            (false, false) => Ok(NetworkId::Main),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(NetworkId::Main),
            "test" | "testnet" => Ok(NetworkId::Test),
            "regtest" => Ok(NetworkId::RegTest),
            _ => Err(Error::InvalidNetwork(s.to_string())),
        }
    }
}
