//! Process-wide network selection
//!
//! Profiles are built lazily, once per network, and live for the rest of the
//! process. The active profile is a single-assignment cell: it is written by
//! the first successful [`select`] and only read afterwards.

use crate::consensus::ChainParams;
use crate::network::NetworkId;
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use tracing::info;

static MAINNET: OnceCell<ChainParams> = OnceCell::new();
static TESTNET: OnceCell<ChainParams> = OnceCell::new();
static REGTEST: OnceCell<ChainParams> = OnceCell::new();

static GLOBAL: Registry = Registry::new();

/// Look up (building on first use) the profile of `network`.
///
/// Independent of the current selection. Errors are configuration-integrity
/// failures; a failed build is retried on the next call.
pub fn try_profile_for(network: NetworkId) -> Result<&'static ChainParams> {
    match network {
        NetworkId::Main => MAINNET.get_or_try_init(ChainParams::mainnet),
        NetworkId::Test => {
            TESTNET.get_or_try_init(|| ChainParams::testnet(try_profile_for(NetworkId::Main)?))
        }
        NetworkId::RegTest => {
            REGTEST.get_or_try_init(|| ChainParams::regtest(try_profile_for(NetworkId::Test)?))
        }
    }
}

/// Get shared parameters for `network` (lazy init).
///
/// # Panics
///
/// If the compiled-in profile fails its integrity checks. A node must not run
/// with an unverified genesis block.
pub fn profile_for(network: NetworkId) -> &'static ChainParams {
    try_profile_for(network)
        .unwrap_or_else(|e| panic!("{} chain parameters failed integrity check: {}", network, e))
}

/// Holder of the active profile
#[derive(Debug, Default)]
pub struct Registry {
    active: OnceCell<&'static ChainParams>,
}

impl Registry {
    /// Registry with nothing selected
    pub const fn new() -> Self {
        Self {
            active: OnceCell::new(),
        }
    }

    /// Make `network` the active profile.
    ///
    /// Selecting the already active network again is a no-op; selecting a
    /// different one fails with [`Error::AlreadySelected`].
    pub fn select(&self, network: NetworkId) -> Result<&'static ChainParams> {
        let active = *self.active.get_or_try_init(|| {
            let params = try_profile_for(network)?;
            info!(network = %network, "Selected chain parameters");
            Ok::<_, Error>(params)
        })?;

        if active.network != network {
            return Err(Error::AlreadySelected {
                active: active.network,
                requested: network,
            });
        }
        Ok(active)
    }

    /// Parse a network token and select it.
    ///
    /// An unrecognised token leaves the registry untouched.
    pub fn select_str(&self, token: &str) -> Result<&'static ChainParams> {
        let network: NetworkId = token.parse()?;
        self.select(network)
    }

    /// The active profile
    pub fn active(&self) -> Result<&'static ChainParams> {
        self.active.get().copied().ok_or(Error::NotSelected)
    }

    /// Whether a network has been selected
    pub fn is_selected(&self) -> bool {
        self.active.get().is_some()
    }
}

/// Select the process-wide network
pub fn select(network: NetworkId) -> Result<&'static ChainParams> {
    GLOBAL.select(network)
}

/// Select the process-wide network from a command-line token
pub fn select_from_str(token: &str) -> Result<&'static ChainParams> {
    GLOBAL.select_str(token)
}

/// The process-wide active profile.
///
/// # Panics
///
/// If called before a network has been selected.
pub fn active() -> &'static ChainParams {
    match GLOBAL.active() {
        Ok(params) => params,
        Err(_) => panic!("chain parameters used before a network was selected"),
    }
}

/// The process-wide active profile, if any
pub fn try_active() -> Option<&'static ChainParams> {
    GLOBAL.active().ok()
}
