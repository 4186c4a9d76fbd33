//! Per-network parameter profiles
//!
//! Testnet is built from the mainnet profile and regtest from the testnet
//! profile, each overriding a named subset of fields with struct-update
//! syntax. Every builder re-derives and verifies its genesis block.

use crate::checkpoints::CheckpointData;
use crate::genesis::{derive_genesis, GenesisRecord, GenesisTemplate, TracingProgress};
use crate::hash::{DoubleSha256, Hash256};
use crate::network::NetworkId;
use crate::seeds::{
    dns_hostnames, fixed_seeds_now, DnsSeed, SeedAddress, SeedSpec6, MAINNET_DNS_SEEDS,
    MAINNET_FIXED_SEEDS, TESTNET_DNS_SEEDS, TESTNET_FIXED_SEEDS,
};
use crate::{Error, Result};
use hex_literal::hex;
use primitive_types::U256;
use serde::Serialize;
use tracing::info;

/// Base units per coin
pub const COIN: u64 = 100_000_000;

const GENESIS_TIMESTAMP: &str = "12 January 2021 PRCY Coin Development Team - Privacy is Your Right";
const GENESIS_OUTPUT_PUBKEY: [u8; 65] = hex!(
    "04b78f63269234b741668d85b57ba11edec2ee20f15719db180d5d6a37c4e9db0c"
    "494390fb54925934bc7b29f148a372c00273bbd5c939830d7d2941de6ce44b8b"
);

/// Shared by every network: the coinbase is identical, only the header differs
const GENESIS_MERKLE_ROOT: &str =
    "07703a9238239ceb0489c1bffbb75ece37613bd68a53bb92ea2a49ba47ec3fe6";

const MAINNET_GENESIS_HASH: &str =
    "000007b4e047bba025d2541e5d3b643be7b4da3bca22f981aa9c184d6c8c4dd9";
const TESTNET_GENESIS_HASH: &str =
    "00000231b3fd9bd40bcf7a8be00b8b78daeb733ac8539b75f10240e74ff0a114";
const REGTEST_GENESIS_HASH: &str =
    "318553f5e5d7ce64b40c3e51d06fa934a6ac7069b4860874bf6319409c0c74da";

//   What makes a good checkpoint block?
// + Is surrounded by blocks with reasonable timestamps
//   (no blocks before with a timestamp after, none after with
//    timestamp before)
// + Contains no strange transactions
//
// Entries above height 0 are hashes of the deployed chain under its own block
// hasher; they only verify once that hasher is plugged in.
const MAINNET_CHECKPOINTS: &[(u32, &str)] = &[
    (0, MAINNET_GENESIS_HASH),
    (500, "00214da9b906c7c14558395b9bc88293301e6e5f87a714194079dd651293fadb"), // Final PoW block
    (561, "54872c72e81b34117bc5a6095d6f1b8d85746992d2513d7adc90a2aceed1651e"), // First PoA block
    (562, "0f00d3a6636c8a265724764da082fdef8106fce7057dfdda94ab6537f7211b4f"),
    (14905, "6389ecdb851500d9467b41a54d02c58b1542bfc2d5c99339821c89d25135a4b0"), // Chain split
    (17128, "98d76615ef96b3ced1d9902715ba432393335b791b2256936883c323f0bb91f4"),
    (17133, "d9dcec83e8a675db0f7b6d28fde591f494a1b0766f7cb56ea8d8cb95348f835b"),
    (17150, "bad4dccf8fd86f00d6c215802d39342e4de64e21155b76b38f0182ba7d96edd2"),
    (17153, "4e63d92ac5209f0a342c2e74098778bbe36324de66734ff41132c7f3db3ad628"),
    (18375, "c291cf0a7bcd73a91c6f68d28dc6ce9e1acee973fd134f4250c1ee80bf3d0c03"),
    (18813, "ccf401e6fb24f34c105b2f693c2eb75c2ba7a2a4e3ffbbfe152e98ae9806d418"),
    (18814, "f8092b5c474cc260edb7c378c4f7e2123b007a55018d32f97b9b729f729067ae"),
    (19317, "0bd530827eff9bdc79893739c02c14c02bb35a39b943eaeeb72e04767e0597a5"),
    (19400, "cdeebfe4fdeda461ab2025d08248e89b13a1e970c76b91ac2788837c147e6f33"),
    (77852, "e6ec3ddccfb6bd378ca3cf5cc292c011ec235536a9edbb8c3fdbe17abd921d44"),
    (98768, "43f42aaba4a1e8f7a4981b7d8620e5967974b0bbdee4ae22e42f14585be3a52f"),
    (105629, "82ae47c00a0338f33a41b8505162cabaa4740f2187feb07f4ee4bc6138461acb"),
];
const MAINNET_LAST_CHECKPOINT_TIME: i64 = 1_614_113_250;
const MAINNET_TRANSACTIONS_LAST_CHECKPOINT: u64 = 219_212;
const MAINNET_TRANSACTIONS_PER_DAY: f64 = 1440.0;

const TESTNET_CHECKPOINTS: &[(u32, &str)] = &[(0, TESTNET_GENESIS_HASH)];
const REGTEST_CHECKPOINTS: &[(u32, &str)] = &[(0, REGTEST_GENESIS_HASH)];

/// Block-version supermajority thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeMajority {
    /// Upgraded blocks needed to enforce new rules
    pub enforce: u32,
    /// Upgraded blocks needed to reject outdated blocks
    pub reject_outdated: u32,
    /// Window the counts are taken over
    pub window: u32,
}

/// Heights of protocol transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivationHeights {
    /// Last proof-of-work block
    pub last_pow_block: u32,
    /// First proof-of-audit block
    pub start_poa_block: u32,
    /// Stake modifier upgrade
    pub modifier_update_block: u32,
    /// Soft fork changing the difficulty rules
    pub soft_fork_block: u32,
    /// New proof-of-audit difficulty
    pub poa_new_diff: u32,
}

/// Proof-of-audit cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoaSchedule {
    /// Seconds between PoA blocks
    pub block_time: u32,
    /// Minimum PoS blocks audited by one PoA block
    pub min_pos_blocks: u32,
    /// Maximum PoS blocks audited by one PoA block
    pub max_pos_blocks: u32,
}

/// Base58 version prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Base58Prefixes {
    /// Pay-to-pubkey-hash addresses
    pub pubkey_address: [u8; 1],
    /// Pay-to-script-hash addresses
    pub script_address: [u8; 1],
    /// WIF private keys
    pub secret_key: [u8; 1],
    /// BIP32 extended public keys
    pub ext_public_key: [u8; 4],
    /// BIP32 extended private keys
    pub ext_secret_key: [u8; 4],
}

/// Network behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// RPC refuses to start without a password
    pub require_rpc_password: bool,
    /// Mining waits for at least one peer
    pub mining_requires_peers: bool,
    /// Minimum-difficulty blocks are allowed after a long gap
    pub allow_min_difficulty_blocks: bool,
    /// Expensive consistency checks on by default
    pub default_consistency_checks: bool,
    /// Only standard transactions are relayed
    pub require_standard: bool,
    /// Blocks are mined on RPC request rather than continuously
    pub mine_blocks_on_demand: bool,
    /// Proof-of-work checks are skipped
    pub skip_proof_of_work_check: bool,
    /// RPC still reports the deprecated `testnet` field
    pub testnet_to_be_deprecated_field_rpc: bool,
    /// Headers-first synchronisation
    pub headers_first_syncing_active: bool,
}

/// Immutable parameter profile of one network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainParams {
    /// Network this profile describes
    pub network: NetworkId,
    /// Message start bytes
    #[serde(serialize_with = "hex::serde::serialize")]
    pub message_start: [u8; 4],
    /// Default P2P port
    pub default_port: u16,
    /// Highest valid proof-of-work target
    pub pow_limit: U256,
    /// Blocks between subsidy halvings
    pub subsidy_halving_interval: u32,
    /// Deepest reorganisation accepted
    pub max_reorganization_depth: u32,
    /// Block-version upgrade thresholds
    pub majority: UpgradeMajority,
    /// Default internal miner threads
    pub miner_threads: u32,
    /// Difficulty retarget timespan (seconds)
    pub target_timespan: u32,
    /// Target block spacing (seconds)
    pub target_spacing: u32,
    /// Coinbase maturity (blocks)
    pub maturity: u32,
    /// Tolerated masternode count drift
    pub masternode_count_drift: u32,
    /// Maximum money supply (base units)
    pub max_money_out: u64,
    /// Protocol transition heights
    pub activation: ActivationHeights,
    /// Proof-of-audit cadence
    pub poa: PoaSchedule,
    /// Base58 prefixes
    pub base58: Base58Prefixes,
    /// BIP44 coin type (hardened)
    pub ext_coin_type: u32,
    /// Behaviour switches
    pub flags: Capabilities,
    /// Template the genesis block was derived from
    #[serde(skip)]
    pub genesis_template: GenesisTemplate,
    /// Verified genesis block
    pub genesis: GenesisRecord,
    /// Checkpoint table
    pub checkpoints: CheckpointData,
    /// DNS seeds
    pub dns_seeds: Vec<DnsSeed>,
    /// Compiled-in seed peers
    #[serde(skip)]
    pub fixed_seeds: &'static [SeedSpec6],
    /// Maximum transactions in an obfuscation pool
    pub pool_max_transactions: u32,
    /// Placeholder address used by the obfuscation pool
    pub obfuscation_pool_dummy_address: &'static str,
    /// Time masternode payments start (Unix seconds)
    pub start_masternode_payments: i64,
    /// Confirmations required on a budget finalisation fee
    pub budget_fee_confirmations: u32,
}

/// Derive a genesis block and check it against its hard-coded hash
fn verified_genesis(template: &GenesisTemplate, expected_hash: &str) -> Result<GenesisRecord> {
    let expected_hash: Hash256 = expected_hash.parse()?;
    let expected_merkle_root: Hash256 = GENESIS_MERKLE_ROOT.parse()?;
    let derived = derive_genesis(
        template,
        &expected_hash,
        &expected_merkle_root,
        &DoubleSha256,
        &mut TracingProgress::new(template.network),
    )?;
    Ok(derived.record)
}

impl ChainParams {
    /// Build the mainnet profile
    pub fn mainnet() -> Result<Self> {
        let genesis_template = GenesisTemplate {
            network: NetworkId::Main,
            timestamp: GENESIS_TIMESTAMP,
            output_pubkey: GENESIS_OUTPUT_PUBKEY,
            output_value: 0,
            version: 1,
            time: 1_610_409_600, // 2021-01-12 00:00:00 UTC
            bits: 0x1e0f_fff0,
            nonce: 28_149_548,
        };

        let params = Self {
            network: NetworkId::Main,
            // Rarely used upper ASCII, not valid UTF-8, and a large 4-byte int at any alignment.
            message_start: [0xf8, 0x8e, 0xa6, 0x90],
            default_port: 59682,
            pow_limit: U256::MAX >> 1,
            subsidy_halving_interval: 210_000,
            max_reorganization_depth: 100,
            majority: UpgradeMajority {
                enforce: 8100,          // 75%
                reject_outdated: 10260, // 95%
                window: 10800,          // ~7.5 days of blocks
            },
            miner_threads: 0,
            target_timespan: 60,
            target_spacing: 60,
            maturity: 100,
            masternode_count_drift: 20,
            max_money_out: 70_000_000 * COIN,
            activation: ActivationHeights {
                last_pow_block: 500,
                start_poa_block: 560,
                modifier_update_block: 615_800,
                soft_fork_block: 120_000,
                poa_new_diff: 135_000,
            },
            poa: PoaSchedule {
                block_time: 60 * 60,
                min_pos_blocks: 59,
                max_pos_blocks: 120,
            },
            base58: Base58Prefixes {
                pubkey_address: [55],
                script_address: [61],
                secret_key: [28],
                ext_public_key: [0x57, 0x4d, 0x12, 0x23],
                ext_secret_key: [0x57, 0x41, 0x71, 0x65],
            },
            ext_coin_type: 0x8000_0355,
            flags: Capabilities {
                require_rpc_password: true,
                mining_requires_peers: true,
                allow_min_difficulty_blocks: false,
                default_consistency_checks: false,
                require_standard: true,
                mine_blocks_on_demand: false,
                skip_proof_of_work_check: false,
                testnet_to_be_deprecated_field_rpc: false,
                headers_first_syncing_active: false,
            },
            genesis: verified_genesis(&genesis_template, MAINNET_GENESIS_HASH)?,
            genesis_template,
            checkpoints: CheckpointData::from_table(
                MAINNET_CHECKPOINTS,
                MAINNET_LAST_CHECKPOINT_TIME,
                MAINNET_TRANSACTIONS_LAST_CHECKPOINT,
                MAINNET_TRANSACTIONS_PER_DAY,
            )?,
            dns_seeds: MAINNET_DNS_SEEDS.to_vec(),
            fixed_seeds: MAINNET_FIXED_SEEDS,
            pool_max_transactions: 3,
            obfuscation_pool_dummy_address: "D87q2gC9j6nNrnzCsg4aY6bHMLsT9nUhEw",
            start_masternode_payments: 1_546_809_115,
            budget_fee_confirmations: 6,
        };
        params.finish()
    }

    /// Build the testnet profile on top of mainnet
    pub fn testnet(main: &ChainParams) -> Result<Self> {
        let genesis_template = GenesisTemplate {
            network: NetworkId::Test,
            time: 1_608_422_400,
            nonce: 23_860_213,
            ..main.genesis_template
        };

        let params = Self {
            network: NetworkId::Test,
            message_start: [0xc1, 0xaa, 0xb2, 0xe9],
            default_port: 59684,
            majority: UpgradeMajority {
                enforce: 4320,         // 75%
                reject_outdated: 5472, // 95%
                window: 5760,          // 4 days
            },
            miner_threads: 0,
            target_timespan: 60,
            target_spacing: 60,
            maturity: 15,
            masternode_count_drift: 4,
            max_money_out: 5_000_000_000 * COIN,
            activation: ActivationHeights {
                last_pow_block: 500,
                start_poa_block: 560,
                modifier_update_block: 51_197,
                soft_fork_block: 300,
                poa_new_diff: 500,
            },
            poa: PoaSchedule {
                block_time: 30 * 60,
                min_pos_blocks: 20,
                ..main.poa
            },
            base58: Base58Prefixes {
                pubkey_address: [139],
                script_address: [19],
                secret_key: [239],
                ext_public_key: [0x3a, 0x80, 0x61, 0xa0],
                ext_secret_key: [0x3a, 0x80, 0x58, 0x37],
            },
            ext_coin_type: 0x8000_0001,
            flags: Capabilities {
                require_rpc_password: true,
                mining_requires_peers: true,
                allow_min_difficulty_blocks: false,
                default_consistency_checks: false,
                require_standard: false,
                mine_blocks_on_demand: false,
                testnet_to_be_deprecated_field_rpc: true,
                ..main.flags
            },
            genesis: verified_genesis(&genesis_template, TESTNET_GENESIS_HASH)?,
            genesis_template,
            checkpoints: CheckpointData::from_table(TESTNET_CHECKPOINTS, 0, 0, 0.0)?,
            dns_seeds: TESTNET_DNS_SEEDS.to_vec(),
            fixed_seeds: TESTNET_FIXED_SEEDS,
            pool_max_transactions: 2,
            obfuscation_pool_dummy_address: "y57cqfGRkekRyDRNeJiLtYVEbvhXrNbmox",
            start_masternode_payments: 1_420_837_558,
            // Only an 8 block finalisation window on testnet
            budget_fee_confirmations: 3,
            ..main.clone()
        };
        params.finish()
    }

    /// Build the regtest profile on top of testnet
    pub fn regtest(test: &ChainParams) -> Result<Self> {
        let genesis_template = GenesisTemplate {
            network: NetworkId::RegTest,
            time: 1_608_422_399,
            bits: 0x207f_ffff,
            nonce: 12_361,
            ..test.genesis_template
        };

        let params = Self {
            network: NetworkId::RegTest,
            message_start: [0xc6, 0xb3, 0x97, 0xd1],
            default_port: 51476,
            pow_limit: U256::MAX >> 1,
            subsidy_halving_interval: 150,
            majority: UpgradeMajority {
                enforce: 750,
                reject_outdated: 950,
                window: 1000,
            },
            miner_threads: 1,
            target_timespan: 24 * 60 * 60,
            target_spacing: 60,
            flags: Capabilities {
                require_rpc_password: false,
                mining_requires_peers: false,
                allow_min_difficulty_blocks: true,
                default_consistency_checks: true,
                require_standard: false,
                mine_blocks_on_demand: true,
                testnet_to_be_deprecated_field_rpc: false,
                ..test.flags
            },
            genesis: verified_genesis(&genesis_template, REGTEST_GENESIS_HASH)?,
            genesis_template,
            checkpoints: CheckpointData::from_table(REGTEST_CHECKPOINTS, 0, 0, 0.0)?,
            dns_seeds: Vec::new(),
            fixed_seeds: &[],
            ..test.clone()
        };
        params.finish()
    }

    /// Build the full inheritance chain up to `network`
    pub fn build(network: NetworkId) -> Result<Self> {
        let main = Self::mainnet()?;
        match network {
            NetworkId::Main => Ok(main),
            NetworkId::Test => Self::testnet(&main),
            NetworkId::RegTest => Self::regtest(&Self::testnet(&main)?),
        }
    }

    /// Final integrity check shared by every builder
    fn finish(self) -> Result<Self> {
        if !self.checkpoints.verify(0, &self.genesis.hash) {
            let expected = self
                .checkpoints
                .get(0)
                .map_or(Hash256::ZERO, |cp| cp.hash);
            return Err(Error::GenesisHashMismatch {
                network: self.network,
                expected,
                actual: self.genesis.hash,
            });
        }

        info!(
            network = %self.network,
            port = self.default_port,
            checkpoints = self.checkpoints.len(),
            "Chain parameters ready, genesis {}",
            self.genesis.hash
        );
        Ok(self)
    }

    /// Genesis block hash
    pub fn genesis_hash(&self) -> Hash256 {
        self.genesis.hash
    }

    /// Canonical network string id
    pub fn network_id(&self) -> &'static str {
        self.network.as_str()
    }

    /// Check if amount is valid (within max supply)
    pub fn money_range(&self, amount: u64) -> bool {
        amount <= self.max_money_out
    }

    /// Blocks per difficulty retarget window
    pub fn difficulty_adjustment_interval(&self) -> u32 {
        self.target_timespan / self.target_spacing
    }

    /// Whether `height` is still in the proof-of-work phase
    pub fn is_pow_phase(&self, height: u32) -> bool {
        height <= self.activation.last_pow_block
    }

    /// Whether proof-of-audit blocks may appear at `height`
    pub fn is_poa_active(&self, height: u32) -> bool {
        height >= self.activation.start_poa_block
    }

    /// Heuristic current chain height at `now`, given the caller's chain-wide
    /// transaction count
    pub fn estimated_height(&self, now: i64, chain_tx: u64) -> u32 {
        self.checkpoints
            .estimated_height(now, chain_tx, self.target_spacing)
    }

    /// Fixed seed peers with fresh randomised timestamps
    pub fn fixed_seed_addresses(&self) -> Vec<SeedAddress> {
        fixed_seeds_now(self.fixed_seeds)
    }

    /// DNS seed hostnames for peers offering `required_bits`
    pub fn dns_seed_hosts(&self, required_bits: u64) -> Vec<String> {
        dns_hostnames(&self.dns_seeds, required_bits)
    }
}
