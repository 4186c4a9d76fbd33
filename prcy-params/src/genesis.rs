//! Genesis block derivation
//!
//! The genesis block is rebuilt from a fixed coinbase template on every start,
//! hashed, and checked against the hard-coded hash and Merkle root of its
//! network. Templates ship pre-solved, so the nonce search below normally
//! never runs; it is kept complete so a re-parameterised network can be mined
//! from a fresh template.

use crate::compact::decode_compact;
use crate::hash::{merkle_root, Hash256, PowHasher};
use crate::network::NetworkId;
use crate::{Error, Result};
use primitive_types::U256;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Compact bits pushed into every genesis scriptSig
pub const GENESIS_SCRIPT_BITS: i64 = 486_604_799;

/// Extra-nonce pushed after the bits
pub const GENESIS_EXTRA_NONCE: i64 = 4;

/// Nonce stride between progress reports during a search
pub const PROGRESS_INTERVAL: u32 = 10_000;

const OP_0: u8 = 0x00;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1NEGATE: u8 = 0x4f;
const OP_1: u8 = 0x51;
const OP_CHECKSIG: u8 = 0xac;

/// Minimal script writer covering what a coinbase template needs
#[derive(Debug, Default, Clone)]
struct Script(Vec<u8>);

impl Script {
    fn push_opcode(mut self, opcode: u8) -> Self {
        self.0.push(opcode);
        self
    }

    fn push_slice(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len < OP_PUSHDATA1 as usize {
            self.0.push(len as u8);
        } else if len <= 0xff {
            self.0.push(OP_PUSHDATA1);
            self.0.push(len as u8);
        } else if len <= 0xffff {
            self.0.push(OP_PUSHDATA2);
            self.0.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.0.push(OP_PUSHDATA4);
            self.0.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
        self
    }

    /// Integer push using the small-integer opcodes where they apply
    fn push_int(self, n: i64) -> Self {
        match n {
            0 => self.push_opcode(OP_0),
            -1 => self.push_opcode(OP_1NEGATE),
            1..=16 => self.push_opcode(OP_1 + (n as u8) - 1),
            _ => self.push_slice(&script_num(n)),
        }
    }

    /// Explicit number push, always as data
    fn push_num(self, n: i64) -> Self {
        self.push_slice(&script_num(n))
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Minimal little-endian sign-magnitude encoding of a script number
fn script_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }
    let negative = n < 0;
    let mut abs = n.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    // The top bit carries the sign.
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

fn write_compact_size(buf: &mut Vec<u8>, n: usize) {
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&(n as u64).to_le_bytes());
        }
    }
}

/// The single reward-creating transaction of a genesis block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinbaseTx {
    /// Transaction version
    pub version: i32,
    /// Input script embedding the genesis bits and timestamp text
    #[serde(with = "hex")]
    pub script_sig: Vec<u8>,
    /// Output value in base units
    pub value: i64,
    /// Output locking script
    #[serde(with = "hex")]
    pub script_pubkey: Vec<u8>,
    /// Lock time
    pub lock_time: u32,
}

impl CoinbaseTx {
    /// Legacy wire serialisation (one null-prevout input, one output)
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.script_sig.len() + self.script_pubkey.len());
        buf.extend_from_slice(&self.version.to_le_bytes());

        write_compact_size(&mut buf, 1);
        buf.extend_from_slice(Hash256::ZERO.as_bytes());
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        write_compact_size(&mut buf, self.script_sig.len());
        buf.extend_from_slice(&self.script_sig);
        buf.extend_from_slice(&u32::MAX.to_le_bytes());

        write_compact_size(&mut buf, 1);
        buf.extend_from_slice(&self.value.to_le_bytes());
        write_compact_size(&mut buf, self.script_pubkey.len());
        buf.extend_from_slice(&self.script_pubkey);

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Transaction id under `hasher`
    pub fn txid<H: PowHasher + ?Sized>(&self, hasher: &H) -> Hash256 {
        hasher.hash(&self.serialize())
    }
}

/// 80-byte block header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    /// Block version
    pub version: i32,
    /// Previous block hash (zero for genesis)
    pub prev_block: Hash256,
    /// Merkle root of the block's transactions
    pub merkle_root: Hash256,
    /// Block time (Unix seconds)
    pub time: u32,
    /// Compact difficulty
    pub bits: u32,
    /// Proof-of-work nonce
    pub nonce: u32,
}

impl BlockHeader {
    /// Serialised header length
    pub const SIZE: usize = 80;

    /// Wire serialisation
    pub fn serialize(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..36].copy_from_slice(self.prev_block.as_bytes());
        buf[36..68].copy_from_slice(self.merkle_root.as_bytes());
        buf[68..72].copy_from_slice(&self.time.to_le_bytes());
        buf[72..76].copy_from_slice(&self.bits.to_le_bytes());
        buf[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// Block hash under `hasher`
    pub fn hash<H: PowHasher + ?Sized>(&self, hasher: &H) -> Hash256 {
        hasher.hash(&self.serialize())
    }
}

/// Inputs from which a network's genesis block is rebuilt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisTemplate {
    /// Network the template belongs to (used in diagnostics)
    pub network: NetworkId,
    /// Human-readable text embedded in the coinbase scriptSig
    pub timestamp: &'static str,
    /// Uncompressed public key paid by the coinbase output
    pub output_pubkey: [u8; 65],
    /// Coinbase output value in base units
    pub output_value: i64,
    /// Block version
    pub version: i32,
    /// Initial block time
    pub time: u32,
    /// Compact difficulty
    pub bits: u32,
    /// Initial nonce guess
    pub nonce: u32,
}

impl GenesisTemplate {
    /// Build the coinbase transaction described by this template
    pub fn coinbase(&self) -> CoinbaseTx {
        let script_sig = Script::default()
            .push_int(GENESIS_SCRIPT_BITS)
            .push_num(GENESIS_EXTRA_NONCE)
            .push_slice(self.timestamp.as_bytes())
            .into_bytes();
        let script_pubkey = Script::default()
            .push_slice(&self.output_pubkey)
            .push_opcode(OP_CHECKSIG)
            .into_bytes();

        CoinbaseTx {
            version: 1,
            script_sig,
            value: self.output_value,
            script_pubkey,
            lock_time: 0,
        }
    }
}

/// A verified genesis block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenesisRecord {
    /// Block header as solved
    pub header: BlockHeader,
    /// The coinbase transaction
    pub coinbase: CoinbaseTx,
    /// Header hash
    pub hash: Hash256,
}

/// Result of [`derive_genesis`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedGenesis {
    /// The verified genesis block
    pub record: GenesisRecord,
    /// Nonce increments performed by the search (zero for a pre-solved template)
    pub iterations: u64,
    /// Number of nonce wrap-arounds (each bumped the block time by one second)
    pub wraps: u32,
}

/// Observer for the nonce search.
///
/// Every method defaults to a no-op, so implementors only override what they
/// want to report.
pub trait SearchProgress {
    /// The stored nonce did not meet `target`; a search is starting
    fn started(&mut self, _header: &BlockHeader, _target: &U256) {}

    /// Periodic report every [`PROGRESS_INTERVAL`] nonces
    fn checkpoint(&mut self, _nonce: u32, _hash: &Hash256) {}

    /// The nonce wrapped to zero and the block time moved to `time`
    fn nonce_wrapped(&mut self, _time: u32) {}

    /// A header meeting the target was found
    fn found(&mut self, _header: &BlockHeader, _hash: &Hash256) {}
}

/// Progress observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl SearchProgress for NoProgress {}

/// Progress observer that reports through `tracing`
#[derive(Debug, Clone, Copy)]
pub struct TracingProgress {
    network: NetworkId,
}

impl TracingProgress {
    /// Report search progress for `network`
    pub fn new(network: NetworkId) -> Self {
        Self { network }
    }
}

impl SearchProgress for TracingProgress {
    fn started(&mut self, header: &BlockHeader, target: &U256) {
        warn!(
            network = %self.network,
            nonce = header.nonce,
            time = header.time,
            "Searching for genesis block, target {}",
            Hash256::from_u256(*target)
        );
    }

    fn checkpoint(&mut self, nonce: u32, hash: &Hash256) {
        debug!(network = %self.network, "nonce {:08}: hash={}", nonce, hash);
    }

    fn nonce_wrapped(&mut self, time: u32) {
        info!(network = %self.network, time, "Nonce wrapped, incrementing time");
    }

    fn found(&mut self, header: &BlockHeader, hash: &Hash256) {
        info!(
            network = %self.network,
            time = header.time,
            nonce = header.nonce,
            merkle_root = %header.merkle_root,
            "Genesis block found: {}",
            hash
        );
    }
}

/// Statistics of a completed nonce search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStats {
    /// Hash of the accepted header
    pub hash: Hash256,
    /// Nonce increments performed
    pub iterations: u64,
    /// Nonce wrap-arounds
    pub wraps: u32,
}

/// Advance `header` until its hash is at or below `target`.
///
/// Increments the nonce; when it wraps to zero the time is bumped by one so
/// the search space is fresh. Returns immediately if the header already
/// satisfies the target. Deterministic for a given header, target and hasher.
pub fn solve_header<H, P>(
    header: &mut BlockHeader,
    target: &U256,
    hasher: &H,
    progress: &mut P,
) -> SearchStats
where
    H: PowHasher + ?Sized,
    P: SearchProgress + ?Sized,
{
    let mut stats = SearchStats {
        hash: header.hash(hasher),
        ..SearchStats::default()
    };
    if stats.hash.meets_target(target) {
        return stats;
    }

    progress.started(header, target);
    loop {
        header.nonce = header.nonce.wrapping_add(1);
        if header.nonce == 0 {
            header.time = header.time.wrapping_add(1);
            stats.wraps += 1;
            progress.nonce_wrapped(header.time);
        }
        stats.iterations += 1;
        stats.hash = header.hash(hasher);

        if header.nonce % PROGRESS_INTERVAL == 0 {
            progress.checkpoint(header.nonce, &stats.hash);
        }
        if stats.hash.meets_target(target) {
            break;
        }
    }
    progress.found(header, &stats.hash);
    stats
}

/// Rebuild and verify a network's genesis block.
///
/// The derived hash and Merkle root must equal the hard-coded expectations;
/// a mismatch is a configuration-integrity failure and must stop startup.
pub fn derive_genesis<H, P>(
    template: &GenesisTemplate,
    expected_hash: &Hash256,
    expected_merkle_root: &Hash256,
    hasher: &H,
    progress: &mut P,
) -> Result<DerivedGenesis>
where
    H: PowHasher + ?Sized,
    P: SearchProgress + ?Sized,
{
    let coinbase = template.coinbase();
    let merkle = merkle_root(hasher, &[coinbase.txid(hasher)]);

    let mut header = BlockHeader {
        version: template.version,
        prev_block: Hash256::ZERO,
        merkle_root: merkle,
        time: template.time,
        bits: template.bits,
        nonce: template.nonce,
    };

    let target = decode_compact(template.bits)?;
    if target.is_zero() {
        return Err(Error::InvalidCompact(template.bits));
    }
    let stats = solve_header(&mut header, &target, hasher, progress);

    if stats.hash != *expected_hash {
        error!(
            network = %template.network,
            "Genesis hash mismatch: expected {}, derived {}",
            expected_hash,
            stats.hash
        );
        return Err(Error::GenesisHashMismatch {
            network: template.network,
            expected: *expected_hash,
            actual: stats.hash,
        });
    }
    if header.merkle_root != *expected_merkle_root {
        error!(
            network = %template.network,
            "Genesis merkle root mismatch: expected {}, derived {}",
            expected_merkle_root,
            header.merkle_root
        );
        return Err(Error::MerkleRootMismatch {
            network: template.network,
            expected: *expected_merkle_root,
            actual: header.merkle_root,
        });
    }

    debug!(
        network = %template.network,
        nonce = header.nonce,
        iterations = stats.iterations,
        "Genesis verified: {}",
        stats.hash
    );

    Ok(DerivedGenesis {
        record: GenesisRecord {
            header,
            coinbase,
            hash: stats.hash,
        },
        iterations: stats.iterations,
        wraps: stats.wraps,
    })
}
