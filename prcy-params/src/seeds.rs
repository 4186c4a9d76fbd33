//! Bootstrap peer directory
//!
//! Fixed binary seeds and DNS seed hostnames handed to peer discovery. No
//! sockets are opened and no names are resolved here.

use rand::Rng;
use serde::Serialize;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

/// Full node service bit
pub const NODE_NETWORK: u64 = 1 << 0;

/// Bloom filter service bit
pub const NODE_BLOOM: u64 = 1 << 2;

/// Seconds in a week
pub const ONE_WEEK: i64 = 7 * 24 * 60 * 60;

/// Compiled-in seed record: IPv6 (or IPv4-mapped) address and port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSpec6 {
    /// Address bytes in network order
    pub addr: [u8; 16],
    /// TCP port
    pub port: u16,
}

impl SeedSpec6 {
    /// Socket address, unwrapping IPv4-mapped addresses to plain IPv4
    pub fn socket_addr(&self) -> SocketAddr {
        let v6 = Ipv6Addr::from(self.addr);
        let ip = match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        };
        SocketAddr::new(ip, self.port)
    }
}

/// A seed peer ready for the address manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedAddress {
    /// Peer address
    pub addr: SocketAddr,
    /// Advertised services
    pub services: u64,
    /// Synthetic "last seen" time (Unix seconds)
    pub last_seen: i64,
}

/// Convert fixed seed records into peer addresses.
///
/// Each peer gets a random last-seen time between one and two weeks before
/// `now`. A node only tries one or two of them before gossip hands it
/// addresses with fresher timestamps.
pub fn fixed_seeds<R: Rng + ?Sized>(
    table: &[SeedSpec6],
    now: i64,
    rng: &mut R,
) -> Vec<SeedAddress> {
    table
        .iter()
        .map(|entry| SeedAddress {
            addr: entry.socket_addr(),
            services: NODE_NETWORK,
            last_seen: now - rng.gen_range(0..ONE_WEEK) - ONE_WEEK,
        })
        .collect()
}

/// [`fixed_seeds`] against the wall clock and the thread-local RNG
pub fn fixed_seeds_now(table: &[SeedSpec6]) -> Vec<SeedAddress> {
    fixed_seeds(table, chrono::Utc::now().timestamp(), &mut rand::thread_rng())
}

/// A DNS seed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsSeed {
    /// Display name
    pub name: &'static str,
    /// Hostname to resolve
    pub host: &'static str,
    /// Whether the seed answers `x<bits>.<host>` queries
    pub supports_service_bits_filtering: bool,
}

impl DnsSeed {
    /// Seed without service-bit filtering
    pub const fn new(name: &'static str, host: &'static str) -> Self {
        Self {
            name,
            host,
            supports_service_bits_filtering: false,
        }
    }

    /// Seed that understands service-bit filtered queries
    pub const fn with_filtering(name: &'static str, host: &'static str) -> Self {
        Self {
            name,
            host,
            supports_service_bits_filtering: true,
        }
    }

    /// Hostname to query for peers offering `required_bits`
    pub fn host_for(&self, required_bits: u64) -> String {
        if !self.supports_service_bits_filtering || required_bits == NODE_NETWORK {
            return self.host.to_string();
        }
        format!("x{:x}.{}", required_bits, self.host)
    }
}

/// Hostnames for every seed, in table order
pub fn dns_hostnames(seeds: &[DnsSeed], required_bits: u64) -> Vec<String> {
    seeds.iter().map(|seed| seed.host_for(required_bits)).collect()
}

/// Mainnet DNS seeds
pub const MAINNET_DNS_SEEDS: &[DnsSeed] = &[
    DnsSeed::new("seed.prcycoin.com", "seed.prcycoin.com"),
    DnsSeed::new("seed1.prcycoin.com", "seed1.prcycoin.com"),
    DnsSeed::new("seed2.prcycoin.com", "seed2.prcycoin.com"),
    DnsSeed::new("seed3.prcycoin.com", "seed3.prcycoin.com"),
    DnsSeed::new("seed4.prcycoin.com", "seed4.prcycoin.com"),
    DnsSeed::new("seed5.prcycoin.com", "seed5.prcycoin.com"),
    DnsSeed::new("vps.prcycoin.com", "vps.prcycoin.com"),
    DnsSeed::new("vps1.prcycoin.com", "vps1.prcycoin.com"),
    DnsSeed::new("vps2.prcycoin.com", "vps2.prcycoin.com"),
    DnsSeed::new("vps3.prcycoin.com", "vps3.prcycoin.com"),
    DnsSeed::new("vps4.prcycoin.com", "vps4.prcycoin.com"),
    DnsSeed::new("vps5.prcycoin.com", "vps5.prcycoin.com"),
];

/// Testnet DNS seeds
pub const TESTNET_DNS_SEEDS: &[DnsSeed] = &[DnsSeed::new(
    "testnet.prcycoin-seeds.com",
    "testnet.prcycoin-seeds.com",
)];

/// Mainnet fixed seeds.
///
/// Empty until the table is regenerated from node crawls; bootstrap relies on
/// the DNS seeds alone.
// TODO: regenerate MAINNET_FIXED_SEEDS and TESTNET_FIXED_SEEDS from live node crawls.
pub const MAINNET_FIXED_SEEDS: &[SeedSpec6] = &[];

/// Testnet fixed seeds (empty, see [`MAINNET_FIXED_SEEDS`])
pub const TESTNET_FIXED_SEEDS: &[SeedSpec6] = &[];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn v4_mapped(a: u8, b: u8, c: u8, d: u8, port: u16) -> SeedSpec6 {
        let mut addr = [0u8; 16];
        addr[10] = 0xff;
        addr[11] = 0xff;
        addr[12..].copy_from_slice(&[a, b, c, d]);
        SeedSpec6 { addr, port }
    }

    #[test]
    fn test_ipv4_mapped_unwraps() {
        let entry = v4_mapped(192, 0, 2, 1, 59682);
        assert_eq!(entry.socket_addr().to_string(), "192.0.2.1:59682");
    }

    #[test]
    fn test_plain_ipv6_kept() {
        let mut addr = [0u8; 16];
        addr[0] = 0x20;
        addr[1] = 0x01;
        addr[2] = 0x0d;
        addr[3] = 0xb8;
        addr[15] = 1;
        let entry = SeedSpec6 { addr, port: 59682 };
        assert_eq!(entry.socket_addr().to_string(), "[2001:db8::1]:59682");
    }

    #[test]
    fn test_fixed_seed_timestamps_in_window() {
        let table = [v4_mapped(192, 0, 2, 1, 1), v4_mapped(192, 0, 2, 2, 2)];
        let now = 1_700_000_000;
        let mut rng = StdRng::seed_from_u64(7);
        let seeds = fixed_seeds(&table, now, &mut rng);

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1].addr.port(), 2);
        for seed in seeds {
            assert!(seed.last_seen <= now - ONE_WEEK);
            assert!(seed.last_seen > now - 2 * ONE_WEEK);
            assert_eq!(seed.services, NODE_NETWORK);
        }
    }

    #[test]
    fn test_fixed_seeds_now_empty_table() {
        assert!(fixed_seeds_now(&[]).is_empty());
    }

    #[test]
    fn test_host_for_service_bits() {
        let filtering = DnsSeed::with_filtering("a", "seed.a.example");
        let plain = DnsSeed::new("b", "seed.b.example");

        assert_eq!(filtering.host_for(NODE_NETWORK), "seed.a.example");
        assert_eq!(plain.host_for(NODE_NETWORK), "seed.b.example");

        let bits = NODE_NETWORK | NODE_BLOOM;
        assert_eq!(filtering.host_for(bits), "x5.seed.a.example");
        assert_eq!(plain.host_for(bits), "seed.b.example");
    }

    #[test]
    fn test_dns_hostnames_preserve_order() {
        let seeds = [
            DnsSeed::with_filtering("a", "seed.a.example"),
            DnsSeed::new("b", "seed.b.example"),
        ];
        assert_eq!(
            dns_hostnames(&seeds, NODE_NETWORK),
            vec!["seed.a.example", "seed.b.example"]
        );
        assert_eq!(
            dns_hostnames(&seeds, 0x40d),
            vec!["x40d.seed.a.example", "seed.b.example"]
        );
    }

    #[test]
    fn test_mainnet_table() {
        assert_eq!(MAINNET_DNS_SEEDS.len(), 12);
        assert_eq!(MAINNET_DNS_SEEDS[0].host, "seed.prcycoin.com");
        assert!(MAINNET_DNS_SEEDS
            .iter()
            .all(|seed| !seed.supports_service_bits_filtering));
    }
}
