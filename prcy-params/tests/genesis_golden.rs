//! Golden genesis fixtures for every network

use prcy_params::{
    derive_genesis, profile_for, ChainParams, DoubleSha256, Hash256, NetworkId, NoProgress,
};

const MERKLE_ROOT: &str = "07703a9238239ceb0489c1bffbb75ece37613bd68a53bb92ea2a49ba47ec3fe6";

fn golden(network: NetworkId) -> (&'static str, u32, u32) {
    match network {
        NetworkId::Main => (
            "000007b4e047bba025d2541e5d3b643be7b4da3bca22f981aa9c184d6c8c4dd9",
            1_610_409_600,
            28_149_548,
        ),
        NetworkId::Test => (
            "00000231b3fd9bd40bcf7a8be00b8b78daeb733ac8539b75f10240e74ff0a114",
            1_608_422_400,
            23_860_213,
        ),
        NetworkId::RegTest => (
            "318553f5e5d7ce64b40c3e51d06fa934a6ac7069b4860874bf6319409c0c74da",
            1_608_422_399,
            12_361,
        ),
    }
}

#[test]
fn genesis_matches_golden_values() {
    let merkle: Hash256 = MERKLE_ROOT.parse().unwrap();

    for network in NetworkId::ALL {
        let (hash, time, nonce) = golden(network);
        let expected: Hash256 = hash.parse().unwrap();
        let params = profile_for(network);

        let derived = derive_genesis(
            &params.genesis_template,
            &expected,
            &merkle,
            &DoubleSha256,
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(derived.iterations, 0, "{} template should ship solved", network);
        assert_eq!(derived.record.hash, expected);
        assert_eq!(derived.record.header.merkle_root, merkle);
        assert_eq!(derived.record.header.time, time);
        assert_eq!(derived.record.header.nonce, nonce);
        assert_eq!(derived.record.header.prev_block, Hash256::ZERO);
        assert_eq!(derived.record, params.genesis);
    }
}

#[test]
fn coinbase_serialization_is_stable() {
    let params = profile_for(NetworkId::Main);
    let tx = params.genesis.coinbase.serialize();
    assert_eq!(tx.len(), 201);
    assert_eq!(&tx[..5], &[0x01, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(&tx[tx.len() - 4..], &[0, 0, 0, 0]);
    assert_eq!(params.genesis.coinbase.value, 0);
}

#[test]
fn nonce_wrap_search_matches_presolved_template() {
    let regtest = profile_for(NetworkId::RegTest);
    let merkle: Hash256 = MERKLE_ROOT.parse().unwrap();
    let expected: Hash256 = "5bae780c3214b14411ca4df23823373c7ed4eba4728d1e428707f540909e6360"
        .parse()
        .unwrap();

    // Two steps from the top of the nonce space: MAX, then wrap to 0 with time + 1.
    let mut unsolved = regtest.genesis_template;
    unsolved.time = 1_608_422_399;
    unsolved.nonce = u32::MAX - 1;

    let searched =
        derive_genesis(&unsolved, &expected, &merkle, &DoubleSha256, &mut NoProgress).unwrap();
    assert_eq!(searched.iterations, 2);
    assert_eq!(searched.wraps, 1);
    assert_eq!(searched.record.header.time, 1_608_422_400);
    assert_eq!(searched.record.header.nonce, 0);

    let mut solved = unsolved;
    solved.time = searched.record.header.time;
    solved.nonce = searched.record.header.nonce;

    let direct =
        derive_genesis(&solved, &expected, &merkle, &DoubleSha256, &mut NoProgress).unwrap();
    assert_eq!(direct.iterations, 0);
    assert_eq!(direct.wraps, 0);
    assert_eq!(direct.record, searched.record);
}

#[test]
fn tampered_template_is_fatal() {
    let main = profile_for(NetworkId::Main);
    let (hash, _, _) = golden(NetworkId::Main);
    let expected: Hash256 = hash.parse().unwrap();
    let merkle: Hash256 = MERKLE_ROOT.parse().unwrap();

    let mut tampered = main.genesis_template;
    tampered.timestamp = "12 January 2021 PRCY Coin Development Team";
    // Regtest bits keep the search short; the Merkle root changes so the hash cannot match.
    tampered.bits = 0x207f_ffff;

    let err = derive_genesis(&tampered, &expected, &merkle, &DoubleSha256, &mut NoProgress)
        .unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn build_chain_is_deterministic() {
    for network in NetworkId::ALL {
        let a = ChainParams::build(network).unwrap();
        let b = ChainParams::build(network).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.genesis_hash().to_string(), golden(network).0);
    }
}
