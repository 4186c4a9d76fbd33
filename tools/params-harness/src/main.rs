//! CLI harness for inspecting PRCY chain parameters
//!
//! This tool allows:
//! - Dumping the selected network's profile as JSON
//! - Re-deriving the genesis block, optionally from an unsolved nonce
//! - Checking a block hash against the checkpoint table
//! - Listing bootstrap seeds for a service-bit mask
//! - Estimating the current chain height from the checkpoint statistics

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use prcy_params::genesis::BlockHeader;
use prcy_params::{
    derive_genesis, select, ChainParams, DoubleSha256, Hash256, NetworkId, SearchProgress, U256,
    NODE_NETWORK,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "params-harness")]
#[command(about = "PRCY chain parameters harness", long_about = None)]
struct Cli {
    /// Use the test network
    #[arg(long, global = true)]
    testnet: bool,

    /// Use the regression test network
    #[arg(long, global = true)]
    regtest: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the selected profile as JSON
    Show,

    /// Re-derive and verify the genesis block
    Genesis {
        /// Start the search from this nonce instead of the shipped one
        #[arg(long)]
        from_nonce: Option<u32>,

        /// Start the search from this block time instead of the shipped one
        #[arg(long)]
        from_time: Option<u32>,
    },

    /// Check a block hash against the checkpoint table
    Checkpoint {
        /// Block height
        height: u32,

        /// Block hash (hex, display order)
        hash: String,
    },

    /// List bootstrap seeds
    Seeds {
        /// Required service bits
        #[arg(short, long, default_value_t = NODE_NETWORK)]
        services: u64,
    },

    /// Estimate the current chain height
    Height {
        /// Chain-wide transaction count of the local tip (defaults to the
        /// count expected from the checkpoint rate)
        #[arg(long)]
        chain_tx: Option<u64>,
    },
}

/// Spinner fed by the nonce search
struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner().template("[{elapsed_precise}] {spinner} {msg}")?,
        );
        Ok(Self { bar })
    }
}

impl SearchProgress for SpinnerProgress {
    fn started(&mut self, header: &BlockHeader, target: &U256) {
        info!("Searching for genesis block");
        info!("Target: {}", Hash256::from_u256(*target));
        self.bar
            .set_message(format!("nonce {} time {}", header.nonce, header.time));
    }

    fn checkpoint(&mut self, nonce: u32, hash: &Hash256) {
        self.bar.set_message(format!("nonce {:08}: {}", nonce, hash));
        self.bar.tick();
    }

    fn nonce_wrapped(&mut self, time: u32) {
        warn!("Nonce wrapped, time now {}", time);
    }

    fn found(&mut self, header: &BlockHeader, hash: &Hash256) {
        self.bar.finish_with_message(format!(
            "found nonce {} time {}: {}",
            header.nonce, header.time, hash
        ));
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let network = NetworkId::from_flags(cli.testnet, cli.regtest)?;
    let params = select(network).context("selecting chain parameters")?;

    match cli.command {
        Commands::Show => show(params),
        Commands::Genesis {
            from_nonce,
            from_time,
        } => rederive_genesis(params, from_nonce, from_time),
        Commands::Checkpoint { height, hash } => check(params, height, &hash),
        Commands::Seeds { services } => seeds(params, services),
        Commands::Height { chain_tx } => estimate_height(params, chain_tx),
    }
}

fn show(params: &ChainParams) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(params)?);
    Ok(())
}

fn rederive_genesis(
    params: &ChainParams,
    from_nonce: Option<u32>,
    from_time: Option<u32>,
) -> anyhow::Result<()> {
    let mut template = params.genesis_template;
    if let Some(nonce) = from_nonce {
        template.nonce = nonce;
    }
    if let Some(time) = from_time {
        template.time = time;
    }

    let mut progress = SpinnerProgress::new()?;
    let derived = derive_genesis(
        &template,
        &params.genesis.hash,
        &params.genesis.header.merkle_root,
        &DoubleSha256,
        &mut progress,
    )?;

    info!(
        "Genesis verified after {} iterations ({} wraps)",
        derived.iterations, derived.wraps
    );
    println!("{}", serde_json::to_string_pretty(&derived.record)?);
    Ok(())
}

fn check(params: &ChainParams, height: u32, hash: &str) -> anyhow::Result<()> {
    let hash: Hash256 = hash.parse()?;
    if params.checkpoints.verify(height, &hash) {
        match params.checkpoints.get(height) {
            Some(_) => info!("Block {} matches checkpoint {}", hash, height),
            None => info!("No checkpoint at height {}", height),
        }
        Ok(())
    } else {
        anyhow::bail!("block {} conflicts with checkpoint at height {}", hash, height)
    }
}

fn seeds(params: &ChainParams, services: u64) -> anyhow::Result<()> {
    for host in params.dns_seed_hosts(services) {
        println!("dns   {}", host);
    }
    for seed in params.fixed_seed_addresses() {
        println!("fixed {} last_seen={}", seed.addr, seed.last_seen);
    }
    Ok(())
}

fn estimate_height(params: &ChainParams, chain_tx: Option<u64>) -> anyhow::Result<()> {
    let now = chrono::Utc::now().timestamp();
    let chain_tx =
        chain_tx.unwrap_or_else(|| params.checkpoints.estimated_transactions(now) as u64);

    info!("Estimating height for {} transactions", chain_tx);
    println!("{}", params.estimated_height(now, chain_tx));
    Ok(())
}
