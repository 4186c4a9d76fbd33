//! Blockchain checkpoints for faster sync

use crate::hash::Hash256;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seconds per day, for the transactions-per-day rate
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Relative cost of verifying a transaction past the last checkpoint
const SIGCHECK_VERIFICATION_FACTOR: f64 = 5.0;

/// A trusted (height, hash) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    /// Block height
    pub height: u32,
    /// Block hash
    pub hash: Hash256,
}

/// Checkpoint table plus the statistics used to estimate sync progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckpointData {
    checkpoints: BTreeMap<u32, Hash256>,
    /// Timestamp of the last checkpoint block (Unix seconds)
    pub last_checkpoint_time: i64,
    /// Transactions between genesis and the last checkpoint
    pub transactions_last_checkpoint: u64,
    /// Estimated transactions per day after the last checkpoint
    pub transactions_per_day: f64,
}

impl CheckpointData {
    /// Build from a literal table.
    ///
    /// Heights must be strictly increasing in table order and every hash must
    /// parse; either failure means the compiled-in table is corrupt.
    pub fn from_table(
        table: &[(u32, &str)],
        last_checkpoint_time: i64,
        transactions_last_checkpoint: u64,
        transactions_per_day: f64,
    ) -> Result<Self> {
        let mut checkpoints = BTreeMap::new();
        let mut previous: Option<u32> = None;

        for &(height, hash) in table {
            if let Some(previous) = previous {
                if height <= previous {
                    return Err(Error::CheckpointOrder { previous, height });
                }
            }
            checkpoints.insert(height, hash.parse::<Hash256>()?);
            previous = Some(height);
        }

        Ok(Self {
            checkpoints,
            last_checkpoint_time,
            transactions_last_checkpoint,
            transactions_per_day,
        })
    }

    /// Check a block hash against the table.
    ///
    /// True when no checkpoint exists at `height` or the checkpoint matches.
    pub fn verify(&self, height: u32, hash: &Hash256) -> bool {
        self.checkpoints
            .get(&height)
            .map_or(true, |expected| expected == hash)
    }

    /// Checkpoint at exactly `height`
    pub fn get(&self, height: u32) -> Option<CheckpointEntry> {
        self.checkpoints
            .get(&height)
            .map(|hash| CheckpointEntry { height, hash: *hash })
    }

    /// Highest checkpoint
    pub fn last_checkpoint(&self) -> Option<CheckpointEntry> {
        self.checkpoints
            .iter()
            .next_back()
            .map(|(height, hash)| CheckpointEntry {
                height: *height,
                hash: *hash,
            })
    }

    /// Get checkpoint at or before given height
    pub fn checkpoint_at_or_before(&self, height: u32) -> Option<CheckpointEntry> {
        self.checkpoints
            .range(..=height)
            .next_back()
            .map(|(height, hash)| CheckpointEntry {
                height: *height,
                hash: *hash,
            })
    }

    /// Highest checkpoint whose block the caller already knows about.
    ///
    /// `is_known` is typically a lookup into the node's block index.
    pub fn last_known_checkpoint<F>(&self, is_known: F) -> Option<CheckpointEntry>
    where
        F: Fn(&Hash256) -> bool,
    {
        self.checkpoints
            .iter()
            .rev()
            .find(|(_, hash)| is_known(hash))
            .map(|(height, hash)| CheckpointEntry {
                height: *height,
                hash: *hash,
            })
    }

    /// Height of the last checkpoint, or 0 for an empty table
    pub fn total_blocks_estimate(&self) -> u32 {
        self.last_checkpoint().map_or(0, |cp| cp.height)
    }

    /// Extrapolate the current chain height from the last checkpoint.
    ///
    /// `chain_tx` is the caller's current chain-wide transaction count. The
    /// transactions past the last checkpoint, at [`Self::transactions_per_day`],
    /// give the days elapsed since it; those days are capped by the clock and
    /// converted to blocks at `target_spacing`. Tables without a recorded rate
    /// fall back to the clock alone.
    ///
    /// Heuristic only. Never below the last checkpoint height; tables without a
    /// recorded checkpoint time return that height unchanged.
    pub fn estimated_height(&self, now: i64, chain_tx: u64, target_spacing: u32) -> u32 {
        let base = self.total_blocks_estimate();
        if self.last_checkpoint_time <= 0 || target_spacing == 0 {
            return base;
        }

        let clock_secs = (now - self.last_checkpoint_time).max(0) as f64;
        let elapsed_secs = if self.transactions_per_day > 0.0 {
            let new_tx = chain_tx.saturating_sub(self.transactions_last_checkpoint) as f64;
            (new_tx * SECONDS_PER_DAY / self.transactions_per_day).min(clock_secs)
        } else {
            clock_secs
        };

        // Float-to-int casts saturate.
        let blocks = (elapsed_secs / f64::from(target_spacing)) as u32;
        base.saturating_add(blocks)
    }

    /// Expected chain-wide transaction count at `now`
    pub fn estimated_transactions(&self, now: i64) -> f64 {
        let elapsed_days = (now - self.last_checkpoint_time).max(0) as f64 / SECONDS_PER_DAY;
        self.transactions_last_checkpoint as f64 + elapsed_days * self.transactions_per_day
    }

    /// Fraction of total verification work done, in `[0, 1]`.
    ///
    /// Work before the last checkpoint is cheap; transactions after it cost
    /// [`SIGCHECK_VERIFICATION_FACTOR`] times more because signatures are
    /// checked. `chain_tx` and `block_time` describe the caller's tip.
    pub fn guess_verification_progress(&self, chain_tx: u64, block_time: i64, now: i64) -> f64 {
        let last_tx = self.transactions_last_checkpoint;

        let (work_before, work_after) = if chain_tx <= last_tx {
            let cheap_before = chain_tx as f64;
            let cheap_after = (last_tx - chain_tx) as f64;
            let expensive_after = (now - self.last_checkpoint_time).max(0) as f64
                / SECONDS_PER_DAY
                * self.transactions_per_day;
            (
                cheap_before,
                cheap_after + expensive_after * SIGCHECK_VERIFICATION_FACTOR,
            )
        } else {
            let cheap_before = last_tx as f64;
            let expensive_before = (chain_tx - last_tx) as f64;
            let expensive_after =
                (now - block_time).max(0) as f64 / SECONDS_PER_DAY * self.transactions_per_day;
            (
                cheap_before + expensive_before * SIGCHECK_VERIFICATION_FACTOR,
                expensive_after * SIGCHECK_VERIFICATION_FACTOR,
            )
        };

        let total = work_before + work_after;
        if total <= 0.0 {
            return 0.0;
        }
        work_before / total
    }

    /// All checkpoints in ascending height order
    pub fn entries(&self) -> impl Iterator<Item = CheckpointEntry> + '_ {
        self.checkpoints
            .iter()
            .map(|(height, hash)| CheckpointEntry {
                height: *height,
                hash: *hash,
            })
    }

    /// Checkpoint heights in ascending order
    pub fn heights(&self) -> Vec<u32> {
        self.checkpoints.keys().copied().collect()
    }

    /// Get checkpoint count
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "000006957e238ff4e6bcf00c8a7d1b3e7249c0a2109b0391d8740821a40c1d8c";
    const B: &str = "00214da9b906c7c14558395b9bc88293301e6e5f87a714194079dd651293fadb";
    const C: &str = "54872c72e81b34117bc5a6095d6f1b8d85746992d2513d7adc90a2aceed1651e";

    fn sample() -> CheckpointData {
        CheckpointData::from_table(&[(0, A), (500, B), (561, C)], 1_000_000, 1_000, 1440.0)
            .unwrap()
    }

    #[test]
    fn test_rejects_non_increasing_heights() {
        let err = CheckpointData::from_table(&[(0, A), (500, B), (500, C)], 0, 0, 0.0)
            .unwrap_err();
        assert!(matches!(err, Error::CheckpointOrder { previous: 500, height: 500 }));

        let err = CheckpointData::from_table(&[(10, A), (5, B)], 0, 0, 0.0).unwrap_err();
        assert!(matches!(err, Error::CheckpointOrder { previous: 10, height: 5 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_rejects_bad_hash() {
        let err = CheckpointData::from_table(&[(0, "nothex")], 0, 0, 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidHash(_)));
    }

    #[test]
    fn test_verify() {
        let cps = sample();
        assert!(cps.verify(500, &B.parse().unwrap()));
        assert!(!cps.verify(500, &A.parse().unwrap()));
        // No checkpoint at this height: anything goes
        assert!(cps.verify(501, &A.parse().unwrap()));
    }

    #[test]
    fn test_last_checkpoint() {
        let cps = sample();
        let last = cps.last_checkpoint().unwrap();
        assert_eq!(last.height, 561);
        assert_eq!(last.hash, C.parse().unwrap());
        assert_eq!(cps.total_blocks_estimate(), 561);

        let empty = CheckpointData::from_table(&[], 0, 0, 0.0).unwrap();
        assert!(empty.last_checkpoint().is_none());
        assert_eq!(empty.total_blocks_estimate(), 0);
    }

    #[test]
    fn test_checkpoint_at_or_before() {
        let cps = sample();
        assert_eq!(cps.checkpoint_at_or_before(520).unwrap().height, 500);
        assert_eq!(cps.checkpoint_at_or_before(561).unwrap().height, 561);
        assert_eq!(cps.checkpoint_at_or_before(0).unwrap().height, 0);
    }

    #[test]
    fn test_last_known_checkpoint() {
        let cps = sample();
        let b: Hash256 = B.parse().unwrap();
        let known = cps.last_known_checkpoint(|hash| *hash == b).unwrap();
        assert_eq!(known.height, 500);
        assert!(cps.last_known_checkpoint(|_| false).is_none());
    }

    #[test]
    fn test_estimated_height() {
        let cps = sample();
        let now = 1_000_000 + 86_400;

        // 1440 tx/day at one block a minute: one block per new transaction
        assert_eq!(cps.estimated_height(now, 1_000 + 10, 60), 571);
        // No transactions past the checkpoint yet
        assert_eq!(cps.estimated_height(now, 1_000, 60), 561);
        assert_eq!(cps.estimated_height(now, 0, 60), 561);
        // Capped by the clock: at most a day of blocks after a day
        assert_eq!(cps.estimated_height(now, 1_000_000, 60), 561 + 1_440);
        // Clock behind the checkpoint does not move the estimate backwards
        assert_eq!(cps.estimated_height(0, 1_000_000, 60), 561);

        let no_stats = CheckpointData::from_table(&[(0, A)], 0, 0, 0.0).unwrap();
        assert_eq!(no_stats.estimated_height(1_700_000_000, 5_000, 60), 0);
    }

    #[test]
    fn test_estimated_height_follows_transaction_rate() {
        let table = [(0, A), (500, B), (561, C)];
        let slow = CheckpointData::from_table(&table, 1_000_000, 1_000, 1.0).unwrap();
        let busy = CheckpointData::from_table(&table, 1_000_000, 1_000, 1_000_000.0).unwrap();
        let now = 1_000_000 + 86_400;

        // 1000 new transactions: a day's worth on the slow chain, seconds on the busy one
        assert_eq!(slow.estimated_height(now, 2_000, 60), 561 + 1_440);
        assert_eq!(busy.estimated_height(now, 2_000, 60), 562);
        assert_ne!(
            slow.estimated_height(now, 2_000, 60),
            busy.estimated_height(now, 2_000, 60)
        );
    }

    #[test]
    fn test_estimated_height_without_rate_uses_clock() {
        let cps = CheckpointData::from_table(&[(0, A), (500, B)], 1_000_000, 1_000, 0.0).unwrap();
        assert_eq!(cps.estimated_height(1_000_000 + 600, 0, 60), 510);
    }

    #[test]
    fn test_estimated_transactions() {
        let cps = sample();
        let tx = cps.estimated_transactions(1_000_000 + 86_400);
        assert!((tx - 2_440.0).abs() < 1e-9);
    }

    #[test]
    fn test_verification_progress() {
        let cps = sample();
        let now = 1_000_000;
        // Caught up exactly at the checkpoint with no time elapsed
        assert!((cps.guess_verification_progress(1_000, now, now) - 1.0).abs() < 1e-9);
        // Half of the cheap history
        assert!((cps.guess_verification_progress(500, 0, now) - 0.5).abs() < 1e-9);
        // Past the checkpoint but a day behind
        let progress = cps.guess_verification_progress(1_100, now, now + 86_400);
        assert!(progress > 0.0 && progress < 1.0);

        let empty = CheckpointData::from_table(&[], 0, 0, 0.0).unwrap();
        assert_eq!(empty.guess_verification_progress(0, 0, 0), 0.0);
    }

    #[test]
    fn test_heights_sorted() {
        assert_eq!(sample().heights(), vec![0, 500, 561]);
    }
}
