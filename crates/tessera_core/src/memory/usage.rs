//! # Pool Usage Reports
//!
//! Snapshot of every pool, rendered as the dashboard dumped before a fatal
//! exhaustion.

use std::fmt;

/// Occupancy of a single pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolUsage {
    /// Bytes per block.
    pub block_size: usize,
    /// Blocks in the pool.
    pub blocks: usize,
    /// Blocks currently allocated.
    pub used: usize,
}

impl PoolUsage {
    /// Blocks still available.
    #[inline]
    #[must_use]
    pub const fn free(&self) -> usize {
        self.blocks - self.used
    }

    /// Bytes reserved by the pool.
    #[inline]
    #[must_use]
    pub const fn total_bytes(&self) -> usize {
        self.block_size * self.blocks
    }

    /// Bytes held by live blocks.
    #[inline]
    #[must_use]
    pub const fn used_bytes(&self) -> usize {
        self.block_size * self.used
    }

    /// Percentage of blocks in use.
    #[inline]
    #[must_use]
    pub const fn percent_used(&self) -> usize {
        (100 * self.used) / self.blocks
    }
}

/// Occupancy of every pool, ascending by block size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolUsageReport {
    /// Per-pool figures.
    pub pools: Vec<PoolUsage>,
}

impl PoolUsageReport {
    /// Bytes reserved by all pools.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.pools.iter().map(PoolUsage::total_bytes).sum()
    }

    /// Bytes held by live blocks across all pools.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.pools.iter().map(PoolUsage::used_bytes).sum()
    }

    /// Percentage of reserved bytes in use.
    #[must_use]
    pub fn percent_used(&self) -> usize {
        match self.total_bytes() {
            0 => 0,
            total => (100 * self.used_bytes()) / total,
        }
    }

    /// Pools whose usage is above `threshold` percent.
    pub fn above(&self, threshold: u8) -> impl Iterator<Item = &PoolUsage> {
        self.pools
            .iter()
            .filter(move |pool| pool.percent_used() > usize::from(threshold))
    }
}

impl fmt::Display for PoolUsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MEMORY POOLS STATUS")?;
        writeln!(f, "{:>5} {:>6} {:>6} {:>5}", "Pool", "Free", "Used", "%")?;
        for pool in &self.pools {
            writeln!(
                f,
                "{:>5} {:>6} {:>6} {:>4}%",
                pool.block_size,
                pool.free(),
                pool.used,
                pool.percent_used()
            )?;
        }
        writeln!(f, "Pool size:  {:>8}", self.total_bytes())?;
        write!(
            f,
            "Pool usage: {:>8} ({}%)",
            self.used_bytes(),
            self.percent_used()
        )
    }
}
