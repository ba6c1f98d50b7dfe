//! # Memory Management
//!
//! Fixed-class object pools standing in for `malloc`.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once at startup. During gameplay:
//! - No heap allocations
//! - No coalescing (block size never changes within a pool)
//! - Fragmentation is only ever between pools, never inside one

mod pool;
mod usage;

pub use pool::{FixedPoolAllocator, PoolHandle};
pub use usage::{PoolUsage, PoolUsageReport};
