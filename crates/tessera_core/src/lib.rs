//! # TESSERA Core
//!
//! Object allocation for a console with no heap, no operating system and a
//! single interrupt-driven frame loop.
//!
//! ## Architecture Rules
//!
//! 1. **No heap growth after construction** - every pool is sized up front
//! 2. **Atomic with respect to interrupts** - claiming a block happens inside
//!    a critical section because interrupt handlers allocate too
//! 3. **Failures decided at the boundary** - the build profile picks between
//!    a fatal dump and a silent empty result
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{EngineConfig, FixedPoolAllocator, HostInterrupts};
//!
//! let config = EngineConfig::default();
//! let pools = FixedPoolAllocator::new(&config.memory_pools, config.profile, HostInterrupts::new())?;
//!
//! let handle = pools.allocate(24)?;
//! pools.free(handle)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod interrupts;
pub mod memory;

pub use config::{
    EngineConfig, ParamSpaceConfig, PoolClassConfig, PoolConfig, TextureSpaceConfig,
};
pub use error::{ConfigError, ConfigResult, PoolError, PoolResult};
pub use interrupts::{CriticalSection, HostInterrupts, InterruptControl};
pub use memory::{FixedPoolAllocator, PoolHandle, PoolUsage, PoolUsageReport};
pub use tessera_shared::BuildProfile;
