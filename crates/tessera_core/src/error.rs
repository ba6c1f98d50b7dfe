//! # Core Error Types
//!
//! All errors that can occur in the object pools or while loading the
//! engine configuration.

use thiserror::Error;

/// Errors raised by [`crate::FixedPoolAllocator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Every pool able to hold the request is full.
    #[error("memory pools exhausted: no free block of at least {requested} bytes")]
    Exhausted {
        /// Bytes requested by the caller.
        requested: usize,
    },

    /// The request is larger than the largest block size.
    #[error("request of {requested} bytes exceeds the largest block ({largest} bytes)")]
    Oversized {
        /// Bytes requested by the caller.
        requested: usize,
        /// Block size of the largest pool.
        largest: usize,
    },

    /// The handle does not name a block of any pool.
    #[error("handle does not belong to any pool (pool {pool}, block {block})")]
    InvalidHandle {
        /// Pool index carried by the handle.
        pool: u8,
        /// Block index carried by the handle.
        block: u16,
    },

    /// The handle names a block that is already free.
    #[error("block {block} of pool {pool} is not allocated")]
    NotAllocated {
        /// Pool index carried by the handle.
        pool: u8,
        /// Block index carried by the handle.
        block: u16,
    },

    /// A typed value does not fit in the block it was read from or written to.
    #[error("value of {size} bytes does not fit a {block_size}-byte block")]
    ValueTooLarge {
        /// Size of the value type.
        size: usize,
        /// Size of the block.
        block_size: usize,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors raised while loading or validating [`crate::EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but describes an impossible layout.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
