//! # Engine Configuration
//!
//! Budgets for every allocator, loaded once at startup from TOML.
//!
//! Defaults reproduce the stock build-time tables, so an empty file is a
//! valid configuration:
//!
//! ```toml
//! profile = "shipping"
//!
//! [memory_pools]
//! warning_threshold = 85
//! pools = [
//!     { block_size = 16, blocks = 450 },
//!     { block_size = 32, blocks = 64 },
//! ]
//!
//! [param_table]
//! segments = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_shared::constants::{
    AFFINE_ENTRY_BYTES, AFFINE_ROW_CAP, HBIAS_ENTRY_BYTES, HBIAS_ROW_CAP, MAXIMUM_SCALE,
    PIXELS_PER_TILE_ROW, TOTAL_BGMAP_SEGMENTS,
};
use tessera_shared::BuildProfile;

use crate::error::{ConfigError, ConfigResult};

/// Smallest block able to hold anything useful on a 32-bit target.
const MINIMUM_BLOCK_SIZE: usize = 4;

/// Complete allocator configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Build mode deciding how allocator exhaustion is handled.
    pub profile: BuildProfile,
    /// Object pools.
    pub memory_pools: PoolConfig,
    /// Tile space partitioning.
    pub texture_space: TextureSpaceConfig,
    /// Per-sprite transform table.
    pub param_table: ParamSpaceConfig,
}

impl EngineConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for layouts no allocator can honor.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`EngineConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.memory_pools.validate()?;
        self.texture_space.validate()?;
        self.param_table.validate()?;

        if self.param_table.segments >= self.texture_space.bgmap_segments {
            return Err(ConfigError::Invalid(format!(
                "param table takes {} of {} segments, leaving none for textures",
                self.param_table.segments, self.texture_space.bgmap_segments
            )));
        }

        Ok(())
    }
}

/// One size class of the object allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolClassConfig {
    /// Bytes per block.
    pub block_size: usize,
    /// Number of blocks in the pool.
    pub blocks: usize,
}

impl PoolClassConfig {
    /// Creates a size class.
    #[must_use]
    pub const fn new(block_size: usize, blocks: usize) -> Self {
        Self { block_size, blocks }
    }
}

/// Object pool layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Usage percentage above which a pool is reported as nearly full.
    pub warning_threshold: u8,
    /// Size classes, ascending by block size.
    pub pools: Vec<PoolClassConfig>,
}

impl PoolConfig {
    /// Builds a layout from `(block_size, blocks)` pairs.
    #[must_use]
    pub fn from_classes(classes: &[(usize, usize)]) -> Self {
        Self {
            pools: classes
                .iter()
                .map(|&(block_size, blocks)| PoolClassConfig::new(block_size, blocks))
                .collect(),
            ..Self::default()
        }
    }

    /// Total bytes reserved by every pool.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.pools.iter().map(|p| p.block_size * p.blocks).sum()
    }

    /// Checks the pool table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the table is empty, unsorted, or
    /// holds a class that cannot be addressed.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pools.is_empty() {
            return Err(ConfigError::Invalid("at least one memory pool is required".into()));
        }
        if self.pools.len() > usize::from(u8::MAX) {
            return Err(ConfigError::Invalid(format!(
                "{} memory pools configured, at most {} are addressable",
                self.pools.len(),
                u8::MAX
            )));
        }
        if self.warning_threshold > 100 {
            return Err(ConfigError::Invalid(format!(
                "warning threshold {}% is above 100%",
                self.warning_threshold
            )));
        }

        for (index, pool) in self.pools.iter().enumerate() {
            if pool.block_size < MINIMUM_BLOCK_SIZE || pool.block_size % MINIMUM_BLOCK_SIZE != 0 {
                return Err(ConfigError::Invalid(format!(
                    "pool {index}: block size {} must be a multiple of {MINIMUM_BLOCK_SIZE}",
                    pool.block_size
                )));
            }
            if pool.blocks == 0 || pool.blocks > usize::from(u16::MAX) {
                return Err(ConfigError::Invalid(format!(
                    "pool {index}: block count {} is out of range",
                    pool.blocks
                )));
            }
        }

        if let Some(pair) = self
            .pools
            .windows(2)
            .find(|pair| pair[0].block_size >= pair[1].block_size)
        {
            return Err(ConfigError::Invalid(format!(
                "pools must be strictly ascending by block size ({} then {})",
                pair[0].block_size, pair[1].block_size
            )));
        }

        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            warning_threshold: 85,
            pools: vec![
                PoolClassConfig::new(16, 450),
                PoolClassConfig::new(20, 700),
                PoolClassConfig::new(28, 350),
                PoolClassConfig::new(40, 30),
                PoolClassConfig::new(68, 60),
                PoolClassConfig::new(80, 50),
                PoolClassConfig::new(108, 40),
                PoolClassConfig::new(116, 40),
                PoolClassConfig::new(140, 10),
                PoolClassConfig::new(152, 10),
                PoolClassConfig::new(164, 1),
            ],
        }
    }
}

/// Tile space layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSpaceConfig {
    /// Background map segments in video memory, shared with the param table.
    pub bgmap_segments: u16,
    /// Shelves tracked per segment.
    pub shelves_per_segment: usize,
    /// Keep text rows free at the bottom of the last texture segment.
    pub reserve_printing_segment: bool,
}

impl TextureSpaceConfig {
    /// Checks the tile space layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty layout or one that needs
    /// fewer than two shelves.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bgmap_segments == 0 {
            return Err(ConfigError::Invalid("no background map segments configured".into()));
        }
        if self.shelves_per_segment < 2 {
            return Err(ConfigError::Invalid(format!(
                "{} shelves per segment; the next-shelf boundary needs at least 2",
                self.shelves_per_segment
            )));
        }
        Ok(())
    }
}

impl Default for TextureSpaceConfig {
    fn default() -> Self {
        Self {
            bgmap_segments: TOTAL_BGMAP_SEGMENTS,
            shelves_per_segment: 16,
            reserve_printing_segment: true,
        }
    }
}

/// Param table layout and per-mode row costs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSpaceConfig {
    /// Background map segments reserved for the table at stage load.
    pub segments: u16,
    /// Extra tile rows reserved past each texture so writes never overrun.
    pub padding_rows: u16,
    /// Row cap for affine sprites.
    pub affine_row_cap: u16,
    /// Row cap for h-bias sprites.
    pub hbias_row_cap: u16,
    /// Bytes one affine tile row costs.
    pub affine_bytes_per_row: u32,
    /// Bytes one h-bias tile row costs.
    pub hbias_bytes_per_row: u32,
}

impl ParamSpaceConfig {
    /// Checks the row costs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a mode would cost nothing.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.affine_bytes_per_row == 0 || self.hbias_bytes_per_row == 0 {
            return Err(ConfigError::Invalid("param rows must cost at least one byte".into()));
        }
        if self.affine_row_cap == 0 || self.hbias_row_cap == 0 {
            return Err(ConfigError::Invalid("param row caps must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ParamSpaceConfig {
    fn default() -> Self {
        Self {
            segments: 1,
            padding_rows: 1,
            affine_row_cap: AFFINE_ROW_CAP,
            hbias_row_cap: HBIAS_ROW_CAP,
            affine_bytes_per_row: PIXELS_PER_TILE_ROW * AFFINE_ENTRY_BYTES * MAXIMUM_SCALE,
            hbias_bytes_per_row: PIXELS_PER_TILE_ROW * HBIAS_ENTRY_BYTES,
        }
    }
}
