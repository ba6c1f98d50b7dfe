//! Row layouts of the param table.
//!
//! Both layouts are `Pod` so they can be copied into table memory as raw
//! bytes, the same way the video unit reads them back.

use bytemuck::{Pod, Zeroable};
use tessera_core::ParamSpaceConfig;
use tessera_shared::constants::{AFFINE_ENTRY_BYTES, HBIAS_ENTRY_BYTES};

/// How the video unit transforms a background sprite row by row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformMode {
    /// Full affine transform (rotation, scale, shear).
    Affine,
    /// Horizontal displacement per pixel row.
    HBias,
}

impl TransformMode {
    /// Bytes one tile row of a sprite costs in the table.
    #[inline]
    #[must_use]
    pub const fn bytes_per_row(self, config: &ParamSpaceConfig) -> u32 {
        match self {
            Self::Affine => config.affine_bytes_per_row,
            Self::HBias => config.hbias_bytes_per_row,
        }
    }

    /// Most tile rows the mode ever needs.
    #[inline]
    #[must_use]
    pub const fn row_cap(self, config: &ParamSpaceConfig) -> u16 {
        match self {
            Self::Affine => config.affine_row_cap,
            Self::HBias => config.hbias_row_cap,
        }
    }
}

/// A row layout of the param table.
pub trait ParamRow: Pod {
    /// Mode whose sprites are made of these rows.
    const MODE: TransformMode;
}

/// One affine row: fixed-point matrix terms and source displacement.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct AffineEntry {
    /// Parallax shift.
    pub mx: i16,
    /// Horizontal scale/rotation term.
    pub mp: i16,
    /// Source row.
    pub my: i16,
    /// Horizontal step per pixel.
    pub dx: i16,
    /// Vertical step per pixel.
    pub dy: i16,
    /// Unused by the video unit.
    pub reserved: [i16; 3],
}

impl ParamRow for AffineEntry {
    const MODE: TransformMode = TransformMode::Affine;
}

/// One h-bias row: horizontal shift of each eye's image.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct HBiasEntry {
    /// Shift of the left image.
    pub left: i16,
    /// Shift of the right image.
    pub right: i16,
}

impl ParamRow for HBiasEntry {
    const MODE: TransformMode = TransformMode::HBias;
}

const _: () = assert!(std::mem::size_of::<AffineEntry>() == AFFINE_ENTRY_BYTES as usize);
const _: () = assert!(std::mem::size_of::<HBiasEntry>() == HBIAS_ENTRY_BYTES as usize);
