//! # Param Table
//!
//! Per-row transform coefficients read by the video unit while it draws
//! affine and h-bias sprites.

mod rows;
mod space;

pub use rows::{AffineEntry, HBiasEntry, ParamRow, TransformMode};
pub use space::{
    Defrag, ParamSpaceAllocator, ParamSprite, ParamUsage, PendingFree, RowWrite, SpriteHandle,
};
