//! # Tile Space
//!
//! Textures live in fixed 64x64-tile background segments. Space is carved
//! with a shelf heuristic and never compacted, so recyclable textures are
//! reused instead of freed.

mod space;
mod spec;

pub use space::{TextureEntry, TextureId, TextureSpaceAllocator, TextureUsage, TilePlacement};
pub use spec::{Alignment, CharSetSharing, Padding, SegmentLayout, TextureSpec, TextureSpecId};
