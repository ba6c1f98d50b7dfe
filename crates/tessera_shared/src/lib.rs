//! # TESSERA Shared
//!
//! Fixed console geometry and build profiles used by every allocator crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER contain allocator state. It only describes the
//! hardware the allocators partition and the build mode they run under.
//!
//! If you need bookkeeping, put it in `tessera_core` or `tessera_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod profile;

pub use constants::{
    BGMAP_SEGMENT_SIZE, MAXIMUM_SCALE, SCREEN_HEIGHT_IN_TILES, SEGMENT_COLS, SEGMENT_ROWS,
    SEGMENT_TILES, TOTAL_BGMAP_SEGMENTS,
};
pub use profile::BuildProfile;
