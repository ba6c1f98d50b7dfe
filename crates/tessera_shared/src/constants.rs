//! # Hardware Geometry
//!
//! Video memory layout of the target console.
//!
//! **CRITICAL:** These values describe silicon, not tuning knobs.
//! Tunable budgets live in the engine config instead.

// =============================================================================
// BACKGROUND MAP SPACE
// =============================================================================

/// Columns of tiles in one background map segment.
pub const SEGMENT_COLS: u16 = 64;

/// Rows of tiles in one background map segment.
pub const SEGMENT_ROWS: u16 = 64;

/// Tiles addressable by one segment (64 x 64).
pub const SEGMENT_TILES: u32 = SEGMENT_COLS as u32 * SEGMENT_ROWS as u32;

/// Bytes occupied by one segment (two bytes per tile entry).
pub const BGMAP_SEGMENT_SIZE: u32 = SEGMENT_TILES * 2;

/// Segments available in background map space before the param table takes its share.
pub const TOTAL_BGMAP_SEGMENTS: u16 = 14;

// =============================================================================
// SCREEN
// =============================================================================

/// Screen height in pixels.
pub const SCREEN_HEIGHT: u16 = 224;

/// Screen height in tiles. The printing segment keeps this many rows for text.
pub const SCREEN_HEIGHT_IN_TILES: u16 = SCREEN_HEIGHT >> 3;

// =============================================================================
// PARAM TABLE
// =============================================================================

/// Pixel rows covered by one tile row.
pub const PIXELS_PER_TILE_ROW: u32 = 8;

/// Bytes of one affine param entry (one pixel row of an affine sprite).
pub const AFFINE_ENTRY_BYTES: u32 = 16;

/// Bytes of one h-bias param entry (one pixel row of an h-bias sprite).
pub const HBIAS_ENTRY_BYTES: u32 = 4;

/// Largest scale factor an affine sprite may be drawn at.
pub const MAXIMUM_SCALE: u32 = 2;

/// Tile rows an affine sprite can address in the param table.
pub const AFFINE_ROW_CAP: u16 = 64;

/// Tile rows an h-bias sprite can address in the param table.
pub const HBIAS_ROW_CAP: u16 = 28;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_geometry_is_consistent() {
        assert_eq!(SEGMENT_TILES, 4096);
        assert_eq!(BGMAP_SEGMENT_SIZE, 8192);
        assert_eq!(SCREEN_HEIGHT_IN_TILES, 28);
    }
}
