//! # Rendering Error Types
//!
//! All errors that can occur while partitioning video memory.

use thiserror::Error;

/// Errors raised by [`crate::TextureSpaceAllocator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// No shelf in any eligible segment can admit the texture.
    #[error("texture space depleted: no room for {cols}x{rows} tiles")]
    NoSpace {
        /// Columns requested, padding included.
        cols: u16,
        /// Rows requested, padding included.
        rows: u16,
    },

    /// A stride-aligned placement starts past the last texture segment.
    #[error("cannot honor segment stride {stride} from segment {minimum_segment}: only {available} segments")]
    UnalignedSegment {
        /// First segment after rounding up to the stride.
        minimum_segment: u16,
        /// Required segment stride.
        stride: u16,
        /// Segments available for textures.
        available: u16,
    },

    /// The id does not name a live texture.
    #[error("unknown texture {0}")]
    UnknownTexture(u16),
}

/// Result type for tile space operations.
pub type TextureResult<T> = Result<T, TextureError>;

/// Errors raised by [`crate::ParamSpaceAllocator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// The table cannot fit the request.
    #[error("param table depleted: {requested} bytes requested, {available} available")]
    TableFull {
        /// Bytes the sprite needs.
        requested: u32,
        /// Bytes left in the table.
        available: u32,
    },

    /// The sprite has no rows to transform.
    #[error("sprite {0} needs no param table space")]
    EmptySprite(u32),

    /// The sprite holds no allocation.
    #[error("sprite {0} has no param table allocation")]
    UnknownSprite(u32),

    /// Rows of one transform mode were written for a sprite in another.
    #[error("sprite {sprite} does not use this transform mode")]
    ModeMismatch {
        /// The sprite written to.
        sprite: u32,
    },

    /// More rows were supplied than the allocation holds.
    #[error("{rows} param rows supplied, allocation holds {capacity}")]
    RowsOverflow {
        /// Rows supplied.
        rows: usize,
        /// Rows the allocation holds.
        capacity: usize,
    },
}

/// Result type for param table operations.
pub type ParamResult<T> = Result<T, ParamError>;

/// Errors raised while realizing a sprite through [`crate::VideoMemory`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Tile space failure.
    #[error(transparent)]
    Texture(#[from] TextureError),

    /// Param table failure.
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Result type for [`crate::VideoMemory`] operations.
pub type RenderResult<T> = Result<T, RenderError>;
