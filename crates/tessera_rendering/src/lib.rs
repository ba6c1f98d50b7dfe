//! # TESSERA Rendering
//!
//! Video memory partitioning for tile-based sprites.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────── background map memory ────────────────────────┐
//! │ segment 0 │ segment 1 │ ... │ printing segment │ param table segments │
//! │  shelves  │  shelves  │     │ shelves + text   │ affine / h-bias rows │
//! └───────────┴───────────┴─────┴──────────────────┴──────────────────────┘
//!        TextureSpaceAllocator                        ParamSpaceAllocator
//! ```
//!
//! ## Rules
//!
//! - Only the frame loop touches these allocators, never interrupt handlers
//! - Param rows move only between frames, one sprite at a time
//! - Texture space is reclaimed at stage load, never mid-stage

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod param;
pub mod texture;
pub mod video_memory;

pub use error::{ParamError, ParamResult, RenderError, RenderResult, TextureError, TextureResult};
pub use param::{
    AffineEntry, Defrag, HBiasEntry, ParamRow, ParamSpaceAllocator, ParamSprite, ParamUsage,
    PendingFree, RowWrite, SpriteHandle, TransformMode,
};
pub use texture::{
    Alignment, CharSetSharing, Padding, SegmentLayout, TextureEntry, TextureId,
    TextureSpaceAllocator, TextureSpec, TextureSpecId, TextureUsage, TilePlacement,
};
pub use video_memory::{RealizedSprite, VideoMemory};
