//! # Tile Space Allocator
//!
//! Shelf (next-fit) packing of textures into background map segments.
//!
//! ## Architecture
//!
//! ```text
//!   segment i (64 x 64 tiles)
//!   ┌────────────────────────────────────┐ y[0] = 0
//!   │ tex 0 │ tex 3 │ tex 4 │ ─► x[0]    │
//!   ├───────┴───────┴───────┴────────────┤ y[1] = tallest on shelf 0
//!   │ tex 1      │ ─► x[1]               │
//!   ├────────────┴───────────────────────┤ y[2]
//!   │ tex 2 │ ─► x[2]                    │
//!   ├───────┘                            │ y[3] = 0 (shelf still open)
//!   └────────────────────────────────────┘
//! ```
//!
//! Each shelf is bounded above by its own start and below by the start of
//! the next shelf. A shelf whose successor has not been placed yet is open
//! and grows to fit the tallest texture put on it.

use std::fmt;

use tessera_core::{ConfigResult, TextureSpaceConfig};
use tessera_shared::constants::{SCREEN_HEIGHT_IN_TILES, SEGMENT_COLS, SEGMENT_ROWS, SEGMENT_TILES};
use tessera_shared::BuildProfile;

use crate::error::{TextureError, TextureResult};
use crate::texture::spec::{Alignment, CharSetSharing, Padding, TextureSpec};

/// Auto-incrementing id of a texture instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u16);

/// Tile rectangle a texture occupies inside its segment, padding excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TilePlacement {
    /// First column.
    pub x: u16,
    /// First row.
    pub y: u16,
    /// Width in tiles.
    pub cols: u16,
    /// Height in tiles.
    pub rows: u16,
}

/// A live texture instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureEntry {
    /// Description currently owning the space (`None` for raw allocations).
    pub spec: Option<TextureSpec>,
    /// Segment holding the texture.
    pub segment: u16,
    /// Where inside the segment.
    pub placement: TilePlacement,
    /// Active users.
    pub usage_count: u16,
}

impl TextureEntry {
    fn is_recyclable(&self) -> bool {
        self.spec.is_some_and(|spec| spec.recyclable)
    }
}

/// Shelf bookkeeping of one segment.
#[derive(Clone, Debug)]
struct Segment {
    /// Tiles placed so far, padding included.
    used_tiles: u32,
    /// Horizontal frontier of each shelf.
    x_offset: Vec<u16>,
    /// Vertical start of each shelf; zero past the first means undefined.
    y_offset: Vec<u16>,
}

impl Segment {
    fn new(shelves: usize) -> Self {
        Self {
            used_tiles: 0,
            x_offset: vec![0; shelves],
            y_offset: vec![0; shelves],
        }
    }

    fn clear(&mut self) {
        self.used_tiles = 0;
        self.x_offset.fill(0);
        self.y_offset.fill(0);
    }

    /// Places a `width` x `height` padded block on the first shelf that
    /// admits it. Returns the top-left corner of the padded block.
    fn place(&mut self, width: u16, height: u16, maximum_row: u16) -> Option<(u16, u16)> {
        let area = u32::from(width) * u32::from(height);
        if SEGMENT_TILES - self.used_tiles < area {
            return None;
        }

        // The last shelf only bounds the one before it.
        for j in 0..self.y_offset.len() - 1 {
            let top = self.y_offset[j];
            let next = self.y_offset[j + 1];
            let open = next == 0;
            let bottom = if open { maximum_row } else { next };

            if open || height <= bottom.saturating_sub(top) {
                if height > maximum_row.saturating_sub(top) {
                    // Shelves below only start lower.
                    return None;
                }
                if width > SEGMENT_COLS - self.x_offset[j] {
                    continue;
                }

                let corner = (self.x_offset[j], top);
                self.x_offset[j] += width;
                if next.saturating_sub(top) < height {
                    self.y_offset[j + 1] = top + height;
                }
                self.used_tiles += area;
                return Some(corner);
            }

            if height > SEGMENT_ROWS - top {
                return None;
            }
        }

        None
    }
}

/// Occupancy of the tile space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureUsage {
    /// Segments available to textures.
    pub available_segments: u16,
    /// Segment sharing its bottom rows with text output.
    pub printing_segment: u16,
    /// Live texture instances.
    pub textures: usize,
    /// Instances built from recyclable descriptions.
    pub recyclable: usize,
    /// Recyclable instances with no users.
    pub recyclable_free: usize,
    /// Tiles used per available segment.
    pub used_tiles: Vec<u32>,
}

impl fmt::Display for TextureUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BGMAP TEXTURES USAGE")?;
        writeln!(f, "Segments for textures: {}", self.available_segments)?;
        writeln!(f, "Printing segment:      {}", self.printing_segment)?;
        writeln!(f, "Textures count:        {}", self.textures)?;
        writeln!(f, "Recyclable textures")?;
        writeln!(f, "  Total: {}", self.recyclable)?;
        write!(f, "  Free:  {}", self.recyclable_free)?;
        for (segment, used) in self.used_tiles.iter().enumerate() {
            write!(f, "\n  Segment {segment:>2}: {used:>4} / {SEGMENT_TILES}")?;
        }
        Ok(())
    }
}

/// Partitions background map segments among texture instances.
///
/// Space is handed out with a shelf heuristic and only reclaimed by
/// [`TextureSpaceAllocator::reset`]. Released textures keep their tiles;
/// recyclable ones can be handed to another description of similar size.
pub struct TextureSpaceAllocator {
    /// Layout limits.
    config: TextureSpaceConfig,
    /// Decides whether running out of space is fatal.
    profile: BuildProfile,
    /// Shelf state of every segment.
    segments: Vec<Segment>,
    /// Segments textures may use; the rest belongs to the param table.
    available_segments: u16,
    /// Live instances, indexed by [`TextureId`].
    entries: Vec<TextureEntry>,
}

impl TextureSpaceAllocator {
    /// Creates an allocator owning every configured segment.
    ///
    /// # Errors
    ///
    /// Returns [`tessera_core::ConfigError::Invalid`] if there are no
    /// segments or fewer than two shelves per segment.
    pub fn new(config: TextureSpaceConfig, profile: BuildProfile) -> ConfigResult<Self> {
        config.validate()?;

        let segments = (0..config.bgmap_segments)
            .map(|_| Segment::new(config.shelves_per_segment))
            .collect();

        Ok(Self {
            config,
            profile,
            segments,
            available_segments: config.bgmap_segments,
            entries: Vec::new(),
        })
    }

    /// Forgets every texture and clears every shelf (stage load).
    pub fn reset(&mut self) {
        self.entries.clear();
        for segment in &mut self.segments {
            segment.clear();
        }
        self.available_segments = self.config.bgmap_segments;
        tracing::info!(
            "texture space reset: {} segments",
            self.available_segments
        );
    }

    /// Limits textures to the first `available` segments.
    pub fn configure(&mut self, available: u16) {
        self.available_segments = available.min(self.config.bgmap_segments);
        tracing::debug!(
            "texture space configured: {} segments, printing segment {}",
            self.available_segments,
            self.printing_segment()
        );
    }

    /// Segments available to textures.
    #[inline]
    #[must_use]
    pub const fn available_segments(&self) -> u16 {
        self.available_segments
    }

    /// Segment whose bottom rows hold text output.
    #[inline]
    #[must_use]
    pub const fn printing_segment(&self) -> u16 {
        self.available_segments.saturating_sub(1)
    }

    /// Tiles used in `segment`.
    #[must_use]
    pub fn used_tiles(&self, segment: u16) -> Option<u32> {
        self.segments
            .get(usize::from(segment))
            .map(|segment| segment.used_tiles)
    }

    /// Live texture instances.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no texture has been allocated since the last reset.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record of a texture.
    #[must_use]
    pub fn entry(&self, id: TextureId) -> Option<&TextureEntry> {
        self.entries.get(usize::from(id.0))
    }

    /// Placement of a texture inside its segment.
    #[must_use]
    pub fn placement(&self, id: TextureId) -> Option<TilePlacement> {
        self.entry(id).map(|entry| entry.placement)
    }

    /// Segment holding a texture.
    #[must_use]
    pub fn segment(&self, id: TextureId) -> Option<u16> {
        self.entry(id).map(|entry| entry.segment)
    }

    /// First column of a texture.
    #[must_use]
    pub fn x_offset(&self, id: TextureId) -> Option<u16> {
        self.placement(id).map(|placement| placement.x)
    }

    /// First row of a texture.
    #[must_use]
    pub fn y_offset(&self, id: TextureId) -> Option<u16> {
        self.placement(id).map(|placement| placement.y)
    }

    /// Users of a texture.
    #[must_use]
    pub fn usage_count(&self, id: TextureId) -> Option<u16> {
        self.entry(id).map(|entry| entry.usage_count)
    }

    /// Carves a `cols` x `rows` texture plus padding out of the first
    /// eligible segment with room for it.
    ///
    /// The new instance starts with one user.
    ///
    /// # Errors
    ///
    /// Returns [`TextureError::UnalignedSegment`] if the aligned start lies
    /// past the last texture segment, or [`TextureError::NoSpace`] if no
    /// shelf admits the texture.
    ///
    /// # Panics
    ///
    /// Both errors are fatal in development profiles.
    pub fn allocate(
        &mut self,
        cols: u16,
        rows: u16,
        padding: Padding,
        alignment: Alignment,
    ) -> TextureResult<TextureId> {
        self.allocate_entry(None, cols, rows, padding, alignment)
    }

    /// Returns a texture for `spec`, reusing space where the description
    /// allows it, and adds one user to it.
    ///
    /// - shared character sets reuse a live texture of the same description;
    /// - recyclable descriptions take over an unused recyclable texture of
    ///   similar size;
    /// - anything else gets fresh space.
    ///
    /// # Errors
    ///
    /// Same as [`TextureSpaceAllocator::allocate`] when fresh space is needed.
    pub fn get_texture(&mut self, spec: &TextureSpec, alignment: Alignment) -> TextureResult<TextureId> {
        let reused = match spec.charset {
            None => None,
            Some(CharSetSharing::Exclusive) if spec.recyclable => self.find_texture(spec, true),
            Some(CharSetSharing::Exclusive) => None,
            Some(CharSetSharing::Shared) => self.find_texture(spec, false),
        };

        if let Some(id) = reused {
            let entry = &mut self.entries[usize::from(id.0)];
            entry.usage_count += 1;
            tracing::debug!(
                "texture {} reused for spec {:?} ({} users)",
                id.0,
                spec.id,
                entry.usage_count
            );
            return Ok(id);
        }

        self.allocate_entry(Some(*spec), spec.cols, spec.rows, spec.padding, alignment)
    }

    /// Drops one user of a texture. The tiles stay reserved.
    ///
    /// # Errors
    ///
    /// Returns [`TextureError::UnknownTexture`] for an id that was never
    /// handed out since the last reset.
    pub fn release_texture(&mut self, id: TextureId) -> TextureResult<()> {
        let entry = self
            .entries
            .get_mut(usize::from(id.0))
            .ok_or(TextureError::UnknownTexture(id.0))?;
        entry.usage_count = entry.usage_count.saturating_sub(1);
        Ok(())
    }

    /// Allocates the recyclable and shared descriptions up front, tallest
    /// first, then releases them so recyclable ones are free for reuse.
    ///
    /// # Errors
    ///
    /// Fails like [`TextureSpaceAllocator::get_texture`] if a texture does
    /// not fit.
    pub fn preload(&mut self, specs: &[TextureSpec]) -> TextureResult<()> {
        let mut sorted: Vec<&TextureSpec> = Vec::with_capacity(specs.len());
        for spec in specs {
            if spec.charset.is_none() || !(spec.recyclable || spec.is_shared()) {
                continue;
            }
            if sorted.iter().any(|known| known.id == spec.id) {
                continue;
            }
            sorted.push(spec);
        }
        // Stable, so equal heights keep their listed order.
        sorted.sort_by(|a, b| b.rows.cmp(&a.rows));

        let mut loaded = Vec::with_capacity(sorted.len());
        for spec in sorted {
            loaded.push(self.get_texture(spec, Alignment::ANY)?);
        }
        for id in loaded {
            self.release_texture(id)?;
        }
        Ok(())
    }

    /// Snapshot of the tile space.
    #[must_use]
    pub fn usage(&self) -> TextureUsage {
        let recyclable: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.is_recyclable())
            .collect();

        TextureUsage {
            available_segments: self.available_segments,
            printing_segment: self.printing_segment(),
            textures: self.entries.len(),
            recyclable: recyclable.len(),
            recyclable_free: recyclable.iter().filter(|e| e.usage_count == 0).count(),
            used_tiles: self.segments[..usize::from(self.available_segments)]
                .iter()
                .map(|segment| segment.used_tiles)
                .collect(),
        }
    }

    /// Looks for a live texture `spec` can use.
    ///
    /// Unless `recyclable_only`, an instance of the very same description
    /// with matching sharing and padding wins outright. Otherwise, for a
    /// recyclable `spec`, the tightest unused recyclable instance whose
    /// area is at least the request and under four times it in each
    /// dimension is handed over to `spec`.
    fn find_texture(&mut self, spec: &TextureSpec, recyclable_only: bool) -> Option<TextureId> {
        let mut selected: Option<usize> = None;

        for (index, entry) in self.entries.iter().enumerate() {
            let Some(owner) = entry.spec else {
                continue;
            };

            if !recyclable_only
                && owner.id == spec.id
                && owner.charset == spec.charset
                && owner.padding == spec.padding
            {
                return Some(TextureId(index as u16));
            }

            if !spec.recyclable || !owner.recyclable || entry.usage_count != 0 {
                continue;
            }

            let TilePlacement { cols, rows, .. } = entry.placement;
            let fits = spec.cols > cols >> 2
                && spec.cols <= cols
                && spec.rows > rows >> 2
                && spec.rows <= rows;
            if !fits {
                continue;
            }

            if spec.cols == cols && spec.rows == rows {
                selected = Some(index);
                break;
            }

            match selected {
                None => selected = Some(index),
                Some(current) => {
                    let best = self.entries[current].placement;
                    if cols < best.cols || rows < best.rows {
                        selected = Some(index);
                    }
                }
            }
        }

        let index = selected?;
        self.entries[index].spec = Some(*spec);
        tracing::debug!("texture {} recycled for spec {:?}", index, spec.id);
        Some(TextureId(index as u16))
    }

    fn allocate_entry(
        &mut self,
        spec: Option<TextureSpec>,
        cols: u16,
        rows: u16,
        padding: Padding,
        alignment: Alignment,
    ) -> TextureResult<TextureId> {
        let width = cols + (padding.cols << 1);
        let height = rows + (padding.rows << 1);
        let stride = alignment.stride();
        let first = alignment.first_segment();

        if alignment.layout.is_some() && first >= self.available_segments {
            return Err(self.fail(TextureError::UnalignedSegment {
                minimum_segment: first,
                stride,
                available: self.available_segments,
            }));
        }

        if width == 0 || height == 0 || width > SEGMENT_COLS || height > SEGMENT_ROWS {
            return Err(self.fail(TextureError::NoSpace { cols: width, rows: height }));
        }

        let printing_segment = self.printing_segment();
        let mut segment = first;
        while segment < self.available_segments {
            let maximum_row = if self.config.reserve_printing_segment && segment == printing_segment {
                SEGMENT_ROWS - SCREEN_HEIGHT_IN_TILES
            } else {
                SEGMENT_ROWS
            };

            if let Some((x, y)) = self.segments[usize::from(segment)].place(width, height, maximum_row) {
                let id = TextureId(self.entries.len() as u16);
                let placement = TilePlacement {
                    x: x + padding.cols,
                    y: y + padding.rows,
                    cols,
                    rows,
                };
                self.entries.push(TextureEntry {
                    spec,
                    segment,
                    placement,
                    usage_count: 1,
                });
                tracing::debug!(
                    "texture {} placed in segment {} at ({}, {}) {}x{}",
                    id.0,
                    segment,
                    placement.x,
                    placement.y,
                    cols,
                    rows
                );
                return Ok(id);
            }

            segment += stride;
        }

        Err(self.fail(TextureError::NoSpace { cols: width, rows: height }))
    }

    /// Applies the build profile to a failure.
    fn fail(&self, error: TextureError) -> TextureError {
        if self.profile.failures_are_fatal() {
            tracing::error!("{}", self.usage());
            panic!("TextureSpace: {error}");
        }
        tracing::warn!("texture space request failed: {error}");
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::spec::SegmentLayout;

    fn config(segments: u16) -> TextureSpaceConfig {
        TextureSpaceConfig {
            bgmap_segments: segments,
            shelves_per_segment: 16,
            reserve_printing_segment: false,
        }
    }

    fn space(segments: u16) -> TextureSpaceAllocator {
        TextureSpaceAllocator::new(config(segments), BuildProfile::Shipping).unwrap()
    }

    #[test]
    fn test_rejects_unusable_layouts() {
        for config in [
            TextureSpaceConfig { shelves_per_segment: 0, ..config(1) },
            TextureSpaceConfig { shelves_per_segment: 1, ..config(1) },
            config(0),
        ] {
            assert!(matches!(
                TextureSpaceAllocator::new(config, BuildProfile::Shipping),
                Err(tessera_core::ConfigError::Invalid(_))
            ));
        }
        assert!(TextureSpaceAllocator::new(
            TextureSpaceConfig { shelves_per_segment: 2, ..config(1) },
            BuildProfile::Shipping,
        )
        .is_ok());
    }

    #[test]
    fn test_first_texture_at_origin() {
        let mut space = space(2);
        let id = space.allocate(8, 4, Padding::NONE, Alignment::ANY).unwrap();
        assert_eq!(space.placement(id), Some(TilePlacement { x: 0, y: 0, cols: 8, rows: 4 }));
        assert_eq!(space.segment(id), Some(0));
        assert_eq!(space.used_tiles(0), Some(32));
        assert_eq!(space.usage_count(id), Some(1));
    }

    #[test]
    fn test_shelf_fills_horizontally_then_opens_next() {
        let mut space = space(1);
        let a = space.allocate(40, 10, Padding::NONE, Alignment::ANY).unwrap();
        let b = space.allocate(20, 6, Padding::NONE, Alignment::ANY).unwrap();
        let c = space.allocate(10, 4, Padding::NONE, Alignment::ANY).unwrap();

        assert_eq!((space.x_offset(a), space.y_offset(a)), (Some(0), Some(0)));
        assert_eq!((space.x_offset(b), space.y_offset(b)), (Some(40), Some(0)));
        // Shelf 0 is full; shelf 1 starts under the tallest texture so far.
        assert_eq!((space.x_offset(c), space.y_offset(c)), (Some(0), Some(10)));
    }

    #[test]
    fn test_taller_texture_skips_short_shelf() {
        let mut space = space(1);
        let _ = space.allocate(8, 4, Padding::NONE, Alignment::ANY).unwrap();
        let _ = space.allocate(8, 20, Padding::NONE, Alignment::ANY).unwrap();
        let short = space.allocate(8, 4, Padding::NONE, Alignment::ANY).unwrap();

        // Shelf 0 is bounded at 4 rows, so the tall one opened shelf 1.
        assert_eq!(space.y_offset(short), Some(0));
        assert_eq!(space.x_offset(short), Some(8));
    }

    #[test]
    fn test_padding_offsets_placement() {
        let mut space = space(1);
        let first = space.allocate(4, 4, Padding::new(1, 2), Alignment::ANY).unwrap();
        let second = space.allocate(4, 4, Padding::NONE, Alignment::ANY).unwrap();

        assert_eq!(space.placement(first), Some(TilePlacement { x: 1, y: 2, cols: 4, rows: 4 }));
        assert_eq!(space.x_offset(second), Some(6));
        assert_eq!(space.used_tiles(0), Some(6 * 8 + 16));
    }

    #[test]
    fn test_single_segment_budget() {
        let mut space = space(1);
        assert!(space.allocate(64, 32, Padding::NONE, Alignment::ANY).is_ok());
        assert!(space.allocate(64, 32, Padding::NONE, Alignment::ANY).is_ok());
        assert_eq!(space.used_tiles(0), Some(SEGMENT_TILES));
        assert_eq!(
            space.allocate(1, 1, Padding::NONE, Alignment::ANY),
            Err(TextureError::NoSpace { cols: 1, rows: 1 })
        );
    }

    #[test]
    fn test_overflow_moves_to_next_segment() {
        let mut space = space(2);
        let _ = space.allocate(64, 64, Padding::NONE, Alignment::ANY).unwrap();
        let next = space.allocate(16, 16, Padding::NONE, Alignment::ANY).unwrap();
        assert_eq!(space.segment(next), Some(1));
    }

    #[test]
    fn test_stride_alignment() {
        let mut space = space(8);
        let id = space
            .allocate(8, 8, Padding::NONE, Alignment::new(1, Some(SegmentLayout::W2x2)))
            .unwrap();
        assert_eq!(space.segment(id), Some(4));

        assert_eq!(
            space.allocate(8, 8, Padding::NONE, Alignment::new(1, Some(SegmentLayout::W1x8))),
            Err(TextureError::UnalignedSegment { minimum_segment: 8, stride: 8, available: 8 })
        );
    }

    #[test]
    #[should_panic(expected = "texture space depleted")]
    fn test_depletion_is_fatal_in_debug() {
        let mut space = TextureSpaceAllocator::new(config(1), BuildProfile::Debug).unwrap();
        let _ = space.allocate(64, 64, Padding::NONE, Alignment::ANY);
        let _ = space.allocate(1, 1, Padding::NONE, Alignment::ANY);
    }

    #[test]
    fn test_printing_segment_keeps_text_rows() {
        let mut space = TextureSpaceAllocator::new(
            TextureSpaceConfig { reserve_printing_segment: true, ..config(1) },
            BuildProfile::Shipping,
        )
        .unwrap();
        assert!(space.allocate(64, 37, Padding::NONE, Alignment::ANY).is_err());
        assert!(space.allocate(64, 36, Padding::NONE, Alignment::ANY).is_ok());
    }

    #[test]
    fn test_configure_limits_segments() {
        let mut space = space(4);
        space.configure(1);
        assert_eq!(space.printing_segment(), 0);
        let _ = space.allocate(64, 64, Padding::NONE, Alignment::ANY).unwrap();
        assert!(space.allocate(1, 1, Padding::NONE, Alignment::ANY).is_err());

        space.reset();
        assert_eq!(space.available_segments(), 4);
        assert!(space.is_empty());
    }

    #[test]
    fn test_shared_spec_reuses_texture() {
        let mut space = space(1);
        let spec = TextureSpec::new(7, 8, 8).shared();

        let first = space.get_texture(&spec, Alignment::ANY).unwrap();
        let second = space.get_texture(&spec, Alignment::ANY).unwrap();
        assert_eq!(first, second);
        assert_eq!(space.usage_count(first), Some(2));
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_exclusive_spec_gets_own_texture() {
        let mut space = space(1);
        let spec = TextureSpec::new(7, 8, 8);

        let first = space.get_texture(&spec, Alignment::ANY).unwrap();
        let second = space.get_texture(&spec, Alignment::ANY).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_recycling_prefers_tightest_fit() {
        let mut space = space(1);
        let big = space.get_texture(&TextureSpec::new(1, 32, 32).recyclable(), Alignment::ANY).unwrap();
        let snug = space.get_texture(&TextureSpec::new(2, 12, 12).recyclable(), Alignment::ANY).unwrap();
        space.release_texture(big).unwrap();
        space.release_texture(snug).unwrap();

        let request = TextureSpec::new(3, 10, 10).recyclable();
        let id = space.get_texture(&request, Alignment::ANY).unwrap();
        assert_eq!(id, snug);
        assert_eq!(space.entry(id).unwrap().spec, Some(request));
        assert_eq!(space.usage_count(id), Some(1));
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_recycling_rejects_wasteful_or_busy() {
        let mut space = space(1);
        let huge = space.get_texture(&TextureSpec::new(1, 64, 32).recyclable(), Alignment::ANY).unwrap();
        space.release_texture(huge).unwrap();

        // 8 columns is not more than a quarter of 64.
        let tiny = space.get_texture(&TextureSpec::new(2, 8, 16).recyclable(), Alignment::ANY).unwrap();
        assert_ne!(tiny, huge);

        // Busy textures are never taken over.
        let busy = space.get_texture(&TextureSpec::new(3, 16, 16).recyclable(), Alignment::ANY).unwrap();
        let other = space.get_texture(&TextureSpec::new(4, 16, 16).recyclable(), Alignment::ANY).unwrap();
        assert_ne!(busy, other);
    }

    #[test]
    fn test_preload_leaves_recyclables_free() {
        let mut space = space(2);
        let specs = [
            TextureSpec::new(1, 8, 4).recyclable(),
            TextureSpec::new(2, 8, 16).recyclable(),
            TextureSpec::new(3, 8, 8).shared(),
            TextureSpec::new(4, 8, 8),
            TextureSpec::new(2, 8, 16).recyclable(),
        ];
        space.preload(&specs).unwrap();

        assert_eq!(space.len(), 3);
        // Tallest first.
        assert_eq!(space.entry(TextureId(0)).unwrap().spec.unwrap().id.0, 2);

        let usage = space.usage();
        assert_eq!(usage.recyclable, 2);
        assert_eq!(usage.recyclable_free, 2);
        assert!(usage.to_string().contains("Textures count:        3"));
    }

    #[test]
    fn test_release_unknown_texture() {
        let mut space = space(1);
        assert_eq!(space.release_texture(TextureId(3)), Err(TextureError::UnknownTexture(3)));
    }
}
