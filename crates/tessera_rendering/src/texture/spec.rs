//! Texture descriptions handed to the tile space allocator.

/// Identity of a texture description (one per asset, shared by every
/// texture instance built from it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureSpecId(pub u32);

/// Empty tiles kept around a texture on each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Padding {
    /// Columns on the left and on the right.
    pub cols: u16,
    /// Rows above and below.
    pub rows: u16,
}

impl Padding {
    /// No padding.
    pub const NONE: Self = Self { cols: 0, rows: 0 };

    /// Creates a padding of `cols` columns and `rows` rows per side.
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// How the texture's character set is owned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharSetSharing {
    /// Every instance draws from one character set; instances share a texture.
    Shared,
    /// Each instance owns its character set.
    Exclusive,
}

/// Description of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSpec {
    /// Identity of the description.
    pub id: TextureSpecId,
    /// Width in tiles.
    pub cols: u16,
    /// Height in tiles.
    pub rows: u16,
    /// Border kept free around the texture.
    pub padding: Padding,
    /// Whether an unused instance may be handed over to another spec.
    pub recyclable: bool,
    /// Character set ownership, if the texture has tiles at all.
    pub charset: Option<CharSetSharing>,
}

impl TextureSpec {
    /// Creates an exclusive, non-recyclable description without padding.
    #[must_use]
    pub const fn new(id: u32, cols: u16, rows: u16) -> Self {
        Self {
            id: TextureSpecId(id),
            cols,
            rows,
            padding: Padding::NONE,
            recyclable: false,
            charset: Some(CharSetSharing::Exclusive),
        }
    }

    /// Sets the padding.
    #[must_use]
    pub const fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Marks the description recyclable.
    #[must_use]
    pub const fn recyclable(mut self) -> Self {
        self.recyclable = true;
        self
    }

    /// Marks the character set shared.
    #[must_use]
    pub const fn shared(mut self) -> Self {
        self.charset = Some(CharSetSharing::Shared);
        self
    }

    /// Whether the character set is shared.
    #[inline]
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self.charset, Some(CharSetSharing::Shared))
    }
}

/// Segment arrangement of a multi-segment background.
///
/// Layouts spanning several segments must start at a segment index that is a
/// multiple of the number of segments they span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentLayout {
    /// One segment.
    W1x1,
    /// Two segments side by side.
    W2x1,
    /// Two segments stacked.
    W1x2,
    /// Four segments in a row.
    W4x1,
    /// Two by two segments.
    W2x2,
    /// Four segments stacked.
    W1x4,
    /// Eight segments in a row.
    W8x1,
    /// Four by two segments.
    W4x2,
    /// Two by four segments.
    W2x4,
    /// Eight segments stacked.
    W1x8,
}

impl SegmentLayout {
    /// Segment index multiple the layout must start at.
    #[must_use]
    pub const fn stride(self) -> u16 {
        match self {
            Self::W1x1 => 1,
            Self::W2x1 | Self::W1x2 => 2,
            Self::W4x1 | Self::W2x2 | Self::W1x4 => 4,
            Self::W8x1 | Self::W4x2 | Self::W2x4 | Self::W1x8 => 8,
        }
    }
}

/// Where a texture may be placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Lowest segment the texture may live in.
    pub minimum_segment: u16,
    /// Multi-segment layout forcing a stride-aligned start, if any.
    pub layout: Option<SegmentLayout>,
}

impl Alignment {
    /// Any segment from zero on.
    pub const ANY: Self = Self {
        minimum_segment: 0,
        layout: None,
    };

    /// Creates an alignment.
    #[must_use]
    pub const fn new(minimum_segment: u16, layout: Option<SegmentLayout>) -> Self {
        Self {
            minimum_segment,
            layout,
        }
    }

    /// Segment step between candidate segments.
    #[must_use]
    pub const fn stride(&self) -> u16 {
        match self.layout {
            Some(layout) => layout.stride(),
            None => 1,
        }
    }

    /// First candidate segment, rounded up to the stride.
    #[must_use]
    pub const fn first_segment(&self) -> u16 {
        let stride = self.stride();
        match self.minimum_segment % stride {
            0 => self.minimum_segment,
            rest => self.minimum_segment + (stride - rest),
        }
    }
}
