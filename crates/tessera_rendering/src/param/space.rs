//! # Param Table Allocator
//!
//! Bump allocation with deferred compaction.
//!
//! ## Compaction
//!
//! Freeing never moves memory. The freed bytes are folded into a single
//! pending-free summary (lowest freed offset plus total bytes freed above
//! it), and [`ParamSpaceAllocator::defragment`] later slides the live sprites
//! above that offset down, one sprite per step:
//!
//! ```text
//!   before   [ A ][ B ][ C ][ D ]      free(B), free(C)
//!   pending  [ A ][ ...... ][ D ]      lowest = B, recovered = |B|+|C|
//!   step     [ A ][ D ]                D moved to lowest, rows rewritten
//!   done     used -= recovered
//! ```
//!
//! A sprite is never moved onto its own bytes and never while the previously
//! moved sprite is still rewriting its rows, so the video unit never reads a
//! half-written table.
//!
//! ## Sharing
//!
//! Sprites whose texture is shared overlay the rows of the first live sprite
//! showing the same texture. Differing transforms on such sprites conflict on
//! screen; this is a known limitation of the sharing policy.

use std::fmt;

use tessera_core::{ConfigResult, ParamSpaceConfig};
use tessera_shared::constants::BGMAP_SEGMENT_SIZE;
use tessera_shared::BuildProfile;

use crate::error::{ParamError, ParamResult};
use crate::param::rows::{ParamRow, TransformMode};
use crate::texture::TextureSpecId;

/// Identity of a sprite holding param table space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u32);

/// What the allocator needs to know about a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSprite {
    /// The sprite.
    pub handle: SpriteHandle,
    /// Description of the texture the sprite shows.
    pub texture: TextureSpecId,
    /// Tile rows of that texture.
    pub texture_rows: u16,
    /// Whether the texture's character set is shared.
    pub shared: bool,
    /// Transform applied to the sprite.
    pub mode: TransformMode,
}

impl ParamSprite {
    /// Describes an exclusive sprite.
    #[must_use]
    pub const fn new(handle: u32, texture: TextureSpecId, texture_rows: u16, mode: TransformMode) -> Self {
        Self {
            handle: SpriteHandle(handle),
            texture,
            texture_rows,
            shared: false,
            mode,
        }
    }

    /// Marks the sprite's texture shared.
    #[must_use]
    pub const fn shared(mut self) -> Self {
        self.shared = true;
        self
    }
}

/// Progress of a sprite rewriting its rows at its current offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowWrite {
    /// Rows from `next_row` on still have to be written.
    Pending {
        /// First row not yet written.
        next_row: usize,
    },
    /// Every row is in place.
    Complete,
}

impl RowWrite {
    /// Whether part of the rows has been written and part has not.
    #[inline]
    #[must_use]
    pub const fn is_mid_write(self) -> bool {
        matches!(self, Self::Pending { next_row } if next_row > 0)
    }
}

/// Summary of the holes awaiting compaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingFree {
    /// Where the next live sprite will be moved to.
    pub lowest_freed_offset: u32,
    /// Bytes freed above `lowest_freed_offset`.
    pub recovered_bytes: u32,
}

/// Outcome of one [`ParamSpaceAllocator::defragment`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Defrag {
    /// Nothing to compact.
    Idle,
    /// One sprite (and any sprite overlaying it) was moved down.
    Stepped {
        /// The sprite moved.
        sprite: SpriteHandle,
        /// Its old offset.
        from: u32,
        /// Its new offset.
        to: u32,
    },
    /// The next move has to wait for a later call.
    Blocked,
    /// Compaction finished and the bytes went back to the free space.
    Recovered {
        /// Bytes returned.
        bytes: u32,
    },
}

/// A sprite registered in the ownership list.
#[derive(Clone, Copy, Debug)]
struct Owner {
    sprite: ParamSprite,
    offset: u32,
    size: u32,
    write: RowWrite,
}

/// Occupancy of the param table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamUsage {
    /// Table size.
    pub table_bytes: u32,
    /// Bytes below the bump pointer.
    pub used_bytes: u32,
    /// Sprites holding space.
    pub sprites: usize,
    /// Holes awaiting compaction.
    pub pending: Option<PendingFree>,
}

impl fmt::Display for ParamUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PARAM TABLE STATUS")?;
        writeln!(f, "Size:     {:>6}", self.table_bytes)?;
        writeln!(f, "Used:     {:>6}", self.used_bytes)?;
        write!(f, "Sprites:  {:>6}", self.sprites)?;
        if let Some(pending) = self.pending {
            write!(
                f,
                "\nPending:  {:>6} from {}",
                pending.recovered_bytes, pending.lowest_freed_offset
            )?;
        }
        Ok(())
    }
}

/// Hands out param table space to affine and h-bias sprites.
///
/// Offsets are relative to the start of the table.
pub struct ParamSpaceAllocator {
    /// Row costs and caps.
    config: ParamSpaceConfig,
    /// Decides whether a full table is fatal.
    profile: BuildProfile,
    /// Table memory.
    table: Vec<u8>,
    /// Bump pointer.
    used: u32,
    /// Live sprites, sorted by offset.
    owners: Vec<Owner>,
    /// Holes awaiting compaction.
    pending: Option<PendingFree>,
    /// Last sprite moved by compaction.
    previously_moved: Option<SpriteHandle>,
}

impl ParamSpaceAllocator {
    /// Creates an allocator with no table; call
    /// [`ParamSpaceAllocator::configure`] before allocating.
    ///
    /// # Errors
    ///
    /// Returns [`tessera_core::ConfigError::Invalid`] if a row cost or row
    /// cap is zero.
    pub fn new(config: ParamSpaceConfig, profile: BuildProfile) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            profile,
            table: Vec::new(),
            used: 0,
            owners: Vec::new(),
            pending: None,
            previously_moved: None,
        })
    }

    /// Reserves `segments` background segments for the table.
    ///
    /// Returns the table size in bytes.
    pub fn configure(&mut self, segments: u16) -> u32 {
        self.configure_bytes(u32::from(segments) * BGMAP_SEGMENT_SIZE)
    }

    /// Sizes the table to `bytes` and zeroes it.
    ///
    /// Every allocation is forgotten.
    pub fn configure_bytes(&mut self, bytes: u32) -> u32 {
        self.table.clear();
        self.table.resize(bytes as usize, 0);
        self.forget_allocations();
        tracing::info!("param table configured: {} bytes", bytes);
        bytes
    }

    /// Forgets every allocation and zeroes the table (stage load).
    pub fn reset(&mut self) {
        self.table.fill(0);
        self.forget_allocations();
        tracing::info!("param table reset");
    }

    fn forget_allocations(&mut self) {
        self.owners.clear();
        self.used = 0;
        self.pending = None;
        self.previously_moved = None;
    }

    /// Table size in bytes.
    #[inline]
    #[must_use]
    pub fn table_bytes(&self) -> u32 {
        self.table.len() as u32
    }

    /// Bytes below the bump pointer, holes awaiting compaction included.
    #[inline]
    #[must_use]
    pub const fn used_bytes(&self) -> u32 {
        self.used
    }

    /// Bytes above the bump pointer.
    #[inline]
    #[must_use]
    pub fn free_bytes(&self) -> u32 {
        self.table_bytes() - self.used
    }

    /// Holes awaiting compaction.
    #[inline]
    #[must_use]
    pub const fn pending_free(&self) -> Option<PendingFree> {
        self.pending
    }

    /// Raw table memory as the video unit sees it.
    #[inline]
    #[must_use]
    pub fn table(&self) -> &[u8] {
        &self.table
    }

    /// Bytes `sprite` needs: its texture rows plus padding, capped per mode.
    #[must_use]
    pub fn size_for(&self, sprite: &ParamSprite) -> u32 {
        let rows = sprite
            .texture_rows
            .saturating_add(self.config.padding_rows)
            .min(sprite.mode.row_cap(&self.config));
        u32::from(rows) * sprite.mode.bytes_per_row(&self.config)
    }

    fn owner_index(&self, sprite: SpriteHandle) -> Option<usize> {
        self.owners.iter().position(|owner| owner.sprite.handle == sprite)
    }

    fn owner(&self, sprite: SpriteHandle) -> ParamResult<&Owner> {
        self.owners
            .iter()
            .find(|owner| owner.sprite.handle == sprite)
            .ok_or(ParamError::UnknownSprite(sprite.0))
    }

    /// Offset of a sprite's rows.
    #[must_use]
    pub fn offset(&self, sprite: SpriteHandle) -> Option<u32> {
        self.owner(sprite).ok().map(|owner| owner.offset)
    }

    /// Bytes reserved for a sprite.
    #[must_use]
    pub fn size_of(&self, sprite: SpriteHandle) -> Option<u32> {
        self.owner(sprite).ok().map(|owner| owner.size)
    }

    /// Row write progress of a sprite.
    #[must_use]
    pub fn row_write(&self, sprite: SpriteHandle) -> Option<RowWrite> {
        self.owner(sprite).ok().map(|owner| owner.write)
    }

    /// Sprites holding space.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no sprite holds space.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Reserves rows for `sprite` and returns their offset.
    ///
    /// A sprite with a shared texture reuses the rows of the first live
    /// sprite showing the same texture. Allocating a sprite twice returns
    /// its current offset.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::EmptySprite`] if the sprite needs no rows, or
    /// [`ParamError::TableFull`] if the rows do not fit above the bump
    /// pointer.
    ///
    /// # Panics
    ///
    /// A full table is fatal in development profiles.
    pub fn allocate(&mut self, sprite: ParamSprite) -> ParamResult<u32> {
        if let Some(index) = self.owner_index(sprite.handle) {
            return Ok(self.owners[index].offset);
        }

        if sprite.shared {
            let host = self.owners.iter().position(|owner| {
                owner.sprite.shared && owner.sprite.texture == sprite.texture
            });
            if let Some(host) = host {
                let Owner { offset, size, .. } = self.owners[host];
                let after_group = self.owners[host..]
                    .iter()
                    .position(|owner| owner.offset != offset)
                    .map_or(self.owners.len(), |skip| host + skip);
                self.owners.insert(
                    after_group,
                    Owner {
                        sprite,
                        offset,
                        size,
                        write: RowWrite::Pending { next_row: 0 },
                    },
                );
                tracing::debug!("sprite {} shares param rows at {}", sprite.handle.0, offset);
                return Ok(offset);
            }
        }

        let size = self.size_for(&sprite);
        if size == 0 {
            return Err(ParamError::EmptySprite(sprite.handle.0));
        }

        if self.used + size >= self.table_bytes() {
            return Err(self.fail(ParamError::TableFull {
                requested: size,
                available: self.free_bytes(),
            }));
        }

        let offset = self.used;
        self.used += size;
        // Every live offset lies below the bump pointer, so pushing keeps
        // the list sorted.
        self.owners.push(Owner {
            sprite,
            offset,
            size,
            write: RowWrite::Pending { next_row: 0 },
        });
        tracing::debug!("sprite {} param rows at {} ({} bytes)", sprite.handle.0, offset, size);
        Ok(offset)
    }

    /// Gives back a sprite's rows.
    ///
    /// Nothing moves here: the bytes join the pending-free summary and come
    /// back through [`ParamSpaceAllocator::defragment`]. Rows still overlaid
    /// by another sprite stay reserved.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownSprite`] if the sprite holds no rows.
    pub fn free(&mut self, sprite: SpriteHandle) -> ParamResult<()> {
        let index = self
            .owner_index(sprite)
            .ok_or(ParamError::UnknownSprite(sprite.0))?;
        let Owner { offset, size, .. } = self.owners.remove(index);

        if self.previously_moved == Some(sprite) {
            self.previously_moved = None;
        }

        if self.owners.iter().any(|owner| owner.offset == offset) {
            return Ok(());
        }

        self.pending = Some(match self.pending {
            Some(pending) if pending.lowest_freed_offset <= offset => PendingFree {
                recovered_bytes: pending.recovered_bytes + size,
                ..pending
            },
            pending => PendingFree {
                lowest_freed_offset: offset,
                recovered_bytes: pending.map_or(0, |p| p.recovered_bytes) + size,
            },
        });
        tracing::debug!("sprite {} freed {} param bytes at {}", sprite.0, size, offset);
        Ok(())
    }

    /// Compacts the table.
    ///
    /// A `deferred` call moves at most one sprite, so compaction can be
    /// spread over frames. Otherwise steps run until the holes are recovered
    /// or a move is blocked.
    pub fn defragment(&mut self, deferred: bool) -> Defrag {
        loop {
            let step = self.defragment_step();
            if deferred || !matches!(step, Defrag::Stepped { .. }) {
                return step;
            }
        }
    }

    fn defragment_step(&mut self) -> Defrag {
        let Some(pending) = self.pending else {
            return Defrag::Idle;
        };
        let lowest = pending.lowest_freed_offset;

        let Some(index) = self.owners.iter().position(|owner| owner.offset > lowest) else {
            self.used -= pending.recovered_bytes;
            self.pending = None;
            self.previously_moved = None;
            tracing::debug!("param table recovered {} bytes", pending.recovered_bytes);
            return Defrag::Recovered {
                bytes: pending.recovered_bytes,
            };
        };

        let Owner { sprite, offset, size, .. } = self.owners[index];
        if lowest + size > offset {
            return Defrag::Blocked;
        }

        let previous_busy = self
            .previously_moved
            .and_then(|previous| self.row_write(previous))
            .is_some_and(RowWrite::is_mid_write);
        if previous_busy {
            return Defrag::Blocked;
        }

        for owner in self.owners[index..]
            .iter_mut()
            .take_while(|owner| owner.offset == offset)
        {
            owner.offset = lowest;
            owner.write = RowWrite::Pending { next_row: 0 };
        }

        self.pending = Some(PendingFree {
            lowest_freed_offset: lowest + size,
            ..pending
        });
        self.previously_moved = Some(sprite.handle);
        tracing::debug!("sprite {} param rows moved {} -> {}", sprite.handle.0, offset, lowest);

        Defrag::Stepped {
            sprite: sprite.handle,
            from: offset,
            to: lowest,
        }
    }

    /// Copies `rows` into the sprite's table space, resuming where the last
    /// call stopped and writing at most `budget` rows when given.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownSprite`], [`ParamError::ModeMismatch`]
    /// if `R` is not the sprite's row layout, or
    /// [`ParamError::RowsOverflow`] if `rows` does not fit the allocation.
    pub fn write_rows<R: ParamRow>(
        &mut self,
        sprite: SpriteHandle,
        rows: &[R],
        budget: Option<usize>,
    ) -> ParamResult<RowWrite> {
        let index = self
            .owner_index(sprite)
            .ok_or(ParamError::UnknownSprite(sprite.0))?;
        let owner = self.owners[index];

        if owner.sprite.mode != R::MODE {
            return Err(ParamError::ModeMismatch { sprite: sprite.0 });
        }

        let entry = std::mem::size_of::<R>();
        let capacity = owner.size as usize / entry;
        if rows.len() > capacity {
            return Err(ParamError::RowsOverflow {
                rows: rows.len(),
                capacity,
            });
        }

        let start = match owner.write {
            RowWrite::Pending { next_row } => next_row.min(rows.len()),
            RowWrite::Complete => 0,
        };
        let end = budget.map_or(rows.len(), |budget| (start + budget).min(rows.len()));

        let base = owner.offset as usize + start * entry;
        let bytes: &[u8] = bytemuck::cast_slice(&rows[start..end]);
        self.table[base..base + bytes.len()].copy_from_slice(bytes);

        let write = if end == rows.len() {
            RowWrite::Complete
        } else {
            RowWrite::Pending { next_row: end }
        };
        self.owners[index].write = write;
        Ok(write)
    }

    /// Marks a sprite's rows stale so the next write starts over.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownSprite`] if the sprite holds no rows.
    pub fn invalidate_rows(&mut self, sprite: SpriteHandle) -> ParamResult<()> {
        let index = self
            .owner_index(sprite)
            .ok_or(ParamError::UnknownSprite(sprite.0))?;
        self.owners[index].write = RowWrite::Pending { next_row: 0 };
        Ok(())
    }

    /// Reads row `row` of a sprite back from the table.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownSprite`], [`ParamError::ModeMismatch`],
    /// or [`ParamError::RowsOverflow`] if `row` lies past the allocation.
    pub fn read_row<R: ParamRow>(&self, sprite: SpriteHandle, row: usize) -> ParamResult<R> {
        let owner = self.owner(sprite)?;
        if owner.sprite.mode != R::MODE {
            return Err(ParamError::ModeMismatch { sprite: sprite.0 });
        }

        let entry = std::mem::size_of::<R>();
        let capacity = owner.size as usize / entry;
        if row >= capacity {
            return Err(ParamError::RowsOverflow {
                rows: row + 1,
                capacity,
            });
        }

        let base = owner.offset as usize + row * entry;
        Ok(bytemuck::pod_read_unaligned(&self.table[base..base + entry]))
    }

    /// Snapshot of the table.
    #[must_use]
    pub fn usage(&self) -> ParamUsage {
        ParamUsage {
            table_bytes: self.table_bytes(),
            used_bytes: self.used,
            sprites: self.owners.len(),
            pending: self.pending,
        }
    }

    /// Applies the build profile to a failure.
    fn fail(&self, error: ParamError) -> ParamError {
        if self.profile.failures_are_fatal() {
            tracing::error!("{}", self.usage());
            panic!("ParamTable: {error}");
        }
        tracing::warn!("param table request failed: {error}");
        error
    }
}
