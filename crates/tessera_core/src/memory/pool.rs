//! # Fixed Pool Allocator
//!
//! Segregated free-list allocator over a small, fixed set of block sizes.

use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};
use tessera_shared::BuildProfile;

use crate::config::PoolConfig;
use crate::error::{ConfigResult, PoolError, PoolResult};
use crate::interrupts::{CriticalSection, HostInterrupts, InterruptControl};
use crate::memory::usage::{PoolUsage, PoolUsageReport};

/// Occupancy of one block, kept outside the block's own bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockState {
    Free,
    Used,
}

/// Handle to an allocated block.
///
/// Handles are plain indices; the bytes they name are only reachable
/// through the allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Index of the owning pool.
    pool: u8,
    /// Index of the block inside the pool.
    block: u16,
}

impl PoolHandle {
    /// Handle of an object that was never pool-allocated (a static or
    /// singleton instance). Freeing it is a no-op.
    pub const UNPOOLED: Self = Self {
        pool: u8::MAX,
        block: u16::MAX,
    };

    /// Index of the pool the block belongs to.
    #[inline]
    #[must_use]
    pub const fn pool(self) -> u8 {
        self.pool
    }

    /// Index of the block inside its pool.
    #[inline]
    #[must_use]
    pub const fn block(self) -> u16 {
        self.block
    }

    /// Whether this is the [`PoolHandle::UNPOOLED`] sentinel.
    #[inline]
    #[must_use]
    pub const fn is_unpooled(self) -> bool {
        self.pool == u8::MAX
    }
}

/// One size class.
struct Pool {
    /// Bytes per block.
    block_size: usize,
    /// Payload of every block, `block_size` apart.
    storage: Box<[u8]>,
    /// Side table: one entry per block.
    states: Box<[BlockState]>,
    /// Block most recently claimed or released.
    last_free_hint: usize,
    /// Blocks currently in use.
    used: usize,
    /// Whether the warning threshold has been reported since usage last
    /// dropped below it.
    warned: bool,
}

impl Pool {
    fn new(block_size: usize, blocks: usize) -> Self {
        Self {
            block_size,
            storage: vec![0u8; block_size * blocks].into_boxed_slice(),
            states: vec![BlockState::Free; blocks].into_boxed_slice(),
            last_free_hint: 0,
            used: 0,
            warned: false,
        }
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn is_free(&self, block: isize) -> bool {
        self.states[block as usize] == BlockState::Free
    }

    /// Looks for a free block near the hint.
    ///
    /// Two cursors leave the hint in opposite directions. Each half is also
    /// closed from its far end, so every block is probed exactly once
    /// before the scan gives up.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn find_free(&self) -> Option<usize> {
        let last = self.states.len() as isize - 1;
        let hint = (self.last_free_hint as isize).min(last);

        // Right half: [hint + 1, last]
        let (mut right, mut end) = (hint + 1, last);
        // Left half: [0, hint]
        let (mut left, mut start) = (hint, 0isize);

        loop {
            let right_open = right <= end;
            let left_open = left >= start;

            if !right_open && !left_open {
                return None;
            }

            if right_open {
                if self.is_free(right) {
                    return Some(right as usize);
                }
                if self.is_free(end) {
                    return Some(end as usize);
                }
                right += 1;
                end -= 1;
            }

            if left_open {
                if self.is_free(left) {
                    return Some(left as usize);
                }
                if self.is_free(start) {
                    return Some(start as usize);
                }
                left -= 1;
                start += 1;
            }
        }
    }

    #[inline]
    fn percent_used(&self) -> usize {
        (100 * self.used) / self.states.len()
    }

    fn payload(&self, block: usize) -> &[u8] {
        let offset = block * self.block_size;
        &self.storage[offset..offset + self.block_size]
    }

    fn payload_mut(&mut self, block: usize) -> &mut [u8] {
        let offset = block * self.block_size;
        &mut self.storage[offset..offset + self.block_size]
    }

    fn usage(&self) -> PoolUsage {
        PoolUsage {
            block_size: self.block_size,
            blocks: self.states.len(),
            used: self.used,
        }
    }

    fn reset(&mut self) {
        self.states.fill(BlockState::Free);
        self.last_free_hint = 0;
        self.used = 0;
        self.warned = false;
    }
}

/// Bookkeeping guarded by the allocator's lock.
struct PoolTable {
    /// Size classes, ascending by block size.
    pools: Vec<Pool>,
    /// Pool that served the previous request.
    last_pool: usize,
}

/// Outcome of a successful claim.
struct Claim {
    handle: PoolHandle,
    /// Usage percentage if this claim pushed the pool over the threshold.
    crossed: Option<usize>,
}

impl PoolTable {
    fn pool(&self, handle: PoolHandle) -> PoolResult<&Pool> {
        let pool = self
            .pools
            .get(usize::from(handle.pool))
            .filter(|pool| usize::from(handle.block) < pool.states.len())
            .ok_or(PoolError::InvalidHandle {
                pool: handle.pool,
                block: handle.block,
            })?;

        if pool.states[usize::from(handle.block)] == BlockState::Free {
            return Err(PoolError::NotAllocated {
                pool: handle.pool,
                block: handle.block,
            });
        }
        Ok(pool)
    }

    fn pool_mut(&mut self, handle: PoolHandle) -> PoolResult<&mut Pool> {
        self.pool(handle)?;
        Ok(&mut self.pools[usize::from(handle.pool)])
    }

    /// Claims the first free block able to hold `size` bytes, trying the
    /// smallest eligible pool first.
    #[allow(clippy::cast_possible_truncation)]
    fn claim(&mut self, size: usize, warning_threshold: u8) -> Option<Claim> {
        // Pools below the hinted one are only worth scanning if the hinted
        // one could have held the request.
        let first = if self.pools[self.last_pool].block_size < size {
            self.last_pool + 1
        } else {
            0
        };

        for index in first..self.pools.len() {
            let pool = &mut self.pools[index];
            if pool.block_size < size {
                continue;
            }

            let Some(block) = pool.find_free() else {
                continue;
            };

            pool.states[block] = BlockState::Used;
            pool.last_free_hint = block;
            pool.used += 1;
            self.last_pool = index;

            let percent = pool.percent_used();
            let crossed = if percent > usize::from(warning_threshold) && !pool.warned {
                pool.warned = true;
                Some(percent)
            } else {
                None
            };

            return Some(Claim {
                handle: PoolHandle {
                    pool: index as u8,
                    block: block as u16,
                },
                crossed,
            });
        }

        None
    }

    fn release(&mut self, handle: PoolHandle, warning_threshold: u8) -> PoolResult<()> {
        let pool = self.pool_mut(handle)?;
        let block = usize::from(handle.block);

        pool.states[block] = BlockState::Free;
        // A block just released is the likeliest next target.
        pool.last_free_hint = block;
        pool.used -= 1;

        if pool.percent_used() <= usize::from(warning_threshold) {
            pool.warned = false;
        }
        Ok(())
    }
}

/// Pool table held with interrupts suspended.
///
/// Fields drop in order, so the lock is released before interrupts resume.
struct LockedTable<'a, I: InterruptControl> {
    table: MutexGuard<'a, PoolTable>,
    _section: CriticalSection<'a, I>,
}

impl<I: InterruptControl> Deref for LockedTable<'_, I> {
    type Target = PoolTable;

    fn deref(&self) -> &PoolTable {
        &self.table
    }
}

impl<I: InterruptControl> DerefMut for LockedTable<'_, I> {
    fn deref_mut(&mut self) -> &mut PoolTable {
        &mut self.table
    }
}

/// Heap-less replacement for `malloc`.
///
/// Every pool holds blocks of one size, reserved when the allocator is
/// built. A request is served by the smallest pool whose blocks can hold it
/// and spills into larger pools when that one is full.
///
/// # Interrupt Safety
///
/// Interrupt handlers allocate too. Every access to the bookkeeping, block
/// reads and writes included, happens inside a [`crate::CriticalSection`] of
/// the allocator's interrupt controller. The bookkeeping also sits behind a
/// lock so the allocator can be shared by reference on hosted builds.
///
/// # Example
///
/// ```rust,ignore
/// let pools = FixedPoolAllocator::new(&PoolConfig::default(), BuildProfile::Shipping, HostInterrupts::new())?;
///
/// // Claim - no heap allocation
/// let handle = pools.allocate(24)?;
///
/// // Release - no coalescing
/// pools.free(handle)?;
/// ```
pub struct FixedPoolAllocator<I: InterruptControl = HostInterrupts> {
    /// Pools and hints.
    table: Mutex<PoolTable>,
    /// Interrupt suspension used to make claims atomic.
    interrupts: I,
    /// Decides whether exhaustion is fatal.
    profile: BuildProfile,
    /// Usage percentage reported as nearly full.
    warning_threshold: u8,
}

impl<I: InterruptControl> FixedPoolAllocator<I> {
    /// Builds every pool described by `config`.
    ///
    /// All block memory is reserved here and never grows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Invalid`] if the pool table is empty,
    /// unsorted or holds unaddressable classes.
    pub fn new(config: &PoolConfig, profile: BuildProfile, interrupts: I) -> ConfigResult<Self> {
        config.validate()?;

        let pools: Vec<Pool> = config
            .pools
            .iter()
            .map(|class| Pool::new(class.block_size, class.blocks))
            .collect();

        tracing::info!(
            "memory pools ready: {} classes, {} bytes",
            pools.len(),
            config.total_bytes()
        );

        let last_pool = pools.len() / 2;
        Ok(Self {
            table: Mutex::new(PoolTable { pools, last_pool }),
            interrupts,
            profile,
            warning_threshold: config.warning_threshold,
        })
    }

    /// Returns the interrupt controller.
    #[inline]
    #[must_use]
    pub fn interrupts(&self) -> &I {
        &self.interrupts
    }

    /// Returns the build profile deciding failure handling.
    #[inline]
    #[must_use]
    pub const fn profile(&self) -> BuildProfile {
        self.profile
    }

    /// Number of size classes.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.lock().pools.len()
    }

    /// Block size of the pool a handle belongs to.
    #[must_use]
    pub fn block_size(&self, handle: PoolHandle) -> Option<usize> {
        self.lock()
            .pools
            .get(usize::from(handle.pool))
            .map(|pool| pool.block_size)
    }

    /// Bytes reserved by every pool.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.lock()
            .pools
            .iter()
            .map(|pool| pool.storage.len())
            .sum()
    }

    /// Claims a block of at least `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Exhausted`] when every pool able to hold `size`
    /// is full, or [`PoolError::Oversized`] when no pool could ever hold it.
    ///
    /// # Panics
    ///
    /// In [`BuildProfile::Debug`] and [`BuildProfile::Tools`] builds a
    /// failure dumps the pool usage and panics instead of returning.
    pub fn allocate(&self, size: usize) -> PoolResult<PoolHandle> {
        let claim = {
            let mut table = self.lock();

            let largest = table.pools.last().map_or(0, |pool| pool.block_size);
            if size > largest {
                Err(largest)
            } else {
                Ok(table.claim(size, self.warning_threshold))
            }
        };

        let claim = match claim {
            Ok(claim) => claim,
            Err(largest) => {
                return Err(self.fail(PoolError::Oversized {
                    requested: size,
                    largest,
                }))
            }
        };

        let Some(claim) = claim else {
            return Err(self.fail(PoolError::Exhausted { requested: size }));
        };

        if let Some(percent) = claim.crossed {
            tracing::warn!(
                "memory pool {} is {}% full",
                claim.handle.pool,
                percent
            );
        }
        tracing::trace!(
            "allocated {} bytes from pool {} block {}",
            size,
            claim.handle.pool,
            claim.handle.block
        );

        Ok(claim.handle)
    }

    /// Releases a block.
    ///
    /// Freeing [`PoolHandle::UNPOOLED`] is a no-op. No coalescing happens;
    /// the block simply becomes the pool's preferred next target.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] or [`PoolError::NotAllocated`]
    /// for handles that do not name a live block.
    ///
    /// # Panics
    ///
    /// Those same errors are fatal in development profiles.
    pub fn free(&self, handle: PoolHandle) -> PoolResult<()> {
        if handle.is_unpooled() {
            return Ok(());
        }

        let result = {
            let mut table = self.lock();
            table.release(handle, self.warning_threshold)
        };

        result.map_err(|error| self.fail(error))
    }

    /// Whether the handle names a live block.
    #[must_use]
    pub fn is_allocated(&self, handle: PoolHandle) -> bool {
        self.lock().pool(handle).is_ok()
    }

    /// Runs `f` over the payload bytes of a live block.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not name a live block.
    pub fn with_block<R>(&self, handle: PoolHandle, f: impl FnOnce(&[u8]) -> R) -> PoolResult<R> {
        let table = self.lock();
        let pool = table.pool(handle)?;
        Ok(f(pool.payload(usize::from(handle.block))))
    }

    /// Runs `f` over the mutable payload bytes of a live block.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not name a live block.
    pub fn with_block_mut<R>(
        &self,
        handle: PoolHandle,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> PoolResult<R> {
        let mut table = self.lock();
        let pool = table.pool_mut(handle)?;
        Ok(f(pool.payload_mut(usize::from(handle.block))))
    }

    /// Constructs a plain-data value inside a freshly claimed block.
    ///
    /// # Errors
    ///
    /// Same as [`FixedPoolAllocator::allocate`] for `size_of::<T>()` bytes.
    pub fn allocate_value<T: bytemuck::Pod>(&self, value: T) -> PoolResult<PoolHandle> {
        let bytes = bytemuck::bytes_of(&value);
        let handle = self.allocate(bytes.len())?;
        self.with_block_mut(handle, |block| block[..bytes.len()].copy_from_slice(bytes))?;
        Ok(handle)
    }

    /// Reads back a value written by [`FixedPoolAllocator::allocate_value`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ValueTooLarge`] if `T` does not fit the block,
    /// or a handle error if the block is not live.
    pub fn read_value<T: bytemuck::Pod>(&self, handle: PoolHandle) -> PoolResult<T> {
        let size = std::mem::size_of::<T>();
        self.with_block(handle, |block| {
            if size > block.len() {
                return Err(PoolError::ValueTooLarge {
                    size,
                    block_size: block.len(),
                });
            }
            Ok(bytemuck::pod_read_unaligned(&block[..size]))
        })?
    }

    /// Snapshot of every pool's occupancy.
    #[must_use]
    pub fn usage(&self) -> PoolUsageReport {
        PoolUsageReport {
            pools: self.lock().pools.iter().map(Pool::usage).collect(),
        }
    }

    /// Marks every block free and rewinds the hints (stage load).
    pub fn reset(&self) {
        let mut table = self.lock();
        for pool in &mut table.pools {
            pool.reset();
        }
        table.last_pool = table.pools.len() / 2;
        tracing::info!("memory pools reset");
    }

    /// Zeroes the payload of every free block.
    pub fn scrub(&self) {
        let mut table = self.lock();
        for pool in &mut table.pools {
            for block in 0..pool.states.len() {
                if pool.states[block] == BlockState::Free {
                    pool.payload_mut(block).fill(0);
                }
            }
        }
    }

    /// Suspends interrupts, then locks the pool table.
    ///
    /// Handlers share the table, so it is never held with interrupts enabled.
    fn lock(&self) -> LockedTable<'_, I> {
        let section = self.interrupts.critical_section();
        LockedTable {
            table: self.table.lock(),
            _section: section,
        }
    }

    /// Applies the build profile to a failure.
    fn fail(&self, error: PoolError) -> PoolError {
        if self.profile.failures_are_fatal() {
            tracing::error!("{}", self.usage());
            panic!("MemoryPool: {error}");
        }
        tracing::warn!("memory pool request failed: {error}");
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;

    fn pools(classes: &[(usize, usize)]) -> FixedPoolAllocator {
        FixedPoolAllocator::new(
            &PoolConfig::from_classes(classes),
            BuildProfile::Shipping,
            HostInterrupts::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_smallest_fitting_pool_serves_first() {
        let pools = pools(&[(16, 2), (32, 2), (64, 2)]);

        let a = pools.allocate(10).unwrap();
        let b = pools.allocate(10).unwrap();
        assert_eq!(a.pool(), 0);
        assert_eq!(b.pool(), 0);
        assert_ne!(a.block(), b.block());

        let c = pools.allocate(20).unwrap();
        assert_eq!(c.pool(), 1);
    }

    #[test]
    fn test_full_pool_spills_upward() {
        let pools = pools(&[(16, 2), (32, 2), (64, 2)]);

        let _ = pools.allocate(10).unwrap();
        let _ = pools.allocate(10).unwrap();
        let spilled = pools.allocate(10).unwrap();
        assert_eq!(spilled.pool(), 1);
    }

    #[test]
    fn test_exhaustion_returns_error_when_shipping() {
        let pools = pools(&[(16, 1)]);

        let _ = pools.allocate(8).unwrap();
        assert_eq!(
            pools.allocate(8),
            Err(PoolError::Exhausted { requested: 8 })
        );
        assert!(pools.interrupts().enabled());
    }

    #[test]
    fn test_oversized_request_rejected() {
        let pools = pools(&[(16, 1)]);
        assert_eq!(
            pools.allocate(17),
            Err(PoolError::Oversized {
                requested: 17,
                largest: 16
            })
        );
        assert!(pools.interrupts().enabled());
    }

    #[test]
    #[should_panic(expected = "memory pools exhausted")]
    fn test_exhaustion_is_fatal_in_debug() {
        let pools = FixedPoolAllocator::new(
            &PoolConfig::from_classes(&[(16, 1)]),
            BuildProfile::Debug,
            HostInterrupts::new(),
        )
        .unwrap();

        let _ = pools.allocate(8).unwrap();
        let _ = pools.allocate(8);
    }

    #[test]
    fn test_freed_block_is_reused() {
        let pools = pools(&[(16, 4)]);

        let handles: Vec<_> = (0..4).map(|_| pools.allocate(16).unwrap()).collect();
        pools.free(handles[2]).unwrap();

        let again = pools.allocate(16).unwrap();
        assert_eq!(again, handles[2]);
    }

    #[test]
    fn test_unpooled_free_is_noop() {
        let pools = pools(&[(16, 1)]);
        assert!(pools.free(PoolHandle::UNPOOLED).is_ok());
    }

    #[test]
    fn test_double_free_rejected() {
        let pools = pools(&[(16, 2)]);
        let handle = pools.allocate(4).unwrap();
        pools.free(handle).unwrap();
        assert_eq!(
            pools.free(handle),
            Err(PoolError::NotAllocated { pool: 0, block: handle.block() })
        );
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let pools = pools(&[(16, 2)]);
        let foreign = PoolHandle { pool: 3, block: 0 };
        assert_eq!(
            pools.free(foreign),
            Err(PoolError::InvalidHandle { pool: 3, block: 0 })
        );
    }

    #[test]
    fn test_scan_reaches_every_block() {
        for hint in 0..7 {
            let mut pool = Pool::new(16, 7);
            pool.states.fill(BlockState::Used);
            for target in 0..7 {
                pool.states.fill(BlockState::Used);
                pool.states[target] = BlockState::Free;
                pool.last_free_hint = hint;
                assert_eq!(pool.find_free(), Some(target), "hint {hint} target {target}");
            }
            pool.states.fill(BlockState::Used);
            assert_eq!(pool.find_free(), None);
        }
    }

    #[test]
    fn test_scan_prefers_neighbour_of_hint() {
        let mut pool = Pool::new(16, 9);
        pool.states.fill(BlockState::Used);
        pool.states[4] = BlockState::Free;
        pool.states[5] = BlockState::Free;
        pool.last_free_hint = 4;
        assert_eq!(pool.find_free(), Some(5));
    }

    #[test]
    fn test_typed_values_round_trip() {
        let pools = pools(&[(16, 2), (32, 2)]);

        let handle = pools.allocate_value([7u32, 8, 9, 10, 11]).unwrap();
        assert_eq!(handle.pool(), 1);
        assert_eq!(pools.read_value::<[u32; 5]>(handle).unwrap(), [7, 8, 9, 10, 11]);
        assert_eq!(
            pools.read_value::<[u64; 8]>(handle),
            Err(PoolError::ValueTooLarge { size: 64, block_size: 32 })
        );
    }

    #[test]
    fn test_reset_and_scrub() {
        let pools = pools(&[(16, 2)]);

        let handle = pools.allocate_value(0xDEAD_BEEF_u32).unwrap();
        pools.free(handle).unwrap();
        pools.scrub();

        let handle = pools.allocate(4).unwrap();
        let zeroed = pools.with_block(handle, |bytes| bytes.iter().all(|&b| b == 0)).unwrap();
        assert!(zeroed);

        pools.reset();
        assert_eq!(pools.usage().used_bytes(), 0);
        assert!(!pools.is_allocated(handle));
    }

    #[test]
    fn test_usage_and_total_bytes() {
        let pools = pools(&[(16, 2), (32, 2)]);
        let _ = pools.allocate(20).unwrap();

        let usage = pools.usage();
        assert_eq!(pools.total_bytes(), 96);
        assert_eq!(usage.used_bytes(), 32);
        assert_eq!(usage.pools[1].used, 1);
    }

    #[test]
    fn test_block_access_suspends_interrupts() {
        let pools = pools(&[(16, 2)]);
        let handle = pools.allocate(4).unwrap();

        pools
            .with_block_mut(handle, |bytes| {
                assert!(!pools.interrupts().enabled());
                bytes[0] = 9;
            })
            .unwrap();
        let first = pools
            .with_block(handle, |bytes| {
                assert!(!pools.interrupts().enabled());
                bytes[0]
            })
            .unwrap();

        assert_eq!(first, 9);
        assert!(pools.interrupts().enabled());
    }

    #[test]
    fn test_queries_leave_interrupts_balanced() {
        let pools = pools(&[(16, 2), (32, 2)]);
        let handle = pools.allocate(4).unwrap();
        let entered = pools.interrupts().sections_entered();

        assert_eq!(pools.pool_count(), 2);
        assert_eq!(pools.block_size(handle), Some(16));
        assert_eq!(pools.total_bytes(), 96);
        assert!(pools.is_allocated(handle));
        assert_eq!(pools.usage().used_bytes(), 16);

        assert_eq!(pools.interrupts().sections_entered(), entered + 5);
        assert!(pools.interrupts().enabled());
    }

    #[test]
    #[should_panic(expected = "of pool 0 is not allocated")]
    fn test_double_free_is_fatal_in_debug() {
        let pools = FixedPoolAllocator::new(
            &PoolConfig::from_classes(&[(16, 2)]),
            BuildProfile::Debug,
            HostInterrupts::new(),
        )
        .unwrap();

        let handle = pools.allocate(4).unwrap();
        pools.free(handle).unwrap();
        let _ = pools.free(handle);
    }

    #[test]
    fn test_warning_latch_rearms_below_threshold() {
        let pools = FixedPoolAllocator::new(
            &PoolConfig {
                warning_threshold: 50,
                ..PoolConfig::from_classes(&[(16, 10)])
            },
            BuildProfile::Shipping,
            HostInterrupts::new(),
        )
        .unwrap();
        let warned = || pools.table.lock().pools[0].warned;

        let mut held: Vec<_> = (0..5).map(|_| pools.allocate(4).unwrap()).collect();
        assert!(!warned());

        held.push(pools.allocate(4).unwrap());
        assert!(warned());
        held.push(pools.allocate(4).unwrap());
        assert!(warned());

        pools.free(held.pop().unwrap()).unwrap();
        assert!(warned());
        pools.free(held.pop().unwrap()).unwrap();
        assert!(!warned());

        held.push(pools.allocate(4).unwrap());
        assert!(warned());
    }

    #[test]
    fn test_interrupts_balanced_after_operations() {
        let pools = pools(&[(16, 2)]);
        let handle = pools.allocate(4).unwrap();
        pools.free(handle).unwrap();
        let _ = pools.free(handle);

        assert!(pools.interrupts().enabled());
        assert!(pools.interrupts().sections_entered() >= 3);
    }
}
