//! # Interrupt Suspension
//!
//! The console has no threads; the only thing that can run "concurrently"
//! with the frame loop is an interrupt handler. Timer, keypad and
//! frame-complete handlers construct objects too, so claiming a pool block
//! has to be atomic with respect to them.
//!
//! ```text
//!   main loop ──► suspend() ──► scan + claim block ──► resume()
//!                     ▲                                    │
//!                     └──── interrupt handlers wait ───────┘
//! ```
//!
//! [`CriticalSection`] pairs the two calls so an early return can never leave
//! interrupts disabled.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Hardware hook for disabling and re-enabling interrupts.
///
/// Calls nest: every `suspend` is matched by exactly one `resume`.
pub trait InterruptControl: Send + Sync {
    /// Disables interrupt delivery.
    fn suspend(&self);

    /// Re-enables interrupt delivery.
    fn resume(&self);

    /// Suspends interrupts until the returned guard is dropped.
    #[must_use = "interrupts resume as soon as the guard is dropped"]
    fn critical_section(&self) -> CriticalSection<'_, Self>
    where
        Self: Sized,
    {
        self.suspend();
        CriticalSection { control: self }
    }
}

/// RAII guard returned by [`InterruptControl::critical_section`].
pub struct CriticalSection<'a, I: InterruptControl> {
    control: &'a I,
}

impl<I: InterruptControl> Drop for CriticalSection<'_, I> {
    fn drop(&mut self) {
        self.control.resume();
    }
}

/// Interrupt controller for hosted builds and tests.
///
/// Tracks nesting so callers can verify that every critical section was
/// closed.
#[derive(Debug, Default)]
pub struct HostInterrupts {
    /// Current nesting depth; zero means interrupts are enabled.
    depth: AtomicU32,
    /// Number of critical sections ever entered.
    entered: AtomicU64,
}

impl HostInterrupts {
    /// Creates a controller with interrupts enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            depth: AtomicU32::new(0),
            entered: AtomicU64::new(0),
        }
    }

    /// Returns whether interrupts are currently enabled.
    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.depth.load(Ordering::Acquire) == 0
    }

    /// Returns the current nesting depth.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Acquire)
    }

    /// Returns how many critical sections have been entered.
    #[inline]
    #[must_use]
    pub fn sections_entered(&self) -> u64 {
        self.entered.load(Ordering::Relaxed)
    }
}

impl InterruptControl for HostInterrupts {
    fn suspend(&self) {
        self.depth.fetch_add(1, Ordering::AcqRel);
        self.entered.fetch_add(1, Ordering::Relaxed);
    }

    fn resume(&self) {
        let previous = self.depth.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "resume without matching suspend");
    }
}
