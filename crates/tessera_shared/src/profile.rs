//! # Build Profiles
//!
//! The configuration a build runs under decides whether running out of
//! video or object memory stops the device or degrades to "draw nothing".

use serde::{Deserialize, Serialize};

/// Compile-time build mode of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    /// Development build: allocator failures dump state and abort.
    Debug,
    /// Tooling build (level editors, profilers): failures are fatal too.
    Tools,
    /// Optimised build that still carries diagnostics.
    Release,
    /// Cartridge build: failures degrade silently to an empty result.
    Shipping,
}

impl BuildProfile {
    /// Profile matching how this binary was compiled.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    /// Whether exhausting an allocator must stop the program.
    #[inline]
    #[must_use]
    pub const fn failures_are_fatal(self) -> bool {
        matches!(self, Self::Debug | Self::Tools)
    }
}

impl Default for BuildProfile {
    fn default() -> Self {
        Self::current()
    }
}
