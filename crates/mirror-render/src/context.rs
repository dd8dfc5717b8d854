//! Reentrancy tracking for reflection renders.

use std::cell::Cell;

/// Per-frame render context shared by every mirror surface.
///
/// Holds the flag that is set exactly while some reflection render is in
/// flight. Surfaces rendered from inside that render observe the flag and
/// skip, which bounds recursion to a single bounce. The flag is only ever set
/// through a [`ReentrancyToken`], so it is cleared on every exit path,
/// including errors and panics.
#[derive(Debug, Default)]
pub struct ReflectionContext {
    in_reflection: Cell<bool>,
}

impl ReflectionContext {
    /// Creates a context with no reflection in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a reflection render is in flight.
    #[must_use]
    pub fn is_rendering_reflection(&self) -> bool {
        self.in_reflection.get()
    }

    /// Marks a reflection render as in flight.
    ///
    /// Returns `None` when one already is.
    #[must_use]
    pub fn try_enter(&self) -> Option<ReentrancyToken<'_>> {
        if self.in_reflection.replace(true) {
            None
        } else {
            Some(ReentrancyToken { ctx: self })
        }
    }
}

/// Proof that the holder owns the in-flight reflection. Dropping it clears
/// the context's flag.
#[derive(Debug)]
#[must_use = "the reflection is only in flight while the token is held"]
pub struct ReentrancyToken<'a> {
    ctx: &'a ReflectionContext,
}

impl Drop for ReentrancyToken<'_> {
    fn drop(&mut self) {
        self.ctx.in_reflection.set(false);
    }
}
