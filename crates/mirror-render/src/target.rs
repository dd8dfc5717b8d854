//! The per-surface reflection render target.

use crate::backend::{RenderBackend, TargetDescriptor, TargetId};
use crate::error::RenderResult;

/// A live render target and the edge length it was allocated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionTarget {
    /// Backend handle.
    pub id: TargetId,
    /// Edge length in texels.
    pub size: u32,
}

/// Holds at most one square render target, shared by all of a surface's
/// reflection cameras.
#[derive(Debug, Default)]
pub struct TargetSlot {
    current: Option<ReflectionTarget>,
}

impl TargetSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live target, if any.
    #[must_use]
    pub fn current(&self) -> Option<ReflectionTarget> {
        self.current
    }

    /// Returns a target of edge `size`, allocating one if the slot is empty
    /// or holds a different size. The old target is destroyed before the new
    /// one is created.
    pub fn get_or_create<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        label: &str,
        size: u32,
    ) -> RenderResult<ReflectionTarget> {
        if let Some(target) = self.current {
            if target.size == size {
                return Ok(target);
            }
        }

        if let Some(old) = self.current.take() {
            log::debug!("reallocating {label}: {} -> {size}", old.size);
            backend.destroy_target(old.id);
        }

        let id = backend.create_target(&TargetDescriptor::square(label, size))?;
        log::debug!("allocated {label} ({id}, {size}x{size})");
        let target = ReflectionTarget { id, size };
        self.current = Some(target);
        Ok(target)
    }

    /// Destroys the target, if any.
    pub fn release<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(old) = self.current.take() {
            backend.destroy_target(old.id);
        }
    }
}
