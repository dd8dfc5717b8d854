//! Scoped overrides of global render settings.
//!
//! Each guard captures the prior value when created, applies the override and
//! restores the prior value when dropped. Guards borrow the backend mutably and
//! dereference to it, so nested overrides unwind in reverse order.

use std::ops::{Deref, DerefMut};

use crate::backend::RenderBackend;

/// Overrides the per-pixel light budget while alive.
pub struct PixelLightOverride<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    prior: Option<u32>,
}

impl<'a, B: RenderBackend + ?Sized> PixelLightOverride<'a, B> {
    /// Sets the budget to `count`, remembering the current value.
    pub fn new(backend: &'a mut B, count: u32) -> Self {
        let prior = backend.pixel_light_count();
        backend.set_pixel_light_count(count);
        Self {
            backend,
            prior: Some(prior),
        }
    }

    /// Leaves the budget untouched; dropping restores nothing.
    pub fn passthrough(backend: &'a mut B) -> Self {
        Self {
            backend,
            prior: None,
        }
    }

    /// Applies the override only when `enabled`.
    pub fn when(backend: &'a mut B, enabled: bool, count: u32) -> Self {
        if enabled {
            Self::new(backend, count)
        } else {
            Self::passthrough(backend)
        }
    }
}

impl<B: RenderBackend + ?Sized> Deref for PixelLightOverride<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> DerefMut for PixelLightOverride<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for PixelLightOverride<'_, B> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior {
            self.backend.set_pixel_light_count(prior);
        }
    }
}

/// Inverts backface winding while alive.
///
/// Mirrored view matrices flip handedness, so front faces would otherwise be
/// culled.
pub struct InvertCullingOverride<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    prior: bool,
}

impl<'a, B: RenderBackend + ?Sized> InvertCullingOverride<'a, B> {
    /// Inverts winding, remembering the current setting.
    pub fn new(backend: &'a mut B) -> Self {
        let prior = backend.invert_culling();
        backend.set_invert_culling(true);
        Self { backend, prior }
    }
}

impl<B: RenderBackend + ?Sized> Deref for InvertCullingOverride<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> DerefMut for InvertCullingOverride<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for InvertCullingOverride<'_, B> {
    fn drop(&mut self) {
        self.backend.set_invert_culling(self.prior);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{BackendCall, RecordingBackend};

    #[test]
    fn test_pixel_light_override_restores() {
        let mut backend = RecordingBackend::new();
        backend.set_pixel_light_count(4);
        {
            let guard = PixelLightOverride::new(&mut backend, 0);
            assert_eq!(guard.pixel_light_count(), 0);
        }
        assert_eq!(backend.pixel_light_count(), 4);
    }

    #[test]
    fn test_passthrough_touches_nothing() {
        let mut backend = RecordingBackend::new();
        backend.set_pixel_light_count(2);
        backend.clear_log();
        {
            let guard = PixelLightOverride::when(&mut backend, false, 0);
            assert_eq!(guard.pixel_light_count(), 2);
        }
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_nested_overrides_unwind_in_reverse() {
        let mut backend = RecordingBackend::new();
        backend.set_pixel_light_count(8);
        backend.clear_log();
        {
            let mut lights = PixelLightOverride::new(&mut backend, 0);
            let winding = InvertCullingOverride::new(&mut *lights);
            assert!(winding.invert_culling());
            assert_eq!(winding.pixel_light_count(), 0);
        }
        assert_eq!(
            backend.calls(),
            &[
                BackendCall::SetPixelLightCount(0),
                BackendCall::SetInvertCulling(true),
                BackendCall::SetInvertCulling(false),
                BackendCall::SetPixelLightCount(8),
            ]
        );
    }

    #[test]
    fn test_invert_culling_restores_prior_true() {
        let mut backend = RecordingBackend::new();
        backend.set_invert_culling(true);
        drop(InvertCullingOverride::new(&mut backend));
        assert!(backend.invert_culling());
    }
}
