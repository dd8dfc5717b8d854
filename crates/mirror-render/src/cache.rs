//! Reflection cameras, one per viewer camera a surface has seen.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::backend::{CameraId, RenderBackend, TargetId, ViewerId};
use crate::camera::{Camera, Pose};
use crate::error::RenderResult;

/// An auxiliary camera that renders the mirror image of one viewer camera.
#[derive(Debug, Clone)]
pub struct ReflectionCamera {
    /// Backend entity backing this camera.
    pub id: CameraId,
    /// The viewer this camera mirrors.
    pub viewer: ViewerId,
    /// Camera state, overwritten every frame before rendering.
    pub camera: Camera,
    /// Output of the next render.
    pub target: Option<TargetId>,
}

/// Maps viewer cameras to the reflection cameras a surface owns.
#[derive(Debug, Default)]
pub struct ReflectionCameraCache {
    cameras: HashMap<ViewerId, ReflectionCamera>,
}

impl ReflectionCameraCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reflection camera for `viewer`, creating a disabled one at
    /// `initial_pose` the first time the viewer is seen.
    pub fn get_or_create<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        surface_label: &str,
        viewer: ViewerId,
        initial_pose: Pose,
    ) -> RenderResult<&mut ReflectionCamera> {
        match self.cameras.entry(viewer) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let label = format!("Mirror Refl Camera id{surface_label} for {}", viewer.0);
                let id = backend.create_camera(&label, initial_pose)?;
                log::debug!("created {label} ({id})");
                Ok(entry.insert(ReflectionCamera {
                    id,
                    viewer,
                    camera: Camera::disabled_at(initial_pose),
                    target: None,
                }))
            }
        }
    }

    /// Returns the reflection camera for `viewer`, if one exists.
    #[must_use]
    pub fn get(&self, viewer: ViewerId) -> Option<&ReflectionCamera> {
        self.cameras.get(&viewer)
    }

    /// Destroys the reflection camera for `viewer`, if one exists.
    pub fn evict<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, viewer: ViewerId) -> bool {
        match self.cameras.remove(&viewer) {
            Some(camera) => {
                backend.destroy_camera(camera.id);
                true
            }
            None => false,
        }
    }

    /// Destroys every reflection camera and empties the cache.
    pub fn clear<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for (_, camera) in self.cameras.drain() {
            backend.destroy_camera(camera.id);
        }
    }

    /// Number of cached reflection cameras.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
