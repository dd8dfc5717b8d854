//! A headless backend that records every call made to it.
//!
//! Useful for tests and tooling that need to observe exactly which resources
//! a mirror surface allocates, renders into and releases, without a GPU.

use std::collections::HashMap;

use crate::backend::{CameraId, RenderBackend, TargetDescriptor, TargetId, ViewerId};
use crate::cache::ReflectionCamera;
use crate::camera::{Camera, Pose};
use crate::context::ReflectionContext;
use crate::error::{RenderError, RenderResult};
use crate::surface::{DispatchOutcome, MirrorSurface, ViewerCamera};

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// A target was allocated.
    CreateTarget {
        /// Handle handed out.
        id: TargetId,
        /// Requested label.
        label: String,
        /// Requested edge length.
        size: u32,
    },
    /// A target was released.
    DestroyTarget(TargetId),
    /// A camera entity was created.
    CreateCamera {
        /// Handle handed out.
        id: CameraId,
        /// Requested label.
        label: String,
    },
    /// A camera entity was released.
    DestroyCamera(CameraId),
    /// A reflection was rendered.
    Render {
        /// Camera rendered from.
        camera: CameraId,
        /// Target rendered into.
        target: TargetId,
    },
    /// The pixel light budget changed.
    SetPixelLightCount(u32),
    /// The winding convention changed.
    SetInvertCulling(bool),
}

/// Snapshot of the state a render call observed.
#[derive(Debug, Clone)]
pub struct RenderRecord {
    /// Camera entity rendered from.
    pub camera_id: CameraId,
    /// Viewer the camera mirrors.
    pub viewer: ViewerId,
    /// Target rendered into.
    pub target: TargetId,
    /// Reflection camera state at render time.
    pub camera: Camera,
    /// Pixel light budget at render time.
    pub pixel_light_count: u32,
    /// Winding inversion at render time.
    pub invert_culling: bool,
    /// Whether the context reported a reflection in flight.
    pub reflection_in_flight: bool,
}

/// A scene surface rendered from inside every reflection render.
struct NestedSurface {
    surface: MirrorSurface,
    viewer: ViewerCamera,
}

/// Backend that tracks live resources and logs calls in order.
#[derive(Default)]
pub struct RecordingBackend {
    next_id: u64,
    calls: Vec<BackendCall>,
    renders: Vec<RenderRecord>,
    targets: HashMap<TargetId, TargetDescriptor>,
    cameras: HashMap<CameraId, String>,
    pixel_light_count: u32,
    invert_culling: bool,
    fail_target: bool,
    fail_camera: bool,
    fail_render: bool,
    nested: Vec<NestedSurface>,
    nested_outcomes: Vec<DispatchOutcome>,
}

impl RecordingBackend {
    /// Creates a backend with four pixel lights and standard winding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixel_light_count: 4,
            ..Self::default()
        }
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Number of logged calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|call| pred(call)).count()
    }

    /// Forgets logged calls and renders; live resources are kept.
    pub fn clear_log(&mut self) {
        self.calls.clear();
        self.renders.clear();
        self.nested_outcomes.clear();
    }

    /// Render snapshots so far.
    #[must_use]
    pub fn renders(&self) -> &[RenderRecord] {
        &self.renders
    }

    /// Number of allocated, not yet destroyed targets.
    #[must_use]
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Descriptor of a live target.
    #[must_use]
    pub fn target(&self, id: TargetId) -> Option<&TargetDescriptor> {
        self.targets.get(&id)
    }

    /// Number of created, not yet destroyed cameras.
    #[must_use]
    pub fn live_cameras(&self) -> usize {
        self.cameras.len()
    }

    /// Label of a live camera.
    #[must_use]
    pub fn camera_label(&self, id: CameraId) -> Option<&str> {
        self.cameras.get(&id).map(String::as_str)
    }

    /// Makes the next target allocation fail.
    pub fn fail_next_target(&mut self) {
        self.fail_target = true;
    }

    /// Makes the next camera creation fail.
    pub fn fail_next_camera(&mut self) {
        self.fail_camera = true;
    }

    /// Makes the next render fail.
    pub fn fail_next_render(&mut self) {
        self.fail_render = true;
    }

    /// Adds a surface that is visible from inside every reflection render,
    /// seen by `viewer`.
    pub fn add_nested_surface(&mut self, surface: MirrorSurface, viewer: ViewerCamera) {
        self.nested.push(NestedSurface { surface, viewer });
    }

    /// Outcomes of nested surface dispatches, in order.
    #[must_use]
    pub fn nested_outcomes(&self) -> &[DispatchOutcome] {
        &self.nested_outcomes
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for RecordingBackend {
    fn create_target(&mut self, desc: &TargetDescriptor) -> RenderResult<TargetId> {
        if std::mem::take(&mut self.fail_target) {
            return Err(RenderError::TextureCreationFailed(desc.label.clone()));
        }
        let id = TargetId(self.next_id());
        self.targets.insert(id, desc.clone());
        self.calls.push(BackendCall::CreateTarget {
            id,
            label: desc.label.clone(),
            size: desc.size,
        });
        Ok(id)
    }

    fn destroy_target(&mut self, target: TargetId) {
        self.targets.remove(&target);
        self.calls.push(BackendCall::DestroyTarget(target));
    }

    fn create_camera(&mut self, label: &str, _pose: Pose) -> RenderResult<CameraId> {
        if std::mem::take(&mut self.fail_camera) {
            return Err(RenderError::CameraCreationFailed(label.to_string()));
        }
        let id = CameraId(self.next_id());
        self.cameras.insert(id, label.to_string());
        self.calls.push(BackendCall::CreateCamera {
            id,
            label: label.to_string(),
        });
        Ok(id)
    }

    fn destroy_camera(&mut self, camera: CameraId) {
        self.cameras.remove(&camera);
        self.calls.push(BackendCall::DestroyCamera(camera));
    }

    fn render(
        &mut self,
        ctx: &ReflectionContext,
        camera: &ReflectionCamera,
        target: TargetId,
    ) -> RenderResult<()> {
        if !self.targets.contains_key(&target) {
            return Err(RenderError::UnknownTarget(target.0));
        }
        self.calls.push(BackendCall::Render {
            camera: camera.id,
            target,
        });
        self.renders.push(RenderRecord {
            camera_id: camera.id,
            viewer: camera.viewer,
            target,
            camera: camera.camera.clone(),
            pixel_light_count: self.pixel_light_count,
            invert_culling: self.invert_culling,
            reflection_in_flight: ctx.is_rendering_reflection(),
        });

        let mut nested = std::mem::take(&mut self.nested);
        let mut result = Ok(());
        for entry in &mut nested {
            match entry
                .surface
                .render_reflection(ctx, self, Some(&entry.viewer))
            {
                Ok(outcome) => self.nested_outcomes.push(outcome),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.nested = nested;
        result?;

        if std::mem::take(&mut self.fail_render) {
            return Err(RenderError::RenderFailed(format!("{} into {target}", camera.id)));
        }
        Ok(())
    }

    fn pixel_light_count(&self) -> u32 {
        self.pixel_light_count
    }

    fn set_pixel_light_count(&mut self, count: u32) {
        self.pixel_light_count = count;
        self.calls.push(BackendCall::SetPixelLightCount(count));
    }

    fn invert_culling(&self) -> bool {
        self.invert_culling
    }

    fn set_invert_culling(&mut self, invert: bool) {
        self.invert_culling = invert;
        self.calls.push(BackendCall::SetInvertCulling(invert));
    }
}
