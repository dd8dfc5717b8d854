//! Mirror surfaces and the per-frame reflection entry point.

use mirror_core::MirrorConfig;

use crate::backend::{RenderBackend, TargetId, ViewerId};
use crate::cache::{ReflectionCamera, ReflectionCameraCache};
use crate::camera::{Camera, Pose};
use crate::context::ReflectionContext;
use crate::error::RenderResult;
use crate::material::SurfaceRenderer;
use crate::scoped::{InvertCullingOverride, PixelLightOverride};
use crate::sync;
use crate::target::{ReflectionTarget, TargetSlot};

/// A viewer camera as handed over by the pipeline's visibility callback.
#[derive(Debug, Clone)]
pub struct ViewerCamera {
    /// Stable identity of the camera.
    pub id: ViewerId,
    /// Current camera state.
    pub camera: Camera,
}

impl ViewerCamera {
    /// Creates a viewer camera.
    #[must_use]
    pub fn new(id: ViewerId, camera: Camera) -> Self {
        Self { id, camera }
    }
}

/// Why a dispatch did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The surface is disabled.
    SurfaceDisabled,
    /// The surface has no renderer.
    NoRenderer,
    /// The surface's renderer is disabled.
    RendererDisabled,
    /// The renderer has no shared material.
    NoSharedMaterial,
    /// No viewer camera is current.
    NoViewer,
    /// Another reflection is already being rendered.
    ReflectionInFlight,
}

/// Result of one [`MirrorSurface::render_reflection`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The reflection was rendered into `target` and bound to
    /// `materials_updated` materials.
    Rendered {
        /// Target holding the reflection.
        target: TargetId,
        /// Materials that received the texture.
        materials_updated: usize,
    },
    /// Nothing happened.
    Skipped(SkipReason),
}

impl DispatchOutcome {
    /// Returns whether a reflection was rendered.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }

    /// Target rendered into, if any.
    #[must_use]
    pub fn target(&self) -> Option<TargetId> {
        match self {
            Self::Rendered { target, .. } => Some(*target),
            Self::Skipped(_) => None,
        }
    }
}

/// A flat surface showing a real-time reflection of the scene.
///
/// The mirror plane passes through the surface position with the surface's
/// local up axis as normal. The surface owns one render target, shared by all
/// of its reflection cameras, and one reflection camera per viewer camera.
#[derive(Debug)]
pub struct MirrorSurface {
    name: String,
    config: MirrorConfig,
    enabled: bool,
    pose: Pose,
    renderer: Option<SurfaceRenderer>,
    target: TargetSlot,
    cameras: ReflectionCameraCache,
}

impl MirrorSurface {
    /// Creates an enabled surface without a renderer.
    pub fn new(name: impl Into<String>, pose: Pose, config: MirrorConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            config,
            enabled: true,
            pose,
            renderer: None,
            target: TargetSlot::new(),
            cameras: ReflectionCameraCache::new(),
        })
    }

    /// Attaches a renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: SurfaceRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Returns the name of this surface.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the surface configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Replaces the configuration. A new texture size takes effect on the
    /// next render.
    pub fn set_config(&mut self, config: MirrorConfig) -> RenderResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Sets the reflection texture edge length.
    pub fn set_texture_size(&mut self, size: u32) -> RenderResult<()> {
        self.set_config(MirrorConfig {
            texture_size: size,
            ..self.config.clone()
        })
    }

    /// Returns the surface pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Moves the surface.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Returns the renderer, if any.
    pub fn renderer(&self) -> Option<&SurfaceRenderer> {
        self.renderer.as_ref()
    }

    /// Returns the renderer mutably, if any.
    pub fn renderer_mut(&mut self) -> Option<&mut SurfaceRenderer> {
        self.renderer.as_mut()
    }

    /// Attaches or removes the renderer.
    pub fn set_renderer(&mut self, renderer: Option<SurfaceRenderer>) {
        self.renderer = renderer;
    }

    /// Returns whether the surface is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables the surface. Resources are allocated lazily on the next render.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disables the surface and releases its target and reflection cameras.
    pub fn disable<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.enabled = false;
        self.teardown(backend);
    }

    /// Releases the target and every reflection camera, leaving the cache
    /// empty.
    pub fn teardown<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        let cameras = self.cameras.len();
        self.target.release(backend);
        self.cameras.clear(backend);
        log::debug!("mirror '{}' released its target and {cameras} camera(s)", self.name);
    }

    /// Releases the reflection camera of a viewer that no longer exists.
    pub fn evict_viewer<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        viewer: ViewerId,
    ) -> bool {
        self.cameras.evict(backend, viewer)
    }

    /// The live render target, if any.
    pub fn target(&self) -> Option<ReflectionTarget> {
        self.target.current()
    }

    /// The reflection camera mirroring `viewer`, if one exists.
    pub fn reflection_camera(&self, viewer: ViewerId) -> Option<&ReflectionCamera> {
        self.cameras.get(viewer)
    }

    /// Number of cached reflection cameras.
    pub fn reflection_camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Renders the reflection seen by `viewer` and binds it to the surface's
    /// materials.
    ///
    /// Called by the pipeline once per frame for every viewer that may see
    /// the surface. Disabled surfaces, surfaces without a usable material, a
    /// missing viewer and dispatches issued while another reflection renders
    /// are skipped without touching any state. Render settings and the
    /// context's in-flight flag are restored on every exit path.
    pub fn render_reflection<B: RenderBackend + ?Sized>(
        &mut self,
        ctx: &ReflectionContext,
        backend: &mut B,
        viewer: Option<&ViewerCamera>,
    ) -> RenderResult<DispatchOutcome> {
        if let Some(reason) = self.skip_reason() {
            return Ok(self.skipped(reason));
        }
        let Some(viewer) = viewer else {
            return Ok(self.skipped(SkipReason::NoViewer));
        };
        let Some(token) = ctx.try_enter() else {
            return Ok(self.skipped(SkipReason::ReflectionInFlight));
        };

        let target = {
            let mut lights =
                PixelLightOverride::when(backend, self.config.disable_pixel_lights, 0);
            self.render_into_target(ctx, &mut *lights, viewer)
        };
        drop(token);

        let target = match target {
            Ok(target) => target,
            Err(err) => {
                log::warn!("mirror '{}' reflection failed: {err}", self.name);
                return Err(err);
            }
        };
        let materials_updated = self
            .renderer
            .as_mut()
            .map_or(0, |renderer| renderer.apply_reflection_texture(target));

        Ok(DispatchOutcome::Rendered {
            target,
            materials_updated,
        })
    }

    fn render_into_target<B: RenderBackend + ?Sized>(
        &mut self,
        ctx: &ReflectionContext,
        backend: &mut B,
        viewer: &ViewerCamera,
    ) -> RenderResult<TargetId> {
        let label = format!("__MirrorReflection{}", self.name);
        let target = self
            .target
            .get_or_create(backend, &label, self.config.texture_size)?;
        let camera = self
            .cameras
            .get_or_create(backend, &self.name, viewer.id, self.pose)?;

        sync::mirror_camera(
            &viewer.camera,
            &mut camera.camera,
            self.pose,
            self.config.clip_plane_offset,
            self.config.reflect_layers,
        )?;
        camera.target = Some(target.id);

        let rendered = {
            let mut winding = InvertCullingOverride::new(backend);
            winding.render(ctx, camera, target.id)
        };
        sync::restore_viewer_pose(&viewer.camera, &mut camera.camera);

        rendered.map(|()| target.id)
    }

    fn skip_reason(&self) -> Option<SkipReason> {
        if !self.enabled {
            return Some(SkipReason::SurfaceDisabled);
        }
        match &self.renderer {
            None => Some(SkipReason::NoRenderer),
            Some(renderer) if !renderer.enabled => Some(SkipReason::RendererDisabled),
            Some(renderer) if renderer.shared_material().is_none() => {
                Some(SkipReason::NoSharedMaterial)
            }
            Some(_) => None,
        }
    }

    fn skipped(&self, reason: SkipReason) -> DispatchOutcome {
        log::trace!("mirror '{}' skipped: {reason:?}", self.name);
        DispatchOutcome::Skipped(reason)
    }
}

impl Drop for MirrorSurface {
    fn drop(&mut self) {
        if self.target.current().is_some() || !self.cameras.is_empty() {
            log::warn!(
                "mirror '{}' dropped without being disabled; backend resources leak",
                self.name
            );
        }
    }
}
