//! mirror-rs: real-time planar mirror reflections.
//!
//! A [`MirrorSurface`] renders the scene as seen from the mirror image of each
//! viewer camera, clipped at the mirror plane, into a texture bound to its
//! materials.
//!
//! # Quick Start
//!
//! ```no_run
//! use mirror::*;
//!
//! fn main() -> RenderResult<()> {
//!     init_logging();
//!
//!     let mut backend = headless_backend(Box::new(ClearOnlyDrawer))?;
//!     let ctx = ReflectionContext::new();
//!     let mut floor = MirrorSurface::new("floor", Pose::default(), MirrorConfig::default())?
//!         .with_renderer(SurfaceRenderer::new(vec![Material::mirror("floor")]));
//!
//!     let viewer = ViewerCamera::new(
//!         ViewerId(1),
//!         Camera::default().looking_at(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y),
//!     );
//!     let outcome = floor.render_reflection(&ctx, &mut backend, Some(&viewer))?;
//!     assert!(outcome.is_rendered());
//!
//!     floor.disable(&mut backend);
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `mirror-core`: planes, reflection matrices, oblique projection, config
//! - `mirror-render`: surfaces, caching, overrides and backends

// Re-export core types
pub use mirror_core::{
    camera_space_plane, compute_plane, ground_reflection_matrix, near_clip_plane,
    oblique_projection, reflection_matrix, reflection_matrix_from_point_normal, sgn, EulerRot,
    LayerMask, Mat4, MirrorConfig, MirrorError, Plane, Quat, Result, Vec3, Vec4, REFLECTOR_LAYER,
};

// Re-export render types
pub use mirror_render::{
    copy_camera_modes, front_face, mirror_camera, mirrored_eye, restore_viewer_pose, BackendCall,
    Camera, CameraId, ClearFlags, ClearOnlyDrawer, DispatchOutcome, DrawFrame,
    InvertCullingOverride, Material, MirrorCameraUniforms, MirrorFrame, MirrorSurface,
    PixelLightOverride, Pose, ProjectionMode, RecordingBackend, ReentrancyToken, ReflectionCamera,
    ReflectionCameraCache, ReflectionContext, ReflectionTarget, ReflectionTexture, RenderBackend,
    RenderError, RenderRecord, RenderResult, SceneDrawer, SkipReason, SurfaceRenderer,
    TargetDescriptor, TargetId, TargetSlot, ViewerCamera, ViewerId, WgpuBackend,
    OPENGL_TO_WGPU_MATRIX, REFLECTION_COLOR_FORMAT, REFLECTION_DEPTH_FORMAT,
    REFLECTION_TEXTURE_PROPERTY,
};

/// Installs `env_logger` as the global logger, controlled by `RUST_LOG`.
///
/// Does nothing if a logger is already installed.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::debug!("mirror-rs logging initialized");
    }
}

/// Opens a headless wgpu device and wraps it in a [`WgpuBackend`].
///
/// Blocks until the adapter and device are ready.
pub fn headless_backend(drawer: Box<dyn SceneDrawer>) -> RenderResult<WgpuBackend> {
    pollster::block_on(WgpuBackend::new_headless(drawer))
}

/// Loads a surface configuration from a JSON file and builds an enabled
/// surface with a single mirror material.
pub fn load_surface(
    name: &str,
    pose: Pose,
    config_path: impl AsRef<std::path::Path>,
) -> RenderResult<MirrorSurface> {
    let config = MirrorConfig::load(config_path)?;
    Ok(MirrorSurface::new(name, pose, config)?
        .with_renderer(SurfaceRenderer::new(vec![Material::mirror(name)])))
}
