//! Rendering side of mirror-rs.
//!
//! This crate turns the geometry in `mirror-core` into rendered reflections:
//! - [`MirrorSurface`], the per-frame entry point with its recursion guard
//! - reflection camera caching and render target lifetime
//! - scoped overrides of the host's pixel light budget and winding
//! - the [`RenderBackend`] seam, with a wgpu and a recording implementation

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Texel sizes are u32 and go through usize for slicing
#![allow(clippy::cast_possible_truncation)]
// Accessors named after their field
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod cache;
pub mod camera;
pub mod context;
pub mod error;
pub mod material;
pub mod recording;
pub mod scoped;
pub mod surface;
pub mod sync;
pub mod target;
pub mod wgpu_backend;

pub use backend::{CameraId, RenderBackend, TargetDescriptor, TargetId, ViewerId};
pub use cache::{ReflectionCamera, ReflectionCameraCache};
pub use camera::{Camera, ClearFlags, Pose, ProjectionMode};
pub use context::{ReentrancyToken, ReflectionContext};
pub use error::{RenderError, RenderResult};
pub use material::{Material, SurfaceRenderer, REFLECTION_TEXTURE_PROPERTY};
pub use recording::{BackendCall, RecordingBackend, RenderRecord};
pub use scoped::{InvertCullingOverride, PixelLightOverride};
pub use surface::{DispatchOutcome, MirrorSurface, SkipReason, ViewerCamera};
pub use sync::{copy_camera_modes, mirror_camera, mirrored_eye, restore_viewer_pose, MirrorFrame};
pub use target::{ReflectionTarget, TargetSlot};
pub use wgpu_backend::{
    front_face, ClearOnlyDrawer, DrawFrame, MirrorCameraUniforms, ReflectionTexture, SceneDrawer,
    WgpuBackend, OPENGL_TO_WGPU_MATRIX, REFLECTION_COLOR_FORMAT, REFLECTION_DEPTH_FORMAT,
};
