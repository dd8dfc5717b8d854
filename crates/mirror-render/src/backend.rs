//! The seam between mirror surfaces and the host renderer.
//!
//! Everything a surface needs from the outside world (texture allocation,
//! camera entities, the render call itself and the two global render settings
//! it overrides) goes through [`RenderBackend`].

use std::fmt;

use crate::cache::ReflectionCamera;
use crate::camera::Pose;
use crate::context::ReflectionContext;
use crate::error::RenderResult;

/// Handle to a render target owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Handle to a camera entity owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u64);

/// Stable identity of a viewer camera, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera#{}", self.0)
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

/// Parameters of a square reflection render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Debug label.
    pub label: String,
    /// Edge length in texels.
    pub size: u32,
    /// Bits of the attached depth buffer.
    pub depth_bits: u32,
}

impl TargetDescriptor {
    /// Depth precision of reflection targets.
    pub const DEPTH_BITS: u32 = 16;

    /// Describes a `size × size` target with a 16-bit depth buffer.
    pub fn square(label: impl Into<String>, size: u32) -> Self {
        Self {
            label: label.into(),
            size,
            depth_bits: Self::DEPTH_BITS,
        }
    }
}

/// Operations a host renderer provides to mirror surfaces.
pub trait RenderBackend {
    /// Allocates a render target.
    fn create_target(&mut self, desc: &TargetDescriptor) -> RenderResult<TargetId>;

    /// Releases a render target. Unknown handles are ignored.
    fn destroy_target(&mut self, target: TargetId);

    /// Creates a camera entity at `pose` that is hidden from normal scene
    /// traversal, never persisted and never rendered automatically.
    fn create_camera(&mut self, label: &str, pose: Pose) -> RenderResult<CameraId>;

    /// Releases a camera entity. Unknown handles are ignored.
    fn destroy_camera(&mut self, camera: CameraId);

    /// Renders the scene from `camera` into `target`, synchronously.
    ///
    /// The host may re-enter mirror surfaces visible in the reflected view,
    /// passing `ctx` along so they see the reflection already in flight.
    fn render(
        &mut self,
        ctx: &ReflectionContext,
        camera: &ReflectionCamera,
        target: TargetId,
    ) -> RenderResult<()>;

    /// Current per-pixel light budget.
    fn pixel_light_count(&self) -> u32;

    /// Sets the per-pixel light budget.
    fn set_pixel_light_count(&mut self, count: u32);

    /// Whether backface winding is currently inverted.
    fn invert_culling(&self) -> bool;

    /// Inverts (or restores) the backface winding convention.
    fn set_invert_culling(&mut self, invert: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_descriptor() {
        let desc = TargetDescriptor::square("__MirrorReflection7", 512);
        assert_eq!(desc.size, 512);
        assert_eq!(desc.depth_bits, 16);
        assert_eq!(desc.label, "__MirrorReflection7");
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(TargetId(3).to_string(), "target#3");
        assert_eq!(CameraId(4).to_string(), "camera#4");
        assert_eq!(ViewerId(5).to_string(), "viewer#5");
    }
}
