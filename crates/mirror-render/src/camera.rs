//! Camera state shared by viewer and reflection cameras.

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
use mirror_core::LayerMask;

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// What a camera clears its target to before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearFlags {
    /// Clear to the sky; backends without a sky use the background color.
    #[default]
    Skybox,
    /// Clear color and depth to the background color.
    SolidColor,
    /// Clear depth only.
    DepthOnly,
    /// Clear nothing.
    Nothing,
}

/// A world-space position and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in world space.
    pub position: Vec3,
    /// Orientation in world space.
    pub rotation: Quat,
}

impl Pose {
    /// Creates a pose.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// The local +Y axis in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local-to-world matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// A 3D camera.
///
/// The view and projection matrices derive from the pose and projection
/// parameters unless explicitly overridden; reflection cameras override both
/// every frame. Projections use the OpenGL clip convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera pose. The camera looks down its local -Z axis.
    pub pose: Pose,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Half of the vertical extent when orthographic.
    pub ortho_size: f32,
    /// Clear behaviour.
    pub clear_flags: ClearFlags,
    /// Background color (RGBA).
    pub background_color: Vec4,
    /// Layers this camera renders.
    pub culling_mask: LayerMask,
    /// Whether the pipeline renders this camera automatically.
    pub enabled: bool,
    view_override: Option<Mat4>,
    projection_override: Option<Mat4>,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            pose: Pose::default(),
            fov: 60f32.to_radians(),
            aspect_ratio,
            near: 0.3,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_size: 5.0,
            clear_flags: ClearFlags::Skybox,
            background_color: Vec4::new(0.19, 0.30, 0.47, 0.0),
            culling_mask: LayerMask::EVERYTHING,
            enabled: true,
            view_override: None,
            projection_override: None,
        }
    }

    /// Creates a camera at `pose` that the pipeline never renders on its own.
    #[must_use]
    pub fn disabled_at(pose: Pose) -> Self {
        Self {
            pose,
            enabled: false,
            ..Self::default()
        }
    }

    /// Orients the camera at `position` towards `target`.
    #[must_use]
    pub fn looking_at(mut self, position: Vec3, target: Vec3, up: Vec3) -> Self {
        let world_to_camera = Mat4::look_at_rh(position, target, up);
        let (_, rotation, _) = world_to_camera.inverse().to_scale_rotation_translation();
        self.pose = Pose::new(position, rotation);
        self
    }

    /// Camera position in world space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.pose.rotation * Vec3::NEG_Z
    }

    /// Returns the world-to-camera matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_override
            .unwrap_or_else(|| self.pose.to_matrix().inverse())
    }

    /// Overrides the world-to-camera matrix until [`Self::reset_view_matrix`].
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view_override = Some(view);
    }

    /// Derives the view matrix from the pose again.
    pub fn reset_view_matrix(&mut self) {
        self.view_override = None;
    }

    /// Returns the projection for the current parameters, ignoring overrides.
    #[must_use]
    pub fn standard_projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh_gl(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_size;
                let half_width = half_height * self.aspect_ratio;
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_override
            .unwrap_or_else(|| self.standard_projection_matrix())
    }

    /// Overrides the projection until [`Self::reset_projection_matrix`].
    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection_override = Some(projection);
    }

    /// Derives the projection from the parameters again.
    pub fn reset_projection_matrix(&mut self) {
        self.projection_override = None;
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns `(yaw, pitch, roll)` in radians, applied roll first, then
    /// pitch about X, then yaw about Y.
    #[must_use]
    pub fn euler_angles(&self) -> (f32, f32, f32) {
        let (yaw, pitch, roll) = self.pose.rotation.to_euler(EulerRot::YXZ);
        (yaw, pitch, roll)
    }

    /// Sets the orientation from `(yaw, pitch, roll)` in radians.
    pub fn set_euler_angles(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.pose.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);
    }

    /// Sets the near clipping plane.
    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(0.001);
    }

    /// Sets the far clipping plane.
    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + 0.1);
    }

    /// Sets the orthographic half-height.
    pub fn set_ortho_size(&mut self, size: f32) {
        self.ortho_size = size.max(0.01);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
