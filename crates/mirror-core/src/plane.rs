//! Mirror plane equations.
//!
//! A plane is stored as `(nx, ny, nz, d)` such that `n·x + d = 0` holds for
//! every point `x` on it. Mirror planes are recomputed every frame from the
//! surface pose and are never persisted.

use glam::{Mat4, Vec3, Vec4};

use crate::error::{MirrorError, Result};

/// A plane in Hessian normal form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Plane normal. Unit length for planes built from a surface pose.
    pub normal: Vec3,
    /// Signed offset, so that `normal·x + d = 0` on the plane.
    pub d: f32,
}

impl Plane {
    /// Creates a plane from its four coefficients.
    #[must_use]
    pub const fn new(nx: f32, ny: f32, nz: f32, d: f32) -> Self {
        Self {
            normal: Vec3::new(nx, ny, nz),
            d,
        }
    }

    /// Creates a plane from a point on it and its normal.
    #[must_use]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Returns the coefficients as `(nx, ny, nz, d)`.
    #[must_use]
    pub fn to_vec4(self) -> Vec4 {
        self.normal.extend(self.d)
    }

    /// Returns the signed distance of `point` to the plane.
    ///
    /// Only a true distance when the normal is unit length.
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Projects a point onto the plane (unit normal assumed).
    #[must_use]
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.signed_distance(point) * self.normal
    }
}

impl From<Vec4> for Plane {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Plane> for Vec4 {
    fn from(plane: Plane) -> Self {
        plane.to_vec4()
    }
}

/// Scales a surface normal to unit length.
///
/// Normals taken from a pose with a non-unit rotation come out scaled, and
/// the reflection matrix is only an involution for unit normals.
pub fn unit_normal(normal: Vec3) -> Result<Vec3> {
    normal.try_normalize().ok_or(MirrorError::DegenerateNormal)
}

/// Computes the world-space mirror plane for a surface.
///
/// The normal is returned unchanged and `d = -(normal·position) - offset`,
/// which biases the plane along the normal away from the surface.
#[must_use]
pub fn compute_plane(position: Vec3, normal: Vec3, offset: f32) -> Plane {
    Plane {
        normal,
        d: -normal.dot(position) - offset,
    }
}

/// Expresses the (offset) mirror plane in the space of `world_to_camera`.
///
/// `side_sign` selects which half-space is kept: `+1.0` keeps the side the
/// normal points to.
#[must_use]
pub fn camera_space_plane(
    world_to_camera: Mat4,
    position: Vec3,
    normal: Vec3,
    offset: f32,
    side_sign: f32,
) -> Plane {
    let offset_pos = position + normal * offset;
    let cpos = world_to_camera.transform_point3(offset_pos);
    let cnormal = world_to_camera.transform_vector3(normal).normalize() * side_sign;
    Plane {
        normal: cnormal,
        d: -cpos.dot(cnormal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_plane_biases_along_normal() {
        let plane = compute_plane(Vec3::Y, Vec3::Y, 0.07);
        assert_eq!(plane.normal, Vec3::Y);
        assert!((plane.d - (-1.07)).abs() < 1e-6);
    }

    #[test]
    fn test_compute_plane_zero_offset_contains_position() {
        let position = Vec3::new(2.0, -1.0, 4.0);
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let plane = compute_plane(position, normal, 0.0);
        assert!(plane.signed_distance(position).abs() < 1e-5);
    }

    #[test]
    fn test_unit_normal_rescales() {
        let normal = unit_normal(Vec3::new(0.0, 4.0, 0.0)).unwrap();
        assert!((normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_unit_normal_rejects_zero_and_nan() {
        assert!(matches!(unit_normal(Vec3::ZERO), Err(MirrorError::DegenerateNormal)));
        assert!(matches!(
            unit_normal(Vec3::new(f32::NAN, 1.0, 0.0)),
            Err(MirrorError::DegenerateNormal)
        ));
    }

    #[test]
    fn test_camera_space_plane_identity_view() {
        let plane = camera_space_plane(Mat4::IDENTITY, Vec3::ZERO, Vec3::Y, 0.5, 1.0);
        assert!((plane.normal - Vec3::Y).length() < 1e-6);
        // Offset point (0, 0.5, 0) must lie on the plane.
        assert!((plane.d + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_camera_space_plane_side_sign_flips() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 3.0, 5.0), Vec3::ZERO, Vec3::Y);
        let kept = camera_space_plane(view, Vec3::ZERO, Vec3::Y, 0.0, 1.0);
        let flipped = camera_space_plane(view, Vec3::ZERO, Vec3::Y, 0.0, -1.0);
        assert!((kept.to_vec4() + flipped.to_vec4()).length() < 1e-5);
    }

    #[test]
    fn test_camera_space_plane_matches_world_points() {
        let view = Mat4::look_at_rh(Vec3::new(1.0, 2.0, 6.0), Vec3::ZERO, Vec3::Y);
        let plane = camera_space_plane(view, Vec3::new(0.0, 0.5, 0.0), Vec3::Y, 0.0, 1.0);

        // A world point on the mirror stays on the plane in camera space.
        let on_plane = view.transform_point3(Vec3::new(3.0, 0.5, -2.0));
        assert!(plane.signed_distance(on_plane).abs() < 1e-4);

        // A world point above the mirror stays on the positive side.
        let above = view.transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!(plane.signed_distance(above) > 0.0);
    }

    #[test]
    fn test_project_onto_plane() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        let p = plane.project(Vec3::new(3.0, 7.0, -2.0));
        assert_eq!(p, Vec3::new(3.0, 1.0, -2.0));
    }

    #[test]
    fn test_vec4_conversions() {
        let plane = Plane::new(0.0, 0.0, 1.0, -2.0);
        let v: Vec4 = plane.into();
        assert_eq!(v, Vec4::new(0.0, 0.0, 1.0, -2.0));
        assert_eq!(Plane::from(v), plane);
    }
}
