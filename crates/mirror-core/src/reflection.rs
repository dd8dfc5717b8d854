//! Planar reflection matrices.

use glam::{Mat4, Vec3, Vec4};

use crate::plane::Plane;

/// Computes the affine reflection matrix for a plane `ax + by + cz + d = 0`.
///
/// The plane normal `(a, b, c)` must be unit length. The resulting matrix
/// reflects points across the plane and is its own inverse.
#[must_use]
pub fn reflection_matrix(plane: Plane) -> Mat4 {
    let n = plane.normal;
    let d = plane.d;

    // | 1-2nx²   -2nxny   -2nxnz   -2nxd |
    // | -2nxny   1-2ny²   -2nynz   -2nyd |
    // | -2nxnz   -2nynz   1-2nz²   -2nzd |
    // |    0        0        0       1   |
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.y, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.z, -2.0 * n.y * n.z, 1.0 - 2.0 * n.z * n.z, 0.0),
        Vec4::new(-2.0 * n.x * d, -2.0 * n.y * d, -2.0 * n.z * d, 1.0),
    )
}

/// Computes a reflection matrix for the plane through `plane_point` with
/// normal `plane_normal`. The normal is normalized first.
#[must_use]
pub fn reflection_matrix_from_point_normal(plane_point: Vec3, plane_normal: Vec3) -> Mat4 {
    reflection_matrix(Plane::from_point_normal(
        plane_point,
        plane_normal.normalize(),
    ))
}

/// Computes a reflection matrix for a horizontal ground plane at given height.
///
/// Assumes Y-up coordinate system.
#[must_use]
pub fn ground_reflection_matrix(height: f32) -> Mat4 {
    reflection_matrix_from_point_normal(Vec3::new(0.0, height, 0.0), Vec3::Y)
}
