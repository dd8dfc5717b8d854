//! Oblique near-plane clipping.
//!
//! Folds an arbitrary camera-space plane into a projection matrix so that the
//! plane becomes the near clipping boundary, leaving field of view and aspect
//! untouched. Projections use the OpenGL clip convention (NDC depth in
//! `[-1, 1]`), matching `Mat4::perspective_rh_gl` and `Mat4::orthographic_rh_gl`.

use glam::{Mat4, Vec4};

use crate::plane::Plane;

/// Denominators below this leave the projection unmodified.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Extended sign: `-1`, `0` or `1`.
///
/// Unlike `f32::signum`, zero maps to zero.
#[must_use]
pub fn sgn(a: f32) -> f32 {
    if a > 0.0 {
        1.0
    } else if a < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// The standard near clipping plane of a right-handed camera looking down -Z.
#[must_use]
pub fn near_clip_plane(near: f32) -> Plane {
    Plane::new(0.0, 0.0, -1.0, -near)
}

/// Returns `projection` with its near plane replaced by `clip_plane`.
///
/// `clip_plane` is in camera space with its positive side facing the visible
/// region. The third row is overwritten with `c·(2 / (c·q)) - row4`, where `q`
/// is the camera-space corner of the far plane opposite the clip plane.
/// Supplying the camera's own near plane reproduces `projection`.
#[must_use]
pub fn oblique_projection(projection: Mat4, clip_plane: Plane) -> Mat4 {
    let c = clip_plane.to_vec4();
    let q = projection.inverse() * Vec4::new(sgn(c.x), sgn(c.y), 1.0, 1.0);
    let denom = c.dot(q);
    if denom.abs() < DEGENERATE_EPSILON {
        log::trace!("oblique clip plane is degenerate, keeping base projection");
        return projection;
    }

    let row = c * (2.0 / denom) - projection.row(3);
    let mut m = projection;
    m.x_axis.z = row.x;
    m.y_axis.z = row.y;
    m.z_axis.z = row.z;
    m.w_axis.z = row.w;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn assert_mat_close(a: Mat4, b: Mat4, eps: f32) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() <= eps * (1.0 + y.abs()), "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_sgn_zero_is_zero() {
        assert_eq!(sgn(0.0), 0.0);
        assert_eq!(sgn(-0.0), 0.0);
        assert_eq!(sgn(3.5), 1.0);
        assert_eq!(sgn(-0.1), -1.0);
    }

    #[test]
    fn test_near_plane_is_identity_perspective() {
        let near = 0.3;
        let proj = Mat4::perspective_rh_gl(60f32.to_radians(), 16.0 / 9.0, near, 1000.0);
        let oblique = oblique_projection(proj, near_clip_plane(near));
        assert_mat_close(oblique, proj, 1e-4);
    }

    #[test]
    fn test_near_plane_is_identity_orthographic() {
        let near = 0.1;
        let proj = Mat4::orthographic_rh_gl(-4.0, 4.0, -3.0, 3.0, near, 50.0);
        let oblique = oblique_projection(proj, near_clip_plane(near));
        assert_mat_close(oblique, proj, 1e-4);
    }

    #[test]
    fn test_only_third_row_changes() {
        let proj = Mat4::perspective_rh_gl(1.0, 1.5, 0.1, 100.0);
        let plane = Plane::from_point_normal(
            Vec3::new(0.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, 0.2).normalize(),
        );
        let oblique = oblique_projection(proj, plane);
        assert_eq!(oblique.row(0), proj.row(0));
        assert_eq!(oblique.row(1), proj.row(1));
        assert_eq!(oblique.row(3), proj.row(3));
        assert_ne!(oblique.row(2), proj.row(2));
    }

    #[test]
    fn test_points_on_clip_plane_map_to_near_depth() {
        let proj = Mat4::perspective_rh_gl(60f32.to_radians(), 1.0, 0.1, 100.0);
        let plane = Plane::from_point_normal(
            Vec3::new(0.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, 0.2).normalize(),
        );
        let oblique = oblique_projection(proj, plane);

        let on_plane = plane.project(Vec3::new(0.5, 0.0, -8.0));
        let clip = oblique * on_plane.extend(1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-3);

        // Geometry on the kept side is not near-clipped.
        let above = oblique * Vec4::new(0.0, 0.0, -5.0, 1.0);
        assert!(above.z > -above.w);

        // Geometry behind the plane is.
        let below = oblique * Vec4::new(0.0, -3.0, -5.0, 1.0);
        assert!(below.z < -below.w);
    }

    #[test]
    fn test_degenerate_plane_keeps_projection() {
        let proj = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        let oblique = oblique_projection(proj, Plane::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(oblique, proj);
    }
}
