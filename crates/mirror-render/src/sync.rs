//! Mirroring a viewer camera across a surface.

use glam::{Mat4, Vec3};
use mirror_core::{
    camera_space_plane, compute_plane, oblique_projection, reflection_matrix, unit_normal,
    LayerMask, Plane, Result,
};

use crate::camera::{Camera, Pose};

/// Geometry derived while mirroring one camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorFrame {
    /// World-space mirror plane, biased by the clip-plane offset.
    pub plane: Plane,
    /// Reflection across `plane`.
    pub reflection: Mat4,
    /// The mirror plane in the reflection camera's space.
    pub clip_plane: Plane,
}

/// Copies clear state and projection parameters from `src` to `dest`.
///
/// Pose, culling mask and target are left alone.
pub fn copy_camera_modes(src: &Camera, dest: &mut Camera) {
    dest.clear_flags = src.clear_flags;
    dest.background_color = src.background_color;
    dest.far = src.far;
    dest.near = src.near;
    dest.projection_mode = src.projection_mode;
    dest.fov = src.fov;
    dest.aspect_ratio = src.aspect_ratio;
    dest.ortho_size = src.ortho_size;
}

/// Positions, orients and projects `reflection` as the mirror image of
/// `viewer` across the surface at `surface`.
///
/// The surface normal is the surface's local up axis, rescaled to unit
/// length. The reflection camera's pitch is zeroed while yaw and roll follow
/// the viewer; its view matrix, not its pose, is what renders.
///
/// # Errors
///
/// Returns [`MirrorError::DegenerateNormal`](mirror_core::MirrorError) when the
/// surface rotation has no usable up axis. `reflection` is left untouched.
pub fn mirror_camera(
    viewer: &Camera,
    reflection: &mut Camera,
    surface: Pose,
    clip_plane_offset: f32,
    reflect_layers: LayerMask,
) -> Result<MirrorFrame> {
    let normal = unit_normal(surface.up())?;
    let position = surface.position;
    copy_camera_modes(viewer, reflection);

    let plane = compute_plane(position, normal, clip_plane_offset);
    let r = reflection_matrix(plane);

    reflection.set_view_matrix(viewer.view_matrix() * r);
    reflection.pose.position = r.transform_point3(viewer.position());
    let (yaw, _pitch, roll) = viewer.euler_angles();
    reflection.set_euler_angles(yaw, 0.0, roll);

    let clip_plane = camera_space_plane(
        reflection.view_matrix(),
        position,
        normal,
        clip_plane_offset,
        1.0,
    );
    reflection.set_projection_matrix(oblique_projection(
        reflection.standard_projection_matrix(),
        clip_plane,
    ));
    reflection.culling_mask = reflect_layers.reflection_culling();

    Ok(MirrorFrame {
        plane,
        reflection: r,
        clip_plane,
    })
}

/// Puts the reflection camera back at the viewer's pose once the reflection
/// has been rendered.
pub fn restore_viewer_pose(viewer: &Camera, reflection: &mut Camera) {
    reflection.pose = viewer.pose;
}

/// World position a viewer at `eye` appears at behind the mirror.
pub fn mirrored_eye(eye: Vec3, surface: Pose, clip_plane_offset: f32) -> Result<Vec3> {
    let normal = unit_normal(surface.up())?;
    Ok(reflection_matrix(compute_plane(surface.position, normal, clip_plane_offset))
        .transform_point3(eye))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{ClearFlags, ProjectionMode};
    use glam::{Quat, Vec4};
    use mirror_core::{MirrorError, REFLECTOR_LAYER};

    fn viewer() -> Camera {
        let mut camera = Camera::new(1.5).looking_at(Vec3::new(0.0, 3.0, 5.0), Vec3::ZERO, Vec3::Y);
        camera.fov = 50f32.to_radians();
        camera.near = 0.1;
        camera.far = 200.0;
        camera.clear_flags = ClearFlags::SolidColor;
        camera.background_color = Vec4::new(0.1, 0.2, 0.3, 1.0);
        camera
    }

    fn floor() -> Pose {
        Pose::default()
    }

    #[test]
    fn test_modes_are_copied() {
        let mut src = viewer();
        src.projection_mode = ProjectionMode::Orthographic;
        src.ortho_size = 7.0;
        let mut dest = Camera::default();
        copy_camera_modes(&src, &mut dest);

        assert_eq!(dest.clear_flags, ClearFlags::SolidColor);
        assert_eq!(dest.background_color, src.background_color);
        assert_eq!(dest.near, 0.1);
        assert_eq!(dest.far, 200.0);
        assert_eq!(dest.projection_mode, ProjectionMode::Orthographic);
        assert_eq!(dest.ortho_size, 7.0);
        assert_eq!(dest.fov, src.fov);
        assert_eq!(dest.aspect_ratio, 1.5);
        // Pose is not part of the mode copy.
        assert_eq!(dest.pose, Pose::default());
    }

    #[test]
    fn test_position_is_mirrored() {
        let viewer = viewer();
        let mut refl = Camera::default();
        mirror_camera(&viewer, &mut refl, floor(), 0.07, LayerMask::EVERYTHING).unwrap();

        // Plane sits at y = 0.07, so y = 3 maps to 0.14 - 3.
        assert!((refl.position() - Vec3::new(0.0, -2.86, 5.0)).length() < 1e-4);
        let eye = mirrored_eye(viewer.position(), floor(), 0.07).unwrap();
        assert!((eye - refl.position()).length() < 1e-5);
    }

    #[test]
    fn test_view_matrix_composes_reflection() {
        let viewer = viewer();
        let mut refl = Camera::default();
        let frame = mirror_camera(&viewer, &mut refl, floor(), 0.0, LayerMask::EVERYTHING).unwrap();

        assert_eq!(refl.view_matrix(), viewer.view_matrix() * frame.reflection);

        // The reflection camera sees a point where the viewer sees its mirror image.
        let p = Vec3::new(1.0, 2.0, -1.0);
        let seen = refl.view_matrix().transform_point3(p);
        let mirrored = viewer
            .view_matrix()
            .transform_point3(frame.reflection.transform_point3(p));
        assert!((seen - mirrored).length() < 1e-4);
    }

    #[test]
    fn test_orientation_keeps_yaw_and_roll() {
        let mut viewer = viewer();
        viewer.set_euler_angles(0.8, -0.4, 0.1);
        let mut refl = Camera::default();
        mirror_camera(&viewer, &mut refl, floor(), 0.0, LayerMask::EVERYTHING).unwrap();

        let (yaw, pitch, roll) = refl.euler_angles();
        assert!((yaw - 0.8).abs() < 1e-4);
        assert!(pitch.abs() < 1e-4);
        assert!((roll - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_projection_clips_below_mirror() {
        let viewer = viewer();
        let mut refl = Camera::default();
        mirror_camera(&viewer, &mut refl, floor(), 0.0, LayerMask::EVERYTHING).unwrap();
        let view_proj = refl.view_projection_matrix();

        let above = view_proj * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert!(above.z > -above.w, "geometry above the mirror must be visible");

        let below = view_proj * Vec4::new(0.0, -1.0, 0.0, 1.0);
        assert!(below.z < -below.w, "geometry below the mirror must be clipped");

        let on_mirror = view_proj * Vec4::new(0.5, 0.0, 0.5, 1.0);
        assert!((on_mirror.z / on_mirror.w + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_projection_preserves_fov_and_aspect() {
        let viewer = viewer();
        let mut refl = Camera::default();
        mirror_camera(&viewer, &mut refl, floor(), 0.07, LayerMask::EVERYTHING).unwrap();
        let proj = refl.projection_matrix();
        let base = viewer.standard_projection_matrix();
        assert_eq!(proj.row(0), base.row(0));
        assert_eq!(proj.row(1), base.row(1));
        assert_eq!(proj.row(3), base.row(3));
    }

    #[test]
    fn test_tilted_surface_uses_local_up() {
        let viewer = viewer();
        let wall = Pose::new(Vec3::new(0.0, 0.0, -2.0), Quat::from_rotation_x(90f32.to_radians()));
        let mut refl = Camera::default();
        let frame = mirror_camera(&viewer, &mut refl, wall, 0.0, LayerMask::EVERYTHING).unwrap();

        assert!((frame.plane.normal - Vec3::Z).length() < 1e-5);
        assert!((refl.position() - Vec3::new(0.0, 3.0, -9.0)).length() < 1e-4);
    }

    #[test]
    fn test_unnormalized_rotation_mirrors_like_unit() {
        let viewer = viewer();
        // Identity orientation scaled by two: up() comes out four units long.
        let scaled = Pose::new(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 2.0));
        let mut refl = Camera::default();
        let frame = mirror_camera(&viewer, &mut refl, scaled, 0.0, LayerMask::EVERYTHING).unwrap();

        assert!((frame.plane.normal - Vec3::Y).length() < 1e-6);
        assert!((refl.position() - Vec3::new(0.0, -3.0, 5.0)).length() < 1e-4);
        assert!((frame.reflection * frame.reflection).abs_diff_eq(Mat4::IDENTITY, 1e-5));

        let eye = mirrored_eye(viewer.position(), scaled, 0.0).unwrap();
        assert!((eye - Vec3::new(0.0, -3.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_zero_rotation_is_degenerate() {
        let viewer = viewer();
        let collapsed = Pose::new(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        let mut refl = Camera::default();
        let result = mirror_camera(&viewer, &mut refl, collapsed, 0.0, LayerMask::EVERYTHING);

        assert!(matches!(result, Err(MirrorError::DegenerateNormal)));
        assert_eq!(refl, Camera::default());
        assert!(matches!(
            mirrored_eye(viewer.position(), collapsed, 0.0),
            Err(MirrorError::DegenerateNormal)
        ));
    }

    #[test]
    fn test_culling_mask_drops_reflector_layer() {
        let viewer = viewer();
        let mut refl = Camera::default();
        mirror_camera(&viewer, &mut refl, floor(), 0.0, LayerMask(0b1_0011)).unwrap();
        assert_eq!(refl.culling_mask, LayerMask(0b0_0011));
        assert!(!refl.culling_mask.contains(REFLECTOR_LAYER));
    }

    #[test]
    fn test_restore_viewer_pose() {
        let viewer = viewer();
        let mut refl = Camera::default();
        mirror_camera(&viewer, &mut refl, floor(), 0.0, LayerMask::EVERYTHING).unwrap();
        restore_viewer_pose(&viewer, &mut refl);
        assert_eq!(refl.pose, viewer.pose);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mirror_point_lands_on_near_plane(
                x in -10.0f32..10.0,
                y in 0.5f32..10.0,
                z in 1.0f32..10.0,
            ) {
                let viewer = Camera::new(1.0).looking_at(Vec3::new(x, y, z), Vec3::ZERO, Vec3::Y);
                let mut refl = Camera::default();
                mirror_camera(&viewer, &mut refl, floor(), 0.0, LayerMask::EVERYTHING).unwrap();

                prop_assert!((refl.position() - Vec3::new(x, -y, z)).length() < 1e-3);

                // The look-at target sits on the mirror, so it is fixed by the
                // reflection and lands exactly on the oblique near plane.
                let clip = refl.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
                prop_assert!((clip.z / clip.w + 1.0).abs() < 1e-2);
            }
        }
    }
}
