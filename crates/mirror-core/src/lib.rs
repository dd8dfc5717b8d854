//! Core geometry for mirror-rs.
//!
//! This crate provides the math a planar mirror needs, independent of any GPU:
//! - [`Plane`] and the world/camera-space mirror plane builders
//! - [`reflection_matrix`] for mirroring points and view matrices
//! - [`oblique_projection`] for clipping at the mirror plane
//! - [`MirrorConfig`] and [`LayerMask`] for per-surface settings

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Matrix element names like nx/ny/nz are intentionally close
#![allow(clippy::similar_names)]

pub mod config;
pub mod error;
pub mod oblique;
pub mod plane;
pub mod reflection;

pub use config::{LayerMask, MirrorConfig, REFLECTOR_LAYER};
pub use error::{MirrorError, Result};
pub use oblique::{near_clip_plane, oblique_projection, sgn};
pub use plane::{camera_space_plane, compute_plane, unit_normal, Plane};
pub use reflection::{
    ground_reflection_matrix, reflection_matrix, reflection_matrix_from_point_normal,
};

// Re-export glam types for convenience
pub use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
