//! Error types for mirror-rs.

use thiserror::Error;

/// The main error type for mirror-core operations.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Reflection textures need at least one texel per edge.
    #[error("invalid reflection texture size: {0} (must be positive)")]
    InvalidTextureSize(u32),

    /// The clip-plane offset must be a finite number of world units.
    #[error("invalid clip plane offset: {0}")]
    InvalidClipPlaneOffset(f32),

    /// A plane normal had zero length and cannot be normalized.
    #[error("degenerate plane normal")]
    DegenerateNormal,

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for mirror-core operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
