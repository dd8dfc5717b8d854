//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while producing a reflection.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Reflection texture allocation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// Reflection camera creation failed.
    #[error("camera creation failed: {0}")]
    CameraCreationFailed(String),

    /// The reflection render itself failed.
    #[error("reflection render failed: {0}")]
    RenderFailed(String),

    /// A handle did not refer to a live backend resource.
    #[error("unknown render target {0}")]
    UnknownTarget(u64),

    /// Invalid surface configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] mirror_core::MirrorError),

    /// No GPU adapter matched the request.
    #[error("failed to find a suitable GPU adapter")]
    AdapterCreationFailed,

    /// The adapter refused to open a device.
    #[error("failed to create device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Copying a target back to host memory failed.
    #[error("texture readback failed: {0}")]
    ReadbackFailed(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
