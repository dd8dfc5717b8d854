//! Per-surface mirror configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};

/// Layer reserved for reflective surfaces themselves.
///
/// Reflection cameras never render this layer, whatever the surface's
/// configured mask says, so a mirror never shows up in its own reflection.
pub const REFLECTOR_LAYER: u32 = 4;

/// A 32-bit mask of render layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Mask containing every layer.
    pub const EVERYTHING: Self = Self(u32::MAX);
    /// Mask containing no layer.
    pub const NOTHING: Self = Self(0);

    /// Mask containing only `layer`. Layers at or above 32 produce an empty mask.
    #[must_use]
    pub fn from_layer(layer: u32) -> Self {
        Self(1u32.checked_shl(layer).unwrap_or(0))
    }

    /// Returns whether `layer` is part of the mask.
    #[must_use]
    pub fn contains(self, layer: u32) -> bool {
        self.0 & Self::from_layer(layer).0 != 0
    }

    /// Returns the mask with `layer` removed.
    #[must_use]
    pub fn without(self, layer: u32) -> Self {
        Self(self.0 & !Self::from_layer(layer).0)
    }

    /// The culling mask a reflection camera uses for this configured mask.
    #[must_use]
    pub fn reflection_culling(self) -> Self {
        self.without(REFLECTOR_LAYER)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::EVERYTHING
    }
}

/// Configuration of a single mirror surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Whether per-pixel lights are disabled while rendering the reflection.
    pub disable_pixel_lights: bool,

    /// Edge length in texels of the square reflection texture.
    pub texture_size: u32,

    /// Bias of the mirror plane along its normal, in world units.
    pub clip_plane_offset: f32,

    /// Layers rendered into the reflection.
    pub reflect_layers: LayerMask,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            disable_pixel_lights: true,
            texture_size: 256,
            clip_plane_offset: 0.07,
            reflect_layers: LayerMask::EVERYTHING,
        }
    }
}

impl MirrorConfig {
    /// Checks the invariants a surface relies on.
    pub fn validate(&self) -> Result<()> {
        if self.texture_size == 0 {
            return Err(MirrorError::InvalidTextureSize(self.texture_size));
        }
        if !self.clip_plane_offset.is_finite() {
            return Err(MirrorError::InvalidClipPlaneOffset(self.clip_plane_offset));
        }
        Ok(())
    }

    /// Parses and validates a configuration from JSON. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        log::debug!("loaded mirror config from {}", path.display());
        Ok(config)
    }

    /// Effective culling mask for reflection cameras.
    #[must_use]
    pub fn culling_mask(&self) -> LayerMask {
        self.reflect_layers.reflection_culling()
    }
}
