//! Materials on a mirror surface and reflection texture application.

use std::collections::HashMap;

use crate::backend::TargetId;

/// Sampler property that receives the reflection texture.
pub const REFLECTION_TEXTURE_PROPERTY: &str = "_ReflectionTex";

/// A material with named texture slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    /// Material name.
    pub name: String,
    textures: HashMap<String, Option<TargetId>>,
}

impl Material {
    /// Creates a material without texture slots.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: HashMap::new(),
        }
    }

    /// Creates a material exposing the reflection sampler.
    pub fn mirror(name: impl Into<String>) -> Self {
        Self::new(name).with_texture_slot(REFLECTION_TEXTURE_PROPERTY)
    }

    /// Adds an empty texture slot.
    #[must_use]
    pub fn with_texture_slot(mut self, property: impl Into<String>) -> Self {
        self.textures.insert(property.into(), None);
        self
    }

    /// Returns whether the material exposes `property`.
    #[must_use]
    pub fn has_property(&self, property: &str) -> bool {
        self.textures.contains_key(property)
    }

    /// Returns the texture bound to `property`.
    #[must_use]
    pub fn texture(&self, property: &str) -> Option<TargetId> {
        self.textures.get(property).copied().flatten()
    }

    /// Binds `texture` to an existing slot. Returns `false` if the material
    /// has no such property.
    pub fn set_texture(&mut self, property: &str, texture: TargetId) -> bool {
        match self.textures.get_mut(property) {
            Some(slot) => {
                *slot = Some(texture);
                true
            }
            None => false,
        }
    }
}

/// Renderer of a mirror surface: an enabled flag and its material list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceRenderer {
    /// Whether the renderer draws at all.
    pub enabled: bool,
    /// Materials, the first being the shared material.
    pub materials: Vec<Material>,
}

impl SurfaceRenderer {
    /// Creates an enabled renderer.
    #[must_use]
    pub fn new(materials: Vec<Material>) -> Self {
        Self {
            enabled: true,
            materials,
        }
    }

    /// The shared (first) material.
    #[must_use]
    pub fn shared_material(&self) -> Option<&Material> {
        self.materials.first()
    }

    /// Binds `texture` to the reflection sampler of every material exposing
    /// it. Returns the number of materials updated.
    pub fn apply_reflection_texture(&mut self, texture: TargetId) -> usize {
        let mut updated = 0;
        for material in &mut self.materials {
            if material.set_texture(REFLECTION_TEXTURE_PROPERTY, texture) {
                updated += 1;
            }
        }
        updated
    }
}
