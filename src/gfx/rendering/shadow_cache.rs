//! Shadow map caching
//!
//! The shadow maps only change when a shadow-casting light, the mesh
//! geometry or the mesh transform changes, so the shadow pass is skipped
//! while the last rendered state still holds.

use crate::gfx::resources::global_bindings::GlobalUBOContent;
use crate::gfx::scene::{MeshId, Scene};

/// Everything the shadow pass output depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowKey {
    mesh: (MeshId, u64),
    model: [[f32; 4]; 4],
    side: crate::gfx::resources::material::Side,
    light_view_proj: Vec<(usize, [[f32; 4]; 4])>,
}

impl ShadowKey {
    /// Captures the shadow inputs of this frame.
    ///
    /// # Arguments
    /// * `scene` - Supplies the mesh identity, geometry revision, transform
    ///   and side
    /// * `globals` - Supplies the light frusta of the shadow-casting lights
    pub fn new(scene: &Scene, globals: &GlobalUBOContent) -> Self {
        Self {
            mesh: (scene.mesh.id, scene.mesh.geometry_revision),
            model: scene.mesh.transform.matrix().into(),
            side: scene.mesh.material.side(),
            light_view_proj: globals
                .shadow_layers()
                .map(|i| (i, globals.lights[i].view_proj))
                .collect(),
        }
    }

    pub fn has_casters(&self) -> bool {
        !self.light_view_proj.is_empty()
    }

    /// Shadow map layers to render, one per casting light
    pub fn layers(&self) -> impl Iterator<Item = usize> + '_ {
        self.light_view_proj.iter().map(|(i, _)| *i)
    }
}

/// Remembers the inputs of the last rendered shadow pass.
#[derive(Debug, Default)]
pub struct ShadowCache {
    last: Option<ShadowKey>,
}

impl ShadowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if some light casts and its inputs differ from the last pass
    pub fn needs_update(&self, key: &ShadowKey) -> bool {
        key.has_casters() && self.last.as_ref() != Some(key)
    }

    pub fn mark_valid(&mut self, key: ShadowKey) {
        self.last = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::gfx::geometry::GeometrySettings;
    use crate::gfx::resources::material::Material;

    fn scene() -> Scene {
        let mut scene = Scene::new(
            &EditorConfig::default(),
            1.0,
            GeometrySettings::default().build(),
            Material::default(),
        );
        scene.mesh.cast_shadow = true;
        scene
    }

    fn key(scene: &Scene) -> ShadowKey {
        ShadowKey::new(scene, &GlobalUBOContent::new(scene, (800.0, 600.0), 2048))
    }

    #[test]
    fn test_unchanged_scene_hits_cache() {
        let scene = scene();
        let mut cache = ShadowCache::new();
        assert!(cache.needs_update(&key(&scene)));
        cache.mark_valid(key(&scene));
        assert!(!cache.needs_update(&key(&scene)));
    }

    #[test]
    fn test_moving_mesh_or_light_misses() {
        let mut scene = scene();
        let mut cache = ShadowCache::new();
        cache.mark_valid(key(&scene));

        scene.mesh.transform.position.y = 1.0;
        assert!(cache.needs_update(&key(&scene)));
        cache.mark_valid(key(&scene));

        scene.point_lights[0].position.x = -3.0;
        assert!(cache.needs_update(&key(&scene)));
        cache.mark_valid(key(&scene));

        scene.point_lights[1].enabled = true;
        assert!(cache.needs_update(&key(&scene)));
    }

    #[test]
    fn test_nothing_to_draw_without_casters() {
        let mut scene = scene();
        scene.mesh.cast_shadow = false;
        let cache = ShadowCache::new();
        assert!(!key(&scene).has_casters());
        assert!(!cache.needs_update(&key(&scene)));
    }
}
