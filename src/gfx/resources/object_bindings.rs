//! Per-draw uniforms: model transform, resolved material and map texture
//!
//! The layout MUST match `Object` in the shaders.

use cgmath::Matrix4;

use crate::{
    gfx::{
        resources::{material::Material, texture_resource::TextureResource},
        scene::{SceneMesh, ShadowGround, Transform},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

pub const SHADING_UNLIT: u32 = 0;
pub const SHADING_STANDARD: u32 = 1;
pub const SHADING_PHONG: u32 = 2;
pub const SHADING_SHADOW_CATCHER: u32 = 3;

/// Per-object uniform block, laid out to match `Object` in `common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniformContent {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear color and alpha
    pub color: [f32; 4],
    /// Linear emissive color and the vertex colors switch
    pub emissive: [f32; 4],
    /// Linear specular color and shininess
    pub specular: [f32; 4],
    /// roughness, metalness, point size, size attenuation
    pub params: [f32; 4],
    /// shading model, flat shading, use map, receive shadow
    pub flags: [u32; 4],
}

fn rgba(rgb: [f32; 3], a: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], a]
}

impl ObjectUniformContent {
    /// Packs the mesh transform and its resolved material.
    ///
    /// # Arguments
    ///
    /// * `mesh` - Mesh whose current state is uploaded
    ///
    /// # Returns
    ///
    /// The uniform content with colors converted to linear space
    pub fn for_mesh(mesh: &SceneMesh) -> Self {
        let material = &mesh.material;
        let alpha = material.flags().effective_opacity();
        let (shading, specular, params) = match material {
            Material::Basic(_) | Material::LineBasic(_) => (SHADING_UNLIT, [0.0; 4], [0.0; 4]),
            Material::Standard(m) => (SHADING_STANDARD, [0.0; 4], [m.roughness, m.metalness, 0.0, 0.0]),
            Material::Phong(m) => (SHADING_PHONG, rgba(m.specular.to_linear(), m.shininess), [0.0; 4]),
            Material::Points(m) => (
                SHADING_UNLIT,
                [0.0; 4],
                [0.0, 0.0, m.size, if m.size_attenuation { 1.0 } else { 0.0 }],
            ),
        };

        let vertex_colors = if material.vertex_colors() { 1.0 } else { 0.0 };

        Self {
            model: mesh.transform.matrix().into(),
            normal_matrix: mesh.transform.normal_matrix().into(),
            color: rgba(material.color().to_linear(), alpha),
            emissive: rgba(material.emissive().to_linear(), vertex_colors),
            specular,
            params,
            flags: [
                shading,
                material.flat_shading() as u32,
                material.map().is_some() as u32,
                mesh.receive_shadow as u32,
            ],
        }
    }

    /// The ground only darkens where shadows fall on it.
    pub fn for_ground(ground: &ShadowGround) -> Self {
        let identity: Matrix4<f32> = Transform::default().matrix();
        Self {
            model: identity.into(),
            normal_matrix: identity.into(),
            color: [0.0, 0.0, 0.0, ground.shadow_opacity],
            emissive: [0.0; 4],
            specular: [0.0; 4],
            params: [0.0; 4],
            flags: [SHADING_SHADOW_CATCHER, 0, 0, 1],
        }
    }
}

pub type ObjectUBO = UniformBuffer<ObjectUniformContent>;

/// Layout of group 1: uniform, color map and its sampler.
pub fn object_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_rendering(binding_types::uniform())
        .next_binding_fragment(binding_types::color_map())
        .next_binding_fragment(binding_types::color_map_sampler())
        .create(device, "Object Bind Group Layout")
}

/// Group 1 for one drawable: its uniform plus the map it samples.
///
/// The bind group is rebuilt only when the sampled texture changes.
pub struct ObjectBindings {
    label: &'static str,
    ubo: ObjectUBO,
    map: Option<(u64, TextureResource)>,
    bind_group: wgpu::BindGroup,
}

impl ObjectBindings {
    pub fn new(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        white: &TextureResource,
        label: &'static str,
    ) -> Self {
        let ubo = ObjectUBO::new(device, label);
        let bind_group = Self::create_bind_group(device, layout, &ubo, white, label);
        Self {
            label,
            ubo,
            map: None,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        ubo: &ObjectUBO,
        texture: &TextureResource,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .texture(&texture.view)
            .sampler(&texture.sampler)
            .create(device, label)
    }

    /// Writes the uniform and rebinds when the material's map changed.
    ///
    /// # Arguments
    ///
    /// * `device` - Device used to upload a new map
    /// * `queue` - Queue for the uniform write
    /// * `layout` - Object layout from [`object_layout`]
    /// * `white` - Fallback texture for materials without a map
    /// * `content` - Uniform content for this frame
    /// * `material` - Source of the map, or `None` for helper geometry
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        white: &TextureResource,
        content: ObjectUniformContent,
        material: Option<&Material>,
    ) {
        self.ubo.update_content(queue, content);

        let wanted = material.and_then(Material::map);
        let current = self.map.as_ref().map(|(id, _)| *id);
        if wanted.map(|m| m.id) == current {
            return;
        }

        self.map = wanted.map(|m| (m.id, TextureResource::from_texture_map(device, queue, m)));
        let texture = self.map.as_ref().map_or(white, |(_, t)| t);
        self.bind_group = Self::create_bind_group(device, layout, &self.ubo, texture, self.label);
        log::debug!("Rebound {} texture ({:?})", self.label, wanted.map(|m| &m.name));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::color::Rgb;
    use crate::gfx::geometry::GeometrySettings;
    use crate::gfx::resources::material::{PhongMaterial, PointsMaterial, StandardMaterial};
    use crate::gfx::resources::texture_map::TextureMap;
    use crate::gfx::scene::DrawMode;
    use std::sync::Arc;

    fn mesh(material: Material) -> SceneMesh {
        SceneMesh::new(DrawMode::Solid, Arc::new(GeometrySettings::default().build()), material)
    }

    #[test]
    fn test_standard_material_packing() {
        let mut standard = StandardMaterial {
            roughness: 0.3,
            metalness: 0.7,
            ..StandardMaterial::default()
        };
        standard.flags.transparent = true;
        standard.flags.opacity = 0.4;
        let content = ObjectUniformContent::for_mesh(&mesh(Material::Standard(standard)));

        assert_eq!(content.flags[0], SHADING_STANDARD);
        assert_eq!(content.params[..2], [0.3, 0.7]);
        assert_eq!(content.color[3], 0.4);
    }

    #[test]
    fn test_opacity_ignored_when_opaque() {
        let mut phong = PhongMaterial {
            specular: Rgb::WHITE,
            ..PhongMaterial::default()
        };
        phong.flags.opacity = 0.1;
        let content = ObjectUniformContent::for_mesh(&mesh(Material::Phong(phong.clone())));
        assert_eq!(content.flags[0], SHADING_PHONG);
        assert_eq!(content.color[3], 1.0);
        assert_eq!(content.specular[3], phong.shininess);
    }

    #[test]
    fn test_points_carry_size() {
        let points = PointsMaterial {
            size: 0.005,
            size_attenuation: false,
            ..PointsMaterial::default()
        };
        let content = ObjectUniformContent::for_mesh(&mesh(Material::Points(points)));
        assert_eq!(content.flags[0], SHADING_UNLIT);
        assert_eq!(content.params[2..], [0.005, 0.0]);
    }

    #[test]
    fn test_vertex_colors_switch() {
        let mut phong = PhongMaterial::default();
        assert_eq!(ObjectUniformContent::for_mesh(&mesh(Material::Phong(phong.clone()))).emissive[3], 0.0);

        phong.vertex_colors = true;
        let content = ObjectUniformContent::for_mesh(&mesh(Material::Phong(phong)));
        assert_eq!(content.emissive[3], 1.0);
        assert_eq!(content.emissive[..3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_map_flag_follows_apply_toggle() {
        let mut standard = StandardMaterial::default();
        standard.map.texture = Some(TextureMap::from_rgba("t.png", 1, 1, vec![0, 0, 0, 255], false));
        let mut m = mesh(Material::Standard(standard.clone()));
        assert_eq!(ObjectUniformContent::for_mesh(&m).flags[2], 0);

        standard.map.apply = true;
        m.material = Material::Standard(standard);
        assert_eq!(ObjectUniformContent::for_mesh(&m).flags[2], 1);
    }

    #[test]
    fn test_ground_is_a_shadow_catcher() {
        let content = ObjectUniformContent::for_ground(&ShadowGround::default());
        assert_eq!(content.flags, [SHADING_SHADOW_CATCHER, 0, 0, 1]);
        assert_eq!(content.color, [0.0, 0.0, 0.0, 0.2]);
    }
}
