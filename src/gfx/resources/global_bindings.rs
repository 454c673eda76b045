//! Global uniform bindings for camera, lights and fog
//!
//! Everything shared by every draw in a frame lives in one uniform buffer at
//! group 0, next to the shadow map array and its comparison sampler.
//! The layout MUST match `Globals` in the shaders.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::{
    gfx::{
        camera::{camera_utils::OPENGL_TO_WGPU_MATRIX, Camera},
        picking::AABB,
        scene::{DrawMode, Scene, POINT_LIGHT_COUNT},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::texture_resource::TextureResource;

const SHADOW_MAX_FOV: f32 = 120.0;
const SHADOW_NEAR: f32 = 0.05;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub view_proj: [[f32; 4]; 4],
    /// `w` is 1 when the light is on
    pub position: [f32; 4],
    /// Linear color times intensity; `w` is 1 when the light's shadow map is valid
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub lights: [LightUniform; POINT_LIGHT_COUNT],
    pub ambient: [f32; 4],
    pub fog_color: [f32; 4],
    /// mode, near, far, density
    pub fog: [f32; 4],
    /// width, height, shadow texel size, ground shadow opacity
    pub viewport: [f32; 4],
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Whether the mesh puts anything into the shadow maps.
pub fn mesh_casts_shadow(scene: &Scene) -> bool {
    let mesh = &scene.mesh;
    mesh.cast_shadow && mesh.is_shown() && mesh.mode == DrawMode::Solid && !mesh.geometry.is_empty()
}

/// Perspective frustum from `light` that encloses `bounds`. Only the mesh
/// casts shadows, so nothing outside this cone can be in shadow.
pub fn shadow_view_proj(light: Vector3<f32>, bounds: &AABB) -> Matrix4<f32> {
    let center = bounds.center();
    let radius = ((bounds.max - bounds.min).magnitude() * 0.5).max(1e-3);
    let offset = center - light;
    let distance = offset.magnitude();

    let fov = if distance <= radius {
        SHADOW_MAX_FOV
    } else {
        let half: Deg<f32> = Rad((radius / distance).asin()).into();
        (half.0 * 2.0 * 1.1).clamp(1.0, SHADOW_MAX_FOV)
    };
    let near = (distance - radius).max(SHADOW_NEAR);
    let far = (distance + radius).max(near + 1.0);

    let direction = if distance > 0.0 { offset / distance } else { -Vector3::unit_y() };
    let up = if direction.y.abs() > 0.99 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    let view = Matrix4::look_at_rh(Point3::from_vec(light), Point3::from_vec(light + direction), up);
    OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(fov), 1.0, near, far) * view
}

impl GlobalUBOContent {
    /// Packs the per-frame globals.
    ///
    /// # Arguments
    /// * `scene` - Camera, lights, ambient light, fog and ground
    /// * `viewport` - Viewport size in pixels, for point sizes
    /// * `shadow_map_size` - Shadow map resolution, for the PCF texel size
    pub fn new(scene: &Scene, viewport: (f32, f32), shadow_map_size: u32) -> Self {
        let camera = &scene.camera;
        let position = camera.position();
        let casts = mesh_casts_shadow(scene);
        let bounds = scene.mesh.world_bounds();

        let mut lights = [LightUniform::default(); POINT_LIGHT_COUNT];
        for (uniform, light) in lights.iter_mut().zip(&scene.point_lights) {
            if !light.enabled {
                continue;
            }
            let [r, g, b] = light.color.to_linear().map(|c| c * light.intensity);
            let shadowed = casts && light.casts_shadow();
            uniform.position = [light.position.x, light.position.y, light.position.z, 1.0];
            uniform.color = [r, g, b, if shadowed { 1.0 } else { 0.0 }];
            if shadowed {
                uniform.view_proj = shadow_view_proj(light.position, &bounds).into();
            }
        }

        let env = &scene.environment;
        let [ar, ag, ab] = scene.ambient.radiance();
        let [fr, fg, fb] = env.fog_color.to_linear();

        Self {
            view_proj: camera.build_view_projection_matrix().into(),
            camera_position: [position.x, position.y, position.z, 1.0],
            lights,
            ambient: [ar, ag, ab, 0.0],
            fog_color: [fr, fg, fb, 1.0],
            fog: [env.fog.index() as f32, env.fog_near, env.fog_far, env.fog_density],
            viewport: [
                viewport.0,
                viewport.1,
                1.0 / shadow_map_size.max(1) as f32,
                scene.ground.shadow_opacity,
            ],
        }
    }

    /// Indices of the lights whose shadow map layer is drawn this frame.
    pub fn shadow_layers(&self) -> impl Iterator<Item = usize> + '_ {
        self.lights
            .iter()
            .enumerate()
            .filter(|(_, l)| l.color[3] > 0.0)
            .map(|(i, _)| i)
    }
}

/// Group 0: globals, shadow maps and the shadow comparison sampler.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
        BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::shadow_maps())
            .next_binding_fragment(binding_types::shadow_sampler())
            .create(device, "Globals Bind Group Layout")
    }

    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO, shadow_map: &TextureResource) -> Self {
        let bind_group_layout = Self::layout(device);
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::gfx::geometry::GeometrySettings;
    use crate::gfx::resources::material::Material;
    use crate::gfx::scene::FogMode;
    use cgmath::{Vector4, Zero};

    fn scene() -> Scene {
        Scene::new(
            &EditorConfig::default(),
            1.0,
            GeometrySettings::default().build(),
            Material::default(),
        )
    }

    fn project(m: Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
        let clip = m * Vector4::new(p.x, p.y, p.z, 1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_disabled_lights_contribute_nothing() {
        let content = GlobalUBOContent::new(&scene(), (800.0, 600.0), 2048);
        assert_eq!(content.lights[0].position, [2.0, 3.0, 4.0, 1.0]);
        assert_eq!(content.lights[1].color, [0.0; 4]);
        assert_eq!(content.lights[2].position[3], 0.0);
    }

    #[test]
    fn test_shadows_need_a_casting_mesh() {
        let mut scene = scene();
        let content = GlobalUBOContent::new(&scene, (800.0, 600.0), 2048);
        assert_eq!(content.shadow_layers().count(), 0);

        scene.mesh.cast_shadow = true;
        scene.point_lights[2].enabled = true;
        let content = GlobalUBOContent::new(&scene, (800.0, 600.0), 2048);
        assert_eq!(content.shadow_layers().collect::<Vec<_>>(), vec![0, 2]);

        scene.mesh.visible = false;
        let content = GlobalUBOContent::new(&scene, (800.0, 600.0), 2048);
        assert_eq!(content.shadow_layers().count(), 0);
    }

    #[test]
    fn test_fog_and_viewport_packing() {
        let mut scene = scene();
        scene.environment.set_fog_mode(FogMode::Linear);
        scene.environment.fog_far = 20.0;
        let content = GlobalUBOContent::new(&scene, (640.0, 480.0), 1024);
        assert_eq!(content.fog, [1.0, 1.0, 20.0, scene.environment.fog_density]);
        assert_eq!(content.viewport, [640.0, 480.0, 1.0 / 1024.0, 0.2]);
    }

    #[test]
    fn test_shadow_frustum_encloses_bounds() {
        let bounds = AABB::new(Vector3::new(-1.2, -1.2, -0.2), Vector3::new(1.2, 1.2, 0.2));
        let light = Vector3::new(2.0, 3.0, 4.0);
        let m = shadow_view_proj(light, &bounds);

        let center = project(m, Vector3::zero());
        assert!(center.x.abs() < 1e-4 && center.y.abs() < 1e-4);
        for i in 0..8 {
            let corner = Vector3::new(
                if i & 1 == 0 { bounds.min.x } else { bounds.max.x },
                if i & 2 == 0 { bounds.min.y } else { bounds.max.y },
                if i & 4 == 0 { bounds.min.z } else { bounds.max.z },
            );
            let p = project(m, corner);
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0, "corner {i} outside: {p:?}");
            assert!((0.0..=1.0).contains(&p.z));
        }
    }

    #[test]
    fn test_shadow_frustum_from_straight_above() {
        let bounds = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let m = shadow_view_proj(Vector3::new(0.0, 10.0, 0.0), &bounds);
        let p = project(m, Vector3::zero());
        assert!(p.x.is_finite() && p.x.abs() < 1e-4);
    }
}
