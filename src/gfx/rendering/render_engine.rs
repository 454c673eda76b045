//! WGPU-based rendering engine for the editor viewport
//!
//! Owns the surface, device and every GPU resource of the scene. A frame is
//! a shadow pass per shadow-casting light (skipped while cached), the main
//! pass for the grid, ground, mesh and helpers, and finally the UI overlay.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use wgpu::{Device, TextureFormat};

use crate::{
    config::RenderConfig,
    gfx::{
        resources::{
            global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent},
            object_bindings::{object_layout, ObjectBindings, ObjectUniformContent},
            texture_resource::TextureResource,
        },
        scene::{LineVertex, MeshVertex, Scene, POINT_LIGHT_COUNT},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::gpu_mesh::{GpuLines, GpuMesh, RenderPassExt};
use super::mesh_pipeline::{MeshDraw, MeshPipelineKey};
use super::pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager};
use super::shadow_cache::{ShadowCache, ShadowKey};

const COMMON_SHADER: &str = include_str!("shaders/common.wgsl");

const LINES_PIPELINE: &str = "Lines";
const OVERLAY_PIPELINE: &str = "Gizmo Overlay";
const SHADOW_PIPELINE: &str = "Shadow";

/// Light view-projection used while rendering one shadow layer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct ShadowPassContent {
    view_proj: [[f32; 4]; 4],
}

struct ShadowPass {
    ubo: UniformBuffer<ShadowPassContent>,
    bind_group: wgpu::BindGroup,
    target: wgpu::TextureView,
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    white_texture: TextureResource,

    // Shadow mapping resources
    shadow_map_size: u32,
    _shadow_map: TextureResource,
    shadow_passes: Vec<ShadowPass>,
    shadow_cache: ShadowCache,

    mesh_bindings: ObjectBindings,
    mesh_buffers: Option<GpuMesh>,
    ground_bindings: ObjectBindings,
    ground_buffers: GpuMesh,
    grid_lines: Option<GpuLines>,
}

impl RenderEngine {
    /// Creates the surface, device and all static resources for `window`.
    ///
    /// The scene is needed for the buffers that never change, such as the
    /// grid and the ground plane.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        render_config: &RenderConfig,
        scene: &Scene,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to request a device")?;

        // Colors are encoded in the shaders, so prefer a linear surface
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("the surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(render_config.vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let shadow_map_size = render_config.shadow_map_size.clamp(256, 4096);
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_map_size, POINT_LIGHT_COUNT as u32);

        let global_ubo = GlobalUBO::new(&device, "Global");
        let global_bindings = GlobalBindings::new(&device, &global_ubo, &shadow_map);
        let object_layout = object_layout(&device);
        let white_texture = TextureResource::create_white(&device, &queue);

        let shadow_pass_layout = BindGroupLayoutBuilder::new()
            .next_binding(wgpu::ShaderStages::VERTEX, binding_types::uniform())
            .create(&device, "Shadow Pass Layout");
        let shadow_passes = (0..POINT_LIGHT_COUNT as u32)
            .map(|layer| {
                let ubo = UniformBuffer::<ShadowPassContent>::new(&device, "Shadow Pass");
                let bind_group = BindGroupBuilder::new(&shadow_pass_layout)
                    .resource(ubo.binding_resource())
                    .create(&device, "Shadow Pass Bind Group");
                ShadowPass {
                    ubo,
                    bind_group,
                    target: shadow_map.layer_view(layer),
                }
            })
            .collect();

        let mesh_bindings = ObjectBindings::new(&device, &object_layout, &white_texture, "Mesh");
        let ground_bindings = ObjectBindings::new(&device, &object_layout, &white_texture, "Ground");
        let ground_buffers = GpuMesh::new(&device, &scene.ground.geometry, "Ground");
        let grid_lines = GpuLines::new(&device, "Grid", &scene.grid.lines());

        // Wrap device and queue in Arc for pipeline manager
        let device: Arc<Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("mesh", &[COMMON_SHADER, include_str!("shaders/mesh.wgsl")].concat());
        pipeline_manager.load_shader("points", &[COMMON_SHADER, include_str!("shaders/points.wgsl")].concat());
        pipeline_manager.load_shader("lines", &[COMMON_SHADER, include_str!("shaders/lines.wgsl")].concat());
        pipeline_manager.load_shader("shadow", include_str!("shaders/shadow.wgsl"));

        let globals_layout = global_bindings.bind_group_layout().clone();
        let line_config = PipelineConfig::default()
            .with_shader("lines")
            .with_bind_group_layouts(vec![globals_layout.clone()])
            .with_vertex_layouts(vec![LineVertex::desc()])
            .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
            .with_cull_mode(None)
            .with_color_target(format, true);

        pipeline_manager.register_pipeline(
            LINES_PIPELINE,
            line_config
                .clone()
                .with_label(LINES_PIPELINE)
                .with_depth(DepthConfig::new(TextureResource::DEPTH_FORMAT)),
        );

        // The gizmo is drawn over everything else
        pipeline_manager.register_pipeline(
            OVERLAY_PIPELINE,
            line_config
                .with_label(OVERLAY_PIPELINE)
                .with_entry_points("vs_main", "fs_overlay")
                .with_depth(DepthConfig::new(TextureResource::DEPTH_FORMAT).with_flags(false, false)),
        );

        // No culling so both faces cast
        let shadow_depth = DepthConfig {
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
            ..DepthConfig::new(TextureResource::DEPTH_FORMAT)
        };
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label(SHADOW_PIPELINE)
                .with_shader("shadow")
                .with_bind_group_layouts(vec![shadow_pass_layout.layout.clone(), object_layout.layout.clone()])
                .with_vertex_layouts(vec![MeshVertex::desc()])
                .with_cull_mode(None)
                .with_depth(shadow_depth)
                .with_vertex_only(),
        );

        for name in [LINES_PIPELINE, OVERLAY_PIPELINE, SHADOW_PIPELINE] {
            if !pipeline_manager.prepare(name, PipelineConfig::default) {
                warn!("Pipeline '{name}' is unavailable");
            }
        }

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_layout,
            white_texture,
            shadow_map_size,
            _shadow_map: shadow_map,
            shadow_passes,
            shadow_cache: ShadowCache::new(),
            mesh_bindings,
            mesh_buffers: None,
            ground_bindings,
            ground_buffers,
            grid_lines,
        })
    }

    /// Creates the pipeline for `key` on first use and returns its name.
    fn prepare_mesh_pipeline(&mut self, key: MeshPipelineKey) -> String {
        let name = key.name();
        let format = self.format;
        let layouts = vec![
            self.global_bindings.bind_group_layout().clone(),
            self.object_layout.layout.clone(),
        ];
        self.pipeline_manager.prepare(&name, || key.config(format, layouts));
        name
    }

    /// Uploads everything the frame reads: globals, object uniforms, the
    /// mesh buffers when the geometry changed.
    fn upload(&mut self, scene: &Scene) -> GlobalUBOContent {
        let globals = GlobalUBOContent::new(
            scene,
            (self.config.width as f32, self.config.height as f32),
            self.shadow_map_size,
        );
        self.global_ubo.update_content(&self.queue, globals);

        if !self.mesh_buffers.as_ref().is_some_and(|b| b.matches(&scene.mesh)) {
            debug!("Uploading mesh {} (revision {})", scene.mesh.id, scene.mesh.geometry_revision);
            self.mesh_buffers = Some(GpuMesh::for_mesh(&self.device, &scene.mesh));
        }

        self.mesh_bindings.update(
            &self.device,
            &self.queue,
            &self.object_layout,
            &self.white_texture,
            ObjectUniformContent::for_mesh(&scene.mesh),
            Some(&scene.mesh.material),
        );
        self.ground_bindings.update(
            &self.device,
            &self.queue,
            &self.object_layout,
            &self.white_texture,
            ObjectUniformContent::for_ground(&scene.ground),
            None,
        );

        globals
    }

    fn render_shadows(&mut self, encoder: &mut wgpu::CommandEncoder, key: ShadowKey, globals: &GlobalUBOContent) {
        if !self.shadow_cache.needs_update(&key) {
            return;
        }
        let (Some(pipeline), Some(buffers)) = (self.pipeline_manager.get(SHADOW_PIPELINE), &self.mesh_buffers)
        else {
            return;
        };
        debug!("Rendering shadow maps for lights {:?}", key.layers().collect::<Vec<_>>());

        for layer in key.layers() {
            let pass = &mut self.shadow_passes[layer];
            pass.ubo.update_content(
                &self.queue,
                ShadowPassContent {
                    view_proj: globals.lights[layer].view_proj,
                },
            );

            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &pass.target,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(pipeline);
            shadow_pass.set_bind_group(0, &pass.bind_group, &[]);
            shadow_pass.set_bind_group(1, self.mesh_bindings.bind_group(), &[]);
            shadow_pass.draw_triangles(buffers);
        }

        self.shadow_cache.mark_valid(key);
    }

    /// Renders one frame.
    ///
    /// `overlay` holds the gizmo lines, drawn last without depth testing.
    /// `ui_callback` records the UI into the same encoder on top of the scene.
    pub fn render_frame<F>(&mut self, scene: &Scene, overlay: &[LineVertex], ui_callback: F) -> Result<()>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring the next frame");
                return Ok(());
            }
            Err(e) => return Err(anyhow!("failed to acquire the next frame: {e}")),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let globals = self.upload(scene);
        let mesh_key = MeshPipelineKey::for_mesh(&scene.mesh);
        let mesh_pipeline = self.prepare_mesh_pipeline(mesh_key);
        let ground_pipeline = self.prepare_mesh_pipeline(MeshPipelineKey::ground());

        // PASS 1: shadow maps, only when something they depend on moved
        self.render_shadows(&mut encoder, ShadowKey::new(scene, &globals), &globals);

        // Per-frame line batches must outlive the pass
        let box_lines = scene
            .box_helper_lines()
            .and_then(|lines| GpuLines::new(&self.device, "Box Helper", &lines));
        let light_lines = GpuLines::new(&self.device, "Light Helpers", &scene.light_helper_lines());
        let gizmo_lines = GpuLines::new(&self.device, "Gizmo", overlay);

        // PASS 2: the scene
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.environment.clear_value()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(lines) = self.pipeline_manager.get(LINES_PIPELINE) {
                render_pass.set_pipeline(lines);
                if let Some(grid) = &self.grid_lines {
                    render_pass.draw_lines(grid);
                }
            }

            if let Some(ground) = self.pipeline_manager.get(&ground_pipeline) {
                render_pass.set_pipeline(ground);
                render_pass.set_bind_group(1, self.ground_bindings.bind_group(), &[]);
                render_pass.draw_triangles(&self.ground_buffers);
            }

            if scene.mesh.is_shown() {
                if let (Some(pipeline), Some(buffers)) =
                    (self.pipeline_manager.get(&mesh_pipeline), &self.mesh_buffers)
                {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, self.mesh_bindings.bind_group(), &[]);
                    match mesh_key.draw {
                        MeshDraw::Triangles => render_pass.draw_triangles(buffers),
                        MeshDraw::Edges => render_pass.draw_edges(buffers),
                        MeshDraw::Sprites => render_pass.draw_point_sprites(buffers),
                    }
                }
            }

            if let Some(lines) = self.pipeline_manager.get(LINES_PIPELINE) {
                render_pass.set_pipeline(lines);
                for helper in [&box_lines, &light_lines].into_iter().flatten() {
                    render_pass.draw_lines(helper);
                }
            }

            if let (Some(overlay), Some(gizmo)) = (self.pipeline_manager.get(OVERLAY_PIPELINE), &gizmo_lines) {
                render_pass.set_pipeline(overlay);
                render_pass.draw_lines(gizmo);
            }
        }

        // PASS 3: UI overlay
        ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and the depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
