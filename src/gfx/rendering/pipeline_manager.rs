//! Render pipeline management system for wgpu
//!
//! Pipelines are registered by name and created lazily on first use. Every
//! combination of material state the editor can reach (cull side, blending,
//! depth flags, topology) is its own named pipeline.

use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use log::{debug, error};
use wgpu::*;

/// Depth attachment state of a pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConfig {
    pub format: TextureFormat,
    pub write: bool,
    pub compare: CompareFunction,
    pub bias: DepthBiasState,
}

impl DepthConfig {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            write: true,
            compare: CompareFunction::Less,
            bias: DepthBiasState::default(),
        }
    }

    /// Depth flags of a material: a disabled test always passes.
    pub fn with_flags(mut self, test: bool, write: bool) -> Self {
        self.write = write;
        self.compare = if test { CompareFunction::LessEqual } else { CompareFunction::Always };
        self
    }
}

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub vertex_layouts: Vec<VertexBufferLayout<'static>>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth: Option<DepthConfig>,
    pub color_targets: Vec<Option<ColorTargetState>>,
    pub vertex_only: bool, // for the shadow pass
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "mesh".to_string(),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            bind_group_layouts: Vec::new(),
            vertex_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth: None,
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            vertex_only: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_string();
        self
    }

    pub fn with_entry_points(mut self, vertex: &'static str, fragment: &'static str) -> Self {
        self.vertex_entry = vertex;
        self.fragment_entry = fragment;
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_vertex_layouts(mut self, layouts: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_layouts = layouts;
        self
    }

    pub fn with_primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_depth(mut self, depth: DepthConfig) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Single color target in `format`, alpha blended when `blend` is set.
    pub fn with_color_target(mut self, format: TextureFormat, blend: bool) -> Self {
        self.color_targets = vec![Some(ColorTargetState {
            format,
            blend: Some(if blend {
                BlendState::ALPHA_BLENDING
            } else {
                BlendState::REPLACE
            }),
            write_mask: ColorWrites::ALL,
        })];
        self
    }

    pub fn with_vertex_only(mut self) -> Self {
        self.vertex_only = true;
        self.color_targets = Vec::new();
        self
    }
}

/// Manages render pipelines with caching and lazy creation
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
}

impl PipelineManager {
    /// Creates a new pipeline manager
    ///
    /// # Arguments
    /// * `device` - WGPU device shared with the render engine
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
        }
    }

    /// Compiles a WGSL shader and stores it under `name`
    ///
    /// Pipeline configs refer to shaders by this name. Loading a name again
    /// replaces the module; pipelines created from the old one are kept.
    ///
    /// # Arguments
    /// * `name` - Name used by [`PipelineConfig::with_shader`]
    /// * `source` - Complete WGSL source
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shader_modules.insert(name.to_string(), shader_module);
    }

    /// Registers a pipeline configuration without creating it
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
    }

    /// Whether a configuration is registered under `name`
    pub fn has_pipeline(&self, name: &str) -> bool {
        self.pipeline_configs.contains_key(name)
    }

    /// Registers `name` from `config` unless it already exists, then makes
    /// sure it is created.
    ///
    /// # Arguments
    /// * `name` - Pipeline name, usually derived from the state it encodes
    /// * `config` - Called only when `name` is not registered yet
    ///
    /// # Returns
    /// False if creation failed; the error is logged
    pub fn prepare(&mut self, name: &str, config: impl FnOnce() -> PipelineConfig) -> bool {
        if !self.has_pipeline(name) {
            self.register_pipeline(name, config());
        }
        if self.pipelines.contains_key(name) {
            return true;
        }

        let Some(config) = self.pipeline_configs.get(name) else {
            return false;
        };
        match self.create_pipeline_from_config(name, config) {
            Ok(pipeline) => {
                debug!("Created pipeline '{name}'");
                self.pipelines.insert(name.to_string(), pipeline);
                true
            }
            Err(e) => {
                error!("Failed to create pipeline '{name}': {e}");
                false
            }
        }
    }

    /// A pipeline created earlier by [`PipelineManager::prepare`].
    pub fn get(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    fn create_pipeline_from_config(&self, name: &str, config: &PipelineConfig) -> Result<RenderPipeline> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| anyhow!("shader '{}' not loaded", config.shader))?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let pipeline_layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", name)),
            bind_group_layouts: &bind_group_layout_refs,
            push_constant_ranges: &[],
        });

        let fragment_state = if config.vertex_only {
            None
        } else {
            Some(FragmentState {
                module: shader,
                entry_point: Some(config.fragment_entry),
                targets: &config.color_targets,
                compilation_options: PipelineCompilationOptions::default(),
            })
        };

        let depth_stencil = config.depth.map(|depth| DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write,
            depth_compare: depth.compare,
            stencil: StencilState::default(),
            bias: depth.bias,
        });

        Ok(self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some(config.vertex_entry),
                buffers: &config.vertex_layouts,
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: fragment_state,
            primitive: PrimitiveState {
                topology: config.primitive_topology,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: config.cull_mode,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }
}
