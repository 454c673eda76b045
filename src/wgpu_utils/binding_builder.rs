//! Builders for bind group layouts and the bind groups that match them
//!
//! Bindings are numbered in the order they are added, so a layout and the
//! bind groups created from it stay in sync without spelling out indices.

/// A bind group layout together with the entries it was built from.
pub struct BindGroupLayoutWithDesc {
    pub layout: wgpu::BindGroupLayout,
    pub entries: Vec<wgpu::BindGroupLayoutEntry>,
}

/// Accumulates layout entries with consecutive binding indices.
#[derive(Default)]
pub struct BindGroupLayoutBuilder {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry at the next free binding index.
    ///
    /// # Arguments
    ///
    /// * `visibility` - Shader stages that may read the binding
    /// * `ty` - Binding type, usually one of the `binding_types` helpers
    pub fn next_binding(mut self, visibility: wgpu::ShaderStages, ty: wgpu::BindingType) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.entries.len() as u32,
            visibility,
            ty,
            count: None,
        });
        self
    }

    /// Binding visible to the vertex and fragment stages.
    pub fn next_binding_rendering(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::VERTEX_FRAGMENT, ty)
    }

    /// Appends a fragment-only entry.
    pub fn next_binding_fragment(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::FRAGMENT, ty)
    }

    /// Builds the layout and keeps its entries for later bind group checks.
    ///
    /// # Arguments
    ///
    /// * `device` - Device that owns the layout
    /// * `label` - Debug label
    ///
    /// # Returns
    ///
    /// The layout together with the entries it was built from
    pub fn create(self, device: &wgpu::Device, label: &str) -> BindGroupLayoutWithDesc {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &self.entries,
        });
        BindGroupLayoutWithDesc {
            layout,
            entries: self.entries,
        }
    }
}

/// Fills a bind group in layout order.
pub struct BindGroupBuilder<'a> {
    layout_with_desc: &'a BindGroupLayoutWithDesc,
    entries: Vec<wgpu::BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(layout_with_desc: &'a BindGroupLayoutWithDesc) -> Self {
        Self {
            layout_with_desc,
            entries: Vec::with_capacity(layout_with_desc.entries.len()),
        }
    }

    /// Binds the next entry to `resource`.
    ///
    /// # Panics
    ///
    /// When more resources are supplied than the layout declares.
    pub fn resource(mut self, resource: wgpu::BindingResource<'a>) -> Self {
        assert!(
            self.entries.len() < self.layout_with_desc.entries.len(),
            "more resources than the layout has bindings"
        );
        self.entries.push(wgpu::BindGroupEntry {
            binding: self.entries.len() as u32,
            resource,
        });
        self
    }

    pub fn texture(self, view: &'a wgpu::TextureView) -> Self {
        self.resource(wgpu::BindingResource::TextureView(view))
    }

    pub fn sampler(self, sampler: &'a wgpu::Sampler) -> Self {
        self.resource(wgpu::BindingResource::Sampler(sampler))
    }

    /// Creates the bind group from the resources supplied so far.
    ///
    /// # Arguments
    ///
    /// * `device` - Device that owns the group
    /// * `label` - Debug label
    pub fn create(self, device: &wgpu::Device, label: &str) -> wgpu::BindGroup {
        assert_eq!(
            self.entries.len(),
            self.layout_with_desc.entries.len(),
            "bind group '{label}' does not fill every binding of its layout"
        );
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout_with_desc.layout,
            entries: &self.entries,
        })
    }
}
