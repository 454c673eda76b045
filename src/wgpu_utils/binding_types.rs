//! Binding types for the editor's bind group layouts.
//!
//! Named after what they carry rather than the wgpu enum they wrap.

/// Plain uniform block with no dynamic offset.
pub fn uniform() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

/// A material's color map, or the shared white texture when it has none.
pub fn color_map() -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Float { filterable: true },
        view_dimension: wgpu::TextureViewDimension::D2,
        multisampled: false,
    }
}

/// Linear sampler paired with [`color_map`].
pub fn color_map_sampler() -> wgpu::BindingType {
    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
}

/// One shadow map layer per point light.
pub fn shadow_maps() -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Depth,
        view_dimension: wgpu::TextureViewDimension::D2Array,
        multisampled: false,
    }
}

/// Depth comparison sampler paired with [`shadow_maps`].
pub fn shadow_sampler() -> wgpu::BindingType {
    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_bindings_compare_depth() {
        assert!(matches!(
            shadow_maps(),
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                view_dimension: wgpu::TextureViewDimension::D2Array,
                ..
            }
        ));
        assert!(matches!(
            shadow_sampler(),
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        ));
    }

    #[test]
    fn test_color_map_is_filterable() {
        assert!(matches!(
            color_map(),
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            }
        ));
        assert!(matches!(
            color_map_sampler(),
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
        ));
    }
}
