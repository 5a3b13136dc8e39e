//! GPU-resident 2D textures.

use super::{Image, Sampler};
use wgpu::util::DeviceExt;

/// A 2D texture together with the bind group that samples it.
pub struct GpuTexture {
    /// Texture width.
    width: u32,
    /// Texture height.
    height: u32,
    /// The GPU texture.
    texture: wgpu::Texture,
    /// Texture view.
    #[allow(dead_code)]
    view: wgpu::TextureView,
    /// Texture + sampler bind group.
    bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    /// Bind group layout: a filterable 2D texture at binding 0 and its
    /// sampler at binding 1.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Upload an RGBA8 image.
    /// Uses wgpu's create_texture_with_data which handles row alignment automatically.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &Image,
        layout: &wgpu::BindGroupLayout,
        sampler: &Sampler,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            image.pixels(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler.wgpu_sampler()),
                },
            ],
        });

        Self {
            width: image.width(),
            height: image.height(),
            texture,
            view,
            bind_group,
        }
    }

    /// Get texture width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get texture height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the bind group.
    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Free the GPU memory now rather than when the last reference drops.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}
