//! Texture sampler configuration.

/// Texture addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Clamp to edge pixel.
    #[default]
    ClampToEdge,
    /// Repeat the texture.
    Repeat,
}

impl From<AddressMode> for wgpu::AddressMode {
    fn from(mode: AddressMode) -> Self {
        match mode {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Nearest neighbor (pixelated).
    Nearest,
    /// Linear interpolation (smooth).
    #[default]
    Linear,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Sampler configuration descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDescriptor {
    /// Address mode for U coordinate.
    pub address_mode_u: AddressMode,
    /// Address mode for V coordinate.
    pub address_mode_v: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
        }
    }
}

impl SamplerDescriptor {
    /// Linear filtering, wrapping horizontally so sphere seams line up.
    pub fn body() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            ..Default::default()
        }
    }
}

/// A GPU texture sampler.
pub struct Sampler {
    /// The wgpu sampler.
    sampler: wgpu::Sampler,
}

impl Sampler {
    /// Create a new sampler from a descriptor.
    pub fn new(device: &wgpu::Device, desc: &SamplerDescriptor) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: desc.address_mode_u.into(),
            address_mode_v: desc.address_mode_v.into(),
            mag_filter: desc.mag_filter.into(),
            min_filter: desc.min_filter.into(),
            ..Default::default()
        });

        Self { sampler }
    }

    /// The sampler every body texture uses.
    pub fn linear(device: &wgpu::Device) -> Self {
        Self::new(device, &SamplerDescriptor::body())
    }

    /// Get the underlying wgpu sampler.
    #[inline]
    pub fn wgpu_sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
