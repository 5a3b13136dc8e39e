//! # Core Module
//!
//! The graphics device abstraction, its wgpu and headless implementations,
//! and wgpu context management.

mod context;
mod device;
mod handle;
mod headless;
mod wgpu_device;

pub use context::{Context, ContextError};
pub use device::{with_render_state, DrawCall, DrawUniforms, FrameError, GraphicsDevice, RenderState};
pub use handle::{BufferHandle, HandleAllocator, ProgramHandle, TextureHandle};
pub use headless::{layout_matches, textures_used, DrawRecord, HeadlessDevice, InjectedFailure, MAX_TEXTURE_SIZE};
pub use wgpu_device::WgpuDevice;

/// Surface configuration options.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
    /// Frames the presentation engine may queue.
    pub max_frame_latency: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            present_mode: wgpu::PresentMode::AutoVsync,
            max_frame_latency: 2,
        }
    }
}
