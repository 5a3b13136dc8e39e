//! The graphics device abstraction.
//!
//! Drawables never touch wgpu directly. They allocate programs, buffers and
//! textures through a [`GraphicsDevice`] and refer to them by handle. This
//! keeps handle validity checks and render-state changes explicit, and lets
//! the same scene code run against [`WgpuDevice`](super::WgpuDevice) or
//! [`HeadlessDevice`](super::HeadlessDevice).

use super::{BufferHandle, ProgramHandle, TextureHandle};
use crate::geometry::VertexLayout;
use crate::math::Matrix4;
use crate::shader::{ShaderError, ShaderVariant};
use crate::texture::Image;
use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Fixed-function state used for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    /// Compare fragments against the depth buffer.
    pub depth_test: bool,
    /// Write fragment depth.
    pub depth_write: bool,
    /// Alpha blend onto the color buffer.
    pub blend: bool,
}

impl RenderState {
    /// Depth tested and written, no blending.
    pub const OPAQUE: Self = Self {
        depth_test: true,
        depth_write: true,
        blend: false,
    };

    /// No depth interaction at all. Used for full-screen backdrops.
    pub const BACKDROP: Self = Self {
        depth_test: false,
        depth_write: false,
        blend: false,
    };

    /// Depth tested, not written, alpha blended.
    pub const TRANSLUCENT: Self = Self {
        depth_test: true,
        depth_write: false,
        blend: true,
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Per-draw uniform block. Layout matches the `Uniforms` struct in the WGSL
/// shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    /// Model-view-projection matrix.
    pub mvp: Matrix4,
    /// Model matrix.
    pub model: Matrix4,
    /// Light position in object space (`w = 1`).
    pub light_position: [f32; 4],
    /// Eye position in object space (`w = 1`).
    pub eye_position: [f32; 4],
    /// Color multiplier applied to the sampled texel.
    pub tint: [f32; 4],
    /// `x`: alpha cutoff below which fragments are discarded.
    pub params: [f32; 4],
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            mvp: Matrix4::IDENTITY,
            model: Matrix4::IDENTITY,
            light_position: [0.0, 0.0, 0.0, 1.0],
            eye_position: [0.0, 0.0, 0.0, 1.0],
            tint: [1.0; 4],
            params: [0.0; 4],
        }
    }
}

impl DrawUniforms {
    /// Uniforms for an unlit draw.
    pub fn flat(mvp: Matrix4, model: Matrix4) -> Self {
        Self {
            mvp,
            model,
            ..Default::default()
        }
    }

    /// Set the tint color.
    pub fn with_tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    /// Set the alpha cutoff.
    pub fn with_alpha_cutoff(mut self, cutoff: f32) -> Self {
        self.params[0] = cutoff;
        self
    }

    /// Alpha cutoff below which fragments are discarded.
    #[inline]
    pub fn alpha_cutoff(&self) -> f32 {
        self.params[0]
    }
}

/// A single indexed triangle-list draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    /// Program to draw with.
    pub program: ProgramHandle,
    /// Interleaved vertex buffer.
    pub vertex_buffer: BufferHandle,
    /// Layout of `vertex_buffer`.
    pub layout: VertexLayout,
    /// 16-bit index buffer.
    pub index_buffer: BufferHandle,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Texture bound to the sampler. [`TextureHandle::NONE`] samples white.
    pub texture: TextureHandle,
    /// Uniform values.
    pub uniforms: DrawUniforms,
}

/// Errors that can occur while presenting a frame.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The surface texture could not be acquired.
    #[error("Failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The underlying context was lost; every handle is now invalid.
    #[error("Graphics context lost")]
    ContextLost,
}

/// A GL-like graphics device addressed through integer handles.
///
/// Creation methods return [`ProgramHandle::NONE`]-style zero handles (or an
/// error for programs) instead of panicking, so callers can keep a failed
/// resource around and retry or skip it.
pub trait GraphicsDevice {
    /// Compile and link a program for `variant`.
    fn compile_program(&mut self, variant: ShaderVariant) -> Result<ProgramHandle, ShaderError>;

    /// Whether `program` names a live program.
    fn is_program(&self, program: ProgramHandle) -> bool;

    /// Delete a program. Unknown handles are ignored.
    fn delete_program(&mut self, program: ProgramHandle);

    /// Upload interleaved vertex data. Returns [`BufferHandle::NONE`] on failure.
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle;

    /// Upload 16-bit indices. Returns [`BufferHandle::NONE`] on failure.
    fn create_index_buffer(&mut self, data: &[u16]) -> BufferHandle;

    /// Whether `buffer` names a live buffer.
    fn is_buffer(&self, buffer: BufferHandle) -> bool;

    /// Delete a buffer. Unknown handles are ignored.
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Upload an RGBA8 image. Returns [`TextureHandle::NONE`] on failure.
    fn upload_texture(&mut self, image: &Image) -> TextureHandle;

    /// Whether `texture` names a live texture.
    fn is_texture(&self, texture: TextureHandle) -> bool;

    /// Delete a texture. Unknown handles are ignored.
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Set the drawable size in pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Current render state.
    fn render_state(&self) -> RenderState;

    /// Set the render state used by subsequent draws.
    fn set_render_state(&mut self, state: RenderState);

    /// Start a frame, clearing color and depth.
    fn begin_frame(&mut self, clear_color: [f32; 4]);

    /// Queue an indexed draw with the current render state.
    fn draw_indexed(&mut self, call: &DrawCall);

    /// Finish and present the frame.
    fn end_frame(&mut self) -> Result<(), FrameError>;
}

/// Run `f` with `state` applied, then restore the previous state.
pub fn with_render_state<R>(
    device: &mut dyn GraphicsDevice,
    state: RenderState,
    f: impl FnOnce(&mut dyn GraphicsDevice) -> R,
) -> R {
    let previous = device.render_state();
    device.set_render_state(state);
    let result = f(&mut *device);
    device.set_render_state(previous);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessDevice;

    #[test]
    fn test_uniform_block_size() {
        // Two mat4 plus four vec4, no padding.
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 192);
        assert_eq!(std::mem::offset_of!(DrawUniforms, light_position), 128);
    }

    #[test]
    fn test_with_render_state_restores() {
        let mut device = HeadlessDevice::new();
        assert_eq!(device.render_state(), RenderState::OPAQUE);

        let seen = with_render_state(&mut device, RenderState::TRANSLUCENT, |d| d.render_state());
        assert_eq!(seen, RenderState::TRANSLUCENT);
        assert_eq!(device.render_state(), RenderState::OPAQUE);
    }

    #[test]
    fn test_uniform_builders() {
        let u = DrawUniforms::flat(Matrix4::IDENTITY, Matrix4::IDENTITY)
            .with_tint([0.0, 1.0, 1.0, 0.3])
            .with_alpha_cutoff(0.05);
        assert_eq!(u.tint, [0.0, 1.0, 1.0, 0.3]);
        assert_eq!(u.alpha_cutoff(), 0.05);
    }
}
