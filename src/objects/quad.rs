//! Textured quads: the backdrop and the drifting sprite.

use super::GpuMesh;
use crate::core::{with_render_state, DrawUniforms, GraphicsDevice, RenderState, TextureHandle};
use crate::geometry::unit_quad;
use crate::math::Matrix4;
use crate::shader::{ShaderRegistry, ShaderVariant};

/// Texels with alpha below this are discarded when drawing a sprite.
pub const SPRITE_ALPHA_CUTOFF: f32 = 0.05;

/// How a [`Quad`] is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadMode {
    /// Full-screen background: depth test and depth write off.
    Backdrop,
    /// Depth-tested cut-out: near-transparent texels are discarded.
    Sprite,
}

impl QuadMode {
    fn render_state(self) -> RenderState {
        match self {
            Self::Backdrop => RenderState::BACKDROP,
            Self::Sprite => RenderState::OPAQUE,
        }
    }

    fn alpha_cutoff(self) -> f32 {
        match self {
            Self::Backdrop => 0.0,
            Self::Sprite => SPRITE_ALPHA_CUTOFF,
        }
    }
}

/// A unit quad with one texture.
#[derive(Debug)]
pub struct Quad {
    mesh: GpuMesh,
    texture: TextureHandle,
    mode: QuadMode,
    /// Model matrix.
    pub model: Matrix4,
}

impl Quad {
    /// Upload a quad. The quad takes ownership of `texture`.
    pub fn new(device: &mut dyn GraphicsDevice, texture: TextureHandle, mode: QuadMode) -> Self {
        Self {
            mesh: GpuMesh::upload(device, &unit_quad()),
            texture,
            mode,
            model: Matrix4::IDENTITY,
        }
    }

    /// Draw mode.
    #[inline]
    pub fn mode(&self) -> QuadMode {
        self.mode
    }

    /// Bound texture.
    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Draw with `view_projection`. The previous render state is restored.
    pub fn draw(&self, device: &mut dyn GraphicsDevice, shaders: &mut ShaderRegistry, view_projection: &Matrix4) -> bool {
        let uniforms =
            DrawUniforms::flat(*view_projection * self.model, self.model).with_alpha_cutoff(self.mode.alpha_cutoff());
        with_render_state(device, self.mode.render_state(), |device| {
            self.mesh
                .draw(device, shaders, ShaderVariant::Flat, self.texture, uniforms)
        })
    }

    /// Whether the buffers are live and the texture, if any, is live.
    pub fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        self.mesh.is_ready(device) && (!self.texture.is_valid() || device.is_texture(self.texture))
    }

    /// Delete the buffers and the texture.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.mesh.release(device);
        if self.texture.is_valid() {
            device.delete_texture(self.texture);
            self.texture = TextureHandle::NONE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessDevice;
    use crate::texture::Image;

    #[test]
    fn test_backdrop_disables_depth_and_restores() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let quad = Quad::new(&mut device, TextureHandle::NONE, QuadMode::Backdrop);

        device.begin_frame([0.0; 4]);
        assert!(quad.draw(&mut device, &mut shaders, &Matrix4::IDENTITY));
        let draw = device.draws()[0];
        assert!(!draw.state.depth_test);
        assert!(!draw.state.depth_write);
        assert_eq!(draw.uniforms.alpha_cutoff(), 0.0);
        assert_eq!(device.render_state(), RenderState::OPAQUE);
    }

    #[test]
    fn test_sprite_discards_transparent_texels() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let texture = device.upload_texture(&Image::solid(2, 2, [0, 0, 0, 0]));
        let mut quad = Quad::new(&mut device, texture, QuadMode::Sprite);
        quad.model = Matrix4::IDENTITY.translate(1.0, 2.0, -5.0);

        device.begin_frame([0.0; 4]);
        quad.draw(&mut device, &mut shaders, &Matrix4::IDENTITY);
        let draw = device.draws()[0];
        assert!(draw.state.depth_test);
        assert!(!draw.state.blend);
        assert_eq!(draw.uniforms.alpha_cutoff(), SPRITE_ALPHA_CUTOFF);
        assert_eq!(draw.texture, texture);
        assert_eq!(draw.uniforms.mvp, quad.model);
    }

    #[test]
    fn test_release_frees_texture() {
        let mut device = HeadlessDevice::new();
        let texture = device.upload_texture(&Image::solid(1, 1, [255; 4]));
        let mut quad = Quad::new(&mut device, texture, QuadMode::Sprite);
        assert!(quad.is_ready(&device));

        quad.release(&mut device);
        assert!(!quad.is_ready(&device));
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_buffers(), 0);
    }
}
