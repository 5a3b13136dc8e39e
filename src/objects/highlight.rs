//! Translucent selection cube.

use super::GpuMesh;
use crate::core::{with_render_state, DrawUniforms, GraphicsDevice, RenderState, TextureHandle};
use crate::geometry::unit_cube;
use crate::math::Matrix4;
use crate::shader::{ShaderRegistry, ShaderVariant};

/// Highlight color of the sun.
pub const SUN_HIGHLIGHT: [f32; 4] = [1.0, 1.0, 0.0, 0.3];

/// Highlight color of planets and the moon.
pub const BODY_HIGHLIGHT: [f32; 4] = [0.0, 1.0, 1.0, 0.3];

/// A unit cube drawn as a tinted, blended box around the selected body.
#[derive(Debug)]
pub struct HighlightCube {
    mesh: GpuMesh,
}

impl HighlightCube {
    /// Upload the cube.
    pub fn new(device: &mut dyn GraphicsDevice) -> Self {
        Self {
            mesh: GpuMesh::upload(device, &unit_cube()),
        }
    }

    /// Draw at `model` tinted with `color`. Blending is on and depth write
    /// off for the draw; the previous render state is restored afterwards.
    pub fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        shaders: &mut ShaderRegistry,
        view_projection: &Matrix4,
        model: &Matrix4,
        color: [f32; 4],
    ) -> bool {
        let uniforms = DrawUniforms::flat(*view_projection * *model, *model).with_tint(color);
        with_render_state(device, RenderState::TRANSLUCENT, |device| {
            self.mesh
                .draw(device, shaders, ShaderVariant::Flat, TextureHandle::NONE, uniforms)
        })
    }

    /// Whether the buffers are live.
    pub fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        self.mesh.is_ready(device)
    }

    /// Delete the buffers.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.mesh.release(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessDevice;

    #[test]
    fn test_translucent_and_restored() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let cube = HighlightCube::new(&mut device);
        device.set_render_state(RenderState::BACKDROP);

        device.begin_frame([0.0; 4]);
        let model = Matrix4::IDENTITY.scale_uniform(0.9);
        assert!(cube.draw(&mut device, &mut shaders, &Matrix4::IDENTITY, &model, SUN_HIGHLIGHT));

        let draw = device.draws()[0];
        assert_eq!(draw.state, RenderState::TRANSLUCENT);
        assert!(draw.state.blend && draw.state.depth_test && !draw.state.depth_write);
        assert_eq!(draw.uniforms.tint, SUN_HIGHLIGHT);
        assert_eq!(draw.texture, TextureHandle::NONE);
        assert_eq!(draw.index_count, 36);
        assert_eq!(device.render_state(), RenderState::BACKDROP);
    }

    #[test]
    fn test_state_restored_even_when_skipped() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let mut cube = HighlightCube::new(&mut device);
        cube.release(&mut device);

        device.begin_frame([0.0; 4]);
        assert!(!cube.draw(&mut device, &mut shaders, &Matrix4::IDENTITY, &Matrix4::IDENTITY, BODY_HIGHLIGHT));
        assert_eq!(device.render_state(), RenderState::OPAQUE);
    }
}
