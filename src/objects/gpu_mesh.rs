//! Meshes uploaded to a device.

use crate::core::{BufferHandle, DrawCall, DrawUniforms, GraphicsDevice, TextureHandle};
use crate::geometry::{Mesh, VertexLayout};
use crate::shader::{ShaderRegistry, ShaderVariant};

/// Vertex and index buffers for one [`Mesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct GpuMesh {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
    layout: VertexLayout,
}

impl GpuMesh {
    /// Upload `mesh` in full. Either buffer may come back invalid; the mesh
    /// then never draws.
    pub fn upload(device: &mut dyn GraphicsDevice, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_vertex_buffer(mesh.vertices());
        let index_buffer = device.create_index_buffer(mesh.indices());
        if !vertex_buffer.is_valid() || !index_buffer.is_valid() {
            log::error!("Failed to upload mesh of {} vertices", mesh.vertex_count());
        }
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            layout: mesh.layout(),
        }
    }

    /// Number of indices drawn.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Vertex layout of the buffer.
    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Whether both buffers are still live.
    pub fn is_ready(&self, device: &dyn GraphicsDevice) -> bool {
        device.is_buffer(self.vertex_buffer) && device.is_buffer(self.index_buffer)
    }

    /// Draw with the `variant` program under the current render state.
    ///
    /// Returns `false` if the draw was skipped because the buffers are dead
    /// or the program could not be built.
    pub fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        shaders: &mut ShaderRegistry,
        variant: ShaderVariant,
        texture: TextureHandle,
        uniforms: DrawUniforms,
    ) -> bool {
        if !self.is_ready(device) {
            log::warn!("Skipping draw of a mesh with dead buffers");
            return false;
        }
        let Some(program) = shaders.program(device, variant) else {
            return false;
        };
        device.draw_indexed(&DrawCall {
            program,
            vertex_buffer: self.vertex_buffer,
            layout: self.layout,
            index_buffer: self.index_buffer,
            index_count: self.index_count,
            texture,
            uniforms,
        });
        true
    }

    /// Delete both buffers.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        device.delete_buffer(self.vertex_buffer);
        device.delete_buffer(self.index_buffer);
        self.vertex_buffer = BufferHandle::NONE;
        self.index_buffer = BufferHandle::NONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessDevice;
    use crate::geometry::unit_quad;

    #[test]
    fn test_upload_and_release() {
        let mut device = HeadlessDevice::new();
        let mut mesh = GpuMesh::upload(&mut device, &unit_quad());
        assert!(mesh.is_ready(&device));
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(device.live_buffers(), 2);

        mesh.release(&mut device);
        assert!(!mesh.is_ready(&device));
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_dead_mesh_does_not_draw() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let mut mesh = GpuMesh::upload(&mut device, &unit_quad());
        mesh.release(&mut device);

        device.begin_frame([0.0; 4]);
        let drawn = mesh.draw(
            &mut device,
            &mut shaders,
            ShaderVariant::Flat,
            TextureHandle::NONE,
            DrawUniforms::default(),
        );
        assert!(!drawn);
        assert!(device.draws().is_empty());
        // Skipped before touching the shaders.
        assert_eq!(device.compile_attempts(), 0);
    }
}
