//! Textured spheres for the sun, planets and moon.

use super::GpuMesh;
use crate::core::{DrawUniforms, GraphicsDevice, TextureHandle};
use crate::geometry::SphereGeometry;
use crate::math::{Matrix4, Vector3};
use crate::shader::{ShaderRegistry, ShaderVariant};

/// Light position used when the model matrix cannot be inverted.
pub const FALLBACK_LIGHT: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 5.0 };

/// World-space inputs of the Phong path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Light position.
    pub light_position: Vector3,
    /// Camera position.
    pub eye_position: Vector3,
    /// Object-space light position used when the model is singular.
    pub fallback_light: Vector3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            light_position: Vector3::new(5.0, 5.0, 5.0),
            eye_position: Vector3::new(0.0, 3.0, 8.0),
            fallback_light: FALLBACK_LIGHT,
        }
    }
}

impl Lighting {
    /// Light and eye positions in the object space of `model`, as `w = 1`
    /// homogeneous points. Falls back to [`Lighting::fallback_light`] and the
    /// untransformed eye if `model` is singular.
    pub fn object_space(&self, model: &Matrix4) -> ([f32; 4], [f32; 4]) {
        let Some(inverse) = model.try_inverse() else {
            log::debug!("Singular model matrix, using fallback light");
            let light = self.fallback_light;
            let eye = self.eye_position;
            return ([light.x, light.y, light.z, 1.0], [eye.x, eye.y, eye.z, 1.0]);
        };
        let light = inverse.transform_point(&self.light_position);
        let eye = inverse.transform_point(&self.eye_position);
        ([light.x, light.y, light.z, 1.0], [eye.x, eye.y, eye.z, 1.0])
    }
}

/// A unit sphere mesh drawn at `model · scale(radius)`.
#[derive(Debug)]
pub struct SphereBody {
    mesh: GpuMesh,
    texture: TextureHandle,
    radius: f32,
    variant: ShaderVariant,
    /// Unscaled model matrix, rewritten every frame.
    pub model: Matrix4,
}

impl SphereBody {
    /// Upload a sphere of `radius`. The body takes ownership of `texture`.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        texture: TextureHandle,
        radius: f32,
        variant: ShaderVariant,
        stacks: u32,
        slices: u32,
    ) -> Self {
        let include_normals = variant.vertex_layout().has_normals();
        let mesh = SphereGeometry::new(1.0, stacks, slices).build(include_normals);
        Self {
            mesh: GpuMesh::upload(device, &mesh),
            texture,
            radius,
            variant,
            model: Matrix4::IDENTITY,
        }
    }

    /// Radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Shading variant.
    #[inline]
    pub fn variant(&self) -> ShaderVariant {
        self.variant
    }

    /// Bound texture.
    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// `model · scale(radius)`.
    #[inline]
    pub fn final_model(&self) -> Matrix4 {
        self.model.scale_uniform(self.radius)
    }

    /// Draw under the current render state.
    pub fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        shaders: &mut ShaderRegistry,
        view_projection: &Matrix4,
        lighting: &Lighting,
    ) -> bool {
        let model = self.final_model();
        let mut uniforms = DrawUniforms::flat(*view_projection * model, model);
        if self.variant == ShaderVariant::Phong {
            let (light, eye) = lighting.object_space(&model);
            uniforms.light_position = light;
            uniforms.eye_position = eye;
        }
        self.mesh
            .draw(device, shaders, self.variant, self.texture, uniforms)
    }

    /// Whether the buffers and texture are live.
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

    #[test]
    fn test_final_model_applies_radius_last() {
        let mut device = HeadlessDevice::new();
        let mut body = SphereBody::new(&mut device, TextureHandle::NONE, 0.5, ShaderVariant::Flat, 8, 8);
        body.model = Matrix4::IDENTITY.translate(2.0, 0.0, 0.0);

        let p = body.final_model().transform_point(&Vector3::UNIT_X);
        assert!(p.approx_eq(&Vector3::new(2.5, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_phong_gets_object_space_light() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let mut body = SphereBody::new(&mut device, TextureHandle::NONE, 2.0, ShaderVariant::Phong, 8, 8);
        body.model = Matrix4::IDENTITY.translate(1.0, 0.0, 0.0);
        let lighting = Lighting {
            light_position: Vector3::new(5.0, 5.0, 5.0),
            ..Default::default()
        };

        device.begin_frame([0.0; 4]);
        assert!(body.draw(&mut device, &mut shaders, &Matrix4::IDENTITY, &lighting));
        let draw = device.draws()[0];
        assert_eq!(draw.variant, ShaderVariant::Phong);
        // (5,5,5) minus the translation, divided by the radius.
        let light = draw.uniforms.light_position;
        assert!((light[0] - 2.0).abs() < 1e-5);
        assert!((light[1] - 2.5).abs() < 1e-5);
        assert!((light[2] - 2.5).abs() < 1e-5);
        assert_eq!(light[3], 1.0);
    }

    #[test]
    fn test_singular_model_uses_fallback_light() {
        let lighting = Lighting::default();
        let (light, _) = lighting.object_space(&Matrix4::IDENTITY.scale_uniform(0.0));
        assert_eq!(light, [0.0, 0.0, 5.0, 1.0]);
    }

    #[test]
    fn test_singular_phong_draw_still_happens() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let body = SphereBody::new(&mut device, TextureHandle::NONE, 0.0, ShaderVariant::Phong, 4, 4);

        device.begin_frame([0.0; 4]);
        assert!(body.draw(&mut device, &mut shaders, &Matrix4::IDENTITY, &Lighting::default()));
        assert_eq!(device.draws()[0].uniforms.light_position, [0.0, 0.0, 5.0, 1.0]);
    }

    #[test]
    fn test_flat_sphere_uploads_textured_layout() {
        let mut device = HeadlessDevice::new();
        let mut shaders = ShaderRegistry::new();
        let body = SphereBody::new(&mut device, TextureHandle::NONE, 1.0, ShaderVariant::Flat, 6, 6);

        device.begin_frame([0.0; 4]);
        assert!(body.draw(&mut device, &mut shaders, &Matrix4::IDENTITY, &Lighting::default()));
        assert_eq!(device.draws()[0].index_count, 6 * 6 * 6);
        assert_eq!(device.rejected_draws(), 0);
    }
}
