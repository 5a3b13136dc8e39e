//! A device that records instead of rendering.
//!
//! [`HeadlessDevice`] keeps the same handle bookkeeping as a real device and
//! records every accepted draw, which makes it suitable for tests and for
//! running scenes without a window.

use super::device::{DrawCall, DrawUniforms, FrameError, GraphicsDevice, RenderState};
use super::handle::{BufferHandle, HandleAllocator, ProgramHandle, TextureHandle};
use crate::geometry::VertexLayout;
use crate::shader::{ShaderError, ShaderVariant};
use crate::texture::Image;
use std::collections::{HashMap, HashSet};

/// Largest texture edge accepted by [`HeadlessDevice::upload_texture`].
pub const MAX_TEXTURE_SIZE: u32 = 8192;

/// A draw accepted by a [`HeadlessDevice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    /// Program used.
    pub program: ProgramHandle,
    /// Variant the program was compiled from.
    pub variant: ShaderVariant,
    /// Bound texture.
    pub texture: TextureHandle,
    /// Index count.
    pub index_count: u32,
    /// Uniform values.
    pub uniforms: DrawUniforms,
    /// Render state at the time of the draw.
    pub state: RenderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferKind {
    Vertex,
    Index,
}

/// Failure injected into program compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Shader stage compilation fails.
    Compile,
    /// Program linking fails.
    Link,
}

/// Records draws and tracks handle lifetimes without a GPU.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    handles: HandleAllocator,
    programs: HashMap<ProgramHandle, ShaderVariant>,
    buffers: HashMap<BufferHandle, BufferKind>,
    textures: HashMap<TextureHandle, (u32, u32)>,
    failures: HashMap<ShaderVariant, InjectedFailure>,
    state: RenderState,
    viewport: (u32, u32),
    frame_open: bool,
    clear_color: [f32; 4],
    frame: Vec<DrawRecord>,
    last_frame: Vec<DrawRecord>,
    frames: u64,
    compile_attempts: u32,
    rejected_draws: u32,
    lost_pending: bool,
}

impl HeadlessDevice {
    /// Create an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future compile of `variant` fail, or clear the failure.
    pub fn fail_program(&mut self, variant: ShaderVariant, failure: Option<InjectedFailure>) {
        match failure {
            Some(failure) => {
                self.failures.insert(variant, failure);
            }
            None => {
                self.failures.remove(&variant);
            }
        }
    }

    /// Simulate losing the context: every live handle becomes invalid and the
    /// next [`GraphicsDevice::end_frame`] reports [`FrameError::ContextLost`].
    pub fn lose_context(&mut self) {
        log::warn!("Headless context lost");
        self.programs.clear();
        self.buffers.clear();
        self.textures.clear();
        self.lost_pending = true;
    }

    /// Draws recorded since the last `begin_frame`.
    #[inline]
    pub fn draws(&self) -> &[DrawRecord] {
        &self.frame
    }

    /// Draws of the last finished frame.
    #[inline]
    pub fn last_frame(&self) -> &[DrawRecord] {
        &self.last_frame
    }

    /// Number of finished frames.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Clear color passed to the last `begin_frame`.
    #[inline]
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Current viewport size.
    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Number of live programs.
    #[inline]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of live buffers.
    #[inline]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live textures.
    #[inline]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of `compile_program` calls so far.
    #[inline]
    pub fn compile_attempts(&self) -> u32 {
        self.compile_attempts
    }

    /// Number of draws dropped because a handle was dead or mismatched.
    #[inline]
    pub fn rejected_draws(&self) -> u32 {
        self.rejected_draws
    }

    /// Size of a live texture.
    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    fn is_buffer_kind(&self, buffer: BufferHandle, kind: BufferKind) -> bool {
        self.buffers.get(&buffer) == Some(&kind)
    }

    fn validate(&self, call: &DrawCall) -> Result<ShaderVariant, String> {
        let variant = *self
            .programs
            .get(&call.program)
            .ok_or_else(|| format!("program {} is not live", call.program))?;
        if !self.is_buffer_kind(call.vertex_buffer, BufferKind::Vertex) {
            return Err(format!("vertex buffer {} is not live", call.vertex_buffer));
        }
        if !self.is_buffer_kind(call.index_buffer, BufferKind::Index) {
            return Err(format!("index buffer {} is not live", call.index_buffer));
        }
        if call.layout != variant.vertex_layout() {
            return Err(format!("{:?} vertices do not match the {variant} program", call.layout));
        }
        Ok(variant)
    }

    fn allocate_buffer(&mut self, len: usize, kind: BufferKind) -> BufferHandle {
        if len == 0 {
            log::warn!("Refusing to create an empty {kind:?} buffer");
            return BufferHandle::NONE;
        }
        let handle = BufferHandle::from_raw(self.handles.next());
        self.buffers.insert(handle, kind);
        handle
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn compile_program(&mut self, variant: ShaderVariant) -> Result<ProgramHandle, ShaderError> {
        self.compile_attempts += 1;
        match self.failures.get(&variant) {
            Some(InjectedFailure::Compile) => Err(ShaderError::Compile {
                variant,
                log: "injected compile failure".into(),
            }),
            Some(InjectedFailure::Link) => Err(ShaderError::Link {
                variant,
                log: "injected link failure".into(),
            }),
            None => {
                let handle = ProgramHandle::from_raw(self.handles.next());
                self.programs.insert(handle, variant);
                Ok(handle)
            }
        }
    }

    fn is_program(&self, program: ProgramHandle) -> bool {
        self.programs.contains_key(&program)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
    }

    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle {
        self.allocate_buffer(data.len(), BufferKind::Vertex)
    }

    fn create_index_buffer(&mut self, data: &[u16]) -> BufferHandle {
        self.allocate_buffer(data.len(), BufferKind::Index)
    }

    fn is_buffer(&self, buffer: BufferHandle) -> bool {
        self.buffers.contains_key(&buffer)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
    }

    fn upload_texture(&mut self, image: &Image) -> TextureHandle {
        if !image.is_well_formed() {
            log::warn!("Rejecting malformed {}x{} image", image.width(), image.height());
            return TextureHandle::NONE;
        }
        if image.width() > MAX_TEXTURE_SIZE || image.height() > MAX_TEXTURE_SIZE {
            log::warn!(
                "Rejecting {}x{} image, larger than {MAX_TEXTURE_SIZE}",
                image.width(),
                image.height()
            );
            return TextureHandle::NONE;
        }
        let handle = TextureHandle::from_raw(self.handles.next());
        self.textures.insert(handle, (image.width(), image.height()));
        handle
    }

    fn is_texture(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(&texture)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn render_state(&self) -> RenderState {
        self.state
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
        self.frame.clear();
        self.frame_open = true;
    }

    fn draw_indexed(&mut self, call: &DrawCall) {
        if !self.frame_open {
            log::warn!("draw_indexed outside of a frame");
            self.rejected_draws += 1;
            return;
        }
        match self.validate(call) {
            Ok(variant) => {
                let texture = if self.is_texture(call.texture) {
                    call.texture
                } else {
                    TextureHandle::NONE
                };
                self.frame.push(DrawRecord {
                    program: call.program,
                    variant,
                    texture,
                    index_count: call.index_count,
                    uniforms: call.uniforms,
                    state: self.state,
                });
            }
            Err(reason) => {
                log::warn!("Skipping draw: {reason}");
                self.rejected_draws += 1;
            }
        }
    }

    fn end_frame(&mut self) -> Result<(), FrameError> {
        self.frame_open = false;
        if std::mem::take(&mut self.lost_pending) {
            self.frame.clear();
            return Err(FrameError::ContextLost);
        }
        self.last_frame = std::mem::take(&mut self.frame);
        self.frames += 1;
        Ok(())
    }
}

/// Distinct textures referenced by a set of draws, ignoring the white fallback.
pub fn textures_used(draws: &[DrawRecord]) -> HashSet<TextureHandle> {
    draws
        .iter()
        .map(|d| d.texture)
        .filter(|t| t.is_valid())
        .collect()
}

/// Whether a mesh layout can be drawn by `variant`.
pub fn layout_matches(layout: VertexLayout, variant: ShaderVariant) -> bool {
    layout == variant.vertex_layout()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_call(device: &mut HeadlessDevice, program: ProgramHandle) -> DrawCall {
        DrawCall {
            program,
            vertex_buffer: device.create_vertex_buffer(&[0.0; 20]),
            layout: VertexLayout::Textured,
            index_buffer: device.create_index_buffer(&[0, 1, 2, 0, 2, 3]),
            index_count: 6,
            texture: TextureHandle::NONE,
            uniforms: DrawUniforms::default(),
        }
    }

    #[test]
    fn test_handles_are_unique_and_nonzero() {
        let mut device = HeadlessDevice::new();
        let a = device.create_vertex_buffer(&[1.0]);
        let b = device.create_index_buffer(&[0]);
        let t = device.upload_texture(&Image::solid(1, 1, [255; 4]));
        assert!(a.is_valid() && b.is_valid() && t.is_valid());
        assert_ne!(a.raw(), b.raw());
        assert_ne!(b.raw(), t.raw());
        assert_eq!(device.live_buffers(), 2);
        assert_eq!(device.live_textures(), 1);
    }

    #[test]
    fn test_empty_buffers_are_rejected() {
        let mut device = HeadlessDevice::new();
        assert_eq!(device.create_vertex_buffer(&[]), BufferHandle::NONE);
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_injected_failures() {
        let mut device = HeadlessDevice::new();
        device.fail_program(ShaderVariant::Phong, Some(InjectedFailure::Link));
        assert!(matches!(
            device.compile_program(ShaderVariant::Phong),
            Err(ShaderError::Link { .. })
        ));
        assert!(device.compile_program(ShaderVariant::Flat).is_ok());
        device.fail_program(ShaderVariant::Phong, None);
        assert!(device.compile_program(ShaderVariant::Phong).is_ok());
        assert_eq!(device.compile_attempts(), 3);
    }

    #[test]
    fn test_records_draws_with_state() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(ShaderVariant::Flat).unwrap();
        let call = quad_call(&mut device, program);

        device.begin_frame([0.0, 0.0, 0.0, 1.0]);
        device.set_render_state(RenderState::BACKDROP);
        device.draw_indexed(&call);
        device.end_frame().unwrap();

        let frame = device.last_frame();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].state, RenderState::BACKDROP);
        assert_eq!(frame[0].variant, ShaderVariant::Flat);
        assert_eq!(device.frame_count(), 1);
    }

    #[test]
    fn test_dead_handles_are_skipped() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(ShaderVariant::Flat).unwrap();
        let call = quad_call(&mut device, program);
        device.delete_buffer(call.vertex_buffer);

        device.begin_frame([0.0; 4]);
        device.draw_indexed(&call);
        device.end_frame().unwrap();

        assert!(device.last_frame().is_empty());
        assert_eq!(device.rejected_draws(), 1);
    }

    #[test]
    fn test_layout_mismatch_is_skipped() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(ShaderVariant::Phong).unwrap();
        let call = quad_call(&mut device, program);
        assert!(!layout_matches(call.layout, ShaderVariant::Phong));

        device.begin_frame([0.0; 4]);
        device.draw_indexed(&call);
        assert!(device.draws().is_empty());
    }

    #[test]
    fn test_lost_context_invalidates_everything() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(ShaderVariant::Flat).unwrap();
        let call = quad_call(&mut device, program);
        device.lose_context();

        assert!(!device.is_program(program));
        assert!(!device.is_buffer(call.index_buffer));
        device.begin_frame([0.0; 4]);
        assert!(matches!(device.end_frame(), Err(FrameError::ContextLost)));
        device.begin_frame([0.0; 4]);
        assert!(device.end_frame().is_ok());
    }

    #[test]
    fn test_unknown_texture_falls_back_to_white() {
        let mut device = HeadlessDevice::new();
        let program = device.compile_program(ShaderVariant::Flat).unwrap();
        let mut call = quad_call(&mut device, program);
        call.texture = TextureHandle::from_raw(999);

        device.begin_frame([0.0; 4]);
        device.draw_indexed(&call);
        assert_eq!(device.draws()[0].texture, TextureHandle::NONE);
        assert!(textures_used(device.draws()).is_empty());
    }
}
