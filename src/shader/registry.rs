//! Lazily compiled programs for one surface lifetime.

use super::ShaderVariant;
use crate::core::{GraphicsDevice, ProgramHandle};

/// Program handles for every [`ShaderVariant`].
///
/// A registry belongs to one surface lifetime. Programs are compiled on first
/// request; a handle that the device no longer recognises is recompiled, and
/// a failed compile is stored as [`ProgramHandle::NONE`] so the draw that
/// asked for it can be skipped.
#[derive(Debug, Default)]
pub struct ShaderRegistry {
    programs: [ProgramHandle; ShaderVariant::COUNT],
    failures: [u32; ShaderVariant::COUNT],
}

impl ShaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a live program for `variant`, compiling it if needed.
    ///
    /// Returns `None` if compilation failed; the error is logged.
    pub fn program(&mut self, device: &mut dyn GraphicsDevice, variant: ShaderVariant) -> Option<ProgramHandle> {
        let slot = variant.index();
        let current = self.programs[slot];
        if current.is_valid() && device.is_program(current) {
            return Some(current);
        }
        if current.is_valid() {
            log::warn!("{variant} program {current} is no longer valid, rebuilding");
        }

        match device.compile_program(variant) {
            Ok(program) => {
                log::debug!(
                    "Built {variant} program {program} (attributes {:?})",
                    variant.attribute_locations()
                );
                self.programs[slot] = program;
                self.failures[slot] = 0;
                Some(program)
            }
            Err(err) => {
                if self.failures[slot] == 0 {
                    log::error!("{err}");
                } else {
                    log::debug!("{err} (attempt {})", self.failures[slot] + 1);
                }
                self.programs[slot] = ProgramHandle::NONE;
                self.failures[slot] += 1;
                None
            }
        }
    }

    /// Current handle for `variant` without compiling. May be stale.
    #[inline]
    pub fn handle(&self, variant: ShaderVariant) -> ProgramHandle {
        self.programs[variant.index()]
    }

    /// Consecutive failed compiles of `variant`.
    #[inline]
    pub fn failures(&self, variant: ShaderVariant) -> u32 {
        self.failures[variant.index()]
    }

    /// Delete every program and forget the handles.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        for program in &mut self.programs {
            if program.is_valid() {
                device.delete_program(*program);
            }
            *program = ProgramHandle::NONE;
        }
        self.failures = [0; ShaderVariant::COUNT];
    }
}
