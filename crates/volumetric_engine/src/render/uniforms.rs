//! Uniform upload helper
//!
//! [`UniformBinder`] borrows the backend for one program and pushes named values
//! into it. Names the program does not declare are a configuration smell rather
//! than a fault: the value is dropped by the backend, the binder counts it, and
//! the first drop of each (program, name) pair is reported through `log::warn!`.

use crate::render::backend::{ProgramHandle, RenderBackend, UniformValue};
use crate::render::RenderError;

/// Writes uniforms into a single active program
pub struct UniformBinder<'a> {
    backend: &'a mut dyn RenderBackend,
    program: ProgramHandle,
    uploaded: usize,
    mismatches: usize,
}

impl<'a> UniformBinder<'a> {
    /// Create a binder for a program that is already bound
    pub fn new(backend: &'a mut dyn RenderBackend, program: ProgramHandle) -> Self {
        Self {
            backend,
            program,
            uploaded: 0,
            mismatches: 0,
        }
    }

    /// Program receiving the uploads
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Upload a value under `name`
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        if self.backend.set_uniform(self.program, name, &value) {
            self.uploaded += 1;
        } else {
            self.mismatches += 1;
            if self.backend.note_dropped_uniform(self.program, name) {
                let mismatch = RenderError::UniformMismatch {
                    program: self.program,
                    name: name.to_string(),
                };
                log::warn!("{}", mismatch);
            } else {
                log::trace!("{} dropped '{}' again", self.program, name);
            }
        }
    }

    /// Upload a value only when one is present
    pub fn set_optional<T: Into<UniformValue>>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Number of accepted uploads
    pub fn uploaded(&self) -> usize {
        self.uploaded
    }

    /// Number of uploads the program did not declare
    pub fn mismatches(&self) -> usize {
        self.mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessBackend, ProgramSource, TextureHandle};

    #[test]
    fn test_binder_counts_mismatches_without_failing() {
        let mut gpu = HeadlessBackend::new()
            .with_source("basic.vs", "uniform mat4 u_model;")
            .with_source("flat.fs", "uniform vec4 u_color;");
        let program = gpu.compile_program(&ProgramSource::new("basic.vs", "flat.fs")).unwrap();

        let mut binder = UniformBinder::new(&mut gpu, program);
        binder.set("u_color", 1.0_f32);
        binder.set("u_noise_scale", 2.5_f32);
        binder.set_optional::<TextureHandle>("u_texture", None);

        assert_eq!(binder.uploaded(), 1);
        assert_eq!(binder.mismatches(), 1);
        assert_eq!(gpu.rejected_uniform_count(), 1);
    }

    #[test]
    fn test_repeated_mismatch_is_counted_but_noted_once() {
        let mut gpu = HeadlessBackend::new()
            .with_source("basic.vs", "uniform mat4 u_model;")
            .with_source("flat.fs", "uniform vec4 u_color;");
        let program = gpu.compile_program(&ProgramSource::new("basic.vs", "flat.fs")).unwrap();

        for _ in 0..3 {
            let mut binder = UniformBinder::new(&mut gpu, program);
            binder.set("u_background_light", 1.0_f32);
            assert_eq!(binder.mismatches(), 1);
        }

        assert_eq!(gpu.rejected_uniform_count(), 3);
        assert_eq!(gpu.dropped_uniforms(program).map(|names| names.len()), Some(1));
        assert!(!gpu.note_dropped_uniform(program, "u_background_light"));
    }
}
