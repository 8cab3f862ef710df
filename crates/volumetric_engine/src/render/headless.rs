//! Headless rendering backend
//!
//! A [`RenderBackend`] that keeps no GPU at all. Programs are "compiled" by
//! reading their sources and collecting the `uniform` declarations, which become
//! the program's input interface. Every call is recorded so the frame protocol
//! can be inspected after the fact: which program was bound for each draw, under
//! which raster state, and with which uniform values.
//!
//! The viewer uses it to run scenes without a window; the tests use it as the
//! recording double for materials.

use std::collections::{HashMap, HashSet};

use crate::foundation::math::Vec4;
use crate::render::backend::{
    MeshHandle, ProgramHandle, ProgramSource, RasterState, RenderBackend, Topology, UniformValue,
};
use crate::render::{RenderError, RenderResult};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    /// Framebuffer clear
    Clear(Vec4),
    /// Program activation
    BindProgram(ProgramHandle),
    /// Program release
    UnbindProgram(ProgramHandle),
    /// Accepted uniform upload
    SetUniform {
        /// Target program
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Uploaded value
        value: UniformValue,
    },
    /// Raster state change
    SetRasterState(RasterState),
    /// Draw submission
    Draw {
        /// Drawn mesh
        mesh: MeshHandle,
        /// Primitive topology
        topology: Topology,
    },
}

/// Snapshot of everything that affected a single draw call
#[derive(Debug, Clone)]
pub struct DrawRecord {
    /// Drawn mesh
    pub mesh: MeshHandle,
    /// Primitive topology
    pub topology: Topology,
    /// Program bound at submission time
    pub program: Option<ProgramHandle>,
    /// Raster state at submission time
    pub state: RasterState,
    /// Uniform values held by the bound program at submission time
    pub uniforms: HashMap<String, UniformValue>,
}

impl DrawRecord {
    /// Value of a uniform at submission time
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }
}

#[derive(Debug)]
struct ProgramEntry {
    source: ProgramSource,
    interface: HashSet<String>,
    values: HashMap<String, UniformValue>,
    dropped: HashSet<String>,
}

/// Recording backend without a GPU
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    sources: HashMap<String, String>,
    programs: Vec<ProgramEntry>,
    bound: Option<ProgramHandle>,
    state: RasterState,
    commands: Vec<GpuCommand>,
    draws: Vec<DrawRecord>,
    draw_count: u64,
    rejected_uniforms: u64,
    keep_history: bool,
}

impl HeadlessBackend {
    /// Create a backend that records its full command history
    pub fn new() -> Self {
        Self {
            keep_history: true,
            ..Self::default()
        }
    }

    /// Create a backend that only keeps counters
    ///
    /// Suitable for long headless runs where the history would grow without bound.
    pub fn without_history() -> Self {
        Self::default()
    }

    /// Register an in-memory program source, shadowing the filesystem
    pub fn with_source(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.add_source(path, text);
        self
    }

    /// Register or replace an in-memory program source
    pub fn add_source(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(path.into(), text.into());
    }

    /// Recorded calls, oldest first
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Recorded draw calls, oldest first
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Forget recorded history, keeping programs and counters
    pub fn clear_history(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// Current raster state
    pub fn raster_state(&self) -> RasterState {
        self.state
    }

    /// Currently bound program
    pub fn bound_program(&self) -> Option<ProgramHandle> {
        self.bound
    }

    /// Number of uniform uploads dropped because the program did not declare them
    pub fn rejected_uniform_count(&self) -> u64 {
        self.rejected_uniforms
    }

    /// Distinct uniform names dropped by a program since it was last compiled
    pub fn dropped_uniforms(&self, program: ProgramHandle) -> Option<&HashSet<String>> {
        self.entry(program).map(|entry| &entry.dropped)
    }

    /// Declared inputs of a compiled program
    pub fn interface(&self, program: ProgramHandle) -> Option<&HashSet<String>> {
        self.entry(program).map(|entry| &entry.interface)
    }

    /// Last value uploaded to a program input
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<&UniformValue> {
        self.entry(program).and_then(|entry| entry.values.get(name))
    }

    /// Sources a program was compiled from
    pub fn program_source(&self, program: ProgramHandle) -> Option<&ProgramSource> {
        self.entry(program).map(|entry| &entry.source)
    }

    fn entry(&self, program: ProgramHandle) -> Option<&ProgramEntry> {
        usize::try_from(program.0).ok().and_then(|index| self.programs.get(index))
    }

    fn entry_mut(&mut self, program: ProgramHandle) -> Option<&mut ProgramEntry> {
        usize::try_from(program.0).ok().and_then(|index| self.programs.get_mut(index))
    }

    fn record(&mut self, command: GpuCommand) {
        if self.keep_history {
            self.commands.push(command);
        }
    }

    fn read_source(&self, path: &str, source: &ProgramSource) -> RenderResult<String> {
        if let Some(text) = self.sources.get(path) {
            return Ok(text.clone());
        }

        std::fs::read_to_string(path).map_err(|e| RenderError::ProgramCompilation {
            program: source.to_string(),
            reason: format!("cannot read '{}': {}", path, e),
        })
    }

    fn build_interface(&self, source: &ProgramSource) -> RenderResult<HashSet<String>> {
        let vertex = self.read_source(&source.vertex_path, source)?;
        let fragment = self.read_source(&source.fragment_path, source)?;

        let mut interface = parse_uniform_declarations(&vertex);
        interface.extend(parse_uniform_declarations(&fragment));
        Ok(interface)
    }
}

/// Collect the names of `uniform` declarations in GLSL-style source text
pub fn parse_uniform_declarations(text: &str) -> HashSet<String> {
    let without_comments: String = text
        .lines()
        .map(|line| line.split("//").next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .filter_map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            let position = tokens.iter().position(|token| *token == "uniform")?;
            // `uniform <type> <name>` needs at least two more tokens
            if tokens.len() < position + 3 {
                return None;
            }
            let name = tokens.last()?;
            let name = name.split('[').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

impl RenderBackend for HeadlessBackend {
    fn compile_program(&mut self, source: &ProgramSource) -> RenderResult<ProgramHandle> {
        let interface = self.build_interface(source)?;
        let handle = ProgramHandle(self.programs.len() as u64);

        log::debug!(
            "Compiled {} as {} with {} declared uniforms",
            source,
            handle,
            interface.len()
        );

        self.programs.push(ProgramEntry {
            source: source.clone(),
            interface,
            values: HashMap::new(),
            dropped: HashSet::new(),
        });
        Ok(handle)
    }

    fn reload_program(
        &mut self,
        program: ProgramHandle,
        source: &ProgramSource,
    ) -> RenderResult<()> {
        let interface = self.build_interface(source)?;
        let entry = self
            .entry_mut(program)
            .ok_or_else(|| RenderError::BackendError(format!("Unknown {}", program)))?;

        entry.source = source.clone();
        entry.values.retain(|name, _| interface.contains(name));
        entry.dropped.clear();
        entry.interface = interface;
        Ok(())
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        if let Some(previous) = self.bound {
            log::warn!("Binding {} while {} is still bound", program, previous);
        }
        self.bound = Some(program);
        self.record(GpuCommand::BindProgram(program));
    }

    fn unbind_program(&mut self, program: ProgramHandle) {
        if self.bound != Some(program) {
            log::warn!("Unbinding {} but {:?} is bound", program, self.bound);
        }
        self.bound = None;
        self.record(GpuCommand::UnbindProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: &UniformValue) -> bool {
        let accepted = match self.entry_mut(program) {
            Some(entry) if entry.interface.contains(name) => {
                entry.values.insert(name.to_string(), *value);
                true
            }
            _ => false,
        };

        if accepted {
            log::trace!("{} <- {} = {:?}", program, name, value);
            self.record(GpuCommand::SetUniform {
                program,
                name: name.to_string(),
                value: *value,
            });
        } else {
            self.rejected_uniforms += 1;
        }
        accepted
    }

    fn note_dropped_uniform(&mut self, program: ProgramHandle, name: &str) -> bool {
        match self.entry_mut(program) {
            Some(entry) => entry.dropped.insert(name.to_string()),
            None => true,
        }
    }

    fn set_raster_state(&mut self, state: RasterState) {
        self.state = state;
        self.record(GpuCommand::SetRasterState(state));
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, topology: Topology) {
        if self.bound.is_none() {
            log::warn!("Draw of mesh {:?} issued with no program bound", mesh);
        }

        self.draw_count += 1;
        self.record(GpuCommand::Draw { mesh, topology });

        if self.keep_history {
            let uniforms = self
                .bound
                .and_then(|program| self.entry(program))
                .map(|entry| entry.values.clone())
                .unwrap_or_default();

            self.draws.push(DrawRecord {
                mesh,
                topology,
                program: self.bound,
                state: self.state,
                uniforms,
            });
        }
    }

    fn clear(&mut self, color: Vec4) {
        self.record(GpuCommand::Clear(color));
    }

    fn draw_count(&self) -> u64 {
        self.draw_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "
        uniform mat4 u_viewprojection;
        uniform mat4 u_model; // object to world
        in vec3 a_vertex;
    ";
    const FRAGMENT: &str = "
        uniform vec4 u_color;
        uniform sampler2D u_texture;
        uniform float u_weights[4];
        // uniform float u_commented_out;
    ";

    fn backend() -> HeadlessBackend {
        HeadlessBackend::new()
            .with_source("basic.vs", VERTEX)
            .with_source("flat.fs", FRAGMENT)
    }

    #[test]
    fn test_parse_uniform_declarations() {
        let names = parse_uniform_declarations(FRAGMENT);
        assert!(names.contains("u_color"));
        assert!(names.contains("u_texture"));
        assert!(names.contains("u_weights"));
        assert!(!names.contains("u_commented_out"));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_compile_merges_stage_interfaces() {
        let mut gpu = backend();
        let program = gpu.compile_program(&ProgramSource::new("basic.vs", "flat.fs")).unwrap();

        let interface = gpu.interface(program).unwrap();
        assert!(interface.contains("u_model"));
        assert!(interface.contains("u_color"));
    }

    #[test]
    fn test_missing_source_fails_to_compile() {
        let mut gpu = backend();
        let result = gpu.compile_program(&ProgramSource::new("basic.vs", "does/not/exist.fs"));
        assert!(matches!(result, Err(RenderError::ProgramCompilation { .. })));
    }

    #[test]
    fn test_undeclared_uniforms_are_dropped() {
        let mut gpu = backend();
        let program = gpu.compile_program(&ProgramSource::new("basic.vs", "flat.fs")).unwrap();

        assert!(gpu.set_uniform(program, "u_color", &UniformValue::Float(1.0)));
        assert!(!gpu.set_uniform(program, "u_abs_coef", &UniformValue::Float(2.0)));
        assert_eq!(gpu.rejected_uniform_count(), 1);
        assert!(gpu.uniform_value(program, "u_abs_coef").is_none());
    }

    #[test]
    fn test_draw_snapshots_bound_program_state() {
        let mut gpu = backend();
        let program = gpu.compile_program(&ProgramSource::new("basic.vs", "flat.fs")).unwrap();

        gpu.bind_program(program);
        gpu.set_uniform(program, "u_color", &UniformValue::Float(0.5));
        gpu.set_raster_state(RasterState::wireframe());
        gpu.draw_mesh(MeshHandle(7), Topology::Triangles);
        gpu.unbind_program(program);

        let draw = &gpu.draws()[0];
        assert_eq!(draw.program, Some(program));
        assert_eq!(draw.mesh, MeshHandle(7));
        assert_eq!(draw.state, RasterState::wireframe());
        assert_eq!(draw.uniform("u_color"), Some(&UniformValue::Float(0.5)));
        assert_eq!(gpu.draw_count(), 1);
        assert_eq!(gpu.bound_program(), None);
    }

    #[test]
    fn test_reload_keeps_handle_and_updates_interface() {
        let mut gpu = backend();
        let source = ProgramSource::new("basic.vs", "flat.fs");
        let program = gpu.compile_program(&source).unwrap();
        gpu.set_uniform(program, "u_color", &UniformValue::Float(0.5));

        gpu.add_source("flat.fs", "uniform float u_step_length;");
        gpu.reload_program(program, &source).unwrap();

        let interface = gpu.interface(program).unwrap();
        assert!(interface.contains("u_step_length"));
        assert!(!interface.contains("u_color"));
        assert!(gpu.uniform_value(program, "u_color").is_none());
    }

    #[test]
    fn test_dropped_uniform_noted_once_until_reload() {
        let mut gpu = backend();
        let source = ProgramSource::new("basic.vs", "flat.fs");
        let program = gpu.compile_program(&source).unwrap();

        assert!(gpu.note_dropped_uniform(program, "u_abs_coef"));
        assert!(!gpu.note_dropped_uniform(program, "u_abs_coef"));
        assert!(gpu.note_dropped_uniform(program, "u_noise_scale"));
        assert_eq!(gpu.dropped_uniforms(program).map(HashSet::len), Some(2));

        gpu.reload_program(program, &source).unwrap();
        assert!(gpu.note_dropped_uniform(program, "u_abs_coef"));
    }

    #[test]
    fn test_without_history_only_counts() {
        let mut gpu = HeadlessBackend::without_history();
        gpu.draw_mesh(MeshHandle(1), Topology::Triangles);
        assert_eq!(gpu.draw_count(), 1);
        assert!(gpu.draws().is_empty());
        assert!(gpu.commands().is_empty());
    }
}
