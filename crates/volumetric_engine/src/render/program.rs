//! Program library
//!
//! Caches compiled programs by their (vertex, fragment) source pair so that
//! materials asking for the same pair share one handle. A pair that fails to
//! compile is not cached: the caller receives `None`, the failure is logged, and
//! the next request tries again.

use std::collections::HashMap;
use std::path::Path;

use crate::render::backend::{ProgramHandle, ProgramSource, RenderBackend};

/// Shared cache of compiled GPU programs
#[derive(Debug, Clone)]
pub struct ProgramLibrary {
    directory: String,
    programs: HashMap<ProgramSource, ProgramHandle>,
}

impl ProgramLibrary {
    /// Create a library resolving source files under `directory`
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            programs: HashMap::new(),
        }
    }

    /// Directory source files are resolved against
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Resolve a file name against the library directory
    pub fn resolve(&self, file: &str) -> String {
        if self.directory.is_empty() {
            return file.to_string();
        }
        Path::new(&self.directory).join(file).to_string_lossy().into_owned()
    }

    /// Get the program for a source pair, compiling it on first use
    ///
    /// Returns `None` when compilation fails; the owning material then treats
    /// that slot as unloaded.
    pub fn get(
        &mut self,
        backend: &mut dyn RenderBackend,
        vertex_file: &str,
        fragment_file: &str,
    ) -> Option<ProgramHandle> {
        let source = ProgramSource::new(self.resolve(vertex_file), self.resolve(fragment_file));

        if let Some(handle) = self.programs.get(&source) {
            return Some(*handle);
        }

        match backend.compile_program(&source) {
            Ok(handle) => {
                log::info!("Loaded program {} as {}", source, handle);
                self.programs.insert(source, handle);
                Some(handle)
            }
            Err(e) => {
                log::error!("{}", e);
                None
            }
        }
    }

    /// Recompile every cached program in place
    ///
    /// Handles stay valid, so materials keep working without being rebuilt. A
    /// program that fails to reload keeps its previous compiled state. Returns the
    /// number of programs that reloaded successfully.
    pub fn reload_all(&mut self, backend: &mut dyn RenderBackend) -> usize {
        let mut reloaded = 0;
        for (source, handle) in &self.programs {
            match backend.reload_program(*handle, source) {
                Ok(()) => reloaded += 1,
                Err(e) => log::error!("Reload of {} failed: {}", handle, e),
            }
        }
        log::info!("Reloaded {}/{} programs", reloaded, self.programs.len());
        reloaded
    }

    /// Number of cached programs
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether no program has been cached yet
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
