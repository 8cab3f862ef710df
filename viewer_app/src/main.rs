//! Volumetric viewer, headless driver
//!
//! Builds the configured demo scene on the headless backend and runs it for a
//! fixed number of frames: the light orbits the volume, programs are hot
//! reloaded halfway through, and the run ends with a summary of the work done.
//!
//! Usage: `volume_viewer [config.toml|config.ron]`

use std::path::PathBuf;

use thiserror::Error;
use volumetric_engine::config::{Config, ConfigError};
use volumetric_engine::foundation::logging;
use volumetric_engine::prelude::*;

/// Mesh the showcased material is drawn on
const CUBE_MESH: MeshHandle = MeshHandle(0);

#[derive(Debug, Error)]
enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No program could be loaded from '{0}'")]
    NoPrograms(String),
}

struct ViewerApp {
    config: ViewerConfig,
    gpu: HeadlessBackend,
    programs: ProgramLibrary,
    scene: Scene,
}

impl ViewerApp {
    fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let mut gpu = HeadlessBackend::without_history();
        let mut programs = ProgramLibrary::new(config.shaders.directory.clone());
        let scene = Scene::showcase(&config, &mut programs, &mut gpu, CUBE_MESH);

        if programs.is_empty() {
            return Err(ViewerError::NoPrograms(config.shaders.directory.clone()));
        }

        for node in &scene.nodes {
            if node.material.active_program().is_none() {
                log::warn!("Node '{}' has no loaded program and will not be drawn", node.name);
            }
        }

        Ok(Self {
            config,
            gpu,
            programs,
            scene,
        })
    }

    fn run(&mut self) {
        let frames = self.config.engine.frames;
        let dt = self.config.engine.frame_time;
        let reload_frame = frames / 2;

        let mut inspector = LogInspector::new("scene");
        self.scene.inspect(&mut inspector);

        let mut total_draws = 0_u64;
        for frame in 0..frames {
            if frame == reload_frame && frame > 0 {
                let reloaded = self.programs.reload_all(&mut self.gpu);
                log::info!("Frame {}: hot reloaded {} program(s)", frame, reloaded);
            }

            self.scene.update(dt);
            let stats = self.scene.render(&mut self.gpu);
            total_draws += stats.draw_calls;
        }

        let light = self.scene.frame.lights.first().map(|light| light.position);
        log::info!(
            "Rendered {} frame(s): {} draw call(s), {} dropped upload(s)",
            frames,
            total_draws,
            self.gpu.rejected_uniform_count()
        );
        log::info!(
            "Final light position {:?}, camera eye {:?}, fov {}",
            light,
            self.scene.camera.eye,
            self.scene.camera.fov
        );
    }
}

fn load_config() -> Result<ViewerConfig, ViewerError> {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ViewerConfig::load_from_file(&path)?,
        None => ViewerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.engine.log_level);

    log::info!(
        "Starting volumetric viewer: {:?} technique, shaders from '{}'",
        config.scene.technique,
        config.shaders.directory
    );

    let mut app = ViewerApp::new(config)?;
    app.run();

    log::info!("Viewer finished");
    Ok(())
}
