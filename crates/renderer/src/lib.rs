//! Interactive room-scene viewer built on wgpu and winit.
//!
//! The crate draws a fixed indoor scene (textured room shell, two imported
//! models on simple animations, a point light with an indicator cube, and a
//! camera-held spotlight) with free-fly camera controls and an egui debug
//! overlay. The caller supplies a [`ViewerConfig`] and gets the final
//! [`ProgramState`] back when the window closes, ready to persist.

use std::path::PathBuf;

use anyhow::{Context, Result};
use winit::event_loop::{ControlFlow, EventLoop};

pub use viewstate::ProgramState;

pub mod camera;
mod gpu;
pub mod input;
mod overlay;
pub mod scene;
mod window;

/// MSAA selection. `Auto` picks the highest sample count the surface format
/// supports; an explicit count falls back to the nearest supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    Auto,
    Off,
    Samples(u32),
}

/// Everything the viewer needs to start.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Directory holding `textures/` and `models/`.
    pub assets_root: PathBuf,
    pub antialiasing: Antialiasing,
    /// Initial state, typically restored from the state file.
    pub state: ProgramState,
}

pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Runs the window loop until the user exits, then returns the final
    /// state so the caller can persist it.
    pub fn run(self) -> Result<ProgramState> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = window::App::new(self.config);
        event_loop
            .run_app(&mut app)
            .context("event loop terminated abnormally")?;
        app.into_outcome()
    }
}
