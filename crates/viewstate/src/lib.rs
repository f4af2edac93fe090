//! Runtime-tweakable viewer settings and their on-disk persistence.
//!
//! `ProgramState` is the single value holder the render loop, the input
//! routing, and the debug overlay all read and mutate. A small subset of it
//! (background colour, overlay visibility, camera pose) survives restarts
//! through a positional, whitespace-delimited text file with no header or
//! version tag. Loading is strictly best-effort: a missing, truncated, or
//! malformed file leaves the remaining fields at their defaults and is never
//! reported as an error.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;

/// Point light with Phong colour terms and distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Constant/linear/quadratic falloff coefficients.
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.0, 4.0, 0.0),
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.6),
            specular: Vec3::splat(1.0),
            constant: 1.0,
            linear: 0.7,
            quadratic: 0.2,
        }
    }
}

/// Spotlight shaped like the point light plus a cone.
///
/// The cutoff angles are stored as cosines so the shader compares them
/// against a dot product without per-fragment trigonometry. Position and
/// direction are overridden every frame to track the camera, making the
/// spotlight behave as a flashlight held by the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    /// Cosine of the inner cone angle.
    pub cut_off: f32,
    /// Cosine of the outer cone angle; fragments between the two fade out.
    pub outer_cut_off: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            ambient: Vec3::ZERO,
            diffuse: Vec3::splat(1.0),
            specular: Vec3::splat(1.0),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            cut_off: 12.5_f32.to_radians().cos(),
            outer_cut_off: 15.0_f32.to_radians().cos(),
        }
    }
}

/// Persisted subset of the camera: where it sits and where it looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub front: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -3.0),
            front: Vec3::NEG_Z,
        }
    }
}

/// Process-wide viewer state. One instance exists for the program lifetime
/// and every read/write happens on the render-loop thread between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramState {
    /// Background colour, edited through the overlay colour picker.
    pub clear_color: [f32; 3],
    /// Whether the debug overlay is shown; toggled by a key press.
    pub overlay_enabled: bool,
    pub camera: CameraPose,
    /// Suppresses mouse-driven camera rotation while the overlay is active.
    pub camera_mouse_update_enabled: bool,
    /// Flashlight toggle; flipped by a key press at runtime.
    pub spotlight_enabled: bool,
    /// Placement for a model that is not drawn in the current scene. The
    /// overlay still exposes both fields, so they stay.
    pub backpack_position: Vec3,
    pub backpack_scale: f32,
    pub point_light: PointLight,
    pub spot_light: SpotLight,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self {
            clear_color: [0.0; 3],
            overlay_enabled: false,
            camera: CameraPose::default(),
            camera_mouse_update_enabled: true,
            spotlight_enabled: false,
            backpack_position: Vec3::ZERO,
            backpack_scale: 1.0,
            point_light: PointLight::default(),
            spot_light: SpotLight::default(),
        }
    }
}

impl ProgramState {
    /// Loads the persisted fields from `path`, if present.
    ///
    /// The file carries ten whitespace-separated tokens in fixed order:
    /// clear colour RGB, overlay flag as 0/1, camera position XYZ, camera
    /// front XYZ. Reading stops at the first missing or unparsable token and
    /// every field after that point keeps its current value. Nothing is
    /// reported; absence of the file is the normal first-run case.
    pub fn load(&mut self, path: &Path) {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no persisted state");
                return;
            }
        };

        let mut tokens = contents.split_whitespace();
        let mut next_f32 = move || tokens.next().and_then(|t| t.parse::<f32>().ok());

        let mut floats = [0.0_f32; 10];
        let mut read = 0;
        for slot in floats.iter_mut() {
            match next_f32() {
                Some(value) => *slot = value,
                None => break,
            }
            read += 1;
        }

        if read < 10 {
            tracing::debug!(
                path = %path.display(),
                tokens = read,
                "persisted state is short; keeping defaults for the rest"
            );
        }

        if read >= 3 {
            self.clear_color = [floats[0], floats[1], floats[2]];
        }
        if read >= 4 {
            self.overlay_enabled = floats[3] != 0.0;
        }
        if read >= 7 {
            self.camera.position = Vec3::new(floats[4], floats[5], floats[6]);
        }
        if read >= 10 {
            self.camera.front = Vec3::new(floats[7], floats[8], floats[9]);
        }
    }

    /// Writes the ten persisted values back to `path`, one per line,
    /// truncating any existing file. The parent directory is created first
    /// so a fresh checkout can persist into `resources/`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("failed to prepare directory for state file at {}", dir.display())
                })?;
            }
        }

        let mut out = String::new();
        for value in [
            self.clear_color[0],
            self.clear_color[1],
            self.clear_color[2],
            if self.overlay_enabled { 1.0 } else { 0.0 },
            self.camera.position.x,
            self.camera.position.y,
            self.camera.position.z,
            self.camera.front.x,
            self.camera.front.y,
            self.camera.front.z,
        ] {
            out.push_str(&format!("{value}\n"));
        }

        fs::write(path, out)
            .with_context(|| format!("failed to write state file to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let mut state = ProgramState::default();
        state.load(&dir.path().join("absent.txt"));
        assert_eq!(state, ProgramState::default());
    }

    #[test]
    fn round_trip_preserves_persisted_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/program_state.txt");

        let mut state = ProgramState::default();
        state.clear_color = [0.25, 0.5, 0.125];
        state.overlay_enabled = true;
        state.camera.position = Vec3::new(1.5, -2.0, 7.25);
        state.camera.front = Vec3::new(0.0, 0.0, 1.0);
        state.save(&path).unwrap();

        let mut restored = ProgramState::default();
        restored.load(&path);
        assert_eq!(restored.clear_color, state.clear_color);
        assert!(restored.overlay_enabled);
        assert_eq!(restored.camera.position, state.camera.position);
        assert_eq!(restored.camera.front, state.camera.front);
    }

    #[test]
    fn round_trip_survives_awkward_magnitudes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.txt");

        let mut state = ProgramState::default();
        state.camera.position = Vec3::new(0.1, 1.0 / 3.0, -99.999_99);
        state.save(&path).unwrap();

        // Rust's Display for f32 prints the shortest string that parses back
        // to the same value, so the text format is lossless here.
        let mut restored = ProgramState::default();
        restored.load(&path);
        assert_eq!(restored.camera.position, state.camera.position);
    }

    #[test]
    fn truncated_file_leaves_tail_fields_at_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.txt");
        // Clear colour plus the overlay flag only.
        fs::write(&path, "0.1\n0.2\n0.3\n1\n").unwrap();

        let mut state = ProgramState::default();
        state.load(&path);
        assert_eq!(state.clear_color, [0.1, 0.2, 0.3]);
        assert!(state.overlay_enabled);
        assert_eq!(state.camera, CameraPose::default());
    }

    #[test]
    fn malformed_token_stops_the_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.txt");
        fs::write(&path, "0.1 0.2 oops 1 9 9 9 9 9 9").unwrap();

        let mut state = ProgramState::default();
        state.load(&path);
        // The first two tokens parsed but the triple was never completed, so
        // the colour (and everything after it) stays default.
        assert_eq!(state.clear_color, [0.0, 0.0, 0.0]);
        assert!(!state.overlay_enabled);
        assert_eq!(state.camera, CameraPose::default());
    }

    #[test]
    fn empty_file_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.txt");
        fs::write(&path, "").unwrap();

        let mut state = ProgramState::default();
        state.load(&path);
        assert_eq!(state, ProgramState::default());
    }
}
