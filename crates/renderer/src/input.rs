//! Input routing, independent of any windowing backend.
//!
//! The window layer translates raw key/pointer/scroll events into calls on
//! [`Controls`], which mutates the camera and [`ProgramState`] directly.
//! Keeping this as plain methods (rather than callbacks tied to winit
//! signatures) lets the whole event→state contract run under unit tests
//! with synthetic event sequences.

use std::collections::HashSet;

use viewstate::ProgramState;

use crate::camera::{Camera, MoveDirection};

/// Logical actions the viewer understands; the window layer owns the
/// physical key map (W/A/S/D, Escape, F1, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Forward,
    Backward,
    Left,
    Right,
    Exit,
    ToggleOverlay,
    ToggleSpotlight,
}

/// Tracks held keys, edge-triggered toggles, and the pointer anchor.
#[derive(Debug, Default)]
pub struct Controls {
    held: HashSet<Binding>,
    last_cursor: Option<(f64, f64)>,
    close_requested: bool,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one key-state sample. Held state is tracked for the polled
    /// movement keys; `Exit` requests loop termination; the two toggles flip
    /// their flag only on an up→down transition, so holding a key does not
    /// re-trigger. Toggling the overlay on also suspends mouse-driven camera
    /// rotation; toggling it off resumes it.
    pub fn key_event(&mut self, binding: Binding, pressed: bool, state: &mut ProgramState) {
        let edge = pressed && !self.held.contains(&binding);
        if pressed {
            self.held.insert(binding);
        } else {
            self.held.remove(&binding);
        }
        if !edge {
            return;
        }

        match binding {
            Binding::Exit => self.close_requested = true,
            Binding::ToggleOverlay => {
                state.overlay_enabled = !state.overlay_enabled;
                state.camera_mouse_update_enabled = !state.overlay_enabled;
            }
            Binding::ToggleSpotlight => {
                state.spotlight_enabled = !state.spotlight_enabled;
            }
            _ => {}
        }
    }

    /// Applies one movement step per held movement key. Called once per
    /// frame with the frame delta so speed is frame-rate independent.
    pub fn apply_movement(&self, camera: &mut Camera, dt: f32) {
        const MOVEMENT: [(Binding, MoveDirection); 4] = [
            (Binding::Forward, MoveDirection::Forward),
            (Binding::Backward, MoveDirection::Backward),
            (Binding::Left, MoveDirection::Left),
            (Binding::Right, MoveDirection::Right),
        ];
        for (binding, direction) in MOVEMENT {
            if self.held.contains(&binding) {
                camera.advance(direction, dt);
            }
        }
    }

    /// Routes a pointer-position report into camera rotation.
    ///
    /// The delta is measured against the previous report, with the vertical
    /// component inverted (screen Y grows downward, pitch grows upward). The
    /// first report only seeds the anchor, so an arbitrary initial cursor
    /// position cannot fling the view. The anchor always advances, but the
    /// rotation is applied only while mouse-driven camera updates are
    /// enabled.
    pub fn pointer_moved(&mut self, x: f64, y: f64, camera: &mut Camera, state: &ProgramState) {
        let (dx, dy) = match self.last_cursor {
            Some((last_x, last_y)) => ((x - last_x) as f32, (last_y - y) as f32),
            None => (0.0, 0.0),
        };
        self.last_cursor = Some((x, y));

        if state.camera_mouse_update_enabled {
            camera.rotate(dx, dy);
        }
    }

    /// Forwards a vertical scroll step into the camera zoom.
    pub fn scroll(&mut self, delta: f32, camera: &mut Camera) {
        camera.zoom_by(delta);
    }

    /// Drops the pointer anchor so the next report seeds a fresh one.
    /// Used when the pointer is recaptured after the overlay closes.
    pub fn reset_pointer(&mut self) {
        self.last_cursor = None;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn camera() -> Camera {
        Camera::new(Vec3::ZERO)
    }

    #[test]
    fn overlay_toggle_is_edge_triggered() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();

        // up, down, down, up, down: exactly two up→down transitions, so the
        // flag flips exactly twice and lands back on its initial value.
        let samples = [false, true, true, false, true];
        let mut observed = Vec::new();
        for pressed in samples {
            controls.key_event(Binding::ToggleOverlay, pressed, &mut state);
            observed.push(state.overlay_enabled);
        }

        assert_eq!(observed, vec![false, true, true, true, false]);
    }

    #[test]
    fn holding_the_toggle_key_flips_once() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();
        for _ in 0..5 {
            controls.key_event(Binding::ToggleSpotlight, true, &mut state);
        }
        assert!(state.spotlight_enabled);
    }

    #[test]
    fn independent_bindings_do_not_interfere() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();

        // Both toggles arrive in the same callback batch.
        controls.key_event(Binding::ToggleOverlay, true, &mut state);
        controls.key_event(Binding::ToggleSpotlight, true, &mut state);

        assert!(state.overlay_enabled);
        assert!(state.spotlight_enabled);
    }

    #[test]
    fn overlay_toggle_gates_mouse_updates() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();
        assert!(state.camera_mouse_update_enabled);

        controls.key_event(Binding::ToggleOverlay, true, &mut state);
        assert!(!state.camera_mouse_update_enabled);

        controls.key_event(Binding::ToggleOverlay, false, &mut state);
        controls.key_event(Binding::ToggleOverlay, true, &mut state);
        assert!(state.camera_mouse_update_enabled);
    }

    #[test]
    fn first_pointer_report_produces_no_rotation() {
        let mut controls = Controls::new();
        let state = ProgramState::default();
        let mut cam = camera();
        let initial_front = cam.front;

        controls.pointer_moved(4321.0, -987.0, &mut cam, &state);
        assert_eq!(cam.front, initial_front);

        // The second report rotates by the delta from the first.
        controls.pointer_moved(4331.0, -987.0, &mut cam, &state);
        assert!((cam.yaw - (-90.0 + 10.0 * cam.sensitivity)).abs() < 1e-5);
    }

    #[test]
    fn vertical_pointer_motion_is_inverted() {
        let mut controls = Controls::new();
        let state = ProgramState::default();
        let mut cam = camera();

        controls.pointer_moved(0.0, 100.0, &mut cam, &state);
        // Moving the pointer up the screen (smaller y) should pitch up.
        controls.pointer_moved(0.0, 50.0, &mut cam, &state);
        assert!(cam.pitch > 0.0);
    }

    #[test]
    fn pointer_reports_are_ignored_while_gated() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();
        let mut cam = camera();

        controls.key_event(Binding::ToggleOverlay, true, &mut state);
        assert!(state.overlay_enabled);
        assert!(!state.camera_mouse_update_enabled);

        controls.pointer_moved(0.0, 0.0, &mut cam, &state);
        controls.pointer_moved(500.0, 300.0, &mut cam, &state);
        assert_eq!(cam.yaw, -90.0);
        assert_eq!(cam.pitch, 0.0);
    }

    #[test]
    fn movement_applies_only_held_keys() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();
        let mut cam = camera();

        controls.key_event(Binding::Forward, true, &mut state);
        controls.key_event(Binding::Right, true, &mut state);
        controls.key_event(Binding::Right, false, &mut state);
        controls.apply_movement(&mut cam, 1.0);

        // Forward only: no lateral displacement.
        assert!(cam.position.z < 0.0);
        assert_eq!(cam.position.x, 0.0);
    }

    #[test]
    fn exit_binding_requests_close() {
        let mut controls = Controls::new();
        let mut state = ProgramState::default();
        assert!(!controls.close_requested());
        controls.key_event(Binding::Exit, true, &mut state);
        assert!(controls.close_requested());
    }

    #[test]
    fn scroll_zooms_the_camera() {
        let mut controls = Controls::new();
        let mut cam = camera();
        controls.scroll(5.0, &mut cam);
        assert_eq!(cam.zoom, 40.0);
    }
}
