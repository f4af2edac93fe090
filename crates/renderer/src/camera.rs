//! Free-flying viewer camera.
//!
//! Orientation is stored as yaw/pitch in degrees and the basis vectors are
//! re-derived after every rotation. Movement speed scales with the frame
//! delta supplied by the loop, so travel distance is independent of frame
//! rate. The persisted [`CameraPose`] carries only position and front; yaw
//! and pitch are recovered from the front vector on load.

use glam::{Mat4, Vec3};
use viewstate::CameraPose;

const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_SPEED: f32 = 2.5;
const DEFAULT_SENSITIVITY: f32 = 0.1;
const DEFAULT_ZOOM: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const ZOOM_MIN: f32 = 1.0;
const ZOOM_MAX: f32 = 45.0;

/// Near/far clip distances of the viewing frustum, in world units.
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Direction of a single movement step, mapped from the held movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    world_up: Vec3,
    /// Heading in degrees; -90 looks down -Z.
    pub yaw: f32,
    /// Elevation in degrees, clamped to avoid flipping over the pole.
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    /// Vertical field of view in degrees; narrowed by scrolling.
    pub zoom: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Rebuilds a camera from a persisted pose, recovering yaw/pitch from
    /// the stored front vector.
    pub fn from_pose(pose: &CameraPose) -> Self {
        let mut camera = Self::new(pose.position);
        let front = pose.front.normalize_or(Vec3::NEG_Z);
        camera.pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees();
        camera.yaw = front.z.atan2(front.x).to_degrees();
        camera.update_vectors();
        camera
    }

    /// The persisted subset of the camera.
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            front: self.front,
        }
    }

    /// Moves the camera one step; displacement is `speed * dt`.
    pub fn advance(&mut self, direction: MoveDirection, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            MoveDirection::Forward => self.position += self.front * velocity,
            MoveDirection::Backward => self.position -= self.front * velocity,
            MoveDirection::Left => self.position -= self.right * velocity,
            MoveDirection::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a pointer delta to the orientation. Positive `dy` looks up.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Adjusts the field of view from a scroll step; scrolling up zooms in.
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom - delta).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect.max(f32::EPSILON), NEAR_PLANE, FAR_PLANE)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_pose(&CameraPose::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_scales_linearly_with_frame_delta() {
        let mut slow = Camera::new(Vec3::ZERO);
        let mut fast = Camera::new(Vec3::ZERO);
        slow.advance(MoveDirection::Forward, 0.05);
        fast.advance(MoveDirection::Forward, 0.1);

        let slow_travel = slow.position.length();
        let fast_travel = fast.position.length();
        assert!(slow_travel > 0.0);
        assert!((fast_travel - 2.0 * slow_travel).abs() < 1e-6);
    }

    #[test]
    fn strafing_is_perpendicular_to_front() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.advance(MoveDirection::Right, 1.0);
        assert!(camera.position.dot(camera.front).abs() < 1e-6);
    }

    #[test]
    fn pitch_clamps_at_the_pole() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.rotate(0.0, 10_000.0);
        assert!((camera.pitch - 89.0).abs() < 1e-4);
        camera.rotate(0.0, -100_000.0);
        assert!((camera.pitch + 89.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_stays_in_range() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.zoom_by(100.0);
        assert_eq!(camera.zoom, 1.0);
        camera.zoom_by(-100.0);
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn pose_round_trips_through_yaw_pitch_recovery() {
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        camera.rotate(123.0, -45.0);

        let restored = Camera::from_pose(&camera.pose());
        assert!((restored.front - camera.front).length() < 1e-5);
        assert_eq!(restored.position, camera.position);
    }

    #[test]
    fn default_pose_looks_down_negative_z() {
        let camera = Camera::default();
        assert!((camera.front - Vec3::NEG_Z).length() < 1e-6);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, -3.0));
    }
}
