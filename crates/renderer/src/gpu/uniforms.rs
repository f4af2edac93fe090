use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use viewstate::{PointLight, ProgramState, SpotLight};

use crate::camera::Camera;
use crate::scene::Material;

/// Per-frame camera data shared by every pipeline. All fields are padded to
/// 16 bytes so the struct lays out identically under WGSL uniform rules.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
}

unsafe impl Zeroable for CameraUniform {}
unsafe impl Pod for CameraUniform {}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0; 4],
        }
    }

    pub fn update(&mut self, camera: &Camera, aspect: f32) {
        self.view_proj = (camera.projection_matrix(aspect) * camera.view_matrix()).to_cols_array_2d();
        self.view_pos = pad(camera.position, 1.0);
    }
}

/// Both lights packed into one uniform. Attenuation vectors carry constant,
/// linear, and quadratic coefficients; `spot_cone` carries the inner and
/// outer cutoff cosines plus the on/off flag as 0.0/1.0.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct LightsUniform {
    pub point_position: [f32; 4],
    pub point_ambient: [f32; 4],
    pub point_diffuse: [f32; 4],
    pub point_specular: [f32; 4],
    pub point_attenuation: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_ambient: [f32; 4],
    pub spot_diffuse: [f32; 4],
    pub spot_specular: [f32; 4],
    pub spot_attenuation: [f32; 4],
    pub spot_cone: [f32; 4],
}

unsafe impl Zeroable for LightsUniform {}
unsafe impl Pod for LightsUniform {}

impl LightsUniform {
    pub fn new() -> Self {
        bytemuck::Zeroable::zeroed()
    }

    /// Refreshes from the current state. The spotlight is re-anchored to the
    /// camera so it behaves as a flashlight carried by the viewer.
    pub fn update(&mut self, state: &ProgramState, camera: &Camera) {
        let PointLight {
            position,
            ambient,
            diffuse,
            specular,
            constant,
            linear,
            quadratic,
        } = state.point_light;
        self.point_position = pad(position, 1.0);
        self.point_ambient = pad(ambient, 0.0);
        self.point_diffuse = pad(diffuse, 0.0);
        self.point_specular = pad(specular, 0.0);
        self.point_attenuation = [constant, linear, quadratic, 0.0];

        let SpotLight {
            ambient,
            diffuse,
            specular,
            constant,
            linear,
            quadratic,
            cut_off,
            outer_cut_off,
            ..
        } = state.spot_light;
        self.spot_position = pad(camera.position, 1.0);
        self.spot_direction = pad(camera.front, 0.0);
        self.spot_ambient = pad(ambient, 0.0);
        self.spot_diffuse = pad(diffuse, 0.0);
        self.spot_specular = pad(specular, 0.0);
        self.spot_attenuation = [constant, linear, quadratic, 0.0];
        self.spot_cone = [
            cut_off,
            outer_cut_off,
            if state.spotlight_enabled { 1.0 } else { 0.0 },
            0.0,
        ];
    }
}

/// Per-object transform and material, rewritten before each draw.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct ModelUniform {
    pub model: [[f32; 4]; 4],
    /// Specular colour in xyz, shininess exponent in w.
    pub specular_shininess: [f32; 4],
    pub diffuse_boost: [f32; 4],
}

unsafe impl Zeroable for ModelUniform {}
unsafe impl Pod for ModelUniform {}

impl ModelUniform {
    pub fn from_parts(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            specular_shininess: [
                material.specular.x,
                material.specular.y,
                material.specular.z,
                material.shininess,
            ],
            diffuse_boost: pad(material.diffuse_boost, 0.0),
        }
    }
}

fn pad(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spotlight_flag_follows_state() {
        let mut state = ProgramState::default();
        let camera = Camera::default();
        let mut lights = LightsUniform::new();

        lights.update(&state, &camera);
        assert_eq!(lights.spot_cone[2], 0.0);

        state.spotlight_enabled = true;
        lights.update(&state, &camera);
        assert_eq!(lights.spot_cone[2], 1.0);
    }

    #[test]
    fn spotlight_tracks_the_camera() {
        let state = ProgramState::default();
        let mut camera = Camera::new(Vec3::new(2.0, 1.0, -5.0));
        camera.rotate(45.0, 10.0);

        let mut lights = LightsUniform::new();
        lights.update(&state, &camera);
        assert_eq!(lights.spot_position[..3], [2.0, 1.0, -5.0]);
        let direction = Vec3::new(
            lights.spot_direction[0],
            lights.spot_direction[1],
            lights.spot_direction[2],
        );
        assert!((direction - camera.front).length() < 1e-6);
    }

    #[test]
    fn cone_cosines_are_ordered() {
        let state = ProgramState::default();
        let mut lights = LightsUniform::new();
        lights.update(&state, &Camera::default());
        // Inner cone is narrower, so its cosine is the larger of the two.
        assert!(lights.spot_cone[0] > lights.spot_cone[1]);
    }

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 192);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 96);
    }
}
