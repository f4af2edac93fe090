//! Declarative description of the fixed room scene.
//!
//! Rather than interleaving buffer setup with draw calls, the scene is a
//! plain list of [`SceneObject`] descriptors the render loop iterates in
//! order. The list encodes the draw dependency directly: opaque room
//! surfaces and models first, the light-indicator cube last. Nothing here
//! touches the GPU, so the scene contents and the animation transforms are
//! unit-testable.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Interleaved vertex as uploaded to the GPU: position, normal, UV.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

unsafe impl Zeroable for Vertex {}
unsafe impl Pod for Vertex {}

/// Where an object's triangles come from.
#[derive(Debug, Clone)]
pub enum GeometrySource {
    /// Vertices built inline at startup (room shell, indicator cube, plane).
    Inline(Vec<Vertex>),
    /// An OBJ file imported at startup. A missing or unreadable file is
    /// logged and the object is skipped, never fatal.
    Model(PathBuf),
}

/// Per-surface material terms pushed alongside the shared light uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub specular: Vec3,
    pub shininess: f32,
    /// Multiplier on the light's diffuse term; the original scene brightened
    /// the floor relative to the walls this way.
    pub diffuse_boost: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            specular: Vec3::splat(0.5),
            shininess: 32.0,
            diffuse_boost: Vec3::ONE,
        }
    }
}

/// Simple time-based transform applied on top of an object's base placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    Static,
    /// Continuous rotation about `axis` at a fixed angular rate.
    Spin { axis: Vec3, degrees_per_sec: f32 },
    /// Sinusoidal back-and-forth translation along `axis`; one full cycle
    /// every `period` seconds, reaching `half_span` at the extremes.
    Shuttle {
        axis: Vec3,
        half_span: f32,
        period: f32,
    },
}

impl Animation {
    /// Composes the animated transform with the base placement at time `t`
    /// (seconds since startup).
    pub fn model_matrix(&self, base: Mat4, t: f32) -> Mat4 {
        match *self {
            Animation::Static => base,
            Animation::Spin {
                axis,
                degrees_per_sec,
            } => base * Mat4::from_axis_angle(axis.normalize(), (degrees_per_sec * t).to_radians()),
            Animation::Shuttle {
                axis,
                half_span,
                period,
            } => {
                let phase = (std::f32::consts::TAU * t / period.max(f32::EPSILON)).sin();
                Mat4::from_translation(axis * half_span * phase) * base
            }
        }
    }
}

/// How an object is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Lit, textured geometry drawn with the lighting pipeline.
    Opaque,
    /// The unlit light-indicator cube, drawn last and translated to the
    /// point light's position every frame.
    Indicator,
}

/// One fixed drawable: geometry, surface parameters, placement, animation.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: &'static str,
    pub geometry: GeometrySource,
    pub texture: Option<PathBuf>,
    pub material: Material,
    pub base_transform: Mat4,
    pub animation: Animation,
    pub kind: ObjectKind,
}

const ROOM_HALF: f32 = 10.0;
const ROOM_HEIGHT: f32 = 10.0;

/// Expands one rectangle into two triangles with a shared normal. UVs run
/// from the origin to `uv_max`, so values above 1.0 tile the texture.
fn quad(corners: [[f32; 3]; 4], normal: [f32; 3], uv_max: [f32; 2]) -> Vec<Vertex> {
    let uvs = [
        [0.0, 0.0],
        [uv_max[0], 0.0],
        uv_max,
        [0.0, uv_max[1]],
    ];
    [0usize, 1, 2, 2, 3, 0]
        .iter()
        .map(|&i| Vertex {
            position: corners[i],
            normal,
            tex_coords: uvs[i],
        })
        .collect()
}

/// The four room walls with inward-facing normals.
pub fn room_walls() -> Vec<Vertex> {
    let (h, top) = (ROOM_HALF, ROOM_HEIGHT);
    let mut vertices = Vec::with_capacity(24);
    // Left and right walls.
    vertices.extend(quad(
        [[-h, 0.0, -h], [-h, 0.0, h], [-h, top, h], [-h, top, -h]],
        [1.0, 0.0, 0.0],
        [1.0, 1.0],
    ));
    vertices.extend(quad(
        [[h, 0.0, -h], [h, 0.0, h], [h, top, h], [h, top, -h]],
        [-1.0, 0.0, 0.0],
        [1.0, 1.0],
    ));
    // Back and front walls.
    vertices.extend(quad(
        [[-h, 0.0, -h], [h, 0.0, -h], [h, top, -h], [-h, top, -h]],
        [0.0, 0.0, 1.0],
        [1.0, 1.0],
    ));
    vertices.extend(quad(
        [[-h, 0.0, h], [h, 0.0, h], [h, top, h], [-h, top, h]],
        [0.0, 0.0, -1.0],
        [1.0, 1.0],
    ));
    vertices
}

/// Floor slab; UVs tile the texture four times in each direction.
pub fn floor() -> Vec<Vertex> {
    let h = ROOM_HALF;
    quad(
        [[-h, 0.0, -h], [h, 0.0, -h], [h, 0.0, h], [-h, 0.0, h]],
        [0.0, 1.0, 0.0],
        [4.0, 4.0],
    )
}

/// Ceiling slab with a downward normal.
pub fn ceiling() -> Vec<Vertex> {
    let (h, top) = (ROOM_HALF, ROOM_HEIGHT);
    quad(
        [[-h, top, -h], [h, top, -h], [h, top, h], [-h, top, h]],
        [0.0, -1.0, 0.0],
        [1.0, 1.0],
    )
}

/// Unit cube centred at the origin; translated to the light's position by
/// the loop each frame.
pub fn indicator_cube() -> Vec<Vertex> {
    let s = 0.5;
    let mut vertices = Vec::with_capacity(36);
    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        (
            [[-s, -s, -s], [s, -s, -s], [s, s, -s], [-s, s, -s]],
            [0.0, 0.0, -1.0],
        ),
        (
            [[-s, -s, s], [s, -s, s], [s, s, s], [-s, s, s]],
            [0.0, 0.0, 1.0],
        ),
        (
            [[-s, -s, -s], [-s, -s, s], [-s, s, s], [-s, s, -s]],
            [-1.0, 0.0, 0.0],
        ),
        (
            [[s, -s, -s], [s, -s, s], [s, s, s], [s, s, -s]],
            [1.0, 0.0, 0.0],
        ),
        (
            [[-s, -s, -s], [s, -s, -s], [s, -s, s], [-s, -s, s]],
            [0.0, -1.0, 0.0],
        ),
        (
            [[-s, s, -s], [s, s, -s], [s, s, s], [-s, s, s]],
            [0.0, 1.0, 0.0],
        ),
    ];
    for (corners, normal) in faces {
        vertices.extend(quad(corners, normal, [1.0, 1.0]));
    }
    vertices
}

/// Unit quad in the XY plane facing +Z; scaled/placed by its base transform.
pub fn image_plane() -> Vec<Vertex> {
    let s = 0.5;
    quad(
        [[-s, -s, 0.0], [s, -s, 0.0], [s, s, 0.0], [-s, s, 0.0]],
        [0.0, 0.0, 1.0],
        [1.0, 1.0],
    )
}

/// Assembles the fixed draw list for the room scene.
///
/// Opaque surfaces and models come first; the light-indicator cube is last.
/// Only the hardware depth test orders fragments beyond that.
pub fn build_scene(assets_root: &Path) -> Vec<SceneObject> {
    let texture = |name: &str| Some(assets_root.join("textures").join(name));
    let model = |name: &str| GeometrySource::Model(assets_root.join("models").join(name));

    vec![
        SceneObject {
            name: "walls",
            geometry: GeometrySource::Inline(room_walls()),
            texture: texture("bricks.jpg"),
            material: Material {
                specular: Vec3::splat(0.05),
                shininess: 8.0,
                diffuse_boost: Vec3::ONE,
            },
            base_transform: Mat4::IDENTITY,
            animation: Animation::Static,
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "floor",
            geometry: GeometrySource::Inline(floor()),
            texture: texture("floor.jpg"),
            material: Material {
                specular: Vec3::splat(0.5),
                shininess: 8.0,
                diffuse_boost: Vec3::splat(1.5),
            },
            base_transform: Mat4::IDENTITY,
            animation: Animation::Static,
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "ceiling",
            geometry: GeometrySource::Inline(ceiling()),
            texture: texture("ceiling.png"),
            material: Material {
                specular: Vec3::splat(0.15),
                shininess: 8.0,
                diffuse_boost: Vec3::ONE,
            },
            base_transform: Mat4::IDENTITY,
            animation: Animation::Static,
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "picture",
            geometry: GeometrySource::Inline(image_plane()),
            texture: texture("picture.png"),
            material: Material {
                specular: Vec3::splat(0.05),
                shininess: 16.0,
                diffuse_boost: Vec3::ONE,
            },
            base_transform: Mat4::from_translation(Vec3::new(0.0, 5.0, -9.9))
                * Mat4::from_scale(Vec3::new(8.0, 4.5, 1.0)),
            animation: Animation::Static,
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "tank",
            geometry: model("tank.obj"),
            texture: texture("camo.jpg"),
            material: Material::default(),
            base_transform: Mat4::from_translation(Vec3::new(-4.0, 0.0, 4.0)),
            animation: Animation::Spin {
                axis: Vec3::Y,
                degrees_per_sec: 20.0,
            },
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "wagon-front",
            geometry: model("wagon.obj"),
            texture: texture("wagon.jpg"),
            material: Material::default(),
            base_transform: Mat4::from_translation(Vec3::new(5.0, 0.0, -2.0)),
            animation: Animation::Shuttle {
                axis: Vec3::Z,
                half_span: 6.0,
                period: 12.0,
            },
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "wagon-rear",
            geometry: model("wagon.obj"),
            texture: texture("wagon.jpg"),
            material: Material::default(),
            base_transform: Mat4::from_translation(Vec3::new(5.0, 0.0, 2.0)),
            animation: Animation::Shuttle {
                axis: Vec3::Z,
                half_span: 6.0,
                period: 12.0,
            },
            kind: ObjectKind::Opaque,
        },
        SceneObject {
            name: "light-indicator",
            geometry: GeometrySource::Inline(indicator_cube()),
            texture: None,
            material: Material::default(),
            base_transform: Mat4::IDENTITY,
            animation: Animation::Static,
            kind: ObjectKind::Indicator,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3Swizzles;

    #[test]
    fn indicator_is_drawn_last_after_all_opaques() {
        let scene = build_scene(Path::new("resources"));
        assert!(scene.len() >= 2);
        assert_eq!(scene.last().unwrap().kind, ObjectKind::Indicator);
        let opaque_count = scene
            .iter()
            .take(scene.len() - 1)
            .filter(|object| object.kind == ObjectKind::Opaque)
            .count();
        assert_eq!(opaque_count, scene.len() - 1);
    }

    #[test]
    fn room_shell_vertex_counts_match_the_surface_list() {
        assert_eq!(room_walls().len(), 24);
        assert_eq!(floor().len(), 6);
        assert_eq!(ceiling().len(), 6);
        assert_eq!(indicator_cube().len(), 36);
        assert_eq!(image_plane().len(), 6);
    }

    #[test]
    fn wall_normals_point_into_the_room() {
        for vertex in room_walls() {
            let inward = Vec3::from(vertex.normal);
            let position = Vec3::from(vertex.position);
            // Walking along the normal from the wall must decrease the
            // distance from the room centre axis.
            let stepped = position + inward;
            assert!(
                stepped.xz().length() < position.xz().length(),
                "normal {:?} at {:?} points out of the room",
                vertex.normal,
                vertex.position
            );
        }
    }

    #[test]
    fn floor_uvs_tile_four_times() {
        let max_u = floor()
            .iter()
            .map(|v| v.tex_coords[0])
            .fold(0.0_f32, f32::max);
        assert_eq!(max_u, 4.0);
    }

    #[test]
    fn static_animation_is_the_base_transform() {
        let base = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Animation::Static.model_matrix(base, 42.0), base);
    }

    #[test]
    fn spin_starts_at_identity() {
        let base = Mat4::from_translation(Vec3::X);
        let spin = Animation::Spin {
            axis: Vec3::Y,
            degrees_per_sec: 90.0,
        };
        let at_zero = spin.model_matrix(base, 0.0);
        assert!(at_zero.abs_diff_eq(base, 1e-6));
    }

    #[test]
    fn shuttle_returns_home_every_period() {
        let base = Mat4::from_translation(Vec3::new(5.0, 0.0, -2.0));
        let shuttle = Animation::Shuttle {
            axis: Vec3::Z,
            half_span: 6.0,
            period: 12.0,
        };
        for cycles in 0..4 {
            let at_home = shuttle.model_matrix(base, 12.0 * cycles as f32);
            assert!(
                at_home.abs_diff_eq(base, 1e-3),
                "shuttle drifted after {cycles} cycles"
            );
        }
    }

    #[test]
    fn shuttle_peaks_at_quarter_period() {
        let shuttle = Animation::Shuttle {
            axis: Vec3::Z,
            half_span: 6.0,
            period: 12.0,
        };
        let peak = shuttle.model_matrix(Mat4::IDENTITY, 3.0);
        let offset = peak.transform_point3(Vec3::ZERO);
        assert!((offset.z - 6.0).abs() < 1e-3);
    }
}
