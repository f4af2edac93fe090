use std::path::Path;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use crate::scene::Vertex;

/// A non-indexed vertex buffer ready to draw.
pub(crate) struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl GpuMesh {
    pub(crate) fn from_vertices(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Imports a Wavefront OBJ and flattens every model in it into one
    /// vertex buffer. Meshes without normals get an up-facing default;
    /// meshes without UVs sample the texture's origin.
    pub(crate) fn load_obj(device: &wgpu::Device, path: &Path) -> Result<Self> {
        let (models, _materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
            .with_context(|| format!("failed to read model at {}", path.display()))?;

        let mut vertices = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            for &index in &mesh.indices {
                let i = index as usize;
                let position = [
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                ];
                let normal = if mesh.normals.is_empty() {
                    [0.0, 1.0, 0.0]
                } else {
                    [
                        mesh.normals[3 * i],
                        mesh.normals[3 * i + 1],
                        mesh.normals[3 * i + 2],
                    ]
                };
                let tex_coords = if mesh.texcoords.is_empty() {
                    [0.0, 0.0]
                } else {
                    [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
                };
                vertices.push(Vertex {
                    position,
                    normal,
                    tex_coords,
                });
            }
        }
        anyhow::ensure!(!vertices.is_empty(), "model has no triangles");

        tracing::debug!(
            path = %path.display(),
            vertices = vertices.len(),
            models = models.len(),
            "imported OBJ model"
        );
        let label = path.to_string_lossy();
        Ok(Self::from_vertices(device, &label, &vertices))
    }
}
