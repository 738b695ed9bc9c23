use std::io::{BufReader, Cursor};

use anyhow::{Context as _, bail, ensure};
use wgpu::util::DeviceExt;

use crate::data_structures::model::ModelVertex;

/**
 * CPU-side mesh: parallel, non-indexed arrays with one entry per triangle corner.
 *
 * The arrays always have the same, non-zero length.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
}

impl MeshData {
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
    ) -> anyhow::Result<Self> {
        ensure!(!positions.is_empty(), "mesh has no vertices");
        ensure!(
            positions.len() == normals.len() && positions.len() == uvs.len(),
            "mesh arrays differ in length: {} positions, {} normals, {} uvs",
            positions.len(),
            normals.len(),
            uvs.len()
        );
        Ok(Self {
            positions,
            normals,
            uvs,
        })
    }

    /// Flattens the indexed tobj models of one file into a single triangle list.
    ///
    /// Missing normals or texture coordinates become zeros. V is flipped because
    /// wgpu samples textures with the origin in the top-left corner.
    pub fn from_models(models: &[tobj::Model]) -> anyhow::Result<Self> {
        let corners: usize = models.iter().map(|m| m.mesh.indices.len()).sum();
        if corners == 0 {
            bail!("obj contains no triangles");
        }
        let mut positions = Vec::with_capacity(corners);
        let mut normals = Vec::with_capacity(corners);
        let mut uvs = Vec::with_capacity(corners);

        for m in models {
            let mesh = &m.mesh;
            for &index in &mesh.indices {
                let i = index as usize;
                let position = mesh
                    .positions
                    .get(i * 3..i * 3 + 3)
                    .with_context(|| format!("index {} out of range in model {}", i, m.name))?;
                positions.push([position[0], position[1], position[2]]);
                normals.push([
                    mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                    mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                    mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                ]);
                uvs.push([
                    mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                    1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                ]);
            }
        }
        Self::new(positions, normals, uvs)
    }

    /// Parses OBJ source text. Material libraries are ignored; textures are
    /// assigned per scene object instead.
    pub async fn parse_obj(source: &str) -> anyhow::Result<Self> {
        let mut reader = BufReader::new(Cursor::new(source));
        // Single index so position, normal and uv of a face corner share one index.
        let (models, _) = tobj::load_obj_buf_async(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| async { Ok(Default::default()) },
        )
        .await?;
        Self::from_models(&models)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Interleaves the parallel arrays into the layout the vertex shader reads.
    pub fn vertices(&self) -> Vec<ModelVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((position, normal), tex_coords)| ModelVertex {
                position: *position,
                normal: *normal,
                tex_coords: *tex_coords,
            })
            .collect()
    }

    pub fn create_vertex_buffer(&self, device: &wgpu::Device, label: &str) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&self.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        })
    }
}
