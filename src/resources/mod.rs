use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::data_structures::texture::Texture;

/**
 * This module contains all logic for loading meshes and textures from the asset directory.
 */
pub mod mesh;

pub use mesh::MeshData;

pub fn asset_path(root: &Path, file_name: &str) -> PathBuf {
    root.join(file_name)
}

pub async fn load_string(root: &Path, file_name: &str) -> anyhow::Result<String> {
    let path = asset_path(root, file_name);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

pub async fn load_binary(root: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(root, file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Reads and parses an OBJ mesh relative to `root`.
pub async fn load_mesh(root: &Path, file_name: &str) -> anyhow::Result<MeshData> {
    let source = load_string(root, file_name).await?;
    MeshData::parse_obj(&source)
        .await
        .with_context(|| format!("failed to load mesh {}", file_name))
}

/// Reads, decodes and uploads a texture relative to `root`. The file extension
/// is used as the decoder hint.
pub async fn load_texture(
    root: &Path,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(root, file_name).await?;
    let format = Path::new(file_name).extension().and_then(|e| e.to_str());
    Texture::from_bytes(device, queue, &data, file_name, format)
        .with_context(|| format!("failed to load texture {}", file_name))
}

/// Layout of the per-object texture bind group: a filterable 2D texture and its sampler.
pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}
