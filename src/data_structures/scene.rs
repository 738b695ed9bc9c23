//! Scene objects and the registry that owns them.
//!
//! A [`SceneObject`] pairs an immutable mesh with a material, a model matrix
//! and an [`Animation`]. The [`SceneRegistry`] keeps the objects in draw order
//! and is built once, either from ready objects or by loading a manifest.

use std::{collections::HashMap, path::Path, sync::Arc};

use cgmath::{Matrix4, SquareMatrix, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    animation::Animation,
    manifest::ObjectDescriptor,
    pipelines::{light, phong::ObjectUniform},
    resources::{self, MeshData},
};

/// Phong material parameters. Value type, copied into each object uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(0.0, 0.0, 0.0),
            diffuse: Vector3::new(0.0, 0.0, 0.0),
            specular: Vector3::new(0.1, 0.1, 0.1),
            power: 128.0,
        }
    }
}

/// Draw state derived once from a mesh after upload.
#[derive(Debug)]
pub struct GpuObject {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    /// Shared between objects that use the same texture file.
    pub texture_bind_group: Arc<wgpu::BindGroup>,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct SceneObject {
    pub mesh: MeshData,
    pub material: Material,
    pub transform: Matrix4<f32>,
    pub animation: Animation,
    pub apply_texture: bool,
    pub gpu: Option<GpuObject>,
}

impl SceneObject {
    pub fn new(
        mesh: MeshData,
        material: Material,
        transform: Matrix4<f32>,
        animation: Animation,
        apply_texture: bool,
    ) -> Self {
        Self {
            mesh,
            material,
            transform,
            animation,
            apply_texture,
            gpu: None,
        }
    }

    /// Advances the object's animation by one tick.
    pub fn advance(&mut self, elapsed: Duration) {
        self.animation.advance(&mut self.transform, elapsed);
    }

    /// Uniform contents for the current transform seen through `view`.
    pub fn uniform(&self, view: Matrix4<f32>) -> ObjectUniform {
        ObjectUniform::new(view * self.transform, &self.material, self.apply_texture)
    }

    /// Creates the vertex and uniform buffers and caches them on the object.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        texture_bind_group: Arc<wgpu::BindGroup>,
        label: &str,
    ) {
        let vertex_buffer = self.mesh.create_vertex_buffer(device, label);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Object Uniform", label)),
            contents: bytemuck::cast_slice(&[self.uniform(Matrix4::identity())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = light::mk_bind_group(device, object_layout, &uniform_buffer);
        self.gpu = Some(GpuObject {
            vertex_buffer,
            vertex_count: self.mesh.len() as u32,
            texture_bind_group,
            uniform_buffer,
            uniform_bind_group,
        });
    }
}

/// GPU handles the registry needs to upload objects.
pub struct UploadTargets<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub texture_layout: &'a wgpu::BindGroupLayout,
    pub object_layout: &'a wgpu::BindGroupLayout,
    /// Bound for objects with `apply_texture == false`.
    pub blank_texture: &'a Arc<wgpu::BindGroup>,
}

/// Ordered collection of scene objects. Insertion order is draw order.
#[derive(Debug, Default)]
pub struct SceneRegistry {
    objects: Vec<SceneObject>,
}

impl SceneRegistry {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self { objects }
    }

    /// Loads every described object relative to `root` and uploads it.
    ///
    /// Each distinct texture file is decoded once. Meshes load concurrently;
    /// the resulting order follows `descriptors`.
    pub async fn load(
        root: &Path,
        descriptors: &[ObjectDescriptor],
        targets: &UploadTargets<'_>,
    ) -> anyhow::Result<Self> {
        let mut texture_paths: Vec<&str> = Vec::new();
        for descriptor in descriptors.iter().filter(|d| d.apply_texture) {
            if !texture_paths.contains(&descriptor.texture.as_str()) {
                texture_paths.push(&descriptor.texture);
            }
        }

        let textures = futures::future::try_join_all(
            texture_paths
                .iter()
                .map(|path| resources::load_texture(root, path, targets.device, targets.queue)),
        )
        .await?;
        let bind_groups: HashMap<&str, Arc<wgpu::BindGroup>> = texture_paths
            .iter()
            .zip(textures.iter())
            .map(|(path, texture)| {
                let group = texture.bind_group(targets.device, targets.texture_layout, path);
                (*path, Arc::new(group))
            })
            .collect();
        log::info!("Loaded {} textures", bind_groups.len());

        let meshes = futures::future::try_join_all(
            descriptors
                .iter()
                .map(|descriptor| resources::load_mesh(root, &descriptor.mesh)),
        )
        .await?;

        let mut objects = Vec::with_capacity(descriptors.len());
        for (descriptor, mesh) in descriptors.iter().zip(meshes) {
            let mut object = SceneObject::new(
                mesh,
                descriptor.material,
                descriptor.transform,
                descriptor.animation.clone(),
                descriptor.apply_texture,
            );
            let texture = match bind_groups.get(descriptor.texture.as_str()) {
                Some(group) if descriptor.apply_texture => group.clone(),
                _ => targets.blank_texture.clone(),
            };
            object.upload(
                targets.device,
                targets.object_layout,
                texture,
                &descriptor.mesh,
            );
            objects.push(object);
        }
        log::info!("Loaded {} scene objects", objects.len());
        Ok(Self::new(objects))
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Advances every object's animation by one tick, in draw order.
    pub fn advance(&mut self, elapsed: Duration) {
        for object in &mut self.objects {
            object.advance(elapsed);
        }
    }
}
