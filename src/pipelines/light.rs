use cgmath::{Matrix4, Point3, SquareMatrix};
use wgpu::util::DeviceExt;

/// The single point light of the scene. Set once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Point3<f32>,
}

impl Light {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new((4.0, 4.0, 4.0))
    }
}

/// Per-frame uniform shared by every draw: projection, view and the light.
///
/// The light is passed in world space; the vertex shader moves it into view
/// space with `view`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub light_position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
}

impl SceneUniform {
    pub fn new(projection: Matrix4<f32>, view: Matrix4<f32>, light: &Light) -> Self {
        Self {
            projection: projection.into(),
            view: view.into(),
            light_position: light.position.into(),
            _padding: 0,
        }
    }
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self::new(Matrix4::identity(), Matrix4::identity(), &Light::default())
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: SceneUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Scene Uniform Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Layout for a single uniform buffer visible to both shader stages. Used for
/// the scene uniform and the per-object uniform alike.
pub fn mk_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: None,
    })
}
