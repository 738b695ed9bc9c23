use cgmath::{Matrix4, SquareMatrix, Vector3};
use scene_walk::{
    animation::Animation,
    data_structures::scene::{Material, SceneObject, SceneRegistry},
    resources::MeshData,
};

/// A triangle large enough to fill the view when placed a few units in front of the eye.
pub(crate) fn big_triangle() -> MeshData {
    MeshData::new(
        vec![[-50.0, -50.0, 0.0], [50.0, -50.0, 0.0], [0.0, 50.0, 0.0]],
        vec![[0.0, 0.0, 1.0]; 3],
        vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]],
    )
    .expect("valid triangle")
}

/// Material that renders as pure `colour` without a texture or highlight.
pub(crate) fn flat(colour: [f32; 3]) -> Material {
    Material {
        ambient: colour.into(),
        diffuse: Vector3::new(0.0, 0.0, 0.0),
        specular: Vector3::new(0.0, 0.0, 0.0),
        power: 1.0,
    }
}

pub(crate) fn object_at(transform: Matrix4<f32>, animation: Animation) -> SceneObject {
    SceneObject::new(big_triangle(), Material::default(), transform, animation, true)
}

/// CPU-only registry with one object per animation, all at identity.
pub(crate) fn registry(animations: Vec<Animation>) -> SceneRegistry {
    SceneRegistry::new(
        animations
            .into_iter()
            .map(|animation| object_at(Matrix4::identity(), animation))
            .collect(),
    )
}

pub(crate) fn max_diff(a: &Matrix4<f32>, b: &Matrix4<f32>) -> f32 {
    let a: &[f32; 16] = a.as_ref();
    let b: &[f32; 16] = b.as_ref();
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

/// Device and queue on whatever adapter is available without a window.
#[cfg(feature = "integration-tests")]
pub(crate) async fn headless() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok()?;
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("headless test device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .ok()
}

/// Copies a single-sampled RGBA8 texture of `size`×`size` into an image.
///
/// `size * 4` must be a multiple of 256.
#[cfg(feature = "integration-tests")]
pub(crate) async fn read_back(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    size: u32,
) -> image::RgbaImage {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("read back buffer"),
        size: u64::from(size * size * 4),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("read back encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size * 4),
                rows_per_image: Some(size),
            },
        },
        wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::Wait)
        .expect("device poll failed");
    rx.await
        .expect("map callback dropped")
        .expect("buffer mapping failed");

    let pixels = slice.get_mapped_range().to_vec();
    buffer.unmap();
    image::RgbaImage::from_raw(size, size, pixels).expect("buffer holds a full image")
}
