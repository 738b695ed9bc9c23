//! GPU and window context.
//!
//! [`Context`] owns the surface, device and queue together with everything the
//! frame renderer draws with. [`SceneResources`] and [`RenderTargets`] only need
//! a device, so they can also be built headless.

use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::Projection,
    config::ViewerConfig,
    data_structures::{scene::UploadTargets, texture::Texture},
    pipelines::{
        light::{self, Light, SceneUniform},
        phong,
    },
    resources,
};

/// Pipeline, layouts and shared bind groups of the phong pass.
#[derive(Debug)]
pub struct SceneResources {
    pub pipeline: wgpu::RenderPipeline,
    pub texture_layout: wgpu::BindGroupLayout,
    pub object_layout: wgpu::BindGroupLayout,
    pub scene_buffer: wgpu::Buffer,
    pub scene_bind_group: wgpu::BindGroup,
    /// White 1×1 texture for objects drawn without a texture.
    pub blank_texture: Arc<wgpu::BindGroup>,
}

impl SceneResources {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let scene_layout = light::mk_bind_group_layout(device, "scene_bind_group_layout");
        let object_layout = light::mk_bind_group_layout(device, "object_bind_group_layout");
        let texture_layout = resources::texture_layout(device);

        let scene_buffer = light::mk_buffer(device, SceneUniform::default());
        let scene_bind_group = light::mk_bind_group(device, &scene_layout, &scene_buffer);

        let blank = Texture::create_blank(device, queue);
        let blank_texture = Arc::new(blank.bind_group(device, &texture_layout, "blank texture"));

        let pipeline = phong::mk_phong_pipeline(
            device,
            color_format,
            sample_count,
            &scene_layout,
            &texture_layout,
            &object_layout,
        );

        Self {
            pipeline,
            texture_layout,
            object_layout,
            scene_buffer,
            scene_bind_group,
            blank_texture,
        }
    }

    pub fn upload_targets<'a>(
        &'a self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
    ) -> UploadTargets<'a> {
        UploadTargets {
            device,
            queue,
            texture_layout: &self.texture_layout,
            object_layout: &self.object_layout,
            blank_texture: &self.blank_texture,
        }
    }
}

/// Depth buffer plus, when multisampling, the colour target resolved into the frame.
#[derive(Debug)]
pub struct RenderTargets {
    pub depth: Texture,
    pub msaa: Option<Texture>,
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let depth = Texture::create_depth_texture(device, size, sample_count, "depth_texture");
        let msaa = (sample_count > 1)
            .then(|| Texture::create_msaa_target(device, size, format, sample_count));
        Self { depth, msaa }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub targets: RenderTargets,
    pub resources: SceneResources,
    pub projection: Projection,
    pub light: Light,
    pub clear_colour: wgpu::Color,
    pub sample_count: u32,
}

impl Context {
    pub async fn new(window: Arc<Window>, viewer: &ViewerConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an Srgb surface for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = viewer.sample_count;
        let targets = RenderTargets::new(
            &device,
            [config.width, config.height],
            config.format,
            sample_count,
        );
        let resources = SceneResources::new(&device, &queue, config.format, sample_count);
        let projection = Projection::new(
            config.width,
            config.height,
            viewer.fovy,
            viewer.znear,
            viewer.zfar,
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            targets,
            resources,
            projection,
            light: Light::new(viewer.light),
            clear_colour: viewer.clear_colour,
            sample_count,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigures the surface and recreates the size-dependent targets.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.projection.resize(width, height);
            self.surface.configure(&self.device, &self.config);
            self.targets = RenderTargets::new(
                &self.device,
                [width, height],
                self.config.format,
                self.sample_count,
            );
        }
    }

    pub fn upload_targets(&self) -> UploadTargets<'_> {
        self.resources.upload_targets(&self.device, &self.queue)
    }
}
