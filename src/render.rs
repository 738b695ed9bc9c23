//! Frame pacing and the draw pass.
//!
//! Each render tick runs in two halves. [`FrameRenderer::update`] is pure CPU
//! work: measure elapsed time, advance animations, recompute the view.
//! [`FrameRenderer::render`] uploads uniforms and draws every object in registry
//! order. Keeping them apart lets the CPU half run without a GPU.
//!
//! # Key types
//!
//! - [`FrameClock`] measures time between ticks
//! - [`TickTimer`] decides when the next tick is due
//! - [`FrameTarget`] names the views a frame is drawn into

use cgmath::{Matrix4, SquareMatrix};
use instant::{Duration, Instant};

use crate::{
    camera::Camera,
    context::{Context, SceneResources},
    data_structures::scene::SceneRegistry,
    pipelines::{
        light::{Light, SceneUniform},
        phong::ObjectUniform,
    },
};

/// Elapsed-time source for render ticks. The first tick reports zero.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn tick(&mut self, now: Instant) -> Duration {
        let elapsed = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        elapsed
    }
}

/// Fixed-delay tick scheduling.
///
/// The next tick is due `interval` after the previous one finished, however long
/// that tick took.
#[derive(Debug, Clone, Copy)]
pub struct TickTimer {
    interval: Duration,
    next: Instant,
}

impl TickTimer {
    /// The first tick is due immediately.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
        }
    }

    pub fn due(&self, now: Instant) -> bool {
        now >= self.next
    }

    pub fn rearm(&mut self, now: Instant) {
        self.next = now + self.interval;
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }
}

/// Views a frame is drawn into.
///
/// With multisampling, `color` is the MSAA target and `resolve` the frame that
/// gets presented; otherwise `color` is the frame and `resolve` is `None`.
pub struct FrameTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub resolve: Option<&'a wgpu::TextureView>,
    pub depth: &'a wgpu::TextureView,
}

#[derive(Debug)]
pub struct FrameRenderer {
    clock: FrameClock,
    view: Matrix4<f32>,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self {
            clock: FrameClock::default(),
            view: Matrix4::identity(),
        }
    }

    /// View matrix computed by the last [`update`](Self::update).
    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    /// CPU half of a tick. Returns the elapsed time it advanced the scene by.
    pub fn update(&mut self, now: Instant, registry: &mut SceneRegistry, camera: &Camera) -> Duration {
        let elapsed = self.clock.tick(now);
        registry.advance(elapsed);
        self.view = camera.view_matrix();
        elapsed
    }

    /// Object uniforms for the current view, in registry order.
    pub fn object_uniforms(&self, registry: &SceneRegistry) -> Vec<ObjectUniform> {
        registry
            .objects()
            .iter()
            .map(|object| object.uniform(self.view))
            .collect()
    }

    pub fn scene_uniform(&self, projection: Matrix4<f32>, light: &Light) -> SceneUniform {
        SceneUniform::new(projection, self.view, light)
    }

    /// Writes all uniforms and records the draw pass into a new command buffer.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        resources: &SceneResources,
        scene: SceneUniform,
        clear_colour: wgpu::Color,
        target: FrameTarget<'_>,
        registry: &SceneRegistry,
    ) -> wgpu::CommandBuffer {
        queue.write_buffer(&resources.scene_buffer, 0, bytemuck::cast_slice(&[scene]));
        for (object, uniform) in registry.objects().iter().zip(self.object_uniforms(registry)) {
            if let Some(gpu) = &object.gpu {
                queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color,
                    resolve_target: target.resolve,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&resources.pipeline);
            render_pass.set_bind_group(0, &resources.scene_bind_group, &[]);
            for (i, object) in registry.objects().iter().enumerate() {
                let Some(gpu) = &object.gpu else {
                    log::warn!("Scene object {} has no GPU state and is skipped", i);
                    continue;
                };
                let texture = if object.apply_texture {
                    gpu.texture_bind_group.as_ref()
                } else {
                    resources.blank_texture.as_ref()
                };
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.set_bind_group(2, &gpu.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.draw(0..gpu.vertex_count, 0..1);
            }
        }
        encoder.finish()
    }

    /// GPU half of a tick: draws into the window surface and presents.
    pub fn render(&self, ctx: &Context, registry: &SceneRegistry) -> Result<(), wgpu::SurfaceError> {
        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let target = match &ctx.targets.msaa {
            Some(msaa) => FrameTarget {
                color: &msaa.view,
                resolve: Some(&view),
                depth: &ctx.targets.depth.view,
            },
            None => FrameTarget {
                color: &view,
                resolve: None,
                depth: &ctx.targets.depth.view,
            },
        };

        let scene = self.scene_uniform(ctx.projection.calc_matrix(), &ctx.light);
        let commands = self.draw(
            &ctx.device,
            &ctx.queue,
            &ctx.resources,
            scene,
            ctx.clear_colour,
            target,
            registry,
        );
        ctx.queue.submit(std::iter::once(commands));
        output.present();
        Ok(())
    }

    /// One full render tick: update followed by render.
    pub fn tick(
        &mut self,
        now: Instant,
        ctx: &Context,
        registry: &mut SceneRegistry,
        camera: &Camera,
    ) -> Result<Duration, wgpu::SurfaceError> {
        let elapsed = self.update(now, registry, camera);
        self.render(ctx, registry)?;
        Ok(elapsed)
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}
