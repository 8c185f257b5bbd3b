//! Frame renderer: turns a [`FrameDescription`] into GPU passes.
//!
//! Pass order per frame:
//! 1. Scene pass into the float target (clear, then the displaced plane)
//! 2. Bloom compute passes (only when the post chain is on)
//! 3. Composite onto the surface
//! 4. egui on top of the composite

use super::context::GpuContext;
use super::depth_material::DepthMaterialPipeline;
use super::post::{BloomPass, CompositePipeline, SceneTargets};
use crate::scene::FrameDescription;
use crate::ui::UiPass;

pub struct Renderer {
    targets: SceneTargets,
    material: DepthMaterialPipeline,
    bloom: BloomPass,
    composite: CompositePipeline,
}

impl Renderer {
    /// `scene_size` is the offscreen resolution at the clamped pixel ratio
    pub fn new(ctx: &GpuContext, scene_size: (u32, u32)) -> Self {
        let targets = SceneTargets::new(ctx, scene_size);
        let material = DepthMaterialPipeline::new(ctx);
        let bloom = BloomPass::new(ctx, &targets);
        let mut composite = CompositePipeline::new(ctx);
        composite.bind(ctx, &targets.color.view, bloom.output_view());

        log::debug!("Scene target {}x{}", scene_size.0, scene_size.1);

        Self {
            targets,
            material,
            bloom,
            composite,
        }
    }

    /// Recreate size-dependent targets. No-op when the size is unchanged.
    pub fn resize(&mut self, ctx: &GpuContext, scene_size: (u32, u32)) {
        if scene_size == self.targets.size {
            return;
        }
        log::debug!("Scene target {}x{}", scene_size.0, scene_size.1);
        self.targets = SceneTargets::new(ctx, scene_size);
        self.bloom.resize(ctx, &self.targets);
        self.composite.bind(ctx, &self.targets.color.view, self.bloom.output_view());
    }

    /// Render and present one frame
    pub fn render(&mut self, ctx: &GpuContext, frame: &FrameDescription, ui: &mut UiPass) -> Result<(), wgpu::SurfaceError> {
        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(mesh) = &frame.mesh {
            self.material.prepare(ctx, mesh, frame.view_proj);
        }
        if let Some(post) = &frame.post {
            self.bloom.prepare(ctx, post, self.targets.size);
        }
        self.composite.prepare(ctx, frame.post.as_ref());
        ui.prepare(ctx);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let [r, g, b] = frame.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(mesh) = &frame.mesh {
                self.material.draw(&mut render_pass, mesh);
            }
        }

        if frame.post.is_some() {
            self.bloom.encode(&mut encoder);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.composite.draw(&mut render_pass);
        }

        ui.draw(&mut encoder, &view);

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
