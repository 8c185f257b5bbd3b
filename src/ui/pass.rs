//! egui integration: winit input in, tessellated primitives out, one
//! render pass on top of the composited surface.
//!
//! Per frame:
//!
//! ```text
//! handle_input()      // forward winit events to egui
//! begin_frame()       // start an egui pass
//! … build UI via context() …
//! end_frame()         // tessellate shapes, capture texture delta
//! prepare(ctx)        // upload textures & geometry to the GPU
//! draw(encoder, view) // record the egui render pass
//! ```

use winit::event::WindowEvent;
use winit::window::Window;

use crate::gpu::GpuContext;

pub struct UiPass {
    egui_ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,

    clipped_primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_descriptor: egui_wgpu::ScreenDescriptor,
}

impl UiPass {
    pub fn new(ctx: &GpuContext) -> Self {
        let window = ctx.window();
        let size = window.inner_size();
        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());

        let id = egui_ctx.viewport_id();
        let state = egui_winit::State::new(egui_ctx.clone(), id, window, None, None, None);

        let renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.format(), None, 1, false);

        Self {
            egui_ctx,
            state,
            renderer,
            clipped_primitives: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Forward a window event to egui. Returns `true` if egui consumed it.
    /// Button releases are never reported as consumed so a drag that ends
    /// over a widget still ends for the orbit controls.
    pub fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);

        if let WindowEvent::MouseInput {
            state: winit::event::ElementState::Released,
            ..
        } = event
        {
            return false;
        }

        response.consumed
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.egui_ctx.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) {
        let egui::FullOutput {
            shapes,
            textures_delta,
            platform_output,
            pixels_per_point,
            ..
        } = self.egui_ctx.end_pass();

        self.state.handle_platform_output(window, platform_output);
        self.textures_delta.append(textures_delta);
        self.clipped_primitives = self.egui_ctx.tessellate(shapes, pixels_per_point);
        self.screen_descriptor.pixels_per_point = pixels_per_point;
    }

    pub fn context(&self) -> &egui::Context {
        &self.egui_ctx
    }

    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.screen_descriptor.size_in_pixels = [width, height];
        self.screen_descriptor.pixels_per_point = scale_factor;
    }

    /// True while the pointer is over an egui widget or a drag started on one
    pub fn wants_pointer_input(&self) -> bool {
        self.egui_ctx.wants_pointer_input()
    }

    /// Upload texture changes and geometry for this frame
    pub fn prepare(&mut self, ctx: &GpuContext) {
        let device = &ctx.device;
        let queue = &ctx.queue;

        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui Buffer Upload"),
        });
        let user_cmd_bufs = self.renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &self.clipped_primitives,
            &self.screen_descriptor,
        );
        let mut cmd_bufs: Vec<wgpu::CommandBuffer> = Vec::with_capacity(1 + user_cmd_bufs.len());
        cmd_bufs.push(encoder.finish());
        cmd_bufs.extend(user_cmd_bufs);
        queue.submit(cmd_bufs);

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }

        self.textures_delta.set.clear();
        self.textures_delta.free.clear();
    }

    /// Draw the UI over whatever is already in `view`
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut rpass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        self.renderer
            .render(&mut rpass, &self.clipped_primitives, &self.screen_descriptor);
    }
}
