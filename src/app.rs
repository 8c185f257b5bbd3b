//! Application shell: winit event loop wiring input, UI, loader, scene
//! composer and renderer together.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::{Camera, OrbitControls};
use crate::catalog::CATALOG;
use crate::config::ViewerConfig;
use crate::controls::ShaderControls;
use crate::error::{Result, ViewerError};
use crate::gpu::{GpuContext, Renderer};
use crate::input::PointerInput;
use crate::loading::{LoaderEvent, TextureLoader};
use crate::scene;
use crate::state::{ViewerEvent, ViewerState};
use crate::ui::{Sidebar, UiPass, controls_panel, overlay};

/// Everything that exists once the window is up
struct Viewer {
    config: ViewerConfig,
    gpu_ctx: GpuContext,
    renderer: Renderer,
    ui: UiPass,
    sidebar: Sidebar,
    loader: TextureLoader,

    state: ViewerState,
    controls: ShaderControls,
    camera: Camera,
    orbit: OrbitControls,
    input: PointerInput,
    last_frame: Instant,
}

impl Viewer {
    fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        let gpu_ctx = GpuContext::new(window)?;
        let (width, height) = gpu_ctx.size;
        let scene_size = config.scene_resolution(gpu_ctx.size, gpu_ctx.scale_factor());
        let renderer = Renderer::new(&gpu_ctx, scene_size);
        let ui = UiPass::new(&gpu_ctx);

        let max_texture = gpu_ctx.device.limits().max_texture_dimension_2d;
        let mut loader = TextureLoader::new(config.asset_root.clone(), max_texture);
        loader.request_thumbnails(config.thumbnail_size);

        let state = ViewerState::with_selection(config.initial_selection);
        loader.request(state.selected_index());

        let mut camera = config.camera;
        camera.aspect = width as f32 / height as f32;
        let orbit = OrbitControls::for_camera(&camera);

        Ok(Self {
            config,
            gpu_ctx,
            renderer,
            ui,
            sidebar: Sidebar::new(),
            loader,
            state,
            controls: ShaderControls::default(),
            camera,
            orbit,
            input: PointerInput::new(width, height),
            last_frame: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu_ctx.resize((width, height));
        let scale_factor = self.gpu_ctx.scale_factor();
        let scene_size = self.config.scene_resolution((width, height), scale_factor);
        self.renderer.resize(&self.gpu_ctx, scene_size);
        self.ui.resize(width, height, scale_factor as f32);
        self.input.handle_resize(width, height);
        self.camera.aspect = width as f32 / height as f32;
    }

    /// Pointer events go to egui first; the orbit controls only see what
    /// egui did not consume.
    fn handle_pointer(&mut self, event: &WindowEvent) {
        if self.ui.handle_input(self.gpu_ctx.window(), event) {
            if let WindowEvent::CursorMoved { position, .. } = event {
                self.input.sync_cursor(position.x, position.y);
            }
            return;
        }
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_move(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.input.handle_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_input(*state, *button);
            }
            WindowEvent::MouseWheel { delta, .. } => self.input.handle_mouse_wheel(*delta),
            _ => {}
        }
    }

    fn apply_loader_events(&mut self) {
        for event in self.loader.poll() {
            match event {
                LoaderEvent::Thumbnail(index, image) => {
                    self.sidebar.set_thumbnail(self.ui.context(), index, &image);
                }
                LoaderEvent::Progress(index) => {
                    log::debug!(
                        "'{}' at {}%",
                        CATALOG[index].name,
                        self.loader.state(index).percent()
                    );
                }
            }
        }
    }

    fn update_and_render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.apply_loader_events();

        self.ui.begin_frame(self.gpu_ctx.window());
        let egui_ctx = self.ui.context().clone();

        overlay::show_header(&egui_ctx);
        let events = self.sidebar.show(&egui_ctx, &self.state);
        controls_panel::show(&egui_ctx, &mut self.controls);

        let previous = self.state.selected_index();
        self.state = self.state.reduce_all(&events);
        if events.iter().any(|e| matches!(e, ViewerEvent::Select(_))) {
            let selected = self.state.selected_index();
            if selected != previous {
                log::debug!("Selected '{}'", CATALOG[selected].name);
            }
            // also restarts a failed entry
            self.loader.request(selected);
        }

        let load = self.loader.state(self.state.selected_index());
        if load.is_ready() && !self.ui.wants_pointer_input() {
            self.orbit.update(&mut self.camera, &self.input, dt);
        }

        let frame = scene::compose(
            &self.state,
            &self.controls,
            load,
            &self.camera,
            self.config.clear_color_linear(),
        );
        if let Some(loading) = &frame.overlay {
            overlay::show_loading(&egui_ctx, loading);
        }

        self.ui.end_frame(self.gpu_ctx.window());
        self.input.end_frame();

        self.renderer.render(&self.gpu_ctx, &frame, &mut self.ui)
    }
}

/// Application handler for the winit event loop
struct ViewerApp {
    config: ViewerConfig,
    viewer: Option<Viewer>,
    /// First fatal error, returned from [`run`]
    error: Option<ViewerError>,
}

impl ViewerApp {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            viewer: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let (width, height) = self.config.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(width as f64, height as f64));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match Viewer::new(window, self.config.clone()) {
            Ok(viewer) => {
                println!("=== Phantom Viewer ===");
                println!("Assets: {}", self.config.asset_root.display());
                println!("Controls:");
                println!("  Click thumbnail - Select image");
                println!("  Left drag       - Orbit");
                println!("  Right drag      - Pan");
                println!("  Wheel           - Zoom");
                println!("  ESC             - Exit");
                println!();

                self.viewer = Some(viewer);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let viewer = match &mut self.viewer {
            Some(v) => v,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                viewer.ui.handle_input(viewer.gpu_ctx.window(), &event);
                viewer.resize(size.width, size.height);
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                viewer.ui.handle_input(viewer.gpu_ctx.window(), &event);
                let size = viewer.gpu_ctx.window().inner_size();
                viewer.resize(size.width, size.height);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::CursorMoved { .. }
            | WindowEvent::CursorLeft { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. } => {
                viewer.handle_pointer(&event);
            }

            WindowEvent::RedrawRequested => match viewer.update_and_render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::debug!("Surface lost or outdated, reconfiguring");
                    viewer.gpu_ctx.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of GPU memory");
                    event_loop.exit();
                }
                Err(e) => {
                    log::warn!("Skipping frame: {:?}", e);
                }
            },

            other => {
                viewer.ui.handle_input(viewer.gpu_ctx.window(), &other);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            // Request continuous redraw for damping and load progress
            viewer.gpu_ctx.request_redraw();
        }
    }
}

/// Open the viewer window and run until it is closed
pub fn run(config: ViewerConfig) -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
