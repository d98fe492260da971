//! Window and event loop.
//!
//! [`App`] owns the window, the renderer and the simulation. Window events go
//! to both egui and [`Input`]. Each redraw turns the collected input into
//! camera moves, picks and UI actions (skipping pointer or keyboard input
//! egui is using), ticks the simulation and renders.

use std::sync::Arc;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::{AppConfig, Theme};
use crate::controls::Command;
use crate::error::AppError;
use crate::gpu::{scene_uniforms, Camera, EguiIntegration, FrameData, GpuState};
use crate::input::{Input, KeyCode};
use crate::picking::pick;
use crate::scene::{pick_proxies, BodyInstances, StaticScene};
use crate::selection::Pulse;
use crate::simulation::SimulationContext;
use crate::ui::{self, Action, UiState};

const SHORTCUT_KEYS: [KeyCode; 8] = [
    KeyCode::Space,
    KeyCode::Escape,
    KeyCode::R,
    KeyCode::T,
    KeyCode::H,
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
];

/// Open the viewer window and run until it is closed.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let sim = SimulationContext::from_config(&config)?;
    info!(bodies = sim.registry().len(), "simulation ready");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, sim);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// GPU-side state, created once the window exists.
struct Graphics {
    window: Arc<Window>,
    gpu: GpuState,
    egui: EguiIntegration,
    applied_theme: Theme,
}

struct App {
    config: AppConfig,
    sim: SimulationContext,
    scene: StaticScene,
    camera: Camera,
    input: Input,
    ui: UiState,
    pulse: Option<Pulse>,
    graphics: Option<Graphics>,
    error: Option<AppError>,
}

impl App {
    fn new(config: AppConfig, sim: SimulationContext) -> Self {
        let scene = StaticScene::generate(&sim, &config.scene);
        let camera = Camera::new(&config.camera);
        let ui = UiState::new(config.theme);
        Self {
            config,
            sim,
            scene,
            camera,
            input: Input::new(),
            ui,
            pulse: None,
            graphics: None,
            error: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<Graphics, AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            &self.scene,
            self.config.scene.sphere_segments,
            self.config.scene.ring_segments,
        ))?;
        let egui = EguiIntegration::new(gpu.device(), gpu.config.format, &window, self.ui.theme());

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        Ok(Graphics {
            window,
            gpu,
            egui,
            applied_theme: self.ui.theme(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: AppError) {
        error!("{}", e);
        self.error = Some(e);
        event_loop.exit();
    }

    /// Turn this frame's input into camera moves, picks and actions.
    fn process_input(&mut self, aspect: f32, egui_pointer: bool, egui_keyboard: bool) {
        if !egui_keyboard {
            for key in SHORTCUT_KEYS {
                if self.input.key_pressed(key) {
                    if let Some(action) = ui::shortcut(key) {
                        self.ui.handle(&mut self.sim, action);
                    }
                }
            }
        }

        if egui_pointer {
            return;
        }

        let drag = self.input.drag_delta();
        if drag != glam::Vec2::ZERO {
            self.camera.orbit(drag.x, drag.y);
        }
        let scroll = self.input.scroll_delta();
        if scroll != 0.0 {
            self.camera.zoom(scroll);
        }

        if let Some(ndc) = self.input.click() {
            let inverse = self.camera.view_projection(aspect).inverse();
            let proxies = pick_proxies(&self.sim, self.pulse.as_ref());
            if let Some(id) = pick(ndc, inverse, &proxies) {
                self.ui.handle(&mut self.sim, Action::Sim(Command::Select(id)));
                self.pulse = Some(Pulse::new(id));
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(mut graphics) = self.graphics.take() else {
            return;
        };

        let aspect = graphics.gpu.aspect();
        self.process_input(
            aspect,
            graphics.egui.wants_pointer(),
            graphics.egui.wants_keyboard(),
        );

        let delta = self.sim.advance_frame();
        self.ui.update(delta);
        if let Some(pulse) = &mut self.pulse {
            if !pulse.advance(delta) {
                self.pulse = None;
            }
        }

        let window = graphics.window.clone();
        let sim = &self.sim;
        let ui_state = &self.ui;
        let mut actions = Vec::new();
        let egui_output = graphics.egui.run(&window, |ctx| {
            actions = ui::draw(ctx, sim, ui_state);
        });
        self.ui
            .set_viewport_height(graphics.egui.ctx.screen_rect().height());
        for action in actions {
            self.ui.handle(&mut self.sim, action);
        }

        if self.ui.theme() != graphics.applied_theme {
            graphics.egui.set_theme(self.ui.theme());
            graphics.applied_theme = self.ui.theme();
        }

        let background = self.ui.theme().background();
        let bodies = BodyInstances::build(&self.sim, self.pulse.as_ref());
        let frame = FrameData {
            uniforms: scene_uniforms(&self.camera, aspect, background, self.config.scene.fog_density),
            background,
            bodies: &bodies,
        };

        match graphics.gpu.render(&frame, &mut graphics.egui, &egui_output) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                graphics.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {:?}", e),
        }

        self.input.begin_frame();
        graphics.window.request_redraw();
        self.graphics = Some(graphics);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.init_graphics(event_loop) {
            Ok(graphics) => {
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        graphics.egui.on_window_event(&graphics.window, &event);
        // Always tracked; egui's claims are checked per frame
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                graphics.gpu.resize(size);
                self.input.set_window_size(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
