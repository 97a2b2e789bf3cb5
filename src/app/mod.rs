pub mod demo;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{WindowAttributes, WindowId},
};

use meshlens::geometry::load_obj;
use meshlens::scene::{Drawable, Scene};

pub use demo::Demo;
pub use state::{Animation, AppState};

/// Glyph size step for the bracket and plus/minus keys.
const SIZE_STEP: f32 = 1.25;

/// Configuration for the app from CLI arguments.
pub struct AppConfig {
    pub path: Option<PathBuf>,
    pub demo: Demo,
    pub smooth: bool,
    pub face_vectors: bool,
    pub animate: bool,
    pub point_radius: Option<f32>,
}

impl AppConfig {
    /// Build the initial scene: the loaded file, or a demo.
    ///
    /// An unreadable file leaves an empty mesh in the scene (the loader logs
    /// why). Returns the scene and the meshes whose vectors should animate.
    pub fn build_scene(&self) -> (Scene, Vec<String>) {
        let mut scene = Scene::new();
        let vector_meshes = match &self.path {
            Some(path) => {
                let mesh = load_obj(path);
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "mesh".to_string());
                demo::add_mesh(&mut scene, &name, mesh, self.smooth, self.face_vectors, false);
                if self.face_vectors {
                    vec![name]
                } else {
                    Vec::new()
                }
            }
            None => demo::build(&mut scene, self.demo, self.smooth, self.face_vectors),
        };

        if let Some(radius) = self.point_radius {
            for (_, drawable) in scene.iter_mut() {
                if let Drawable::PointCloud(cloud) = drawable {
                    cloud.set_radius(radius);
                }
            }
        }
        (scene, vector_meshes)
    }
}

pub struct App {
    pub state: Option<AppState>,
    pub config: AppConfig,
    pending: Option<(Scene, Vec<String>)>,
}

impl App {
    pub fn new(config: AppConfig, scene: Scene, vector_meshes: Vec<String>) -> Self {
        Self {
            state: None,
            config,
            pending: Some((scene, vector_meshes)),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some((scene, vector_meshes)) = self.pending.take() else {
            return;
        };

        let window = Arc::new(
            event_loop
                .create_window(
                    WindowAttributes::default()
                        .with_title("meshlens")
                        .with_inner_size(PhysicalSize::new(1280, 720)),
                )
                .expect("Failed to create window"),
        );

        let animation = self.config.animate.then(|| Animation::new(vector_meshes));
        let state = pollster::block_on(AppState::new(window, scene, animation));
        self.state = Some(state);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => state.resize(new_size),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::KeyW) => state.toggle_wireframe(),
                        PhysicalKey::Code(KeyCode::KeyM) => state.toggle_mesh_fill(),
                        PhysicalKey::Code(KeyCode::KeyV) => state.toggle_properties(true),
                        PhysicalKey::Code(KeyCode::KeyC) => state.toggle_properties(false),
                        PhysicalKey::Code(KeyCode::KeyF) => state.frame_scene(),
                        PhysicalKey::Code(KeyCode::BracketLeft) => {
                            state.scale_glyph_radius(1.0 / SIZE_STEP)
                        }
                        PhysicalKey::Code(KeyCode::BracketRight) => {
                            state.scale_glyph_radius(SIZE_STEP)
                        }
                        PhysicalKey::Code(KeyCode::Minus) => {
                            state.scale_vector_length(1.0 / SIZE_STEP)
                        }
                        PhysicalKey::Code(KeyCode::Equal) => state.scale_vector_length(SIZE_STEP),
                        PhysicalKey::Code(KeyCode::Space) => state.toggle_animation(),
                        PhysicalKey::Code(KeyCode::KeyS) => state.export_first_mesh(),
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        _ => {}
                    }
                    state.window.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state) {
                (MouseButton::Left, ElementState::Pressed) => {
                    state.camera_controller.begin_rotate()
                }
                (MouseButton::Right | MouseButton::Middle, ElementState::Pressed) => {
                    state.camera_controller.begin_pan()
                }
                (_, ElementState::Released) => state.camera_controller.end_drag(),
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                let height = state.gpu.size.height as f32;
                if state.camera_controller.on_mouse_move(
                    position.x as f32,
                    position.y as f32,
                    height,
                    &mut state.camera,
                ) {
                    state.window.request_redraw();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                if state.camera_controller.on_scroll(scroll, &mut state.camera) {
                    state.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => state.render(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            if state.animation.as_ref().is_some_and(|a| a.running) {
                state.window.request_redraw();
            }
        }
    }
}
