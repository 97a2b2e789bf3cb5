use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use meshlens::geometry::save_obj;
use meshlens::render::{CameraController, GpuContext, OrbitCamera, Renderer, Uniforms};
use meshlens::scene::{Drawable, Property, Scene};
use meshlens::util::Timed;

const LIGHT_DIR: Vec3 = Vec3::new(-0.5, -0.8, -0.5);

/// Phase advance per frame of the glyph animation.
const ANIMATION_SPEED: f32 = 0.02;

const EXPORT_PATH: &str = "meshlens_export.obj";

/// Oscillates vector glyph size and color on the listed meshes.
pub struct Animation {
    pub meshes: Vec<String>,
    pub time: f32,
    pub running: bool,
}

impl Animation {
    pub fn new(meshes: Vec<String>) -> Self {
        Self {
            meshes,
            time: 0.0,
            running: true,
        }
    }

    fn step(&mut self, scene: &mut Scene) {
        if !self.running {
            return;
        }
        self.time += ANIMATION_SPEED;
        let scale = 1.0 + self.time.sin() * 0.5;
        let t = (self.time.sin() + 1.0) * 0.5;
        let color = Vec3::new(1.0 - t, t, 0.0);

        for name in &self.meshes {
            let Some(visual) = scene.mesh_mut(name) else {
                continue;
            };
            for (_, property) in visual.properties_mut() {
                if let Some(vectors) = property.as_face_vectors_mut() {
                    vectors.set_length(scale).set_radius(scale).set_color(color);
                }
            }
        }
    }
}

pub struct AppState {
    pub window: Arc<Window>,
    pub gpu: GpuContext,
    pub renderer: Renderer,
    pub camera: OrbitCamera,
    pub camera_controller: CameraController,

    pub scene: Scene,
    pub animation: Option<Animation>,
    /// Scene revision the camera was last framed on.
    framed_revision: Option<u64>,

    pub frame_count: u32,
    pub fps_update_time: Instant,
    pub current_fps: f32,
}

impl AppState {
    pub async fn new(window: Arc<Window>, scene: Scene, animation: Option<Animation>) -> Self {
        let gpu = {
            let _t = Timed::info("Initialize GPU");
            GpuContext::new(window.clone(), true).await
        };

        let mut camera = OrbitCamera::new();
        camera.set_aspect(gpu.aspect());
        let camera_controller = CameraController::new();

        let initial_uniforms =
            Uniforms::new(camera.view_projection(), camera.eye_position(), LIGHT_DIR);
        let renderer = Renderer::new(&gpu, &initial_uniforms);

        log::info!("Ready! Left drag to rotate, right drag to pan, scroll to zoom.");
        log::info!("  W: wireframe | M: mesh fill | V: vectors | C: face colors");
        log::info!("  [ ]: glyph radius | - =: vector length | F: frame scene");
        log::info!("  Space: pause animation | S: save first mesh as OBJ | Esc: quit");

        Self {
            window,
            gpu,
            renderer,
            camera,
            camera_controller,
            scene,
            animation,
            framed_revision: None,
            frame_count: 0,
            fps_update_time: Instant::now(),
            current_fps: 0.0,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.camera.set_aspect(self.gpu.aspect());
        self.renderer
            .resize(&self.gpu.device, self.gpu.size.width, self.gpu.size.height);
    }

    /// Center the camera on everything in the scene.
    pub fn frame_scene(&mut self) {
        self.camera.frame(&self.scene.bounds());
        self.framed_revision = Some(self.scene.revision());
    }

    pub fn toggle_wireframe(&mut self) {
        for (_, drawable) in self.scene.iter_mut() {
            if let Drawable::Mesh(m) = drawable {
                m.set_wireframe_visible(!m.show_wireframe());
            }
        }
    }

    pub fn toggle_mesh_fill(&mut self) {
        for (_, drawable) in self.scene.iter_mut() {
            if let Drawable::Mesh(m) = drawable {
                m.set_mesh_visible(!m.show_mesh());
            }
        }
    }

    /// Toggle every property of the given kind on every mesh.
    pub fn toggle_properties(&mut self, vectors: bool) {
        for (_, drawable) in self.scene.iter_mut() {
            let Drawable::Mesh(m) = drawable else {
                continue;
            };
            for (_, property) in m.properties_mut() {
                if matches!(property, Property::FaceVectors(_)) == vectors {
                    property.set_visible(!property.visible());
                }
            }
        }
    }

    /// Multiply the thickness of every glyph in the scene.
    pub fn scale_glyph_radius(&mut self, factor: f32) {
        for (_, drawable) in self.scene.iter_mut() {
            match drawable {
                Drawable::Mesh(m) => {
                    for (_, property) in m.properties_mut() {
                        if let Some(vectors) = property.as_face_vectors_mut() {
                            let radius = vectors.radius() * factor;
                            vectors.set_radius(radius);
                        }
                    }
                }
                Drawable::PointCloud(p) => {
                    let radius = p.radius() * factor;
                    p.set_radius(radius);
                }
                Drawable::LineNetwork(l) => {
                    let radius = l.radius() * factor;
                    l.set_radius(radius);
                }
            }
        }
    }

    pub fn scale_vector_length(&mut self, factor: f32) {
        for (_, drawable) in self.scene.iter_mut() {
            let Drawable::Mesh(m) = drawable else {
                continue;
            };
            for (_, property) in m.properties_mut() {
                if let Some(vectors) = property.as_face_vectors_mut() {
                    let length = vectors.length() * factor;
                    vectors.set_length(length);
                }
            }
        }
    }

    pub fn toggle_animation(&mut self) {
        if let Some(animation) = &mut self.animation {
            animation.running = !animation.running;
        }
    }

    /// Write the first mesh in the scene to an OBJ file, triangulated so the
    /// reader accepts it back.
    pub fn export_first_mesh(&self) {
        let mesh = self.scene.iter().find_map(|(_, d)| match d {
            Drawable::Mesh(m) => Some(m.mesh()),
            _ => None,
        });
        match mesh {
            Some(mesh) => {
                let mut mesh = mesh.clone();
                mesh.triangulate();
                if let Err(e) = save_obj(EXPORT_PATH, &mesh) {
                    log::error!("Export failed: {e}");
                }
            }
            None => log::warn!("No mesh to export"),
        }
    }

    pub fn render(&mut self) {
        if let Some(animation) = &mut self.animation {
            animation.step(&mut self.scene);
        }
        if self.framed_revision != Some(self.scene.revision()) {
            self.frame_scene();
        }

        self.renderer.sync(&self.gpu, &self.scene);

        let uniforms = Uniforms::new(
            self.camera.view_projection(),
            self.camera.eye_position(),
            LIGHT_DIR,
        );
        self.renderer.render(&mut self.gpu, &uniforms);

        self.update_fps();
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.fps_update_time);
        if elapsed < Duration::from_secs(1) {
            return;
        }

        self.current_fps = self.frame_count as f32 / elapsed.as_secs_f32();
        self.frame_count = 0;
        self.fps_update_time = now;

        self.window.set_title(&format!(
            "meshlens | {} drawables | {:.0} FPS",
            self.scene.len(),
            self.current_fps
        ));
    }
}
