use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_4;

use crate::geometry::BoundingBox;

/// Keep the camera off the poles so `look_at` stays well defined.
const MAX_TILT: f32 = 1.5;

/// Zoom range, as multiples of the framed scene radius.
const MIN_DISTANCE_FACTOR: f32 = 0.05;
const MAX_DISTANCE_FACTOR: f32 = 20.0;

/// Distance to the target when framing, as a multiple of the box diagonal.
const FRAME_DISTANCE_FACTOR: f32 = 1.5;

/// An orbit camera circling a target point.
pub struct OrbitCamera {
    /// Point the camera looks at.
    pub target: Vec3,
    /// Distance from the target.
    pub distance: f32,
    /// Horizontal rotation angle (radians), unlimited.
    pub yaw: f32,
    /// Vertical tilt angle (radians), clamped short of the poles.
    pub pitch: f32,
    /// Vertical field of view (radians).
    pub fov_y: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Radius of the framed content; scales zoom limits and clip planes.
    pub scene_radius: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 3.0,
            yaw: 0.6,
            pitch: 0.4,
            fov_y: FRAC_PI_4,
            aspect: 1.0,
            near: 0.01,
            far: 100.0,
            scene_radius: 1.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset from the target to the eye.
    fn offset(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        Vec3::new(x, y, z)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.target + self.offset()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotate around the target. Yaw is free, pitch is clamped.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_TILT, MAX_TILT);
    }

    /// Move the target in the view plane. Deltas are fractions of the
    /// viewport height.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = -self.offset().normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        // One screen height at the target depth.
        let extent = 2.0 * self.distance * (self.fov_y * 0.5).tan();
        self.target += (-right * dx + up * dy) * extent;
    }

    /// Multiplicative zoom; positive `delta` moves closer.
    pub fn zoom(&mut self, delta: f32) {
        let min = self.scene_radius * MIN_DISTANCE_FACTOR;
        let max = self.scene_radius * MAX_DISTANCE_FACTOR;
        self.distance = (self.distance * (-delta).exp()).clamp(min, max);
    }

    /// Look at the center of `bounds` from far enough to see all of it.
    ///
    /// The viewing direction is kept. An empty box leaves the camera as is.
    pub fn frame(&mut self, bounds: &BoundingBox) {
        if bounds.is_empty() {
            return;
        }
        let diagonal = bounds.diagonal().max(1e-3);
        self.target = bounds.center();
        self.scene_radius = diagonal * 0.5;
        self.distance = diagonal * FRAME_DISTANCE_FACTOR;
        self.near = diagonal * 1e-3;
        self.far = diagonal * 100.0;
        log::debug!(
            "Framed camera on {} (diagonal {diagonal:.4})",
            self.target
        );
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

/// Translates mouse input into camera motion.
///
/// Left drag orbits, right drag pans, the wheel zooms.
pub struct CameraController {
    /// Radians per pixel.
    pub rotate_sensitivity: f32,
    /// Zoom exponent per scroll line.
    pub zoom_sensitivity: f32,
    drag: Option<DragMode>,
    last_mouse: Option<(f32, f32)>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            drag: None,
            last_mouse: None,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_rotate(&mut self) {
        self.drag = Some(DragMode::Rotate);
    }

    pub fn begin_pan(&mut self) {
        self.drag = Some(DragMode::Pan);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Returns true if the camera moved.
    ///
    /// `viewport_height` converts pixels into screen fractions for panning.
    pub fn on_mouse_move(
        &mut self,
        x: f32,
        y: f32,
        viewport_height: f32,
        camera: &mut OrbitCamera,
    ) -> bool {
        let last = self.last_mouse.replace((x, y));
        let (Some(mode), Some((last_x, last_y))) = (self.drag, last) else {
            return false;
        };
        let (dx, dy) = (x - last_x, y - last_y);
        match mode {
            DragMode::Rotate => camera.orbit(
                -dx * self.rotate_sensitivity,
                dy * self.rotate_sensitivity,
            ),
            DragMode::Pan => {
                let h = viewport_height.max(1.0);
                camera.pan(dx / h, dy / h);
            }
        }
        true
    }

    pub fn on_scroll(&mut self, delta: f32, camera: &mut OrbitCamera) -> bool {
        camera.zoom(delta * self.zoom_sensitivity);
        true
    }
}
