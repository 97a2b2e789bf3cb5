use glam::{Mat4, Vec3};

/// Per-frame camera and lighting, bind group 0 of every pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space.
    pub camera_pos: [f32; 3],
    pub _padding1: f32,
    /// Direction the key light travels (normalized).
    pub light_dir: [f32; 3],
    pub _padding2: f32,
}

const _: () = assert!(std::mem::size_of::<Uniforms>() == 96);

impl Uniforms {
    pub fn new(view_proj: Mat4, camera_pos: Vec3, light_dir: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.to_array(),
            _padding1: 0.0,
            light_dir: light_dir.normalize().to_array(),
            _padding2: 0.0,
        }
    }
}

pub const DEFAULT_WIREFRAME_COLOR: Vec3 = Vec3::ZERO;
pub const DEFAULT_WIREFRAME_WIDTH: f32 = 1.5;

/// Per-mesh drawing style, bind group 1 of the mesh pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshStyle {
    pub wireframe_color: [f32; 4],
    /// Line width in pixels.
    pub wireframe_width: f32,
    /// 1.0 to shade faces, 0.0 for wireframe only.
    pub show_fill: f32,
    /// 1.0 to overlay polygon edges.
    pub show_wireframe: f32,
    pub _padding: f32,
}

const _: () = assert!(std::mem::size_of::<MeshStyle>() == 32);

impl MeshStyle {
    pub fn new(show_fill: bool, show_wireframe: bool) -> Self {
        Self {
            wireframe_color: DEFAULT_WIREFRAME_COLOR.extend(1.0).to_array(),
            wireframe_width: DEFAULT_WIREFRAME_WIDTH,
            show_fill: if show_fill { 1.0 } else { 0.0 },
            show_wireframe: if show_wireframe { 1.0 } else { 0.0 },
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_follow_camera_and_normalize_light() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let u = Uniforms::new(Mat4::IDENTITY, eye, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(u.camera_pos, eye.to_array());
        assert_eq!(u.light_dir, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_mesh_style_flags() {
        let wire_only = MeshStyle::new(false, true);
        assert_eq!(wire_only.show_fill, 0.0);
        assert_eq!(wire_only.show_wireframe, 1.0);
        assert_eq!(wire_only.wireframe_width, DEFAULT_WIREFRAME_WIDTH);
    }
}
