mod app;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use winit::event_loop::{ControlFlow, EventLoop};

use app::Demo;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliDemo {
    Mesh,
    Network,
    Points,
    Primitives,
}

impl From<CliDemo> for Demo {
    fn from(value: CliDemo) -> Self {
        match value {
            CliDemo::Mesh => Demo::Mesh,
            CliDemo::Network => Demo::Network,
            CliDemo::Points => Demo::Points,
            CliDemo::Primitives => Demo::Primitives,
        }
    }
}

/// meshlens - interactive viewer for polygon meshes and glyph overlays
#[derive(Parser, Debug)]
#[command(name = "meshlens", version, about)]
struct Cli {
    /// OBJ file to open. Without it a built-in demo scene is shown.
    path: Option<PathBuf>,

    /// Built-in scene to show when no file is given
    #[arg(long, value_enum, default_value_t = CliDemo::Mesh)]
    demo: CliDemo,

    /// Use smooth vertex normals (sum of incident face normals) instead of flat ones
    #[arg(long)]
    smooth: bool,

    /// Show face normals as arrow glyphs
    #[arg(long)]
    face_vectors: bool,

    /// Animate vector glyph size and color every frame
    #[arg(long)]
    animate: bool,

    /// Sphere radius for point clouds (defaults to a fraction of the cloud size)
    #[arg(long, value_name = "RADIUS")]
    point_radius: Option<f32>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = app::AppConfig {
        path: cli.path,
        demo: cli.demo.into(),
        smooth: cli.smooth,
        face_vectors: cli.face_vectors,
        animate: cli.animate,
        point_radius: cli.point_radius,
    };

    let (scene, vector_meshes) = config.build_scene();

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(config, scene, vector_meshes);
    event_loop
        .run_app(&mut app)
        .expect("Failed to run application");
}
