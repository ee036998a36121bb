//! Headless engine driver.
//!
//! Runs a demo scene for a fixed number of frames without a window or
//! GPU, printing what the pipeline recorded. Useful for smoke-testing
//! the frame loop and for CI environments without a display.

use anyhow::Result;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use vesta_assets::AssetStore;
use vesta_ecs::{
    register_standard_components, Camera, Material, ReflectRegistry, Rotator, StaticMesh,
    Transform,
};
use vesta_input::{InputRouter, Key, KeyAction};
use vesta_kernel::{App, CameraControllerSystem, RotatorSystem, Scene};
use vesta_render::modules::{DepthMapPass, MeshRenderModule};
use vesta_render::{Framebuffer, RenderPipeline, Viewport};
use vesta_tools::EcsInspector;

#[derive(Parser)]
#[command(name = "vesta", about = "Headless driver for the Vesta engine core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of the demo scene without running it.
    Info,
    /// Run the demo scene headless for a number of frames.
    Run {
        /// Frames to simulate.
        #[arg(long, default_value_t = 120)]
        frames: u32,
        /// Seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Hold W for the first half of the run to exercise the axes.
        #[arg(long, default_value_t = false)]
        drive_camera: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Info => info(),
        Command::Run {
            frames,
            dt,
            drive_camera,
        } => run(frames, dt, drive_camera),
    }
}

fn info() -> Result<()> {
    let app = demo_app()?;
    let mut registry = ReflectRegistry::new();
    register_standard_components(&mut registry);
    let inspector = EcsInspector::new(&registry);
    print!("{}", inspector.summary(app.scene().ecs()));
    println!("viewports: {}", app.pipeline().viewport_count());
    Ok(())
}

fn run(frames: u32, dt: f32, drive_camera: bool) -> Result<()> {
    let mut app = demo_app()?;
    app.start();

    if drive_camera {
        app.input_mut().on_key(Key::W, KeyAction::Press);
    }

    let mut dirty_frames = 0u32;
    for frame in 0..frames {
        if drive_camera && frame == frames / 2 {
            app.input_mut().on_key(Key::W, KeyAction::Release);
        }
        let report = app.frame(dt);
        if !report.is_clean() {
            dirty_frames += 1;
        }
        if app.should_quit() {
            break;
        }
    }
    app.exit();

    let fb = app.pipeline().framebuffer();
    println!(
        "presented {} frames ({} with failures), last frame recorded {} draws",
        fb.presented_frames(),
        dirty_frames,
        fb.commands().len()
    );
    Ok(())
}

/// A spinning cube in front of a controllable camera.
fn demo_app() -> Result<App> {
    let mut assets = AssetStore::new();
    let cube_mesh = assets.register_default_cube();
    let shader = assets.register_shader(vesta_assets::Shader {
        name: "standard".into(),
    });
    let texture = assets.register_texture(vesta_assets::Texture {
        name: "checker".into(),
        unit: 0,
    });

    let mut scene = Scene::new();
    let ecs = scene.ecs_mut();

    let camera = ecs.create_entity();
    ecs.add_component(
        camera,
        Transform {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Transform::default()
        },
    )?;
    ecs.add_component(camera, Camera::default())?;

    let cube = ecs.create_entity();
    ecs.add_component(cube, Transform::default())?;
    ecs.add_component(cube, StaticMesh::new(cube_mesh))?;
    ecs.add_component(
        cube,
        Material {
            shader,
            texture,
            lit: true,
            shininess: 32.0,
        },
    )?;
    ecs.add_component(cube, Rotator::default())?;

    scene
        .scheduler_mut()
        .register_system::<CameraControllerSystem>();
    scene.scheduler_mut().register_system::<RotatorSystem>();
    scene.set_on_start(|_| tracing::info!("demo scene started"));
    scene.set_on_exit(|_| tracing::info!("demo scene exited"));

    let mut pipeline = RenderPipeline::new(Framebuffer::new(1280, 720));
    let mut viewport = Viewport::new(0, 0, 1280, 720);
    viewport.bind_camera(camera);
    pipeline.add_viewport(viewport);
    pipeline.add_pre_pass(Box::new(DepthMapPass::default()));
    pipeline.add_module(Box::new(MeshRenderModule));

    Ok(App::new(
        scene,
        InputRouter::with_default_bindings(),
        pipeline,
    ))
}
