use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gazehunt_common::{Eye, EyeGaze, Pose};
use gazehunt_render::{DebugTextRenderer, RecordingRenderer, Renderer, SceneMeshes};
use gazehunt_scene::{FixedPose, FrameLoop, PoseSource, Scene, SceneConfig, YawSweep};
use gazehunt_tools::SceneInspector;
use glam::{Quat, Vec3};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gazehunt-cli", about = "Headless host for the gaze-hunt scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML). Defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective scene config as YAML
    Config,
    /// Run the frame loop against a synthetic head
    Run {
        /// Number of frames to render
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Sweep the head left and right by this many degrees (0 = hold still)
        #[arg(short, long, default_value = "0")]
        sweep: f32,
        /// Frames per sweep cycle
        #[arg(short, long, default_value = "240")]
        period: u64,
        /// Print per-frame reports as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Render one frame with the head turned and report what it sees
    Gaze {
        /// Head yaw in degrees (positive turns left)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        yaw: f32,
        /// Head pitch in degrees (positive looks up)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pitch: f32,
        /// Eye-tracked gaze yaw in degrees; enables the eye-tracker ray
        #[arg(long, allow_hyphen_values = true)]
        eye_yaw: Option<f32>,
        /// Eye-tracked gaze pitch in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        eye_pitch: f32,
        /// IPD in meters reported with the eye-tracker sample
        #[arg(long, default_value = "0.063")]
        ipd: f32,
        /// Dump the draw list of each eye
        #[arg(long)]
        draws: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("gazehunt-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", gazehunt_common::crate_info());
            println!("pose: {}", gazehunt_pose::crate_info());
            println!("scene: {}", gazehunt_scene::crate_info());
            println!("render: {}", gazehunt_render::crate_info());
            println!("tools: {}", gazehunt_tools::crate_info());
        }
        Commands::Config => {
            config.validate()?;
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Run {
            frames,
            sweep,
            period,
            json,
        } => {
            tracing::info!(frames, sweep, period, "starting headless run");
            let scene = Scene::new(config)?;
            if sweep == 0.0 {
                run(scene, FixedPose::default(), frames, json)?;
            } else {
                run(scene, YawSweep::new(sweep.to_radians(), period), frames, json)?;
            }
        }
        Commands::Gaze {
            yaw,
            pitch,
            eye_yaw,
            eye_pitch,
            ipd,
            draws,
        } => {
            let mut scene = Scene::new(config)?;
            let head = Pose::new(yaw_pitch(yaw, pitch), Vec3::ZERO);
            let eye_gaze = eye_yaw.map(|eye_yaw| {
                EyeGaze::new(Pose::new(yaw_pitch(eye_yaw, eye_pitch), Vec3::ZERO), ipd)
            });
            let frame = scene.begin_frame_with_gaze(&head, eye_gaze.as_ref());
            print!("{}", SceneInspector::inspect_frame(&scene, &frame));

            if draws {
                let meshes = SceneMeshes::build();
                let mut renderer = DebugTextRenderer::new();
                for eye in Eye::ALL {
                    let commands = scene.draw_eye(&frame, eye).draw_commands(&meshes);
                    print!("{}", renderer.render(eye, &commands)?);
                }
            }
        }
    }

    Ok(())
}

fn yaw_pitch(yaw_degrees: f32, pitch_degrees: f32) -> Quat {
    Quat::from_rotation_y(yaw_degrees.to_radians()) * Quat::from_rotation_x(pitch_degrees.to_radians())
}

fn run<P: PoseSource>(scene: Scene, poses: P, frames: u64, json: bool) -> anyhow::Result<()> {
    let mut fl = FrameLoop::new(scene, poses, RecordingRenderer::new());
    let reports = fl.run(frames)?;

    if json {
        for report in &reports {
            println!("{}", serde_json::to_string(report)?);
        }
    }

    let summary = SceneInspector::summary(fl.scene());
    let events = SceneInspector::list_events(fl.scene());
    let looking = reports.iter().filter(|r| r.looking_at_cube).count();
    println!("{summary}");
    println!(
        "Frames: {} rendered, {} looking at cube, {} draws submitted",
        reports.len(),
        looking,
        fl.renderer().draw_count()
    );
    for event in &events {
        println!("  {}", serde_json::to_string(event)?);
    }
    Ok(())
}
