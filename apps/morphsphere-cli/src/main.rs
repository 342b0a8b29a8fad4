use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use glam::Vec3;
use morphsphere_common::ParameterSnapshot;
use morphsphere_render::{DebugTextRenderer, RenderLoop, RenderSettings, Viewport};
use morphsphere_shading::NoiseField;
use morphsphere_timeline::{ParameterChannel, StaticChannel, TimelineChannel};
use morphsphere_tools::{DisplacementProfile, LoopInspector};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "morphsphere-cli", about = "CLI tool for morphsphere inspection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Render settings file (.json, .yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where parameter values come from.
#[derive(Args)]
struct TrackSource {
    /// Timeline project-state file (.json, .yaml)
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Sheet holding the animated object
    #[arg(long, default_value = "Scene")]
    sheet: String,
    /// Object whose tracks drive the mesh
    #[arg(long, default_value = "Shader")]
    object: String,
}

impl TrackSource {
    fn channel(&self) -> anyhow::Result<Option<TimelineChannel>> {
        self.file
            .as_ref()
            .map(|path| {
                TimelineChannel::from_file(path, &self.sheet, &self.object)
                    .with_context(|| format!("loading track {}", path.display()))
            })
            .transpose()
    }

    /// Snapshot at `at` seconds, or the defaults when no file is given.
    fn snapshot_at(&self, at: f32) -> anyhow::Result<ParameterSnapshot> {
        Ok(match self.channel()? {
            Some(mut channel) => {
                channel.playhead_mut().seek(at);
                channel.current_values()
            }
            None => ParameterSnapshot::default(),
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default settings
    Info,
    /// Sample the displacement noise field at a point
    Noise {
        #[arg(short, long, default_value = "0")]
        x: f32,
        #[arg(short, long, default_value = "0")]
        y: f32,
        #[arg(short, long, default_value = "0")]
        z: f32,
        /// Tiling period on every axis
        #[arg(short, long, default_value = "10")]
        period: f32,
    },
    /// Print the parameter snapshot a track yields at a time
    Track {
        #[command(flatten)]
        source: TrackSource,
        /// Time in seconds
        #[arg(short, long, default_value = "0")]
        at: f32,
    },
    /// Run both shader stages on the CPU over the sphere and report ranges
    Profile {
        #[command(flatten)]
        source: TrackSource,
        /// Time in seconds
        #[arg(short, long, default_value = "0")]
        at: f32,
        /// Icosphere detail (overrides the settings file)
        #[arg(short, long)]
        detail: Option<u32>,
    },
    /// Drive the render loop headless with the text renderer
    Run {
        #[command(flatten)]
        source: TrackSource,
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Viewport width
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Viewport height
        #[arg(long, default_value = "720")]
        height: u32,
    },
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<RenderSettings> {
    let settings = match path {
        Some(path) => RenderSettings::load(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => RenderSettings::default(),
    };
    tracing::info!(
        source = %path.map_or("defaults".into(), |p| p.display().to_string()),
        detail = settings.detail,
        wireframe = settings.wireframe,
        "render settings ready"
    );
    Ok(settings)
}

fn check_time(at: f32) -> anyhow::Result<()> {
    if !at.is_finite() {
        bail!("--at must be a finite number of seconds, got {at}");
    }
    Ok(())
}

fn run_headless<C: ParameterChannel>(
    mut render_loop: RenderLoop<C>,
    ticks: u64,
    dt: f32,
    mut advance: impl FnMut(&mut C, f32),
) {
    let mut renderer = DebugTextRenderer::new();
    let mut last = None;
    for _ in 0..ticks {
        advance(render_loop.channel_mut(), dt);
        last = render_loop.tick(&mut renderer);
    }
    render_loop.stop();

    if let Some(frame) = last {
        print!("{frame}");
    }
    println!("{}", LoopInspector::summary(&render_loop));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("morphsphere-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "mesh: radius={} detail={} wireframe={} blend={:?}",
                settings.radius, settings.detail, settings.wireframe, settings.blend
            );
            println!(
                "camera: fov={} near={} far={} distance={}",
                settings.fov_degrees, settings.near, settings.far, settings.camera_distance
            );
            println!("defaults:");
            for (name, value) in ParameterSnapshot::default().uniforms.iter() {
                println!("  {name} = {value}");
            }
        }
        Commands::Noise { x, y, z, period } => {
            if !period.is_finite() || period <= 0.0 {
                bail!("period must be positive, got {period}");
            }
            let point = Vec3::new(x, y, z);
            let value = NoiseField::new().sample(point, Vec3::splat(period));
            println!("pnoise({x}, {y}, {z}; period {period}) = {value:.6}");
        }
        Commands::Track { source, at } => {
            check_time(at)?;
            if source.file.is_none() {
                bail!("--file is required for `track`");
            }
            let snapshot = source.snapshot_at(at)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Profile { source, at, detail } => {
            check_time(at)?;
            let settings = RenderSettings {
                detail: detail.unwrap_or(settings.detail),
                ..settings
            };
            let mut mesh = settings.build_mesh();
            mesh.apply_snapshot(&source.snapshot_at(at)?);
            let camera = settings.camera();
            let profile = DisplacementProfile::measure(&mesh, camera.view_projection());
            println!("{profile}");
        }
        Commands::Run {
            source,
            ticks,
            fps,
            width,
            height,
        } => {
            if !fps.is_finite() || fps <= 0.0 {
                bail!("fps must be positive, got {fps}");
            }
            let dt = 1.0 / fps;
            let mesh = settings.build_mesh();
            let camera = settings.camera();
            let viewport = Viewport::new(width, height);
            let controller = settings.viewport_controller();

            match source.channel()? {
                Some(channel) => {
                    let render_loop = RenderLoop::new(mesh, camera, viewport, controller, channel);
                    run_headless(render_loop, ticks, dt, |channel, dt| {
                        channel.advance(dt);
                    });
                }
                None => {
                    let channel = StaticChannel::new(ParameterSnapshot::default());
                    let render_loop = RenderLoop::new(mesh, camera, viewport, controller, channel);
                    run_headless(render_loop, ticks, dt, |_, _| {});
                }
            }
        }
    }

    Ok(())
}
