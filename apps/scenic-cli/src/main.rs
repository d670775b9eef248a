mod demo;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scenic_common::{FrameTime, UpdateContext};
use scenic_driver::{Driver, DriverConfig};
use scenic_tools::{SceneInspector, TextSink};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenic-cli", about = "CLI tool for scenic scene graphs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Build a demo scene and drive it for a number of frames
    Run {
        /// Number of frames to drive
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Children per node
        #[arg(short, long, default_value = "3")]
        width: usize,
        /// Levels below the top node
        #[arg(short, long, default_value = "2")]
        depth: usize,
        /// Maximum update steps per frame
        #[arg(short, long)]
        budget: Option<usize>,
        /// Seconds per frame fed to the driver
        #[arg(long, default_value = "0.016666666666666666")]
        dt: f64,
        /// Driver config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the demo scene hierarchy
    Tree {
        /// Children per node
        #[arg(short, long, default_value = "2")]
        width: usize,
        /// Levels below the top node
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("scenic-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", scenic_scene::crate_info());
            println!("driver: {}", scenic_driver::crate_info());
            println!("tools: {}", scenic_tools::crate_info());
            let defaults = DriverConfig::default();
            println!(
                "defaults: fixed_timestep={:.5}s max_fixed_steps={} time_scale={}",
                defaults.fixed_timestep, defaults.max_fixed_steps_per_frame, defaults.time_scale
            );
        }
        Commands::Run {
            frames,
            width,
            depth,
            budget,
            dt,
            config,
        } => {
            let mut config = match config {
                Some(path) => DriverConfig::load(&path)?,
                None => DriverConfig::default(),
            };
            if budget.is_some() {
                config.update_step_budget = budget;
            }

            let mut driver = Driver::new(config)?;
            let mut scene = demo::demo_scene(width, depth);
            let mut sink = TextSink::new();
            println!("Driving {frames} frames: width={width} depth={depth} budget={budget:?}");

            for _ in 0..frames {
                sink.clear();
                let stats = driver.frame(&mut scene, dt, &mut sink);
                println!(
                    "frame {:>4}: update={}{} mounted={} unmounted={} fixed={}x ({} steps) render={} wall={:?}",
                    stats.frame,
                    stats.update_steps,
                    if stats.budget_exhausted { " (budget)" } else { "" },
                    stats.mounted,
                    stats.unmounted,
                    stats.fixed_passes,
                    stats.fixed_steps,
                    stats.render_steps,
                    stats.wall_time
                );
            }

            let (updates, fixed) = demo::spinner_totals(&scene);
            println!("{}", SceneInspector::summary(&scene));
            println!("Totals: updates={updates} fixed_steps={fixed} draws_last_frame={}", sink.len());
            println!(
                "Frame time: avg={:?} min={:?} max={:?} over {} frames",
                driver.timer().average(),
                driver.timer().min(),
                driver.timer().max(),
                driver.timer().count()
            );
        }
        Commands::Tree { width, depth } => {
            let mut scene = demo::demo_scene(width, depth);
            let steps = scene.update(UpdateContext::new(FrameTime::default())).count();
            tracing::debug!(steps, "initial mount");
            print!("{}", SceneInspector::tree(&scene));
            println!("{}", SceneInspector::summary(&scene));
        }
    }

    Ok(())
}
