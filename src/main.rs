use std::{env, fs, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use log::info;
use rocket_visualizer::{
    parameters::ParameterMap,
    render::view::WindowSize,
    runner::{FrameRunner, load_rocket, read_params},
};

/// Renders the spinning silhouette of a rocket and dumps the final frame's
/// draw list as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Rocket description
    #[arg(short, long, default_value = "config/rocket.toml")]
    rocket: PathBuf,

    /// View configuration
    #[arg(short, long)]
    view: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 60)]
    frames: u32,

    /// Pace frames against the wall clock instead of rendering back to back
    #[arg(long)]
    realtime: bool,

    /// Output file for the draw list, stdout if not set
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }

    pretty_env_logger::init();

    let args = Args::parse();

    let loaded = load_rocket(&read_params(&args.rocket)?)?;
    info!("Rocket loaded\n{}", loaded.summary);
    if let Some(flight) = &loaded.flight {
        info!("Flight profile\n{flight}");
    }

    let view = match &args.view {
        Some(path) => read_params(path)?,
        None => ParameterMap::default(),
    };

    let mut runner = FrameRunner::new(loaded.shape, &view)?;
    let window = WindowSize::new(args.width, args.height);
    let commands = if args.realtime {
        runner.run_realtime(args.frames, window)?
    } else {
        runner.run(args.frames, window)
    };

    let json = serde_json::to_string_pretty(commands)?;
    match &args.out {
        Some(path) => {
            fs::write(path, json)?;
            info!("Wrote {} draw commands to '{}'", commands.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
