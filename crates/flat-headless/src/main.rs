//! Run the demo scene without a window.
//!
//! Usage:
//!   flat-headless                         # run for 3 seconds
//!   flat-headless --seconds 10 --snapshot out.png
//!   flat-headless --config engine.json    # EngineConfig as JSON

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flat_engine::{Engine, EngineConfig, InputEvent};
use flat_headless::{demo, paint_frame, HeadlessSurface, NullAudio};
use image::Rgba;

#[derive(Parser)]
#[command(name = "flat-headless")]
#[command(about = "Run the flat-engine demo scene on an in-memory surface")]
struct Cli {
    /// Wall-clock seconds to run for
    #[arg(long, default_value_t = 3.0)]
    seconds: f32,
    /// Engine configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Client-area width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Client-area height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Write the last frame to this PNG file
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Press the jump key halfway through
    #[arg(long)]
    jump: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            EngineConfig::from_json(&json).context("Invalid engine configuration")?
        }
        None => EngineConfig::default().with_visibility_timeout(Duration::from_secs(5)),
    };

    let surface = Arc::new(HeadlessSurface::new(cli.width, cli.height));
    let audio = Arc::new(NullAudio::new());
    let mut demo = None;
    let engine = Engine::start(config, surface.clone(), |world| {
        world.set_audio(audio.clone());
        demo = Some(demo::populate(world));
    })?;

    let run_for = Duration::from_secs_f32(cli.seconds.max(0.0));
    if cli.jump {
        thread::sleep(run_for / 2);
        engine.send_input(InputEvent::KeyDown { key_code: demo::JUMP_KEY });
        thread::sleep(run_for / 2);
    } else {
        thread::sleep(run_for);
    }

    let dropped = engine.dropped_faults();
    let (world, faults) = engine.finish()?;

    let time = world.time();
    log::info!(
        "Ran {} ticks over {:.2}s ({:.0} ticks/s), {} frames presented",
        time.tick,
        time.elapsed,
        time.tick as f32 / cli.seconds.max(f32::EPSILON),
        surface.presented()
    );
    if let Some(demo) = &demo {
        log::info!("Ball bounced {} times", demo.bounces());
        if let Some(ball) = world.scene.get(demo.ball) {
            log::info!("Ball at {:?}", ball.shape.position);
        }
    }
    log::info!("{} sounds still playing", audio.active().len());
    for fault in &faults {
        log::warn!("{}", fault);
    }
    if dropped > 0 {
        log::warn!("{} faults dropped while the queue was full", dropped);
    }

    if let Some(path) = &cli.snapshot {
        let frame = surface.latest_frame().context("No frame was presented")?;
        paint_frame(&frame, Rgba([20, 20, 30, 255]))
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Snapshot written to {}", path.display());
    }

    Ok(())
}
