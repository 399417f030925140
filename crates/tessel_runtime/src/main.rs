//! Tessel Runtime
//!
//! Boots the engine on the headless backend and runs the bouncing sprites
//! demo for a fixed number of frames.
//!
//! Usage: `tessel [settings.json] [--frames N] [--sprites N]`

mod engine;
mod scene;

use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use tessel_render::HeadlessBackend;
use tessel_services::Settings;
use tracing_subscriber::EnvFilter;

use crate::{engine::Engine, scene::BouncingSprites};

const DEFAULT_FRAMES: u64 = 600;
const DEFAULT_SPRITES: usize = 256;

struct Args {
    settings: Option<String>,
    frames: u64,
    sprites: usize,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        settings: None,
        frames: DEFAULT_FRAMES,
        sprites: DEFAULT_SPRITES,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().context("--frames needs a value")?;
                args.frames = value.parse().context("--frames must be a number")?;
            }
            "--sprites" => {
                let value = iter.next().context("--sprites needs a value")?;
                args.sprites = value.parse().context("--sprites must be a number")?;
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path => args.settings = Some(path.to_string()),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Tessel Engine v{}", tessel_core::VERSION);
    let args = parse_args()?;

    let settings = match &args.settings {
        Some(path) => Settings::load(path).with_context(|| format!("loading {path}"))?,
        None => Settings::default(),
    };
    if args.sprites > settings.world.max_entities {
        bail!(
            "{} sprites exceed world.max_entities ({})",
            args.sprites,
            settings.world.max_entities
        );
    }

    let world = scene::build_world(settings.world.max_entities)?;
    let frame = Duration::from_secs(1) / settings.time.tick_rate_hz;
    let mut engine = Engine::new(
        settings,
        world,
        Box::new(HeadlessBackend::new()),
        BouncingSprites::new(args.sprites),
    )?;

    let window = engine.context().window_config().window_attributes();
    tracing::debug!(title = %window.title, "window attributes prepared");

    let ran = engine.run_frames(args.frames, frame)?;
    let stats = engine.context().last_stats();
    tracing::info!(
        frames = ran,
        ticks = engine.tick_count(),
        spawned = engine.game().spawned(),
        sprites = engine.context().world.register_count(),
        draw_calls = stats.draw_calls,
        quads = stats.quads,
        "headless run finished"
    );
    Ok(())
}
