//! Engine context and frame driver
//!
//! Every subsystem lives in one [`Context`] handed to the game explicitly;
//! there is no global engine state.

use std::time::Duration;

use anyhow::Result;
use tessel_asset::AssetManager;
use tessel_core::{
    ecs::World,
    math::{Camera2D, Colour, Vec2},
    time::FixedTimestep,
};
use tessel_metrics::{FrameTimer, Phase, PhaseProfiler};
use tessel_render::{
    probe_capabilities, BatchConfig, BatchManager, BatchStats, GraphicsBackend, WindowConfig,
};
use tessel_services::Settings;
use tracing::{debug, info, trace};

/// Frames kept for rolling frame-time averages.
const FRAME_WINDOW: usize = 120;

pub struct Context {
    pub settings: Settings,
    pub world: World,
    pub batches: BatchManager,
    pub assets: AssetManager,
    pub backend: Box<dyn GraphicsBackend>,
    running: bool,
    last_stats: BatchStats,
}

impl Context {
    /// Ask the driver to stop after the current frame.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Batch counters of the last completed frame.
    pub fn last_stats(&self) -> BatchStats {
        self.last_stats
    }

    pub fn window_config(&self) -> WindowConfig {
        let window = &self.settings.window;
        WindowConfig {
            title: window.title.clone(),
            width: window.width,
            height: window.height,
            min_size: window.min_size,
            max_size: window.max_size,
            resizable: window.resizable,
        }
    }
}

/// Game logic driven by [`Engine`].
pub trait Game {
    fn init(&mut self, ctx: &mut Context) -> Result<()>;

    /// Runs zero or more times per frame at the fixed tick rate.
    fn fixed_update(&mut self, ctx: &mut Context, dt: f32) -> Result<()>;

    /// Runs once per frame with the real frame delta.
    fn update(&mut self, _ctx: &mut Context, _frame: Duration) -> Result<()> {
        Ok(())
    }

    /// Submit quads. `alpha` is the fraction of a fixed tick left over.
    fn draw(&mut self, ctx: &mut Context, alpha: f32) -> Result<()>;
}

pub struct Engine<G: Game> {
    ctx: Context,
    game: G,
    clock: FixedTimestep,
    timer: FrameTimer,
    profiler: PhaseProfiler,
    frames: u64,
}

impl<G: Game> Engine<G> {
    pub fn new(
        settings: Settings,
        world: World,
        mut backend: Box<dyn GraphicsBackend>,
        mut game: G,
    ) -> Result<Self> {
        settings.validate()?;
        probe_capabilities(backend.as_ref());

        let (width, height) = WindowConfig {
            width: settings.window.width,
            height: settings.window.height,
            min_size: settings.window.min_size,
            max_size: settings.window.max_size,
            ..Default::default()
        }
        .clamped_size();
        backend.set_viewport(width, height);

        let camera = Camera2D::new(Vec2::new(width as f32, height as f32));
        let batches = BatchManager::new(
            BatchConfig {
                max_batches: settings.render.max_batches,
                max_quads_per_batch: settings.render.max_quads_per_batch,
            },
            camera,
        );
        let clock = FixedTimestep::new(
            settings.time.tick_rate_hz,
            settings.time.max_steps_per_frame,
        );

        let mut ctx = Context {
            settings,
            world,
            batches,
            assets: AssetManager::new()?,
            backend,
            running: true,
            last_stats: BatchStats::default(),
        };
        game.init(&mut ctx)?;
        info!(width, height, "engine initialized");

        Ok(Self {
            ctx,
            game,
            clock,
            timer: FrameTimer::new(FRAME_WINDOW),
            profiler: PhaseProfiler::new(),
            frames: 0,
        })
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick_count()
    }

    pub fn stop(&mut self) {
        self.ctx.stop();
    }

    /// Run one frame that took `delta` of real time.
    ///
    /// Returns whether the engine is still running afterwards. A stopped
    /// engine does nothing.
    pub fn run_frame(&mut self, delta: Duration) -> Result<bool> {
        if !self.ctx.running {
            return Ok(false);
        }
        self.timer.record(delta);

        let dt = self.clock.step_secs();
        for _ in 0..self.clock.accumulate(delta) {
            self.profiler
                .time_phase(Phase::FixedUpdate, || self.game.fixed_update(&mut self.ctx, dt))?;
        }
        self.profiler
            .time_phase(Phase::Update, || self.game.update(&mut self.ctx, delta))?;

        let clear = Colour::from(self.ctx.settings.render.clear_colour);
        self.ctx.backend.clear(clear);
        let alpha = self.clock.alpha();
        self.profiler
            .time_phase(Phase::Draw, || self.game.draw(&mut self.ctx, alpha))?;

        let ctx = &mut self.ctx;
        self.profiler.time_phase(Phase::Present, || -> Result<()> {
            ctx.batches.flush_all(ctx.backend.as_mut())?;
            ctx.backend.swap_buffers()?;
            Ok(())
        })?;

        self.ctx.last_stats = self.ctx.batches.reset_stats();
        self.frames += 1;
        trace!(
            frame = self.frames,
            draw_calls = self.ctx.last_stats.draw_calls,
            quads = self.ctx.last_stats.quads,
            "frame complete"
        );
        Ok(self.ctx.running)
    }

    /// Run up to `count` frames of `delta` each, stopping early if the game
    /// stops the engine. Returns the number of frames run.
    pub fn run_frames(&mut self, count: u64, delta: Duration) -> Result<u64> {
        let mut ran = 0;
        while ran < count && self.ctx.is_running() {
            self.run_frame(delta)?;
            ran += 1;
        }
        self.report();
        Ok(ran)
    }

    fn report(&mut self) {
        info!(
            frames = self.frames,
            ticks = self.clock.tick_count(),
            fps = self.timer.fps(),
            frame_ms = self.timer.frame_time_ms(),
            "run summary"
        );
        for (phase, time) in self.profiler.iter() {
            debug!(
                phase = phase.name(),
                calls = self.profiler.calls(phase),
                ms = time.as_secs_f64() * 1000.0,
                "phase timing"
            );
        }
        self.profiler.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::math::Rect;
    use tessel_render::{HeadlessBackend, ShaderHandle};

    #[derive(Default)]
    struct Counting {
        shader: Option<ShaderHandle>,
        fixed: u32,
        updates: u32,
        stop_after: Option<u32>,
    }

    impl Game for Counting {
        fn init(&mut self, ctx: &mut Context) -> Result<()> {
            self.shader = Some(ctx.assets.load_shader(ctx.backend.as_mut(), 1)?);
            Ok(())
        }

        fn fixed_update(&mut self, _ctx: &mut Context, dt: f32) -> Result<()> {
            assert!(dt > 0.0);
            self.fixed += 1;
            Ok(())
        }

        fn update(&mut self, ctx: &mut Context, _frame: Duration) -> Result<()> {
            self.updates += 1;
            if Some(self.updates) == self.stop_after {
                ctx.stop();
            }
            Ok(())
        }

        fn draw(&mut self, ctx: &mut Context, _alpha: f32) -> Result<()> {
            let shader = ctx.assets.shader(1)?;
            ctx.batches.draw_rect(
                ctx.backend.as_mut(),
                shader,
                Rect::new(0.0, 0.0, 8.0, 8.0),
                Colour::WHITE,
            )?;
            Ok(())
        }
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.time.tick_rate_hz = 10;
        settings
    }

    fn engine(game: Counting) -> Engine<Counting> {
        let world = World::builder().build().unwrap();
        Engine::new(settings(), world, Box::new(HeadlessBackend::new()), game).unwrap()
    }

    #[test]
    fn frames_drive_fixed_and_variable_updates() {
        let mut engine = engine(Counting::default());
        let ran = engine.run_frames(4, Duration::from_millis(50)).unwrap();

        assert_eq!(ran, 4);
        assert_eq!(engine.frames(), 4);
        assert_eq!(engine.game().updates, 4);
        assert_eq!(engine.game().fixed, 2);
        assert_eq!(engine.tick_count(), 2);
        assert_eq!(engine.context().last_stats().draw_calls, 1);
        assert_eq!(engine.context().last_stats().quads, 1);
    }

    #[test]
    fn stop_is_checked_once_per_frame() {
        let mut engine = engine(Counting {
            stop_after: Some(3),
            ..Default::default()
        });
        let ran = engine.run_frames(10, Duration::from_millis(16)).unwrap();
        assert_eq!(ran, 3);
        assert!(!engine.context().is_running());
        assert!(!engine.run_frame(Duration::from_millis(16)).unwrap());
        assert_eq!(engine.frames(), 3);
    }

    #[test]
    fn external_stop() {
        let mut engine = engine(Counting::default());
        engine.stop();
        assert_eq!(engine.run_frames(5, Duration::from_millis(16)).unwrap(), 0);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = settings();
        settings.render.max_batches = 0;
        let world = World::builder().build().unwrap();
        let backend = Box::new(HeadlessBackend::new());
        assert!(Engine::new(settings, world, backend, Counting::default()).is_err());
    }

    #[test]
    fn window_config_mirrors_settings() {
        let mut settings = settings();
        settings.window.title = "demo".into();
        let world = World::builder().build().unwrap();
        let engine =
            Engine::new(settings, world, Box::new(HeadlessBackend::new()), Counting::default())
                .unwrap();
        let config = engine.context().window_config();
        assert_eq!(config.title, "demo");
        assert_eq!((config.width, config.height), (1280, 720));
    }
}
