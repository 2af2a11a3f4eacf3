//! # Waves Demo
//!
//! Headless land and waves sample. Each frame advances the wave simulation,
//! refreshes the current frame slot and submits it to the selected queue
//! backend, waiting on the fence only when the slot is still in flight.

mod args;

use clap::Parser;
use ripple_core::time::{FrameTime, GameTimer};
use ripple_core::{WaveError, Waves};
use ripple_demos::LandAndWaves;
use ripple_graphics::{
    DeviceCapabilities, FrameScheduler, GraphicsDevice, GraphicsError, SchedulerConfig,
    create_queue,
};

use args::Args;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("wave setup failed: {0}")]
    Waves(#[from] WaveError),
    #[error("graphics failure: {0}")]
    Graphics(#[from] GraphicsError),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ripple_core::init();
    ripple_graphics::init();
    log::info!("Ripple Demos v{}", ripple_demos::VERSION);

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("waves_demo: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), DemoError> {
    let waves = Waves::new(
        args.rows,
        args.columns,
        args.spatial_step,
        args.time_step,
        args.speed,
        args.damping,
    )?;

    let device = GraphicsDevice::new(DeviceCapabilities::default());
    let config = SchedulerConfig {
        frame_count: args.frame_count,
        ..Default::default()
    };
    let mut scene = LandAndWaves::new(&device, config.frame_count, waves, args.seed)?;

    let queue = create_queue(args.backend_type())?;
    let mut scheduler = FrameScheduler::new(device, queue, config, scene.frame_resource_desc())?;
    log::info!(
        "waves_demo: {} frames on {:?}, {} bytes of GPU memory",
        args.frames,
        args.backend,
        scheduler.device().allocated_bytes()
    );

    let mut timer = GameTimer::new();
    for frame in 0..args.frames {
        let time = match args.fixed_delta {
            Some(delta) => FrameTime::fixed(delta, frame),
            None => {
                timer.tick();
                timer.frame_time()
            }
        };
        scheduler.render_frame(&mut scene, &time)?;
    }

    let frame_stats = scheduler.stats();
    let scene_stats = scene.stats();
    scheduler.shutdown()?;

    log::info!(
        "waves_demo: {} frames, {} fence waits ({:?} waiting), {} wave steps, {} disturbances",
        frame_stats.frames,
        frame_stats.waits,
        frame_stats.wait_time,
        scene_stats.wave_steps,
        scene_stats.disturbances
    );
    Ok(())
}
