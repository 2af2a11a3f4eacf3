//! Command line arguments for the waves demo.

use std::time::Duration;

use clap::Parser;
use ripple_graphics::BackendType;

/// Queue backend selection for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliBackend {
    /// Work completes at submission; the CPU never waits.
    Dummy,
    /// A worker thread completes work after `--gpu-latency-ms`.
    #[default]
    Simulated,
}

/// Land and waves demo arguments.
#[derive(Parser, Debug)]
#[command(
    name = "waves_demo",
    about = "Land and waves sample driving the Ripple frame scheduler",
    long_about = "Simulates a damped wave field over hilly terrain and pushes every frame \
        through a ring of frame slots guarded by a fence.\n\n\
        EXAMPLES:\n\
          # GPU finishing each frame 20 ms after submission\n\
          ./waves_demo --backend simulated --gpu-latency-ms 20\n\
        \n\
          # Deterministic headless run\n\
          ./waves_demo --backend dummy --frames 120 --fixed-delta 0.016 --seed 7",
    version
)]
pub struct Args {
    /// Queue backend to submit frames to.
    #[arg(long, default_value = "simulated", value_enum)]
    pub backend: CliBackend,

    /// Simulated GPU latency per frame in milliseconds.
    #[arg(long, default_value = "12")]
    pub gpu_latency_ms: u64,

    /// Number of frames to render before exiting.
    #[arg(long, default_value = "600")]
    pub frames: u64,

    /// Frame slots in flight.
    #[arg(long, default_value = "3")]
    pub frame_count: usize,

    /// Wave grid rows.
    #[arg(long, default_value = "128")]
    pub rows: usize,

    /// Wave grid columns.
    #[arg(long, default_value = "128")]
    pub columns: usize,

    /// Distance between wave grid samples.
    #[arg(long, default_value = "1.0")]
    pub spatial_step: f32,

    /// Wave simulation timestep in seconds.
    #[arg(long, default_value = "0.03")]
    pub time_step: f32,

    /// Wave propagation speed.
    #[arg(long, default_value = "4.0")]
    pub speed: f32,

    /// Wave damping coefficient.
    #[arg(long, default_value = "0.2")]
    pub damping: f32,

    /// Use this many seconds per frame instead of wall-clock time.
    #[arg(long)]
    pub fixed_delta: Option<f32>,

    /// Seed for disturbance placement.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn backend_type(&self) -> BackendType {
        match self.backend {
            CliBackend::Dummy => BackendType::Dummy,
            CliBackend::Simulated => BackendType::Simulated {
                latency: Duration::from_millis(self.gpu_latency_ms),
            },
        }
    }
}
