//! # Ripple Demos
//!
//! Sample scenes driving the Ripple frame scheduler.
//!
//! ## Available Demos
//!
//! - `waves_demo` - Hilly land grid with an animated, randomly disturbed water surface

pub mod land_and_waves;

pub use land_and_waves::{LandAndWaves, LandAndWavesStats, OrbitCamera};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
