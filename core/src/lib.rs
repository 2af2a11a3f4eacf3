//! # Ripple Core
//!
//! CPU-side building blocks shared by the Ripple samples:
//! - [`waves`] - Finite-difference wave field simulator
//! - [`parallel`] - Row-partitioned scoped-thread iteration
//! - [`time`] - Game timer and per-frame time snapshot
//! - [`mesh`] - Vertex type and grid generation
//! - [`math`] - Math re-exports and small helpers

pub mod math;
pub mod mesh;
pub mod parallel;
pub mod time;
pub mod waves;

pub use waves::{WaveError, Waves};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core library version.
pub fn init() {
    log::info!("Ripple Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
