//! Wave field simulation.
//!
//! [`Waves`] evolves a height field under the 2D damped wave equation using
//! an explicit finite-difference scheme:
//!
//! ```text
//! h[n+1](i,j) = k1 * h[n-1](i,j) + k2 * h[n](i,j)
//!             + k3 * (h[n](i+1,j) + h[n](i-1,j) + h[n](i,j+1) + h[n](i,j-1))
//! ```
//!
//! with
//!
//! ```text
//! d  = damping*dt + 2
//! e  = (speed*dt/dx)^2
//! k1 = (damping*dt - 2) / d
//! k2 = (4 - 8e) / d
//! k3 = (2e) / d
//! ```
//!
//! Only interior points are stepped; the outer row/column on each side keeps
//! height zero forever. Two height snapshots are kept and swapped by flipping
//! an index after each step, so the previous snapshot is overwritten in place
//! with the next one.
//!
//! # Example
//!
//! ```
//! use ripple_core::waves::Waves;
//!
//! let mut waves = Waves::new(64, 64, 1.0, 0.03, 4.0, 0.2).unwrap();
//! waves.disturb(32, 32, 0.5);
//! for _ in 0..10 {
//!     waves.update(0.03);
//! }
//! assert_eq!(waves.step_count(), 10);
//! ```

use crate::math::Vec3;
use crate::mesh::grid_indices;
use crate::parallel::{ParConfig, par_for_each_row};

/// Largest `(speed*dt/dx)^2` for which the explicit 2D scheme is stable.
pub const MAX_STABLE_COURANT_SQ: f32 = 0.5;

/// Distance from the boundary that disturbances must keep, in cells.
const DISTURB_MARGIN: usize = 2;

/// Errors from wave field construction and disturbance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaveError {
    /// The grid has too few rows or columns to have an interior.
    #[error("wave grid {rows}x{columns} is too small, need at least 3x3")]
    GridTooSmall { rows: usize, columns: usize },
    /// A constructor scalar is out of range.
    #[error("invalid wave parameter: {0}")]
    InvalidParameter(String),
    /// The stencil violates the stability limit.
    #[error("unstable wave stencil: (speed*dt/dx)^2 = {courant_sq} exceeds {MAX_STABLE_COURANT_SQ}")]
    Unstable { courant_sq: f32 },
    /// A disturbance was requested too close to the boundary.
    #[error("disturbance at ({row}, {column}) must satisfy 2 < row < {} and 2 < column < {}", .rows - 2, .columns - 2)]
    DisturbOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },
}

/// Per-sample surface basis derived from the height field.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SurfaceBasis {
    normal: Vec3,
    tangent_x: Vec3,
}

impl Default for SurfaceBasis {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            tangent_x: Vec3::X,
        }
    }
}

/// Height field evolved by the damped wave equation.
#[derive(Debug, Clone)]
pub struct Waves {
    rows: usize,
    columns: usize,

    spatial_step: f32,
    time_step: f32,

    k1: f32,
    k2: f32,
    k3: f32,

    /// Two height snapshots; `heights[current]` is the newest.
    heights: [Vec<f32>; 2],
    current: usize,

    /// Fixed x/z grid coordinates, indexed like the height buffers.
    grid_xz: Vec<(f32, f32)>,
    basis: Vec<SurfaceBasis>,

    accumulated: f32,
    step_count: u64,
    par_config: ParConfig,
}

impl Waves {
    /// Create a flat wave field.
    ///
    /// # Arguments
    ///
    /// * `rows`, `columns` - Grid size in samples (at least 3 each)
    /// * `spatial_step` - Distance between neighboring samples
    /// * `time_step` - Fixed simulation timestep in seconds
    /// * `speed` - Wave propagation speed
    /// * `damping` - Damping coefficient (0 for no damping)
    ///
    /// # Errors
    ///
    /// Returns an error for grids smaller than 3x3, non-positive steps,
    /// negative speed or damping, or an unstable stencil.
    pub fn new(
        rows: usize,
        columns: usize,
        spatial_step: f32,
        time_step: f32,
        speed: f32,
        damping: f32,
    ) -> Result<Self, WaveError> {
        if rows < 3 || columns < 3 {
            return Err(WaveError::GridTooSmall { rows, columns });
        }
        if !(spatial_step > 0.0) {
            return Err(WaveError::InvalidParameter(format!(
                "spatial step must be positive, got {spatial_step}"
            )));
        }
        if !(time_step > 0.0) {
            return Err(WaveError::InvalidParameter(format!(
                "time step must be positive, got {time_step}"
            )));
        }
        if !(speed >= 0.0) || !(damping >= 0.0) {
            return Err(WaveError::InvalidParameter(format!(
                "speed and damping must be non-negative, got {speed} and {damping}"
            )));
        }

        let d = damping * time_step + 2.0;
        let e = (speed * time_step / spatial_step).powi(2);
        if e > MAX_STABLE_COURANT_SQ {
            return Err(WaveError::Unstable { courant_sq: e });
        }

        let k1 = (damping * time_step - 2.0) / d;
        let k2 = (4.0 - 8.0 * e) / d;
        let k3 = (2.0 * e) / d;

        let count = rows * columns;
        let half_width = (columns - 1) as f32 * spatial_step * 0.5;
        let half_depth = (rows - 1) as f32 * spatial_step * 0.5;
        let grid_xz = (0..rows)
            .flat_map(|i| {
                (0..columns).map(move |j| {
                    (
                        -half_width + j as f32 * spatial_step,
                        half_depth - i as f32 * spatial_step,
                    )
                })
            })
            .collect();

        log::debug!(
            "Waves: {}x{} grid, dx={}, dt={}, k=({}, {}, {})",
            rows,
            columns,
            spatial_step,
            time_step,
            k1,
            k2,
            k3
        );

        Ok(Self {
            rows,
            columns,
            spatial_step,
            time_step,
            k1,
            k2,
            k3,
            heights: [vec![0.0; count], vec![0.0; count]],
            current: 0,
            grid_xz,
            basis: vec![SurfaceBasis::default(); count],
            accumulated: 0.0,
            step_count: 0,
            par_config: ParConfig::default(),
        })
    }

    /// Override how row updates are split across threads.
    pub fn with_par_config(mut self, config: ParConfig) -> Self {
        self.par_config = config;
        self
    }

    /// Number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of samples (vertices).
    pub fn vertex_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Number of triangles in the grid triangulation.
    pub fn triangle_count(&self) -> usize {
        (self.rows - 1) * (self.columns - 1) * 2
    }

    /// Extent along x.
    pub fn width(&self) -> f32 {
        (self.columns - 1) as f32 * self.spatial_step
    }

    /// Extent along z.
    pub fn depth(&self) -> f32 {
        (self.rows - 1) as f32 * self.spatial_step
    }

    /// Distance between neighboring samples.
    pub fn spatial_step(&self) -> f32 {
        self.spatial_step
    }

    /// Fixed simulation timestep in seconds.
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Number of discrete steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Stencil coefficients `(k1, k2, k3)`.
    pub fn coefficients(&self) -> (f32, f32, f32) {
        (self.k1, self.k2, self.k3)
    }

    /// Current height at `(row, column)`.
    pub fn height(&self, row: usize, column: usize) -> f32 {
        self.heights[self.current][row * self.columns + column]
    }

    /// Current position of sample `i` (`row * columns + column`).
    pub fn position(&self, i: usize) -> Vec3 {
        let (x, z) = self.grid_xz[i];
        Vec3::new(x, self.heights[self.current][i], z)
    }

    /// Current unit normal of sample `i`.
    pub fn normal(&self, i: usize) -> Vec3 {
        self.basis[i].normal
    }

    /// Current unit tangent along +x of sample `i`.
    pub fn tangent_x(&self, i: usize) -> Vec3 {
        self.basis[i].tangent_x
    }

    /// Triangle-list indices for the grid.
    pub fn indices(&self) -> Vec<u32> {
        grid_indices(self.rows as u32, self.columns as u32)
    }

    /// Advance the simulation by `elapsed` seconds of wall time.
    ///
    /// Time accumulates across calls. When at least one timestep has
    /// accumulated, exactly one step runs and one timestep is subtracted;
    /// any excess carries over to later calls rather than being caught up
    /// immediately. Returns whether a step ran.
    pub fn update(&mut self, elapsed: f32) -> bool {
        self.accumulated += elapsed;
        if self.accumulated < self.time_step {
            return false;
        }

        self.step();
        self.accumulated -= self.time_step;
        true
    }

    /// Add `magnitude` at `(row, column)` and half of it at the four axis
    /// neighbors, in the current snapshot.
    ///
    /// # Panics
    ///
    /// Panics unless `2 < row < rows - 2` and `2 < column < columns - 2`.
    /// Use [`try_disturb`](Self::try_disturb) to get an error instead.
    pub fn disturb(&mut self, row: usize, column: usize, magnitude: f32) {
        if let Err(e) = self.try_disturb(row, column, magnitude) {
            panic!("{e}");
        }
    }

    /// Checked form of [`disturb`](Self::disturb).
    pub fn try_disturb(&mut self, row: usize, column: usize, magnitude: f32) -> Result<(), WaveError> {
        let rows_ok = row > DISTURB_MARGIN && row + DISTURB_MARGIN < self.rows;
        let columns_ok = column > DISTURB_MARGIN && column + DISTURB_MARGIN < self.columns;
        if !rows_ok || !columns_ok {
            return Err(WaveError::DisturbOutOfRange {
                row,
                column,
                rows: self.rows,
                columns: self.columns,
            });
        }

        let n = self.columns;
        let half = 0.5 * magnitude;
        let heights = &mut self.heights[self.current];

        heights[row * n + column] += magnitude;
        heights[row * n + column + 1] += half;
        heights[row * n + column - 1] += half;
        heights[(row + 1) * n + column] += half;
        heights[(row - 1) * n + column] += half;

        Ok(())
    }

    /// Run one discrete timestep.
    fn step(&mut self) {
        let n = self.columns;
        let m = self.rows;
        let (k1, k2, k3) = (self.k1, self.k2, self.k3);

        let [a, b] = &mut self.heights;
        let (prev, curr): (&mut Vec<f32>, &Vec<f32>) = if self.current == 0 {
            (b, &*a)
        } else {
            (a, &*b)
        };

        // Interior rows only; each output cell reads its own old value from
        // `prev` and its neighborhood from `curr`.
        par_for_each_row(
            &mut prev[n..(m - 1) * n],
            n,
            1,
            &self.par_config,
            |i, out| {
                for j in 1..n - 1 {
                    let neighbors = curr[(i + 1) * n + j]
                        + curr[(i - 1) * n + j]
                        + curr[i * n + j + 1]
                        + curr[i * n + j - 1];
                    out[j] = k1 * out[j] + k2 * curr[i * n + j] + k3 * neighbors;
                }
            },
        );

        self.current ^= 1;
        self.step_count += 1;

        self.update_surface_basis();

        log::trace!("Waves: step {}", self.step_count);
    }

    fn update_surface_basis(&mut self) {
        let n = self.columns;
        let m = self.rows;
        let two_dx = 2.0 * self.spatial_step;
        let heights = &self.heights[self.current];

        par_for_each_row(
            &mut self.basis[n..(m - 1) * n],
            n,
            1,
            &self.par_config,
            |i, out| {
                for j in 1..n - 1 {
                    let l = heights[i * n + j - 1];
                    let r = heights[i * n + j + 1];
                    let t = heights[(i - 1) * n + j];
                    let b = heights[(i + 1) * n + j];

                    out[j] = SurfaceBasis {
                        normal: Vec3::new(l - r, two_dx, b - t).normalize(),
                        tangent_x: Vec3::new(two_dx, r - l, 0.0).normalize(),
                    };
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_waves() -> Waves {
        Waves::new(16, 20, 1.0, 0.03, 4.0, 0.2).unwrap()
    }

    fn boundary_is_zero(waves: &Waves) -> bool {
        let (m, n) = (waves.rows(), waves.columns());
        (0..m).all(|i| waves.height(i, 0) == 0.0 && waves.height(i, n - 1) == 0.0)
            && (0..n).all(|j| waves.height(0, j) == 0.0 && waves.height(m - 1, j) == 0.0)
    }

    #[test]
    fn test_coefficients() {
        let waves = Waves::new(8, 8, 1.0, 0.1, 2.0, 1.0).unwrap();
        let (k1, k2, k3) = waves.coefficients();
        let d = 0.1 + 2.0;
        let e = 0.04;
        assert!((k1 - (0.1 - 2.0) / d).abs() < 1e-6);
        assert!((k2 - (4.0 - 8.0 * e) / d).abs() < 1e-6);
        assert!((k3 - 2.0 * e / d).abs() < 1e-6);
    }

    #[test]
    fn test_dimensions() {
        let waves = sample_waves();
        assert_eq!(waves.vertex_count(), 320);
        assert_eq!(waves.triangle_count(), 15 * 19 * 2);
        assert_eq!(waves.indices().len(), waves.triangle_count() * 3);
        assert_eq!(waves.width(), 19.0);
        assert_eq!(waves.depth(), 15.0);
    }

    #[test]
    fn test_grid_positions() {
        let waves = sample_waves();
        assert_eq!(waves.position(0), Vec3::new(-9.5, 0.0, 7.5));
        assert_eq!(waves.position(319), Vec3::new(9.5, 0.0, -7.5));
    }

    #[rstest]
    #[case::too_small(2, 8, 1.0, 0.03, 4.0, 0.2)]
    #[case::zero_dx(8, 8, 0.0, 0.03, 4.0, 0.2)]
    #[case::zero_dt(8, 8, 1.0, 0.0, 4.0, 0.2)]
    #[case::negative_damping(8, 8, 1.0, 0.03, 4.0, -1.0)]
    #[case::unstable(8, 8, 1.0, 0.5, 4.0, 0.2)]
    fn test_rejects_bad_parameters(
        #[case] rows: usize,
        #[case] columns: usize,
        #[case] dx: f32,
        #[case] dt: f32,
        #[case] speed: f32,
        #[case] damping: f32,
    ) {
        assert!(Waves::new(rows, columns, dx, dt, speed, damping).is_err());
    }

    #[test]
    fn test_disturb_pattern() {
        let mut waves = sample_waves();
        waves.disturb(5, 6, 1.0);
        assert_eq!(waves.height(5, 6), 1.0);
        assert_eq!(waves.height(4, 6), 0.5);
        assert_eq!(waves.height(6, 6), 0.5);
        assert_eq!(waves.height(5, 5), 0.5);
        assert_eq!(waves.height(5, 7), 0.5);
        assert_eq!(waves.height(4, 5), 0.0);
    }

    #[rstest]
    #[case::row_at_margin(2, 8)]
    #[case::row_near_far_edge(14, 8)]
    #[case::column_at_margin(8, 2)]
    #[case::column_near_far_edge(8, 18)]
    #[case::corner(0, 0)]
    fn test_try_disturb_rejects_near_boundary(#[case] row: usize, #[case] column: usize) {
        let mut waves = sample_waves();
        let result = waves.try_disturb(row, column, 1.0);
        assert!(matches!(result, Err(WaveError::DisturbOutOfRange { .. })));
        assert!((0..waves.vertex_count()).all(|i| waves.position(i).y == 0.0));
    }

    #[test]
    fn test_try_disturb_accepts_first_valid_cells() {
        let mut waves = sample_waves();
        assert!(waves.try_disturb(3, 3, 1.0).is_ok());
        assert!(waves.try_disturb(13, 17, 1.0).is_ok());
    }

    #[test]
    #[should_panic(expected = "disturbance at (2, 8)")]
    fn test_disturb_panics_near_boundary() {
        let mut waves = sample_waves();
        waves.disturb(2, 8, 1.0);
    }

    #[test]
    fn test_zero_field_is_fixed_point() {
        let mut waves = sample_waves();
        for _ in 0..200 {
            waves.update(waves.time_step());
        }
        assert_eq!(waves.step_count(), 200);
        assert!((0..waves.vertex_count()).all(|i| waves.position(i).y == 0.0));
        assert!((0..waves.vertex_count()).all(|i| waves.normal(i) == Vec3::Y));
    }

    #[test]
    fn test_single_step_per_call() {
        let mut waves = sample_waves();
        let dt = waves.time_step();
        assert!(waves.update(dt * 3.5));
        assert_eq!(waves.step_count(), 1);
        // The excess carries over, one step per call.
        assert!(waves.update(0.0));
        assert!(waves.update(0.0));
        assert_eq!(waves.step_count(), 3);
    }

    #[test]
    fn test_accumulates_small_increments() {
        let mut waves = Waves::new(8, 8, 1.0, 0.5, 0.5, 0.1).unwrap();
        for _ in 0..10 {
            waves.update(0.125);
        }
        // 1.25 seconds at 0.5 per step.
        assert_eq!(waves.step_count(), 2);
    }

    #[test]
    fn test_steps_follow_accumulated_time() {
        let mut waves = sample_waves();
        let increment = waves.time_step() / 3.0;

        let mut reference = 0.0f32;
        let mut expected_steps = 0u64;
        for _ in 0..7 {
            reference += increment;
            if reference >= waves.time_step() {
                reference -= waves.time_step();
                expected_steps += 1;
            }
            waves.update(increment);
        }

        assert_eq!(waves.step_count(), expected_steps);
        assert_eq!(waves.step_count(), 2);
    }

    #[test]
    fn test_damped_energy_decays() {
        let mut waves = Waves::new(32, 32, 1.0, 0.03, 8.0, 2.0).unwrap();
        waves.disturb(16, 16, 1.0);
        waves.disturb(8, 22, -0.5);

        let energy = |w: &Waves| -> f64 {
            (0..w.vertex_count())
                .map(|i| f64::from(w.position(i).y).powi(2))
                .sum()
        };

        // Per-step energy can rise briefly while the initial bump splits into
        // travelling waves, so compare the envelope over blocks of steps.
        let block_peaks: Vec<f64> = (0..5)
            .map(|_| {
                (0..400)
                    .map(|_| {
                        waves.update(0.03);
                        energy(&waves)
                    })
                    .fold(0.0, f64::max)
            })
            .collect();

        for pair in block_peaks.windows(2) {
            assert!(pair[1] <= pair[0], "energy envelope grew: {block_peaks:?}");
        }
        assert!(energy(&waves) <= block_peaks[0] * 1e-6);
    }

    #[test]
    fn test_step_matches_stencil() {
        let mut waves = sample_waves().with_par_config(ParConfig::sequential());
        waves.disturb(8, 8, 1.0);
        let (k1, k2, k3) = waves.coefficients();
        waves.update(waves.time_step());

        // Previous snapshot was all zero.
        let expected_center = k2 * 1.0 + k3 * (4.0 * 0.5);
        assert!((waves.height(8, 8) - expected_center).abs() < 1e-6);
        let expected_neighbor = k2 * 0.5 + k3 * 1.0;
        assert!((waves.height(7, 8) - expected_neighbor).abs() < 1e-6);
        let expected_diagonal = k3 * (0.5 + 0.5);
        assert!((waves.height(7, 7) - expected_diagonal).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let par = ParConfig {
            min_rows_per_batch: 1,
            num_threads: Some(4),
        };
        let mut a = Waves::new(40, 33, 1.0, 0.03, 4.0, 0.2)
            .unwrap()
            .with_par_config(ParConfig::sequential());
        let mut b = Waves::new(40, 33, 1.0, 0.03, 4.0, 0.2)
            .unwrap()
            .with_par_config(par);

        a.disturb(10, 12, 0.8);
        b.disturb(10, 12, 0.8);
        for step in 0..50 {
            if step == 20 {
                a.disturb(30, 20, -0.4);
                b.disturb(30, 20, -0.4);
            }
            a.update(0.03);
            b.update(0.03);
        }

        for i in 0..a.vertex_count() {
            assert_eq!(a.position(i), b.position(i));
            assert_eq!(a.normal(i), b.normal(i));
            assert_eq!(a.tangent_x(i), b.tangent_x(i));
        }
    }

    #[test]
    fn test_boundary_stays_zero() {
        let mut waves = sample_waves();
        for step in 0..300 {
            if step % 7 == 0 {
                let row = 3 + step % 10;
                let column = 3 + (step * 3) % 14;
                waves.disturb(row, column, 0.6);
            }
            waves.update(waves.time_step());
            assert!(boundary_is_zero(&waves), "boundary changed at step {step}");
        }
    }

    #[test]
    fn test_normals_tilt_away_from_crest() {
        let mut waves = sample_waves();
        waves.disturb(8, 8, 1.0);
        waves.update(waves.time_step());

        let n = waves.columns();
        // Height falls off towards +x right of the crest, so the normal leans +x.
        let right = waves.normal(8 * n + 9);
        assert!(right.x > 0.0);
        assert!((right.length() - 1.0).abs() < 1e-5);
        let tangent = waves.tangent_x(8 * n + 9);
        assert!(tangent.y < 0.0);
        // Boundary samples keep the flat basis.
        assert_eq!(waves.normal(0), Vec3::Y);
        assert_eq!(waves.tangent_x(0), Vec3::X);
    }
}
