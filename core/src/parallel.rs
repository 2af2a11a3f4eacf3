//! Row-partitioned parallel iteration.
//!
//! Splits a row-major buffer into batches of whole rows and processes them on
//! separate threads using [`std::thread::scope`], falling back to sequential
//! iteration for small workloads and on WASM where threads are unavailable.
//!
//! Every batch receives a disjoint `&mut` slice of the output, so the only
//! shared state a callback may touch is whatever it captures by shared
//! reference.

/// Configuration for parallel row iteration.
///
/// Controls the number of worker threads and minimum batch size.
/// Use [`Default::default()`] for sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParConfig {
    /// Minimum number of rows per batch. Prevents thread overhead from
    /// dominating for small grids. Default: 16.
    pub min_rows_per_batch: usize,
    /// Number of worker threads. `None` uses
    /// [`std::thread::available_parallelism`]. Default: `None`.
    pub num_threads: Option<usize>,
}

impl Default for ParConfig {
    fn default() -> Self {
        Self {
            min_rows_per_batch: 16,
            num_threads: None,
        }
    }
}

impl ParConfig {
    /// A configuration that always runs on the calling thread.
    pub fn sequential() -> Self {
        Self {
            min_rows_per_batch: usize::MAX,
            num_threads: Some(1),
        }
    }

    /// Number of threads this configuration will use.
    pub fn effective_threads(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }

    fn rows_per_batch(&self, row_count: usize) -> usize {
        let threads = self.effective_threads();
        row_count.div_ceil(threads).max(self.min_rows_per_batch).max(1)
    }
}

/// Call `f(row, row_slice)` for every row of `data`.
///
/// `data` holds consecutive rows of `row_len` elements; the first row in
/// `data` is numbered `first_row`. A trailing partial row is not visited.
///
/// # Panics
///
/// Panics if `row_len` is 0.
#[cfg(not(target_arch = "wasm32"))]
pub fn par_for_each_row<T, F>(
    data: &mut [T],
    row_len: usize,
    first_row: usize,
    config: &ParConfig,
    f: F,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    assert!(row_len > 0, "row_len must be non-zero");

    let row_count = data.len() / row_len;
    let batch_rows = config.rows_per_batch(row_count);

    if config.effective_threads() == 1 || batch_rows >= row_count {
        for_each_row_sequential(data, row_len, first_row, &f);
        return;
    }

    let f = &f;
    std::thread::scope(|scope| {
        for (batch, chunk) in data.chunks_mut(batch_rows * row_len).enumerate() {
            let batch_first = first_row + batch * batch_rows;
            scope.spawn(move || {
                for_each_row_sequential(chunk, row_len, batch_first, f);
            });
        }
    });
}

/// WASM fallback: sequential iteration (no threads available).
#[cfg(target_arch = "wasm32")]
pub fn par_for_each_row<T, F>(
    data: &mut [T],
    row_len: usize,
    first_row: usize,
    _config: &ParConfig,
    f: F,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    assert!(row_len > 0, "row_len must be non-zero");
    for_each_row_sequential(data, row_len, first_row, &f);
}

fn for_each_row_sequential<T, F>(data: &mut [T], row_len: usize, first_row: usize, f: &F)
where
    F: Fn(usize, &mut [T]),
{
    for (offset, row) in data.chunks_exact_mut(row_len).enumerate() {
        f(first_row + offset, row);
    }
}
