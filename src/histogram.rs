//! One-dimensional histogram binning over numeric buffers
//!
//! Samples from a flat or N-dimensional buffer are tallied into a fixed
//! number of equal-width bins over a given or data-derived range. NaN
//! samples are skipped entirely; they appear in neither the counts nor
//! any rate computed from them.

use crate::errors::{NanstatError, Result};
use ndarray::{Array1, ArrayViewD};
use rayon::prelude::*;

use crate::statistics::accumulate::{MaxAcc, MinAcc};
use crate::statistics::operations::NanElement;
use crate::statistics::parallel::{guard, partition_count};
use crate::statistics::reduce::fold_full;

/// Result of a histogram computation
///
/// `edges` has `bins + 1` non-decreasing entries; `counts` has one
/// non-negative entry per bin. The counts sum to the number of non-NaN
/// samples inside `[edges[0], edges[bins]]`.
#[derive(Debug, Clone)]
pub struct Histogram<T> {
    /// Per-bin tallies of non-NaN samples
    pub counts: Array1<u64>,
    /// Bin boundaries, length `bins + 1`
    pub edges: Array1<T>,
}

impl<T> Histogram<T> {
    /// Number of bins
    #[must_use]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Total number of samples tallied across all bins
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.counts.sum()
    }
}

/// Computes a one-dimensional histogram of the non-NaN samples in a buffer
///
/// With `range` omitted, a first pass derives the non-NaN minimum and
/// maximum of the buffer. If the derived or given bounds coincide, every
/// in-range sample lands in bin 0 and all edges equal that value. Bins
/// are half-open on the upper side except the final bin, which is closed,
/// so the maximum sample is counted in the last bin. Samples outside an
/// explicit range are skipped.
///
/// # Errors
///
/// Returns a `Shape` error if `bins` is zero, if a range bound is NaN or
/// inverted, or if no range is given and the buffer holds no non-NaN
/// samples.
pub fn histogram1d<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    bins: usize,
    range: Option<(T, T)>,
) -> Result<Histogram<T>> {
    if bins == 0 {
        return Err(NanstatError::Shape {
            message: "histogram requires at least one bin".to_string(),
        });
    }

    let (lower, upper) = match range {
        Some((lo, hi)) => {
            let (lower, upper) = (lo.widen(), hi.widen());
            if lower.is_nan() || upper.is_nan() {
                return Err(NanstatError::Shape {
                    message: "histogram range bounds must not be NaN".to_string(),
                });
            }
            if lower > upper {
                return Err(NanstatError::Shape {
                    message: format!(
                        "histogram range lower bound {} exceeds upper bound {}",
                        lower, upper
                    ),
                });
            }
            (lower, upper)
        }
        None => {
            let min_state = fold_full::<T, MinAcc>(view)?;
            let max_state = fold_full::<T, MaxAcc>(view)?;
            if min_state.count == 0 {
                return Err(NanstatError::Shape {
                    message: "cannot derive a histogram range from an input without non-NaN samples"
                        .to_string(),
                });
            }
            (min_state.value, max_state.value)
        }
    };

    let width = (upper - lower) / bins as f64;
    let counts = count_samples(view, bins, lower, upper, width)?;

    let mut edges = Vec::with_capacity(bins + 1);
    for edge in 0..bins {
        edges.push(T::narrow(lower + edge as f64 * width));
    }
    // The last edge is the upper bound exactly, not an accumulated step.
    edges.push(T::narrow(upper));

    Ok(Histogram {
        counts: Array1::from_vec(counts),
        edges: Array1::from_vec(edges),
    })
}

/// Map a sample to its bin, or `None` for NaN and out-of-range samples
fn bin_index(sample: f64, lower: f64, upper: f64, width: f64, bins: usize) -> Option<usize> {
    if sample.is_nan() || sample < lower || sample > upper {
        return None;
    }
    if width == 0.0 {
        return Some(0);
    }
    let raw = ((sample - lower) / width) as usize;
    // Bins are half-open except the last, which is closed; the maximum
    // sample clamps into bin `bins - 1` instead of spilling past it.
    Some(raw.min(bins - 1))
}

fn count_run<T: NanElement>(
    run: &[T],
    bins: usize,
    lower: f64,
    upper: f64,
    width: f64,
) -> Vec<u64> {
    let mut counts = vec![0_u64; bins];
    for &value in run {
        if let Some(bin) = bin_index(value.widen(), lower, upper, width, bins) {
            counts[bin] += 1;
        }
    }
    counts
}

/// Tally samples, in parallel with per-partition local count arrays
/// merged by elementwise addition
fn count_samples<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    bins: usize,
    lower: f64,
    upper: f64,
    width: f64,
) -> Result<Vec<u64>> {
    match view.as_slice() {
        Some(buffer) => {
            let partitions = partition_count(buffer.len());
            if partitions <= 1 {
                return Ok(count_run(buffer, bins, lower, upper, width));
            }

            let chunk_len = (buffer.len() + partitions - 1) / partitions;
            let partials: Vec<Vec<u64>> = buffer
                .par_chunks(chunk_len)
                .map(|chunk| guard(|| count_run(chunk, bins, lower, upper, width)))
                .collect::<Result<_>>()?;

            let mut counts = vec![0_u64; bins];
            for partial in partials {
                for (total, local) in counts.iter_mut().zip(partial) {
                    *total += local;
                }
            }
            Ok(counts)
        }
        None => {
            let mut counts = vec![0_u64; bins];
            for &value in view.iter() {
                if let Some(bin) = bin_index(value.widen(), lower, upper, width, bins) {
                    counts[bin] += 1;
                }
            }
            Ok(counts)
        }
    }
}
