//! Parallel execution of reduction work
//!
//! The executor partitions work across the shared Rayon pool and merges
//! partial accumulator states in a fixed, deterministic order. Full
//! reductions split the flat buffer into one contiguous chunk per pool
//! worker and fold the partials left-to-right by partition index, so
//! repeated runs with the same pool size are bit-identical; a different
//! pool size changes the partition count and may shift variance results
//! by ULP-level rounding, which is a documented property of the kernel.
//!
//! A panic inside a pooled task is captured and surfaced as
//! [`NanstatError::WorkerFailure`]; partial results are discarded.

use crate::errors::{NanstatError, Result};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::accumulate::Accumulator;
use super::operations::NanElement;

/// Inputs below this many elements are reduced synchronously, where
/// dispatch overhead would dominate the per-partition workload.
pub(crate) const PARALLEL_THRESHOLD: usize = 1 << 15;

fn worker_failure(payload: Box<dyn Any + Send>) -> NanstatError {
    let message = if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "worker task panicked".to_string()
    };
    NanstatError::WorkerFailure(message)
}

/// Run one pooled task to completion, converting a panic into an error
pub(crate) fn guard<R>(task: impl FnOnce() -> R) -> Result<R> {
    catch_unwind(AssertUnwindSafe(task)).map_err(worker_failure)
}

/// Number of partitions used for a contiguous buffer of `len` elements
pub(crate) fn partition_count(len: usize) -> usize {
    if len < PARALLEL_THRESHOLD {
        1
    } else {
        rayon::current_num_threads()
    }
}

/// Fold a contiguous buffer into a single accumulator state
///
/// The buffer is split into one chunk per partition; partial states are
/// collected by partition index and merged left-to-right.
pub(crate) fn fold_chunks<T, A>(buffer: &[T]) -> Result<A::State>
where
    T: NanElement,
    A: Accumulator<T>,
{
    let partitions = partition_count(buffer.len());
    if partitions <= 1 {
        return Ok(A::fold_run(buffer));
    }

    let chunk_len = (buffer.len() + partitions - 1) / partitions;
    let partials: Vec<A::State> = buffer
        .par_chunks(chunk_len)
        .map(|chunk| guard(|| A::fold_run(chunk)))
        .collect::<Result<_>>()?;

    Ok(partials.into_iter().fold(A::init(), A::merge))
}

/// Run one task per output cell, in parallel above the work threshold
///
/// Workers own disjoint output cells, so no synchronization is needed on
/// writes; results are collected in cell-index order. The first worker
/// error aborts the whole call.
pub(crate) fn run_cells<S, F>(cells: usize, work_per_cell: usize, task: F) -> Result<Vec<S>>
where
    S: Send,
    F: Fn(usize) -> S + Sync,
{
    if cells == 0 {
        return Ok(Vec::new());
    }

    let total_work = cells.saturating_mul(work_per_cell.max(1));
    if total_work < PARALLEL_THRESHOLD {
        return Ok((0..cells).map(&task).collect());
    }

    (0..cells)
        .into_par_iter()
        .map(|cell| guard(|| task(cell)))
        .collect()
}
