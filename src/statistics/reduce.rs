//! Axis-set reductions over borrowed array views
//!
//! The reducer normalizes the caller's axis specification, derives the
//! output shape, and drives one accumulator per output cell over all
//! elements along the reduced axes. Kept axes are moved to the front and
//! reduced axes to the back, so every cell folds the longest contiguous
//! sub-runs the input strides allow.

use crate::errors::{NanstatError, Result};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

use super::accumulate::{Accumulator, MaxAcc, MeanAcc, MinAcc, StdAcc, SumAcc, VarAcc};
use super::operations::{NanElement, Reduction};
use super::parallel;

/// Resolve an axis specification into canonical, unique, sorted indices
///
/// Negative indices count from the end of the shape.
///
/// # Errors
///
/// Returns `InvalidAxis` if an index is out of `[0, rank)` after
/// resolution, and `DuplicateAxis` if an index appears twice.
pub fn normalize_axes(axes: &[isize], rank: usize) -> Result<Vec<usize>> {
    let mut normalized = Vec::with_capacity(axes.len());
    for &axis in axes {
        let resolved = if axis < 0 { axis + rank as isize } else { axis };
        if resolved < 0 || resolved >= rank as isize {
            return Err(NanstatError::InvalidAxis { axis, rank });
        }
        let resolved = resolved as usize;
        if normalized.contains(&resolved) {
            return Err(NanstatError::DuplicateAxis { axis: resolved });
        }
        normalized.push(resolved);
    }
    normalized.sort_unstable();
    Ok(normalized)
}

/// Perform a NaN-aware reduction over the specified axes
///
/// `axes: None` reduces over every axis and yields a 0-dimensional
/// result (or an all-ones shape under `keep_dims`). `axes: Some(&[])`
/// is the degenerate "no reduction" case and returns a shape-preserving
/// copy with values, including NaN, as given; callers should generally
/// avoid it.
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated, or if a
/// pooled worker task fails.
pub fn reduce<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    operation: Reduction,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    match operation {
        Reduction::Sum => reduce_with::<T, SumAcc>(view, axes, keep_dims),
        Reduction::Mean => reduce_with::<T, MeanAcc>(view, axes, keep_dims),
        Reduction::Var => reduce_with::<T, VarAcc>(view, axes, keep_dims),
        Reduction::Std => reduce_with::<T, StdAcc>(view, axes, keep_dims),
        Reduction::Min => reduce_with::<T, MinAcc>(view, axes, keep_dims),
        Reduction::Max => reduce_with::<T, MaxAcc>(view, axes, keep_dims),
    }
}

fn reduce_with<T: NanElement, A: Accumulator<T>>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    let rank = view.ndim();
    let reduced = match axes {
        None => (0..rank).collect::<Vec<_>>(),
        // Zero axes is a documented degenerate case: no reduction, the
        // values pass through as given.
        Some(requested) if requested.is_empty() => return Ok(view.to_owned()),
        Some(requested) => normalize_axes(requested, rank)?,
    };

    if reduced.len() == rank {
        let state = fold_full::<T, A>(view)?;
        let value = A::finalize(state);
        let shape = if keep_dims { vec![1; rank] } else { Vec::new() };
        return Ok(ArrayD::from_elem(IxDyn(&shape), value));
    }

    // Kept axes in original order to the front, reduced axes to the back.
    let kept: Vec<usize> = (0..rank).filter(|dim| !reduced.contains(dim)).collect();
    let mut order = kept.clone();
    order.extend_from_slice(&reduced);
    let permuted = view.view().permuted_axes(IxDyn(&order));

    let outer_shape: Vec<usize> = kept.iter().map(|&dim| view.shape()[dim]).collect();
    let cells: usize = outer_shape.iter().product();
    let block_len: usize = reduced.iter().map(|&dim| view.shape()[dim]).product();

    // Row-major strides over the kept axes for decoding flat cell indices.
    let mut outer_strides = vec![1_usize; outer_shape.len()];
    for dim in (0..outer_shape.len().saturating_sub(1)).rev() {
        outer_strides[dim] = outer_strides[dim + 1] * outer_shape[dim + 1];
    }

    let states = parallel::run_cells(cells, block_len, |cell| {
        let mut block = permuted.view();
        let mut remaining = cell;
        for &stride in &outer_strides {
            block = block.index_axis_move(Axis(0), remaining / stride);
            remaining %= stride;
        }
        fold_block::<T, A>(&block)
    })?;

    let values: Vec<T> = states.into_iter().map(A::finalize).collect();
    let result = ArrayD::from_shape_vec(IxDyn(&outer_shape), values)?;

    if keep_dims {
        let mut full_shape = view.shape().to_vec();
        for &dim in &reduced {
            full_shape[dim] = 1;
        }
        Ok(result.into_shape(IxDyn(&full_shape))?)
    } else {
        Ok(result)
    }
}

/// Fold every element of a view into a single accumulator state
pub(crate) fn fold_full<T: NanElement, A: Accumulator<T>>(
    view: &ArrayViewD<'_, T>,
) -> Result<A::State> {
    match view.as_slice() {
        Some(buffer) => parallel::fold_chunks::<T, A>(buffer),
        None => Ok(fold_block::<T, A>(view)),
    }
}

/// Fold one reduced block, using contiguous runs where the layout allows
fn fold_block<T: NanElement, A: Accumulator<T>>(block: &ArrayViewD<'_, T>) -> A::State {
    if let Some(run) = block.as_slice() {
        return A::fold_run(run);
    }

    if block.ndim() == 0 {
        let mut state = A::init();
        for &value in block.iter() {
            A::update(&mut state, value);
        }
        return state;
    }

    // Strided layout: the lanes of the innermost axis are the longest
    // runs left; fold each lane and merge in lane order.
    let last = Axis(block.ndim() - 1);
    let mut state = A::init();
    for lane in block.lanes(last).into_iter() {
        let partial = match lane.as_slice() {
            Some(run) => A::fold_run(run),
            None => {
                let mut scalar = A::init();
                for &value in lane.iter() {
                    A::update(&mut scalar, value);
                }
                scalar
            }
        };
        state = A::merge(state, partial);
    }
    state
}

/// Computes the NaN-aware sum over the specified axes
///
/// Slices with no non-NaN samples sum to 0.
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated.
pub fn nansum<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    reduce(view, Reduction::Sum, axes, keep_dims)
}

/// Computes the NaN-aware arithmetic mean over the specified axes
///
/// Slices with no non-NaN samples yield NaN.
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated.
pub fn nanmean<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    reduce(view, Reduction::Mean, axes, keep_dims)
}

/// Computes the NaN-aware population variance over the specified axes
///
/// Slices with fewer than two non-NaN samples yield NaN.
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated.
pub fn nanvar<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    reduce(view, Reduction::Var, axes, keep_dims)
}

/// Computes the NaN-aware population standard deviation over the
/// specified axes
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated.
pub fn nanstd<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    reduce(view, Reduction::Std, axes, keep_dims)
}

/// Computes the NaN-aware minimum over the specified axes
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated.
pub fn nanmin<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    reduce(view, Reduction::Min, axes, keep_dims)
}

/// Computes the NaN-aware maximum over the specified axes
///
/// # Errors
///
/// Returns an error if an axis is out of range or duplicated.
pub fn nanmax<T: NanElement>(
    view: &ArrayViewD<'_, T>,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayD<T>> {
    reduce(view, Reduction::Max, axes, keep_dims)
}
