//! Runtime element-type dispatch for dynamically typed buffers
//!
//! Callers that carry a runtime type tag (rather than a concrete `f32` or
//! `f64` view) present their buffer through [`ArrayData`], a closed set of
//! tagged variants. The dispatcher resolves the tag and the requested
//! operation to a concrete kernel instantiation, or rejects the
//! combination. Signed-integer tags exist so any tagged buffer can be
//! presented, but the NaN-aware kernels reject them: NaN-skip semantics
//! do not apply to integers.

use crate::errors::{NanstatError, Result};
use ndarray::{ArrayD, ArrayViewD};

use crate::histogram::{histogram1d, Histogram};
use crate::statistics::{reduce, Reduction};

/// Element type tags for dynamically typed buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    F32,
    F64,
    I32,
    I64,
}

impl ElementType {
    /// Get the string representation of the element type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::I32 => "int32",
            Self::I64 => "int64",
        }
    }
}

/// A borrowed, dynamically typed array view
#[derive(Debug)]
pub enum ArrayData<'a> {
    F32(ArrayViewD<'a, f32>),
    F64(ArrayViewD<'a, f64>),
    I32(ArrayViewD<'a, i32>),
    I64(ArrayViewD<'a, i64>),
}

impl<'a> ArrayData<'a> {
    /// The element type tag of the underlying buffer
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
        }
    }

    /// The shape of the underlying buffer
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(view) => view.shape(),
            Self::F64(view) => view.shape(),
            Self::I32(view) => view.shape(),
            Self::I64(view) => view.shape(),
        }
    }

    /// Total number of elements in the buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether the buffer holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<ArrayViewD<'a, f32>> for ArrayData<'a> {
    fn from(view: ArrayViewD<'a, f32>) -> Self {
        Self::F32(view)
    }
}

impl<'a> From<ArrayViewD<'a, f64>> for ArrayData<'a> {
    fn from(view: ArrayViewD<'a, f64>) -> Self {
        Self::F64(view)
    }
}

impl<'a> From<ArrayViewD<'a, i32>> for ArrayData<'a> {
    fn from(view: ArrayViewD<'a, i32>) -> Self {
        Self::I32(view)
    }
}

impl<'a> From<ArrayViewD<'a, i64>> for ArrayData<'a> {
    fn from(view: ArrayViewD<'a, i64>) -> Self {
        Self::I64(view)
    }
}

/// A freshly allocated, dynamically typed result array
#[derive(Debug)]
pub enum ArrayOutput {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl ArrayOutput {
    /// The element type tag of the result
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    /// The shape of the result
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::F32(data) => data.shape(),
            Self::F64(data) => data.shape(),
        }
    }
}

/// A dynamically typed histogram result
#[derive(Debug)]
pub enum HistogramOutput {
    F32(Histogram<f32>),
    F64(Histogram<f64>),
}

/// Perform a NaN-aware reduction on a dynamically typed buffer
///
/// The element type and operation are resolved to a concrete kernel
/// instantiation; the result carries the input's floating-point type.
///
/// # Errors
///
/// Returns `UnsupportedType` for integer-tagged buffers, and the usual
/// axis errors for invalid axis specifications.
pub fn reduce_dyn(
    data: &ArrayData<'_>,
    operation: Reduction,
    axes: Option<&[isize]>,
    keep_dims: bool,
) -> Result<ArrayOutput> {
    match data {
        ArrayData::F32(view) => reduce(view, operation, axes, keep_dims).map(ArrayOutput::F32),
        ArrayData::F64(view) => reduce(view, operation, axes, keep_dims).map(ArrayOutput::F64),
        ArrayData::I32(_) | ArrayData::I64(_) => Err(NanstatError::UnsupportedType {
            dtype: data.element_type().as_str(),
            operation: operation.as_str(),
        }),
    }
}

/// Compute a one-dimensional histogram of a dynamically typed buffer
///
/// The optional range is given in `f64` and narrowed to the buffer's
/// element type before binning.
///
/// # Errors
///
/// Returns `UnsupportedType` for integer-tagged buffers, and `Shape`
/// errors for invalid bin counts or ranges.
#[allow(clippy::cast_possible_truncation)]
pub fn histogram1d_dyn(
    data: &ArrayData<'_>,
    bins: usize,
    range: Option<(f64, f64)>,
) -> Result<HistogramOutput> {
    match data {
        ArrayData::F32(view) => {
            let range = range.map(|(lo, hi)| (lo as f32, hi as f32));
            histogram1d(view, bins, range).map(HistogramOutput::F32)
        }
        ArrayData::F64(view) => histogram1d(view, bins, range).map(HistogramOutput::F64),
        ArrayData::I32(_) | ArrayData::I64(_) => Err(NanstatError::UnsupportedType {
            dtype: data.element_type().as_str(),
            operation: "histogram",
        }),
    }
}
