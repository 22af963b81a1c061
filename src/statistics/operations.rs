//! Core statistical operations and traits
//!
//! This module defines the fundamental types and traits for the NaN-aware
//! reduction kernels.

use crate::errors::Result;
use ndarray::{ArrayD, ArrayViewD};
use num_traits::Float;
use std::fmt::Debug;

/// Supported statistical reductions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Sum of non-NaN values
    Sum,
    /// Arithmetic mean of non-NaN values
    Mean,
    /// Population variance of non-NaN values
    Var,
    /// Population standard deviation of non-NaN values
    Std,
    /// Minimum non-NaN value
    Min,
    /// Maximum non-NaN value
    Max,
}

impl Reduction {
    /// Get the string representation of the operation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Var => "variance",
            Self::Std => "standard deviation",
            Self::Min => "minimum",
            Self::Max => "maximum",
        }
    }
}

/// Floating-point element types the kernels operate on
///
/// Accumulation is carried in `f64` regardless of the element type, so
/// `f32` inputs do not lose precision while summing long runs. The two
/// hooks convert between the element type and the accumulation domain.
pub trait NanElement: Float + Send + Sync + Debug + 'static {
    /// Widen a sample into the `f64` accumulation domain
    fn widen(self) -> f64;

    /// Narrow an accumulated value back to the element type
    fn narrow(value: f64) -> Self;
}

impl NanElement for f32 {
    fn widen(self) -> f64 {
        f64::from(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn narrow(value: f64) -> Self {
        value as f32
    }
}

impl NanElement for f64 {
    fn widen(self) -> f64 {
        self
    }

    fn narrow(value: f64) -> Self {
        value
    }
}

/// Trait for arrays that can perform NaN-aware statistical reductions
pub trait StatisticalReduction<T> {
    /// Perform a NaN-aware reduction over the specified axes
    ///
    /// `axes: None` reduces over every axis; negative indices count from
    /// the end. With `keep_dims` the reduced axes are retained with size 1.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An axis is out of bounds for the array
    /// - An axis is listed more than once after normalization
    /// - A pooled worker task fails
    fn nan_reduce(
        &self,
        operation: Reduction,
        axes: Option<&[isize]>,
        keep_dims: bool,
    ) -> Result<ArrayD<T>>;
}

impl<T: NanElement> StatisticalReduction<T> for ArrayD<T> {
    fn nan_reduce(
        &self,
        operation: Reduction,
        axes: Option<&[isize]>,
        keep_dims: bool,
    ) -> Result<ArrayD<T>> {
        super::reduce::reduce(&self.view(), operation, axes, keep_dims)
    }
}

impl<'a, T: NanElement> StatisticalReduction<T> for ArrayViewD<'a, T> {
    fn nan_reduce(
        &self,
        operation: Reduction,
        axes: Option<&[isize]>,
        keep_dims: bool,
    ) -> Result<ArrayD<T>> {
        super::reduce::reduce(self, operation, axes, keep_dims)
    }
}
