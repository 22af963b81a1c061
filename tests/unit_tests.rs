//! Comprehensive unit tests for nanstat modules
//!
//! These tests provide extensive coverage of the core functionality
//! to ensure reliability and prevent regressions.

use ndarray::{array, Array1, ArrayD, IxDyn};
use nanstat::{
    dispatch::{histogram1d_dyn, reduce_dyn, ArrayData, ArrayOutput, ElementType, HistogramOutput},
    errors::NanstatError,
    histogram::histogram1d,
    parallel::{get_parallel_info, ParallelConfig},
    statistics::{
        nanmax, nanmean, nanmin, nanstd, nansum, nanvar, normalize_axes, reduce, Reduction,
        StatisticalReduction,
    },
};

fn scalar(result: &ArrayD<f64>) -> f64 {
    result[IxDyn(&[])]
}

#[test]
fn test_error_types() {
    let axis_err = NanstatError::InvalidAxis { axis: -4, rank: 3 };
    assert!(format!("{}", axis_err).contains("Axis -4 is out of bounds"));
    assert!(format!("{}", axis_err).contains("3 dimensions"));

    let dup_err = NanstatError::DuplicateAxis { axis: 1 };
    assert!(format!("{}", dup_err).contains("Axis 1 appears more than once"));

    let type_err = NanstatError::UnsupportedType {
        dtype: "int64",
        operation: "mean",
    };
    assert!(format!("{}", type_err).contains("'mean'"));
    assert!(format!("{}", type_err).contains("'int64'"));

    let shape_err = NanstatError::Shape {
        message: "histogram requires at least one bin".to_string(),
    };
    assert!(format!("{}", shape_err).contains("Invalid shape"));

    let worker_err = NanstatError::WorkerFailure("boom".to_string());
    assert!(format!("{}", worker_err).contains("Worker task failed: boom"));

    let generic_err = NanstatError::Generic("Test error".to_string());
    assert_eq!(format!("{}", generic_err), "Test error");
}

#[test]
fn test_parallel_config() {
    // Test default configuration
    let default_config = ParallelConfig::new_default();
    assert!(default_config.num_threads.is_none());

    // Test with specific threads
    let config_4 = ParallelConfig::with_threads(4);
    assert_eq!(config_4.num_threads, Some(4));

    // Test all cores configuration
    let all_cores_config = ParallelConfig::all_cores();
    assert!(all_cores_config.num_threads.is_some());
    assert!(all_cores_config.num_threads.unwrap() > 0);

    // Test current threads
    let current = default_config.current_threads();
    assert!(current > 0);
}

#[test]
fn test_parallel_info() {
    let info = get_parallel_info();
    assert!(info.current_threads > 0);
    assert!(info.available_cores > 0);
    assert!(info.available_parallelism > 0);

    // Test info printing (doesn't panic)
    info.print_info();
}

#[test]
fn test_reduction_operation() {
    assert_eq!(Reduction::Mean, Reduction::Mean);
    assert_ne!(Reduction::Mean, Reduction::Sum);

    assert_eq!(Reduction::Sum.as_str(), "sum");
    assert_eq!(Reduction::Var.as_str(), "variance");
    assert_eq!(Reduction::Std.as_str(), "standard deviation");
    assert_eq!(Reduction::Min.as_str(), "minimum");
    assert_eq!(Reduction::Max.as_str(), "maximum");

    // Test debug formatting
    assert_eq!(format!("{:?}", Reduction::Mean), "Mean");
}

#[test]
fn test_axis_normalization() {
    // Negative indices resolve from the end
    assert_eq!(normalize_axes(&[-1], 3).unwrap(), vec![2]);
    assert_eq!(normalize_axes(&[-3, -1], 3).unwrap(), vec![0, 2]);

    // Output is sorted canonical order regardless of input order
    assert_eq!(normalize_axes(&[2, 0], 3).unwrap(), vec![0, 2]);

    // Out-of-range indices are rejected
    match normalize_axes(&[3], 3) {
        Err(NanstatError::InvalidAxis { axis, rank }) => {
            assert_eq!(axis, 3);
            assert_eq!(rank, 3);
        }
        _ => panic!("Expected InvalidAxis error"),
    }
    assert!(normalize_axes(&[-4], 3).is_err());

    // Duplicates after normalization are rejected, including a positive
    // and negative spelling of the same axis
    match normalize_axes(&[0, 0], 2) {
        Err(NanstatError::DuplicateAxis { axis }) => assert_eq!(axis, 0),
        _ => panic!("Expected DuplicateAxis error"),
    }
    assert!(normalize_axes(&[1, -1], 2).is_err());
}

#[test]
fn test_all_nan_slices() {
    let data = ArrayD::from_elem(IxDyn(&[4]), f64::NAN);
    let view = data.view();

    // Sum of an all-NaN slice is 0; every other kind yields NaN
    assert_eq!(scalar(&nansum(&view, None, false).unwrap()), 0.0);
    assert!(scalar(&nanmean(&view, None, false).unwrap()).is_nan());
    assert!(scalar(&nanvar(&view, None, false).unwrap()).is_nan());
    assert!(scalar(&nanstd(&view, None, false).unwrap()).is_nan());
    assert!(scalar(&nanmin(&view, None, false).unwrap()).is_nan());
    assert!(scalar(&nanmax(&view, None, false).unwrap()).is_nan());
}

#[test]
fn test_variance_sample_floor() {
    // Fewer than two non-NaN samples yields NaN
    let single = array![5.0_f64].into_dyn();
    assert!(scalar(&nanvar(&single.view(), None, false).unwrap()).is_nan());
    assert!(scalar(&nanstd(&single.view(), None, false).unwrap()).is_nan());

    let masked = array![5.0_f64, f64::NAN, f64::NAN].into_dyn();
    assert!(scalar(&nanvar(&masked.view(), None, false).unwrap()).is_nan());

    // Two equal samples have zero variance
    let constant = array![5.0_f64, 5.0].into_dyn();
    assert_eq!(scalar(&nanvar(&constant.view(), None, false).unwrap()), 0.0);

    // Population variance of [1, 2, 4] with a NaN hole:
    // mean = 7/3, m2 = 42/9, var = 14/9
    let holed = array![1.0_f64, 2.0, f64::NAN, 4.0].into_dyn();
    let var = scalar(&nanvar(&holed.view(), None, false).unwrap());
    assert!((var - 14.0 / 9.0).abs() < 1e-12);
    let std = scalar(&nanstd(&holed.view(), None, false).unwrap());
    assert!((std - (14.0_f64 / 9.0).sqrt()).abs() < 1e-12);
}

#[test]
fn test_size_zero_axis() {
    let empty = ArrayD::<f64>::zeros(IxDyn(&[0, 3]));
    let view = empty.view();

    let sums = nansum(&view, Some(&[0]), false).unwrap();
    assert_eq!(sums.shape(), &[3]);
    assert!(sums.iter().all(|&v| v == 0.0));

    let means = nanmean(&view, Some(&[0]), false).unwrap();
    assert!(means.iter().all(|v| v.is_nan()));

    let mins = nanmin(&view, Some(&[0]), false).unwrap();
    assert!(mins.iter().all(|v| v.is_nan()));
}

#[test]
fn test_zero_axes_is_a_copy() {
    // An explicitly empty axis set is the degenerate "no reduction":
    // the values, including NaN, come back as given
    let data = array![[1.0_f64, f64::NAN], [3.0, 4.0]].into_dyn();
    let copied = nansum(&data.view(), Some(&[]), false).unwrap();

    assert_eq!(copied.shape(), data.shape());
    assert_eq!(copied[[0, 0]], 1.0);
    assert!(copied[[0, 1]].is_nan());
    assert_eq!(copied[[1, 1]], 4.0);
}

#[test]
fn test_keep_dims_shapes() {
    let data = ArrayD::<f64>::zeros(IxDyn(&[2, 3, 4]));
    let view = data.view();

    let kept = nansum(&view, Some(&[0, 2]), true).unwrap();
    assert_eq!(kept.shape(), &[1, 3, 1]);

    let dropped = nansum(&view, Some(&[0, 2]), false).unwrap();
    assert_eq!(dropped.shape(), &[3]);

    let full = nansum(&view, None, true).unwrap();
    assert_eq!(full.shape(), &[1, 1, 1]);

    let full_dropped = nansum(&view, None, false).unwrap();
    assert_eq!(full_dropped.shape(), &[] as &[usize]);
}

#[test]
fn test_negative_axis_equivalence() {
    let data = array![[1.0_f64, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn();
    let view = data.view();

    let positive = nansum(&view, Some(&[1]), false).unwrap();
    let negative = nansum(&view, Some(&[-1]), false).unwrap();
    assert_eq!(positive, negative);
    assert_eq!(positive, array![6.0, 15.0].into_dyn());
}

#[test]
fn test_sum_matches_plain_sum() {
    // Without NaN, the kernel agrees with a straightforward sum
    let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let plain: f64 = values.iter().sum();
    let data = Array1::from_vec(values).into_dyn();

    let total = scalar(&nansum(&data.view(), None, false).unwrap());
    assert!((total - plain).abs() < 1e-9);
}

#[test]
fn test_run_lengths_and_remainders() {
    // Lane-split folds must handle lengths around the lane width,
    // including the empty run
    for len in [0_usize, 1, 7, 8, 9, 17, 31] {
        let values: Vec<f64> = (0..len)
            .map(|i| if i % 3 == 1 { f64::NAN } else { i as f64 })
            .collect();
        let expected_sum: f64 = values.iter().filter(|v| !v.is_nan()).sum();
        let expected_min = values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(f64::INFINITY, |acc, &v| acc.min(v));

        let data = Array1::from_vec(values).into_dyn();
        let total = scalar(&nansum(&data.view(), None, false).unwrap());
        assert_eq!(total, expected_sum, "sum mismatch at len {}", len);

        let min = scalar(&nanmin(&data.view(), None, false).unwrap());
        if expected_min.is_infinite() {
            assert!(min.is_nan(), "min of empty run should be NaN");
        } else {
            assert_eq!(min, expected_min, "min mismatch at len {}", len);
        }
    }
}

#[test]
fn test_strided_views() {
    // A transposed view is not contiguous; results must match the
    // equivalent reduction on the original layout
    let data = array![[1.0_f64, 2.0, 3.0], [4.0, f64::NAN, 6.0]].into_dyn();
    let transposed = data.t().into_dyn();

    let rows = nansum(&data.view(), Some(&[1]), false).unwrap();
    let cols_of_t = nansum(&transposed, Some(&[0]), false).unwrap();
    assert_eq!(rows, cols_of_t);

    let max_rows = nanmax(&data.view(), Some(&[0]), false).unwrap();
    let max_t = nanmax(&transposed, Some(&[1]), false).unwrap();
    assert_eq!(max_rows, max_t);
}

#[test]
fn test_statistical_reduction_trait() {
    let data = array![[1.0_f64, 2.0], [3.0, 4.0]].into_dyn();

    let means = data.nan_reduce(Reduction::Mean, Some(&[0]), false).unwrap();
    assert_eq!(means, array![2.0, 3.0].into_dyn());

    let direct = reduce(&data.view(), Reduction::Mean, Some(&[0]), false).unwrap();
    assert_eq!(means, direct);
}

#[test]
fn test_f32_reductions() {
    let data = array![[1.0_f32, f32::NAN, 3.0], [f32::NAN, 5.0, 6.0]].into_dyn();
    let view = data.view();

    let total = nansum(&view, None, false).unwrap();
    assert_eq!(total[IxDyn(&[])], 15.0_f32);

    let mean = nanmean(&view, None, false).unwrap();
    assert_eq!(mean[IxDyn(&[])], 3.75_f32);

    let columns = nansum(&view, Some(&[0]), false).unwrap();
    assert_eq!(columns, array![1.0_f32, 5.0, 9.0].into_dyn());
}

#[test]
fn test_histogram_equal_width_bins() {
    let samples: Array1<f64> = (0..10).map(f64::from).collect();
    let samples = samples.into_dyn();

    let hist = histogram1d(&samples.view(), 5, None).unwrap();

    assert_eq!(hist.bins(), 5);
    assert_eq!(hist.edges.len(), 6);
    assert_eq!(hist.counts.to_vec(), vec![2, 2, 2, 2, 2]);
    assert_eq!(hist.total_count(), 10);

    let expected_edges = [0.0, 1.8, 3.6, 5.4, 7.2, 9.0];
    for (edge, expected) in hist.edges.iter().zip(expected_edges) {
        assert!((edge - expected).abs() < 1e-12);
    }

    // Edges are non-decreasing
    for pair in hist.edges.to_vec().windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn test_histogram_explicit_range() {
    let samples = array![-1.0_f64, 0.5, 1.5, 2.0, 3.0, f64::NAN].into_dyn();
    let hist = histogram1d(&samples.view(), 2, Some((0.0, 2.0))).unwrap();

    // -1 and 3 fall outside the range, NaN is skipped, and the upper
    // bound itself counts in the closed last bin
    assert_eq!(hist.counts.to_vec(), vec![1, 2]);
    assert_eq!(hist.total_count(), 3);
    assert_eq!(hist.edges.to_vec(), vec![0.0, 1.0, 2.0]);
}

#[test]
fn test_histogram_degenerate_range() {
    let samples = array![4.2_f64, 4.2, 4.2, f64::NAN, 4.2].into_dyn();
    let hist = histogram1d(&samples.view(), 3, None).unwrap();

    // min == max: all edges coincide and every non-NaN sample lands in
    // bin 0 by convention
    assert_eq!(hist.counts.to_vec(), vec![4, 0, 0]);
    assert!(hist.edges.iter().all(|&edge| edge == 4.2));
}

#[test]
fn test_histogram_errors() {
    let samples = array![1.0_f64, 2.0].into_dyn();

    match histogram1d(&samples.view(), 0, None) {
        Err(NanstatError::Shape { message }) => {
            assert!(message.contains("at least one bin"));
        }
        _ => panic!("Expected Shape error for zero bins"),
    }

    let all_nan = ArrayD::from_elem(IxDyn(&[4]), f64::NAN);
    match histogram1d(&all_nan.view(), 4, None) {
        Err(NanstatError::Shape { message }) => {
            assert!(message.contains("without non-NaN samples"));
        }
        _ => panic!("Expected Shape error for an all-NaN input without a range"),
    }

    // An all-NaN input with an explicit range is fine: every bin is empty
    let empty_hist = histogram1d(&all_nan.view(), 4, Some((0.0, 1.0))).unwrap();
    assert_eq!(empty_hist.total_count(), 0);

    assert!(histogram1d(&samples.view(), 4, Some((f64::NAN, 1.0))).is_err());
    assert!(histogram1d(&samples.view(), 4, Some((2.0, 1.0))).is_err());
}

#[test]
fn test_histogram_n_dimensional_input() {
    // N-dimensional buffers are binned sample-by-sample
    let data = array![[1.0_f64, 2.0], [3.0, f64::NAN]].into_dyn();
    let hist = histogram1d(&data.view(), 2, None).unwrap();

    assert_eq!(hist.total_count(), 3);
    assert_eq!(hist.edges.to_vec(), vec![1.0, 2.0, 3.0]);
    assert_eq!(hist.counts.to_vec(), vec![1, 2]);
}

#[test]
fn test_dispatch_float_paths() {
    let data = array![[1.0_f64, f64::NAN], [3.0, 4.0]].into_dyn();
    let tagged = ArrayData::from(data.view());
    assert_eq!(tagged.element_type(), ElementType::F64);
    assert_eq!(tagged.shape(), &[2, 2]);
    assert_eq!(tagged.len(), 4);

    match reduce_dyn(&tagged, Reduction::Sum, None, false).unwrap() {
        ArrayOutput::F64(result) => assert_eq!(result[IxDyn(&[])], 8.0),
        ArrayOutput::F32(_) => panic!("f64 input must produce an f64 result"),
    }

    let single = array![0.5_f32, 1.5, 2.5].into_dyn();
    let tagged = ArrayData::from(single.view());
    match histogram1d_dyn(&tagged, 2, Some((0.0, 3.0))).unwrap() {
        HistogramOutput::F32(hist) => assert_eq!(hist.total_count(), 3),
        HistogramOutput::F64(_) => panic!("f32 input must produce an f32 histogram"),
    }
}

#[test]
fn test_dispatch_rejects_integers() {
    let ints = ArrayD::<i64>::zeros(IxDyn(&[2, 2]));
    let tagged = ArrayData::from(ints.view());
    assert_eq!(tagged.element_type().as_str(), "int64");

    match reduce_dyn(&tagged, Reduction::Mean, None, false) {
        Err(NanstatError::UnsupportedType { dtype, operation }) => {
            assert_eq!(dtype, "int64");
            assert_eq!(operation, "mean");
        }
        _ => panic!("Expected UnsupportedType error for an integer buffer"),
    }

    let ints32 = ArrayD::<i32>::zeros(IxDyn(&[3]));
    let tagged = ArrayData::from(ints32.view());
    assert!(histogram1d_dyn(&tagged, 4, None).is_err());
}

#[test]
fn test_dispatch_axis_validation() {
    // Axis errors surface through the dynamic layer before any work runs
    let data = array![[1.0_f64, 2.0], [3.0, 4.0]].into_dyn();
    let tagged = ArrayData::from(data.view());

    assert!(reduce_dyn(&tagged, Reduction::Sum, Some(&[2]), false).is_err());
    assert!(reduce_dyn(&tagged, Reduction::Sum, Some(&[0, 0]), false).is_err());
}
