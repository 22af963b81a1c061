//! Simple benchmark example showing the performance benefits of parallel
//! NaN-aware reductions.
//!
//! This example builds a synthetic detector-image stack with NaN holes
//! and compares a naive sequential mean against the parallel kernel.

use ndarray::{ArrayD, IxDyn};
use std::time::Instant;

use nanstat::statistics::nanmean;

fn build_stack(images: usize, height: usize, width: usize) -> ArrayD<f64> {
    let len = images * height * width;
    let values: Vec<f64> = (0..len)
        .map(|i| {
            // Punch periodic NaN holes, like masked detector pixels
            if i % 37 == 0 {
                f64::NAN
            } else {
                (i as f64 * 0.001).sin() + 1.0
            }
        })
        .collect();
    ArrayD::from_shape_vec(IxDyn(&[images, height, width]), values)
        .expect("stack shape matches the generated buffer")
}

fn sequential_mean(data: &ArrayD<f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut count = 0_u64;
    for &value in data.iter() {
        if !value.is_nan() {
            sum += value;
            count += 1;
        }
    }
    sum / count as f64
}

fn main() {
    println!("🔬 nanstat Parallel Reduction Benchmark");
    println!("==========================================\n");

    let available_threads = rayon::current_num_threads();
    println!(
        "System has {} logical CPU cores available\n",
        available_threads
    );

    let stack_shapes = vec![(8, 512, 512), (32, 1024, 1024)];

    for (images, height, width) in stack_shapes {
        println!("📊 Testing a {}x{}x{} image stack:", images, height, width);
        println!("-------------------------------------------");

        let stack = build_stack(images, height, width);

        println!("🐌 Sequential processing:");
        let start = Instant::now();
        let seq_mean = sequential_mean(&stack);
        let seq_time = start.elapsed().as_secs_f64();
        println!("   Mean result: {:.6}", seq_mean);
        println!("   ⏱️  Duration: {:.3} seconds\n", seq_time);

        println!("⚡ Parallel processing ({} threads):", available_threads);
        let start = Instant::now();
        let par_result = nanmean(&stack.view(), None, false).expect("reduction succeeds");
        let par_time = start.elapsed().as_secs_f64();
        let par_mean = par_result[IxDyn(&[])];
        println!("   Mean result: {:.6}", par_mean);
        println!("   ⏱️  Duration: {:.3} seconds", par_time);

        let speedup = seq_time / par_time;
        println!("   🚀 Speedup: {:.2}x faster\n", speedup);

        if (seq_mean - par_mean).abs() > 1e-9 * seq_mean.abs() {
            println!("⚠️  Results diverged beyond tolerance!");
        }
        println!("=========================================\n");
    }

    println!("💡 Key Takeaways:");
    println!("   - Larger stacks benefit more from parallel processing");
    println!("   - Use ParallelConfig to pin the worker pool size");
    println!("   - NaN samples are skipped, not propagated");
}
