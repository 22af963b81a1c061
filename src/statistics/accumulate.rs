//! NaN-aware accumulator strategies and contiguous-run folding
//!
//! Each reduction kind is described by an [`Accumulator`]: an initial
//! state, a per-element update that ignores NaN, an associative merge for
//! combining partial states from disjoint partitions, and a finalize step
//! producing the output scalar. All accumulation is carried in `f64`.
//!
//! Contiguous runs are folded through `fold_run`. For sum, mean, min and
//! max the fold splits the run across eight independent accumulator lanes
//! with arithmetic NaN masking instead of a per-element branch, which
//! keeps the loop body amenable to auto-vectorization. Variance keeps a
//! scalar loop: the Welford update carries a loop-carried dependence on
//! the running mean, and correctness takes precedence over vectorization.

use super::operations::NanElement;

const LANES: usize = 8;

/// Shared contract for one reduction kind
pub(crate) trait Accumulator<T: NanElement>: 'static {
    type State: Copy + Send + Sync;

    fn init() -> Self::State;

    /// Fold one sample into the state; NaN samples are a no-op
    fn update(state: &mut Self::State, value: T);

    /// Combine two partial states from disjoint partitions
    fn merge(a: Self::State, b: Self::State) -> Self::State;

    /// Produce the output scalar for a fully reduced slice
    fn finalize(state: Self::State) -> T;

    /// Fold a contiguous run of elements into a single state
    fn fold_run(run: &[T]) -> Self::State {
        let mut state = Self::init();
        for &value in run {
            Self::update(&mut state, value);
        }
        state
    }
}

/// Count and running sum, shared by the sum and mean kinds
#[derive(Debug, Clone, Copy)]
pub(crate) struct SumState {
    pub(crate) count: u64,
    pub(crate) sum: f64,
}

/// Welford triple for variance and standard deviation
#[derive(Debug, Clone, Copy)]
pub(crate) struct WelfordState {
    pub(crate) count: u64,
    pub(crate) mean: f64,
    pub(crate) m2: f64,
}

/// Count and tracked extreme, shared by the min and max kinds
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExtremeState {
    pub(crate) count: u64,
    pub(crate) value: f64,
}

pub(crate) struct SumAcc;
pub(crate) struct MeanAcc;
pub(crate) struct VarAcc;
pub(crate) struct StdAcc;
pub(crate) struct MinAcc;
pub(crate) struct MaxAcc;

fn fold_run_sum<T: NanElement>(run: &[T]) -> SumState {
    let mut sums = [0.0_f64; LANES];
    let mut counts = [0_u64; LANES];

    let mut chunks = run.chunks_exact(LANES);
    for chunk in chunks.by_ref() {
        for lane in 0..LANES {
            let sample = chunk[lane].widen();
            let missing = sample.is_nan();
            sums[lane] += if missing { 0.0 } else { sample };
            counts[lane] += u64::from(!missing);
        }
    }

    let mut state = SumState { count: 0, sum: 0.0 };
    for lane in 0..LANES {
        state.count += counts[lane];
        state.sum += sums[lane];
    }
    for &value in chunks.remainder() {
        <SumAcc as Accumulator<T>>::update(&mut state, value);
    }
    state
}

fn fold_run_extreme<T: NanElement>(
    run: &[T],
    identity: f64,
    pick: fn(f64, f64) -> f64,
) -> ExtremeState {
    let mut extremes = [identity; LANES];
    let mut counts = [0_u64; LANES];

    let mut chunks = run.chunks_exact(LANES);
    for chunk in chunks.by_ref() {
        for lane in 0..LANES {
            let sample = chunk[lane].widen();
            let missing = sample.is_nan();
            extremes[lane] = if missing {
                extremes[lane]
            } else {
                pick(extremes[lane], sample)
            };
            counts[lane] += u64::from(!missing);
        }
    }

    let mut state = ExtremeState {
        count: 0,
        value: identity,
    };
    for lane in 0..LANES {
        state.count += counts[lane];
        state.value = pick(state.value, extremes[lane]);
    }
    for &value in chunks.remainder() {
        let sample = value.widen();
        if !sample.is_nan() {
            state.count += 1;
            state.value = pick(state.value, sample);
        }
    }
    state
}

impl<T: NanElement> Accumulator<T> for SumAcc {
    type State = SumState;

    fn init() -> SumState {
        SumState { count: 0, sum: 0.0 }
    }

    fn update(state: &mut SumState, value: T) {
        let sample = value.widen();
        let missing = sample.is_nan();
        state.sum += if missing { 0.0 } else { sample };
        state.count += u64::from(!missing);
    }

    fn merge(a: SumState, b: SumState) -> SumState {
        SumState {
            count: a.count + b.count,
            sum: a.sum + b.sum,
        }
    }

    /// An all-NaN slice sums to 0
    fn finalize(state: SumState) -> T {
        T::narrow(state.sum)
    }

    fn fold_run(run: &[T]) -> SumState {
        fold_run_sum(run)
    }
}

impl<T: NanElement> Accumulator<T> for MeanAcc {
    type State = SumState;

    fn init() -> SumState {
        <SumAcc as Accumulator<T>>::init()
    }

    fn update(state: &mut SumState, value: T) {
        <SumAcc as Accumulator<T>>::update(state, value);
    }

    fn merge(a: SumState, b: SumState) -> SumState {
        <SumAcc as Accumulator<T>>::merge(a, b)
    }

    /// An all-NaN slice has count 0 and finalizes to NaN, not a divide error
    fn finalize(state: SumState) -> T {
        if state.count == 0 {
            T::nan()
        } else {
            T::narrow(state.sum / state.count as f64)
        }
    }

    fn fold_run(run: &[T]) -> SumState {
        fold_run_sum(run)
    }
}

impl<T: NanElement> Accumulator<T> for VarAcc {
    type State = WelfordState;

    fn init() -> WelfordState {
        WelfordState {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    fn update(state: &mut WelfordState, value: T) {
        let sample = value.widen();
        if sample.is_nan() {
            return;
        }
        state.count += 1;
        let delta = sample - state.mean;
        state.mean += delta / state.count as f64;
        state.m2 += delta * (sample - state.mean);
    }

    /// Parallel Welford combine: pairwise delta correction, not a naive
    /// sum of the m2 terms
    fn merge(a: WelfordState, b: WelfordState) -> WelfordState {
        if a.count == 0 {
            return b;
        }
        if b.count == 0 {
            return a;
        }
        let count = a.count + b.count;
        let delta = b.mean - a.mean;
        let mean = a.mean + delta * (b.count as f64 / count as f64);
        let m2 = a.m2 + b.m2 + delta * delta * (a.count as f64 * b.count as f64 / count as f64);
        WelfordState { count, mean, m2 }
    }

    /// Population variance; fewer than two samples finalize to NaN
    fn finalize(state: WelfordState) -> T {
        if state.count < 2 {
            T::nan()
        } else {
            T::narrow(state.m2 / state.count as f64)
        }
    }
}

impl<T: NanElement> Accumulator<T> for StdAcc {
    type State = WelfordState;

    fn init() -> WelfordState {
        <VarAcc as Accumulator<T>>::init()
    }

    fn update(state: &mut WelfordState, value: T) {
        <VarAcc as Accumulator<T>>::update(state, value);
    }

    fn merge(a: WelfordState, b: WelfordState) -> WelfordState {
        <VarAcc as Accumulator<T>>::merge(a, b)
    }

    fn finalize(state: WelfordState) -> T {
        if state.count < 2 {
            T::nan()
        } else {
            T::narrow((state.m2 / state.count as f64).sqrt())
        }
    }
}

impl<T: NanElement> Accumulator<T> for MinAcc {
    type State = ExtremeState;

    fn init() -> ExtremeState {
        ExtremeState {
            count: 0,
            value: f64::INFINITY,
        }
    }

    fn update(state: &mut ExtremeState, value: T) {
        let sample = value.widen();
        if !sample.is_nan() {
            state.count += 1;
            state.value = state.value.min(sample);
        }
    }

    fn merge(a: ExtremeState, b: ExtremeState) -> ExtremeState {
        ExtremeState {
            count: a.count + b.count,
            value: a.value.min(b.value),
        }
    }

    /// A slice with no non-NaN samples finalizes to NaN
    fn finalize(state: ExtremeState) -> T {
        if state.count == 0 {
            T::nan()
        } else {
            T::narrow(state.value)
        }
    }

    fn fold_run(run: &[T]) -> ExtremeState {
        fold_run_extreme(run, f64::INFINITY, f64::min)
    }
}

impl<T: NanElement> Accumulator<T> for MaxAcc {
    type State = ExtremeState;

    fn init() -> ExtremeState {
        ExtremeState {
            count: 0,
            value: f64::NEG_INFINITY,
        }
    }

    fn update(state: &mut ExtremeState, value: T) {
        let sample = value.widen();
        if !sample.is_nan() {
            state.count += 1;
            state.value = state.value.max(sample);
        }
    }

    fn merge(a: ExtremeState, b: ExtremeState) -> ExtremeState {
        ExtremeState {
            count: a.count + b.count,
            value: a.value.max(b.value),
        }
    }

    fn finalize(state: ExtremeState) -> T {
        if state.count == 0 {
            T::nan()
        } else {
            T::narrow(state.value)
        }
    }

    fn fold_run(run: &[T]) -> ExtremeState {
        fold_run_extreme(run, f64::NEG_INFINITY, f64::max)
    }
}
