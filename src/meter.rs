//! Monotonic request counter used as the control loop's objective signal.
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

struct CutState {
    last_cut: Instant,
    last_rate: f64,
}

/// Counter-plus-timestamp device yielding instantaneous throughput.
///
/// `add` is wait-free and callable from any number of producers; `cut` is
/// meant for a single caller (the arbiter's control task) and is the only
/// operation that resets the counter, so it is guarded separately from the
/// hot-path counter itself.
pub struct ThroughputMeter {
    counter: AtomicU64,
    state: Mutex<CutState>,
}

impl ThroughputMeter {
    #[must_use]
    pub fn new() -> Self {
        ThroughputMeter {
            counter: AtomicU64::new(0),
            state: Mutex::new(CutState {
                last_cut: Instant::now(),
                last_rate: 0.0,
            }),
        }
    }

    /// Increments the counter. Wait-free.
    pub fn add(&self) {
        self.counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Swaps the counter to zero and returns `(previous_rate, current_rate)`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "computing a rate from a count and an elapsed duration is inherent float division"
    )]
    pub fn cut(&self) -> (f64, f64) {
        let now = Instant::now();
        let swapped = self.counter.swap(0, Ordering::AcqRel);
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let elapsed = now.duration_since(state.last_cut).as_secs_f64();
        let current_rate = if elapsed > 0.0 {
            swapped as f64 / elapsed
        } else {
            0.0
        };
        let previous_rate = state.last_rate;
        state.last_rate = current_rate;
        state.last_cut = now;
        (previous_rate, current_rate)
    }
}

impl Default for ThroughputMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "the meter never computes a rate before the first cut, so this is an exact sentinel check, not a fuzzy magnitude comparison"
    )]
    fn first_cut_reports_zero_previous_rate() {
        let meter = ThroughputMeter::new();
        let (previous, _current) = meter.cut();
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn cut_resets_the_counter() {
        let meter = ThroughputMeter::new();
        meter.add();
        meter.add();
        meter.cut();
        assert_eq!(meter.counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn rate_reflects_add_count_over_elapsed_time() {
        let meter = ThroughputMeter::new();
        meter.cut();
        for _ in 0..10 {
            meter.add();
        }
        sleep(Duration::from_millis(50));
        let (_previous, current) = meter.cut();
        assert!(current > 0.0);
    }
}
