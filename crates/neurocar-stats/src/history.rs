//! Best-fitness history across generations.
//!
//! Each generation reports its best fitness to a tracker, which answers with a
//! [`FitnessRecord`] holding that value and a running mean of the best fitness.
//! [`CumulativeBest`] averages over every generation seen so far, while
//! [`WindowedBest`] only averages over the last `n` generations so that
//! plateaus and regressions remain visible in long runs.

/// One line of fitness history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessRecord {
    /// Generation index the record belongs to.
    pub generation: usize,
    /// Best fitness of the generation.
    pub best: f64,
    /// Mean of the tracked best fitness values.
    pub mean: f64,
}

/// A tracker fed with the best fitness of each generation.
pub trait FitnessHistory {
    /// Records the best fitness of `generation` and returns the updated record.
    fn record(&mut self, generation: usize, best: f64) -> FitnessRecord;
}

/// Running mean of the best fitness over all recorded generations.
#[derive(Debug, Clone, Default)]
pub struct CumulativeBest {
    sum: f64,
    count: usize,
}

impl CumulativeBest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FitnessHistory for CumulativeBest {
    #[expect(clippy::cast_precision_loss)]
    fn record(&mut self, generation: usize, best: f64) -> FitnessRecord {
        self.sum += best;
        self.count += 1;
        FitnessRecord {
            generation,
            best,
            mean: self.sum / self.count as f64,
        }
    }
}

/// Mean of the best fitness over the last `n` recorded generations.
#[derive(Debug, Clone)]
pub struct WindowedBest {
    history: Vec<f64>,
    next: usize,
    filled: usize,
}

impl WindowedBest {
    /// Creates a tracker averaging over the last `window` generations.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    #[must_use]
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "window must not be empty");
        Self {
            history: vec![0.0; window],
            next: 0,
            filled: 0,
        }
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.history.len()
    }
}

impl FitnessHistory for WindowedBest {
    #[expect(clippy::cast_precision_loss)]
    fn record(&mut self, generation: usize, best: f64) -> FitnessRecord {
        self.history[self.next] = best;
        self.next = (self.next + 1) % self.history.len();
        self.filled = usize::min(self.filled + 1, self.history.len());
        let sum = self.history.iter().sum::<f64>();
        FitnessRecord {
            generation,
            best,
            mean: sum / self.filled as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cumulative_mean() {
        let mut history = CumulativeBest::new();
        assert_eq!(history.record(0, 1.0).mean, 1.0);
        assert_eq!(history.record(1, 2.0).mean, 1.5);
        let record = history.record(2, 6.0);
        assert_eq!(record.generation, 2);
        assert_eq!(record.best, 6.0);
        assert_eq!(record.mean, 3.0);
    }

    #[test]
    fn test_windowed_mean_before_window_is_full() {
        let mut history = WindowedBest::new(10);
        history.record(0, 2.0);
        let record = history.record(1, 4.0);
        assert_eq!(record.mean, 3.0);
    }

    #[test]
    fn test_windowed_mean_drops_old_values() {
        let mut history = WindowedBest::new(3);
        for (generation, best) in [10.0, 1.0, 2.0, 3.0].into_iter().enumerate() {
            history.record(generation, best);
        }
        let record = history.record(4, 4.0);
        assert_eq!(record.mean, 3.0);
        assert_eq!(history.window(), 3);
    }

    #[test]
    #[should_panic(expected = "window")]
    fn test_windowed_rejects_zero_window() {
        let _ = WindowedBest::new(0);
    }
}
