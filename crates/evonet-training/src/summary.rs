//! Training telemetry.
//!
//! [`GenerationSummary`] condenses the fitness distribution of one finished generation;
//! [`TrainingStatus`] is the one-line progress indicator shown while a generation runs.

use std::fmt;

/// Fitness statistics of one completed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    /// Generation these statistics describe (1-based).
    pub generation: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl GenerationSummary {
    /// Computes statistics over `fitnesses`.
    ///
    /// Returns `None` if `fitnesses` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use evonet_training::GenerationSummary;
    ///
    /// let summary = GenerationSummary::new(1, [10.0, 40.0, 20.0, 5.0]).unwrap();
    /// assert_eq!(summary.min, 5.0);
    /// assert_eq!(summary.max, 40.0);
    /// assert_eq!(summary.mean, 18.75);
    /// assert_eq!(summary.median, 20.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(generation: usize, fitnesses: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = fitnesses.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            generation,
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: max {:.3}, mean {:.3}, median {:.3}, min {:.3}, std-dev {:.3}",
            self.generation, self.max, self.mean, self.median, self.min, self.std_dev
        )
    }
}

/// Snapshot of training progress.
///
/// Displays as `Gen: 3 | Agent: 12 | Best: 840`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingStatus {
    pub generation: usize,
    /// 1-based number of the agent currently being driven.
    pub agent: usize,
    pub best_fitness_ever: f64,
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen: {} | Agent: {} | Best: {:.0}",
            self.generation, self.agent, self.best_fitness_ever
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert!(GenerationSummary::new(1, Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_single_value() {
        let summary = GenerationSummary::new(4, [7.0]).unwrap();
        assert_eq!(summary.generation, 4);
        assert_eq!(summary.min, 7.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.median, 7.0);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_std_dev() {
        let summary = GenerationSummary::new(1, [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.std_dev, 2.0);
    }

    #[test]
    fn test_status_display() {
        let status = TrainingStatus {
            generation: 3,
            agent: 12,
            best_fitness_ever: 840.4,
        };
        assert_eq!(status.to_string(), "Gen: 3 | Agent: 12 | Best: 840");
    }
}
