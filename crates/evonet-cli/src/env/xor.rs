//! Exclusive-or as a four-tick episode.
//!
//! Each tick presents one of the four XOR cases; the episode ends after the last case.
//! Fitness is `4 - Σ|target - output|`, so a perfect network scores 4.

use super::Environment;

const PERFECT_SCORE: f64 = 4.0;

const CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

#[derive(Debug, Clone, Default)]
pub(crate) struct Xor {
    case: usize,
    error: f64,
}

impl Xor {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Environment for Xor {
    fn input_size(&self) -> usize {
        2
    }

    fn output_size(&self) -> usize {
        1
    }

    fn reset(&mut self) {
        self.case = 0;
        self.error = 0.0;
    }

    fn observe(&self) -> Vec<f64> {
        CASES[self.case].0.to_vec()
    }

    fn step(&mut self, outputs: &[f64]) -> Option<f64> {
        let (_, target) = CASES[self.case];
        self.error += (target - outputs[0]).abs();
        self.case += 1;
        (self.case == CASES.len()).then(|| PERFECT_SCORE - self.error)
    }
}
