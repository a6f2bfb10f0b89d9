//! Fully connected feedforward network.
//!
//! A [`Network`] is described by its *topology*, the width of each layer from input to
//! output. Between every pair of consecutive layers it holds a weight matrix of shape
//! `(next × prev)` and a bias column of shape `(next × 1)`. Every layer, including the
//! output layer, is activated with [`sigmoid`], so outputs always lie in `(0, 1)`.
//!
//! # Mutation
//!
//! [`Network::mutate`] is the only way a network changes after creation. Each weight and
//! bias is visited once (weights before biases, layer by layer, row-major); with
//! probability `rate` it receives additive noise drawn from `N(0, strength)`. An optional
//! clamp bounds the magnitude of mutated entries.

use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::{Matrix, NetworkError};

/// Range of the uniform distribution used for freshly created weights and biases.
const INIT_RANGE: (f64, f64) = (-1.0, 1.0);

/// Logistic activation, `1 / (1 + e^-x)`.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A fully connected feedforward network with sigmoid activations.
///
/// Cloning a network produces an independent deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    topology: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

#[derive(Deserialize)]
struct RawNetwork {
    topology: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

impl TryFrom<RawNetwork> for Network {
    type Error = NetworkError;

    fn try_from(raw: RawNetwork) -> Result<Self, Self::Error> {
        Network::from_parts(raw.topology, raw.weights, raw.biases)
    }
}

fn validate_topology(topology: &[usize]) -> Result<(), NetworkError> {
    if topology.len() < 2 || topology.contains(&0) {
        return Err(NetworkError::InvalidTopology {
            topology: topology.to_vec(),
        });
    }
    Ok(())
}

fn check_shape(
    what: &'static str,
    layer: usize,
    matrix: &Matrix,
    expected: (usize, usize),
) -> Result<(), NetworkError> {
    if matrix.shape() != expected {
        return Err(NetworkError::ShapeMismatch {
            what,
            layer,
            expected,
            actual: matrix.shape(),
        });
    }
    Ok(())
}

impl Network {
    /// Creates a network with every weight and bias drawn uniformly from `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidTopology`] if `topology` has fewer than two layers or
    /// any layer of width zero.
    pub fn random<R>(topology: &[usize], rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        validate_topology(topology)?;
        let (lo, hi) = INIT_RANGE;
        let mut weights = Vec::with_capacity(topology.len() - 1);
        let mut biases = Vec::with_capacity(topology.len() - 1);
        for pair in topology.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            weights.push(Matrix::random(next, prev, lo, hi, rng));
            biases.push(Matrix::random(next, 1, lo, hi, rng));
        }
        Ok(Self {
            topology: topology.to_vec(),
            weights,
            biases,
        })
    }

    /// Assembles a network from explicit matrices, checking every shape invariant.
    pub fn from_parts(
        topology: Vec<usize>,
        weights: Vec<Matrix>,
        biases: Vec<Matrix>,
    ) -> Result<Self, NetworkError> {
        validate_topology(&topology)?;
        let transitions = topology.len() - 1;
        if weights.len() != transitions || biases.len() != transitions {
            return Err(NetworkError::LayerCountMismatch {
                transitions,
                weights: weights.len(),
                biases: biases.len(),
            });
        }
        for (i, pair) in topology.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            check_shape("weight matrix", i, &weights[i], (next, prev))?;
            check_shape("bias matrix", i, &biases[i], (next, 1))?;
        }
        Ok(Self {
            topology,
            weights,
            biases,
        })
    }

    #[must_use]
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    #[must_use]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    /// Number of values the network accepts.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.topology[0]
    }

    /// Number of values the network produces.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.weights
            .iter()
            .chain(&self.biases)
            .map(|m| m.as_slice().len())
            .sum()
    }

    /// Runs a forward pass.
    ///
    /// For each layer the current activations are treated as a column vector and replaced
    /// by `sigmoid(W * x + b)`. The returned vector has [`Self::output_size`] entries, each
    /// in `(0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InputSizeMismatch`] if `input.len()` differs from
    /// [`Self::input_size`].
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.input_size() {
            return Err(NetworkError::InputSizeMismatch {
                expected: self.input_size(),
                actual: input.len(),
            });
        }
        let mut activations = Matrix::from_column(input);
        for (w, b) in self.weights.iter().zip(&self.biases) {
            let mut hidden = w.multiply(&activations)?;
            hidden.add_in_place(b)?;
            hidden.map_in_place(sigmoid);
            activations = hidden;
        }
        Ok(activations.into_vec())
    }

    /// Applies Gaussian mutation to every weight and bias in place.
    ///
    /// Each scalar is independently selected with probability `rate`; a selected scalar
    /// gets `N(0, strength)` noise added and, if `clamp` is set, is clamped to
    /// `[-clamp, clamp]`. A `rate` or `strength` of zero leaves the network untouched and
    /// draws nothing from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is outside `[0, 1]` or `strength` is negative or not finite.
    pub fn mutate<R>(&mut self, rate: f64, strength: f64, clamp: Option<f64>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!((0.0..=1.0).contains(&rate), "mutation rate must be in [0, 1]");
        assert!(
            strength.is_finite() && strength >= 0.0,
            "mutation strength must be finite and non-negative"
        );
        if rate == 0.0 || strength == 0.0 {
            return;
        }
        let normal = Normal::new(0.0, strength).unwrap();
        for m in self.weights.iter_mut().chain(&mut self.biases) {
            for v in m.as_mut_slice() {
                if rng.random_bool(rate) {
                    *v += rng.sample(normal);
                    if let Some(limit) = clamp {
                        *v = v.clamp(-limit, limit);
                    }
                }
            }
        }
    }
}
