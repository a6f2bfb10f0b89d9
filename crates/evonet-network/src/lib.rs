//! Dense feedforward neural networks for neuroevolution.
//!
//! This crate provides the two numeric building blocks of the training engine:
//!
//! - [`matrix::Matrix`] - a small row-major dense matrix with the handful of operations a
//!   forward pass needs
//! - [`network::Network`] - a fully connected, sigmoid-activated feedforward network with
//!   randomized initialization and in-place Gaussian mutation
//!
//! Networks never learn by gradient descent. They are created at random and changed only
//! by [`Network::mutate`], driven by the population manager in `evonet-training`.
//!
//! All randomness comes from a caller-supplied [`rand::Rng`], so seeding the generator
//! reproduces a network bit-for-bit.
//!
//! # Example
//!
//! ```
//! use evonet_network::Network;
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(42);
//! let network = Network::random(&[5, 8, 8, 1], &mut rng).unwrap();
//! let output = network.evaluate(&[0.1, 0.0, 1.5, 0.2, 1.0]).unwrap();
//! assert_eq!(output.len(), 1);
//! assert!(output[0] > 0.0 && output[0] < 1.0);
//! ```

pub use self::{matrix::Matrix, network::Network};

pub mod matrix;
pub mod network;

/// Matrix shape as `(rows, cols)`.
pub type Shape = (usize, usize);

/// Two matrices had incompatible shapes for an operation.
///
/// Neither operand is modified when this error is returned. Inside a well-formed
/// [`Network`] it can only result from a construction bug.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "cannot {operation} {}x{} matrix with {}x{} matrix",
    lhs.0,
    lhs.1,
    rhs.0,
    rhs.1
)]
pub struct DimensionMismatchError {
    pub operation: &'static str,
    pub lhs: Shape,
    pub rhs: Shape,
}

impl DimensionMismatchError {
    pub(crate) fn new(operation: &'static str, lhs: &Matrix, rhs: &Matrix) -> Self {
        Self {
            operation,
            lhs: lhs.shape(),
            rhs: rhs.shape(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum NetworkError {
    #[display("invalid topology {topology:?}: need at least two layers, each with one or more units")]
    InvalidTopology { topology: Vec<usize> },
    #[display("input has {actual} values, network expects {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },
    #[display("{what} {layer} has shape {}x{}, expected {}x{}", actual.0, actual.1, expected.0, expected.1)]
    ShapeMismatch {
        what: &'static str,
        layer: usize,
        expected: Shape,
        actual: Shape,
    },
    #[display("network has {weights} weight and {biases} bias matrices for {transitions} layer transitions")]
    LayerCountMismatch {
        transitions: usize,
        weights: usize,
        biases: usize,
    },
    #[display("{_0}")]
    #[from]
    DimensionMismatch(DimensionMismatchError),
}
