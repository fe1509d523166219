use crate::error::Result;
use crate::layers::dense::DenseLayer;
use crate::math::matrix::Matrix;
use crate::math::numeric::Numerics;
use crate::network::network::Network;

/// Plain gradient descent with separate rates for weights and biases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
    pub bias_learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64, bias_learning_rate: f64) -> Sgd {
        Sgd { learning_rate, bias_learning_rate }
    }

    /// Uses the rates stored in the network.
    pub fn for_network(network: &Network) -> Sgd {
        Sgd::new(network.learning_rate, network.bias_learning_rate)
    }

    /// Applies gradients summed over `batch_size` samples:
    /// `W -= (lr / B)·∇W`, `b -= (bias_lr / B)·∇b`.
    pub fn step(
        &self,
        layer: &mut DenseLayer,
        weights_grad: &Matrix,
        biases_grad: &Matrix,
        batch_size: usize,
        numerics: Numerics,
    ) -> Result<()> {
        let b = batch_size as f64;
        layer.apply_gradients(
            weights_grad,
            biases_grad,
            self.learning_rate / b,
            self.bias_learning_rate / b,
            numerics,
        )
    }
}
