use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::Activation;
use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::math::numeric::Numerics;

/// One fully connected layer: `out = g(W·x + b)`.
///
/// `weights` is `(outputs, inputs)`, `biases` is `(outputs, 1)`; inputs and
/// outputs travel as column vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Matrix,
    pub biases: Matrix,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> DenseLayer {
        DenseLayer {
            weights: Matrix::random(outputs, inputs, rng),
            biases: Matrix::random(outputs, 1, rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub fn output_size(&self) -> usize {
        self.weights.rows
    }

    /// Pre-activation `z = W·x + b`.
    pub fn weighted_input(&self, input: &Matrix, numerics: Numerics) -> Result<Matrix> {
        self.weights
            .dot_with(input, numerics)?
            .add_with(&self.biases, numerics)
    }

    /// Returns `(z, g(z))`.
    pub fn feed_from<A: Activation + ?Sized>(
        &self,
        input: &Matrix,
        activation: &A,
        numerics: Numerics,
    ) -> Result<(Matrix, Matrix)> {
        let z = self.weighted_input(input, numerics)?;
        let a = z.apply_with(activation, false, numerics)?;
        Ok((z, a))
    }

    /// Gradients of this layer for one sample: `(δ·xᵀ, δ)`, where `delta` is
    /// the error already multiplied by the activation derivative.
    pub fn compute_gradients(
        &self,
        delta: &Matrix,
        input: &Matrix,
        numerics: Numerics,
    ) -> Result<(Matrix, Matrix)> {
        let weights_grad = delta.dot_with(&input.transpose(), numerics)?;
        Ok((weights_grad, delta.clone()))
    }

    /// Error handed to the previous layer, before its activation derivative: `Wᵀ·δ`.
    pub fn back_propagate(&self, delta: &Matrix, numerics: Numerics) -> Result<Matrix> {
        self.weights.transpose().dot_with(delta, numerics)
    }

    /// `W -= weights_rate·∇W`, `b -= biases_rate·∇b`. Both new values are
    /// computed before either is stored.
    pub fn apply_gradients(
        &mut self,
        weights_grad: &Matrix,
        biases_grad: &Matrix,
        weights_rate: f64,
        biases_rate: f64,
        numerics: Numerics,
    ) -> Result<()> {
        let weights = self
            .weights
            .sub_with(&weights_grad.scale_with(weights_rate, numerics)?, numerics)?;
        let biases = self
            .biases
            .sub_with(&biases_grad.scale_with(biases_rate, numerics)?, numerics)?;
        self.weights = weights;
        self.biases = biases;
        Ok(())
    }
}
