use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{MlpError, Result};
use crate::layers::dense::DenseLayer;
use crate::math::matrix::Matrix;
use crate::math::numeric::Numerics;
use crate::network::config::{validate_rate, validate_topology, NetworkConfig};
use crate::network::metadata::ModelMetadata;

/// A multi-layer perceptron with separate bias vectors.
///
/// Hidden layers share `activation`; the last layer uses `output_activation`.
/// The topology is fixed at construction. Only the trainer's update step
/// changes the weights afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layer_sizes: Vec<usize>,
    pub layers: Vec<DenseLayer>,
    pub activation: ActivationFunction,
    pub output_activation: ActivationFunction,
    pub learning_rate: f64,
    pub bias_learning_rate: f64,
    #[serde(default)]
    pub numerics: Numerics,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

/// Everything a forward pass computed, kept for backpropagation.
///
/// `activations[0]` is the input column; `zs[i]` and `activations[i + 1]`
/// belong to layer `i`.
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    pub zs: Vec<Matrix>,
    pub activations: Vec<Matrix>,
}

impl ForwardTrace {
    pub fn output(&self) -> &Matrix {
        // A trace always holds at least the input column.
        &self.activations[self.activations.len() - 1]
    }
}

impl Network {
    /// Single activation for all layers, bias learning rate equal to `learning_rate`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        learning_rate: f64,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Result<Network> {
        Network::from_config(&NetworkConfig::new(layer_sizes.to_vec(), learning_rate, activation), rng)
    }

    /// Builds and randomizes a network; weights and biases are uniform in [-1, 1).
    pub fn from_config<R: Rng + ?Sized>(config: &NetworkConfig, rng: &mut R) -> Result<Network> {
        config.validate()?;

        let layers = config
            .layer_sizes
            .windows(2)
            .map(|pair| DenseLayer::new(pair[0], pair[1], &mut *rng))
            .collect();

        Ok(Network {
            layer_sizes: config.layer_sizes.clone(),
            layers,
            activation: config.activation,
            output_activation: config.output_activation.unwrap_or(config.activation),
            learning_rate: config.learning_rate,
            bias_learning_rate: config.bias_learning_rate.unwrap_or(config.learning_rate),
            numerics: config.numerics,
            metadata: config.metadata.clone(),
        })
    }

    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Activation used by layer `index`.
    pub fn activation_for(&self, index: usize) -> ActivationFunction {
        if index + 1 == self.layers.len() {
            self.output_activation
        } else {
            self.activation
        }
    }

    /// Forward pass. Does not modify the network.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;

        let mut current = Matrix::column_vector(input);
        for (i, layer) in self.layers.iter().enumerate() {
            let (_, a) = layer.feed_from(&current, &self.activation_for(i), self.numerics)?;
            current = a;
        }
        Ok(current.flatten())
    }

    /// Forward pass that keeps every pre-activation and activation.
    pub fn forward_trace(&self, input: &[f64]) -> Result<ForwardTrace> {
        self.check_input(input)?;

        let mut zs = Vec::with_capacity(self.layers.len());
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(Matrix::column_vector(input));

        for (i, layer) in self.layers.iter().enumerate() {
            let (z, a) = layer.feed_from(&activations[i], &self.activation_for(i), self.numerics)?;
            zs.push(z);
            activations.push(a);
        }

        Ok(ForwardTrace { zs, activations })
    }

    /// Verifies that the layers agree with `layer_sizes` and the rates are usable.
    /// Run on every deserialized model.
    pub fn check_invariants(&self) -> Result<()> {
        validate_topology(&self.layer_sizes).map_err(|e| MlpError::CorruptModel(e.to_string()))?;
        validate_rate("learning_rate", self.learning_rate)
            .and_then(|_| validate_rate("bias_learning_rate", self.bias_learning_rate))
            .map_err(|e| MlpError::CorruptModel(e.to_string()))?;

        if self.layers.len() != self.layer_sizes.len() - 1 {
            return Err(MlpError::CorruptModel(format!(
                "{} layer sizes need {} weight layers, found {}",
                self.layer_sizes.len(),
                self.layer_sizes.len() - 1,
                self.layers.len()
            )));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            let expected = (self.layer_sizes[i + 1], self.layer_sizes[i]);
            if layer.weights.shape() != expected || !is_rectangular(&layer.weights) {
                return Err(MlpError::CorruptModel(format!(
                    "layer {} weights are {:?}, expected {:?}",
                    i,
                    layer.weights.shape(),
                    expected
                )));
            }
            if layer.biases.shape() != (expected.0, 1) || !is_rectangular(&layer.biases) {
                return Err(MlpError::CorruptModel(format!(
                    "layer {} biases are {:?}, expected {:?}",
                    i,
                    layer.biases.shape(),
                    (expected.0, 1)
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_size() {
            return Err(MlpError::shape("predict", (input.len(), 1), (self.input_size(), 1)));
        }
        Ok(())
    }

    /// Number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.rows * l.weights.cols + l.biases.rows)
            .sum()
    }
}

fn is_rectangular(m: &Matrix) -> bool {
    m.data.len() == m.rows && m.data.iter().all(|row| row.len() == m.cols)
}

/// Topology summary followed by every layer's biases and weights.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Network {:?}: {} parameters, activation {}, output {}, lr {}, bias lr {}",
            self.layer_sizes,
            self.parameter_count(),
            self.activation,
            self.output_activation,
            self.learning_rate,
            self.bias_learning_rate
        )?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "Layer {}", i)?;
            writeln!(f, "Bias vector:\n{}", layer.biases)?;
            writeln!(f, "Weight matrix:\n{}", layer.weights)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn shapes_follow_layer_sizes() {
        let net = Network::new(&[3, 5, 2], 0.1, ActivationFunction::Sigmoid, &mut rng()).unwrap();
        assert_eq!(net.layers.len(), 2);
        assert_eq!(net.layers[0].weights.shape(), (5, 3));
        assert_eq!(net.layers[0].biases.shape(), (5, 1));
        assert_eq!(net.layers[1].weights.shape(), (2, 5));
        assert_eq!(net.layers[1].biases.shape(), (2, 1));
        assert_eq!(net.parameter_count(), 5 * 3 + 5 + 2 * 5 + 2);
        assert!(net.check_invariants().is_ok());
    }

    #[test]
    fn zero_input_gives_finite_output_for_every_activation() {
        for activation in ActivationFunction::ALL {
            let net = Network::new(&[4, 8, 8, 3], 0.01, activation, &mut rng()).unwrap();
            let out = net.predict(&[0.0; 4]).unwrap();
            assert_eq!(out.len(), 3);
            assert!(out.iter().all(|x| x.is_finite()), "{}: {:?}", activation, out);
        }
    }

    #[test]
    fn predict_rejects_wrong_input_length() {
        let net = Network::new(&[2, 3, 1], 0.1, ActivationFunction::Sigmoid, &mut rng()).unwrap();
        match net.predict(&[1.0, 2.0, 3.0]) {
            Err(MlpError::ShapeMismatch { left, right, .. }) => {
                assert_eq!(left, (3, 1));
                assert_eq!(right, (2, 1));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn predict_does_not_mutate() {
        let net = Network::new(&[2, 3, 1], 0.1, ActivationFunction::HyperbolicTangent, &mut rng()).unwrap();
        let before = net.clone();
        let first = net.predict(&[0.3, -0.7]).unwrap();
        let second = net.predict(&[0.3, -0.7]).unwrap();
        assert_eq!(first, second);
        assert_eq!(net, before);
    }

    #[test]
    fn output_activation_only_on_last_layer() {
        let config = NetworkConfig::new(vec![2, 3, 2], 0.1, ActivationFunction::ReLU)
            .with_output_activation(ActivationFunction::Identity)
            .with_bias_learning_rate(0.5);
        let net = Network::from_config(&config, &mut rng()).unwrap();
        assert_eq!(net.activation_for(0), ActivationFunction::ReLU);
        assert_eq!(net.activation_for(1), ActivationFunction::Identity);
        assert_eq!(net.bias_learning_rate, 0.5);

        let trace = net.forward_trace(&[1.0, -1.0]).unwrap();
        assert_eq!(trace.zs.len(), 2);
        assert_eq!(trace.activations.len(), 3);
        // Identity output: the last activation equals its pre-activation.
        assert_eq!(trace.output(), &trace.zs[1]);
        assert_eq!(trace.output().flatten(), net.predict(&[1.0, -1.0]).unwrap());
    }

    #[test]
    fn construction_rejects_bad_arguments() {
        assert!(Network::new(&[3], 0.1, ActivationFunction::Sigmoid, &mut rng()).is_err());
        assert!(Network::new(&[3, 1], 0.0, ActivationFunction::Sigmoid, &mut rng()).is_err());
    }

    #[test]
    fn same_seed_same_weights() {
        let a = Network::new(&[2, 4, 1], 0.1, ActivationFunction::Sigmoid, &mut rng()).unwrap();
        let b = Network::new(&[2, 4, 1], 0.1, ActivationFunction::Sigmoid, &mut rng()).unwrap();
        assert_eq!(a, b);
    }
}
