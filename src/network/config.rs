use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{MlpError, Result};
use crate::math::numeric::Numerics;
use crate::network::metadata::ModelMetadata;

/// Everything needed to build a fresh [`Network`](super::Network), without
/// any weights. Can be kept as JSON next to a dataset and loaded before
/// training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Neurons per layer, input first. At least two entries.
    pub layer_sizes: Vec<usize>,
    pub learning_rate: f64,
    /// Defaults to `learning_rate`.
    #[serde(default)]
    pub bias_learning_rate: Option<f64>,
    /// Used by every hidden layer.
    pub activation: ActivationFunction,
    /// Used by the last layer; defaults to `activation`.
    #[serde(default)]
    pub output_activation: Option<ActivationFunction>,
    #[serde(default)]
    pub numerics: Numerics,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl NetworkConfig {
    pub fn new(layer_sizes: Vec<usize>, learning_rate: f64, activation: ActivationFunction) -> Self {
        NetworkConfig {
            layer_sizes,
            learning_rate,
            bias_learning_rate: None,
            activation,
            output_activation: None,
            numerics: Numerics::Clamp,
            metadata: None,
        }
    }

    pub fn with_output_activation(mut self, activation: ActivationFunction) -> Self {
        self.output_activation = Some(activation);
        self
    }

    pub fn with_bias_learning_rate(mut self, rate: f64) -> Self {
        self.bias_learning_rate = Some(rate);
        self
    }

    pub fn with_numerics(mut self, numerics: Numerics) -> Self {
        self.numerics = numerics;
        self
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Checks topology and learning rates.
    pub fn validate(&self) -> Result<()> {
        validate_topology(&self.layer_sizes)?;
        validate_rate("learning_rate", self.learning_rate)?;
        if let Some(rate) = self.bias_learning_rate {
            validate_rate("bias_learning_rate", rate)?;
        }
        Ok(())
    }

    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<NetworkConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: NetworkConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn validate_topology(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(MlpError::invalid(format!(
            "a network needs at least 2 layers, got {}",
            layer_sizes.len()
        )));
    }
    if let Some(i) = layer_sizes.iter().position(|&n| n == 0) {
        return Err(MlpError::invalid(format!("layer {} has no neurons", i)));
    }
    Ok(())
}

pub(crate) fn validate_rate(name: &str, rate: f64) -> Result<()> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(MlpError::invalid(format!("{} must be positive and finite, got {}", name, rate)));
    }
    Ok(())
}
