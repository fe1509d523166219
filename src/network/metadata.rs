use serde::{Deserialize, Serialize};

/// Describes how to turn raw data into the input vector of a Network.
/// Stored in the model JSON so that `classify` knows how to prepare images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// Plain numeric vector.
    Numeric,
    /// Grayscale image resized to width×height, normalized to [0, 1], row-major.
    ImageGrayscale { width: u32, height: u32 },
}

/// Optional annotations attached to a saved Network.
/// All fields are Option<> so models saved without them still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    /// One label per output neuron (e.g. the 62 pattern characters).
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Label for an output index, falling back to the index itself.
    pub fn label(&self, index: usize) -> String {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(index).cloned())
            .unwrap_or_else(|| index.to_string())
    }
}
