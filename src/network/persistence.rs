//! Saving and restoring a [`Network`].
//!
//! The encoding is serde_json. Callers of `to_blob`/`from_blob` should treat
//! the bytes as opaque.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use tracing::info;

use crate::error::Result;
use crate::network::network::Network;

impl Network {
    /// Serializes the complete network state.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Restores a network written by [`to_blob`](Self::to_blob) and checks its invariants.
    pub fn from_blob(bytes: &[u8]) -> Result<Network> {
        let network: Network = serde_json::from_slice(bytes)?;
        network.check_invariants()?;
        Ok(network)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        info!(path, layers = ?self.layer_sizes, "saved model");
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        network.check_invariants()?;
        info!(path, layers = ?network.layer_sizes, "loaded model");
        Ok(network)
    }
}

/// Writes a loss history as space-separated values.
pub fn write_loss_file(losses: &[f64], path: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for loss in losses {
        write!(writer, "{} ", loss)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a file written by [`write_loss_file`].
pub fn read_loss_file(path: &str) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)?;
    text.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|e| {
                crate::error::MlpError::invalid(format!("bad loss value '{}': {}", token, e))
            })
        })
        .collect()
}
