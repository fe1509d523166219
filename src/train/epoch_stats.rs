use serde::{Deserialize, Serialize};

/// Per-epoch statistics emitted by `Trainer::fit`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, one value is
/// sent at the end of every completed epoch. Printing or plotting them is up
/// to the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Loss recorded for this epoch (see `Regime` for its definition).
    pub loss: f64,
    /// Samples that contributed to this epoch's update.
    pub samples: usize,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
