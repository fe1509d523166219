use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// How samples are drawn for each epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regime {
    /// One uniformly drawn sample per epoch; the recorded loss is the
    /// sample's `r2error`.
    Stochastic,
    /// The first `batch_size` samples of a shared input/target permutation.
    /// The permutation is reshuffled every epoch when `shuffle` is set and the
    /// batch is smaller than the data set. The recorded loss is the mean L2
    /// norm of the output error over the batch.
    MiniBatch { batch_size: usize, shuffle: bool },
}

/// When a training run ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Exactly this many epochs.
    Epochs(usize),
    /// Stop once two consecutive losses differ by less than `loss_tolerance`,
    /// or after `max_epochs` epochs (`None` = no ceiling).
    Tolerance {
        loss_tolerance: f64,
        max_epochs: Option<usize>,
    },
}

/// Configuration for one `Trainer::fit` call.
///
/// # Fields
/// - `regime`: stochastic single-sample or mini-batch
/// - `stop`: fixed epoch count or loss tolerance
/// - `progress_tx`: optional channel sender; one `EpochStats` is sent per
///   completed epoch. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub regime: Regime,
    pub stop: StopCondition,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Stochastic training for a fixed number of epochs.
    pub fn epochs(epochs: usize) -> Self {
        TrainConfig {
            regime: Regime::Stochastic,
            stop: StopCondition::Epochs(epochs),
            progress_tx: None,
        }
    }

    /// Stochastic training until the loss settles within `loss_tolerance`.
    pub fn tolerance(loss_tolerance: f64, max_epochs: Option<usize>) -> Self {
        TrainConfig {
            regime: Regime::Stochastic,
            stop: StopCondition::Tolerance { loss_tolerance, max_epochs },
            progress_tx: None,
        }
    }

    /// Switches to shuffled mini-batches of `batch_size`.
    pub fn with_batch(mut self, batch_size: usize) -> Self {
        self.regime = Regime::MiniBatch { batch_size, shuffle: true };
        self
    }

    /// Mini-batches that always take the first `batch_size` samples.
    pub fn with_unshuffled_batch(mut self, batch_size: usize) -> Self {
        self.regime = Regime::MiniBatch { batch_size, shuffle: false };
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}
