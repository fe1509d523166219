use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::{MlpError, Result};
use crate::math::matrix::Matrix;
use crate::math::numeric::{Numerics, SATURATION};
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::backprop::{accumulate_sample, Gradients};
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::{Regime, StopCondition, TrainConfig};

/// Backpropagation driver.
///
/// Owns the random source used for sample draws and shuffling, so a run is
/// reproducible from its seed. Weight initialization takes an RNG as well;
/// [`rng_mut`](Self::rng_mut) lets both share one source.
pub struct Trainer<R: Rng = StdRng> {
    rng: R,
}

impl Trainer<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Trainer::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Trainer::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Trainer<R> {
    pub fn new(rng: R) -> Self {
        Trainer { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Trains `network` in place and returns the loss of every epoch.
    ///
    /// Arguments are validated before anything is touched. Each epoch
    /// computes all of its gradients first and commits the update at the
    /// end, so an error aborts the run with earlier epochs applied and the
    /// failing one discarded.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty or unpaired sample set, a batch size of
    ///   zero or larger than the sample count, zero epochs, or a negative/NaN
    ///   tolerance.
    /// - `ShapeMismatch` if a sample's length disagrees with the topology.
    /// - `NonFinite` in strict numerics mode.
    pub fn fit(
        &mut self,
        network: &mut Network,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        config: &TrainConfig,
    ) -> Result<Vec<f64>> {
        validate(network, inputs, targets, config)?;

        let n = inputs.len();
        let mut order: Vec<usize> = (0..n).collect();
        let mut grads = Gradients::for_network(network);
        let sgd = Sgd::for_network(network);

        info!(
            layers = ?network.layer_sizes,
            samples = n,
            regime = ?config.regime,
            stop = ?config.stop,
            "training started"
        );

        let mut losses = Vec::new();
        let mut previous_loss = f64::MAX;

        loop {
            let started = Instant::now();

            let (loss, samples) = match config.regime {
                Regime::Stochastic => {
                    let pick = [self.rng.gen_range(0..n)];
                    let errors = run_batch(network, inputs, targets, &pick, &mut grads, &sgd)?;
                    (errors[0].r2error(), 1)
                }
                Regime::MiniBatch { batch_size, shuffle } => {
                    let batch = next_batch(&mut self.rng, &mut order, batch_size, shuffle);
                    let errors = run_batch(network, inputs, targets, batch, &mut grads, &sgd)?;
                    let total: f64 = errors.iter().map(Matrix::l2norm).sum();
                    (total / batch_size as f64, batch_size)
                }
            };

            losses.push(loss);
            let epoch = losses.len();
            debug!(epoch, loss, "epoch finished");

            if network.numerics == Numerics::Clamp && loss >= SATURATION {
                warn!(epoch, loss, "loss reached the saturation value; weights may have blown up");
            }

            if let Some(ref tx) = config.progress_tx {
                let stats = EpochStats {
                    epoch,
                    loss,
                    samples,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                };
                // A dropped receiver only means nobody is listening.
                let _ = tx.send(stats);
            }

            let done = match config.stop {
                StopCondition::Epochs(max) => epoch >= max,
                StopCondition::Tolerance { loss_tolerance, max_epochs } => {
                    let settled = (previous_loss - loss).abs() < loss_tolerance;
                    previous_loss = loss;
                    settled || max_epochs.map_or(false, |max| epoch >= max)
                }
            };
            if done {
                break;
            }
        }

        info!(
            epochs = losses.len(),
            final_loss = losses.last().copied().unwrap_or_default(),
            "training finished"
        );

        Ok(losses)
    }
}

/// Indices of the next mini-batch: the first `batch_size` entries of the
/// shared permutation, reshuffled first when `shuffle` is set and the batch
/// does not cover the whole set.
fn next_batch<'a, R: Rng + ?Sized>(
    rng: &mut R,
    order: &'a mut [usize],
    batch_size: usize,
    shuffle: bool,
) -> &'a [usize] {
    if shuffle && batch_size < order.len() {
        order.shuffle(rng);
    }
    &order[..batch_size]
}

/// One epoch: accumulate gradients over `batch`, then commit the averaged
/// update to every layer at once. Returns each sample's output error.
fn run_batch(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    batch: &[usize],
    grads: &mut Gradients,
    sgd: &Sgd,
) -> Result<Vec<Matrix>> {
    grads.reset();

    let errors = batch
        .iter()
        .map(|&idx| accumulate_sample(network, &inputs[idx], &targets[idx], grads))
        .collect::<Result<Vec<Matrix>>>()?;

    let mut updated = network.layers.clone();
    for (i, layer) in updated.iter_mut().enumerate() {
        sgd.step(layer, &grads.weights[i], &grads.biases[i], batch.len(), network.numerics)?;
    }
    network.layers = updated;

    Ok(errors)
}

fn validate(
    network: &Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
) -> Result<()> {
    if inputs.is_empty() {
        return Err(MlpError::invalid("no training samples given"));
    }
    if inputs.len() != targets.len() {
        return Err(MlpError::invalid(format!(
            "inputs and targets must be of same length ({} vs {})",
            inputs.len(),
            targets.len()
        )));
    }

    if let Regime::MiniBatch { batch_size, .. } = config.regime {
        if batch_size == 0 {
            return Err(MlpError::invalid("batch size must be at least 1"));
        }
        if batch_size > inputs.len() {
            return Err(MlpError::invalid(format!(
                "batch size {} cannot be greater than the {} samples given",
                batch_size,
                inputs.len()
            )));
        }
    }

    match config.stop {
        StopCondition::Epochs(0) => return Err(MlpError::invalid("epochs must be at least 1")),
        StopCondition::Tolerance { loss_tolerance, .. } if !(loss_tolerance >= 0.0) => {
            return Err(MlpError::invalid(format!(
                "loss tolerance must be non-negative, got {}",
                loss_tolerance
            )))
        }
        _ => {}
    }

    let (input_size, output_size) = (network.input_size(), network.output_size());
    for (input, target) in inputs.iter().zip(targets) {
        if input.len() != input_size {
            return Err(MlpError::shape("fit input", (input.len(), 1), (input_size, 1)));
        }
        if target.len() != output_size {
            return Err(MlpError::shape("fit target", (target.len(), 1), (output_size, 1)));
        }
    }

    Ok(())
}
