use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Per-layer gradient accumulators.
///
/// Allocated once per training run and zeroed before every batch, so the
/// backward pass reuses the same buffers epoch after epoch.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub weights: Vec<Matrix>,
    pub biases: Vec<Matrix>,
}

impl Gradients {
    pub fn for_network(network: &Network) -> Gradients {
        Gradients {
            weights: network
                .layers
                .iter()
                .map(|l| Matrix::zeros(l.weights.rows, l.weights.cols))
                .collect(),
            biases: network
                .layers
                .iter()
                .map(|l| Matrix::zeros(l.biases.rows, l.biases.cols))
                .collect(),
        }
    }

    pub fn reset(&mut self) {
        self.weights.iter_mut().for_each(|m| m.fill(0.0));
        self.biases.iter_mut().for_each(|m| m.fill(0.0));
    }
}

/// Runs one sample forward and backward, adding its gradients to `grads`.
///
/// The output error is `predicted - target`; hidden errors are
/// `Wᵀ[i+1]·δ[i+1] ⊙ g'(z[i])`. Returns the output error. The network is
/// only read.
pub fn accumulate_sample(
    network: &Network,
    input: &[f64],
    target: &[f64],
    grads: &mut Gradients,
) -> Result<Matrix> {
    let numerics = network.numerics;
    let trace = network.forward_trace(input)?;

    let output_error = trace
        .output()
        .sub_with(&Matrix::column_vector(target), numerics)?;

    let mut delta = output_error.clone();
    for i in (0..network.layers.len()).rev() {
        let layer = &network.layers[i];
        let (w_grad, b_grad) = layer.compute_gradients(&delta, &trace.activations[i], numerics)?;

        if i > 0 {
            let derivative = trace.zs[i - 1].apply_with(&network.activation_for(i - 1), true, numerics)?;
            delta = layer
                .back_propagate(&delta, numerics)?
                .hadamard_with(&derivative, numerics)?;
        }

        grads.weights[i].accumulate(&w_grad, numerics)?;
        grads.biases[i].accumulate(&b_grad, numerics)?;
    }

    Ok(output_error)
}
