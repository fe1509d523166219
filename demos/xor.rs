use vanilla_mlp::{ActivationFunction, Network, TrainConfig, Trainer};

fn main() -> vanilla_mlp::Result<()> {
    let mut trainer = Trainer::seeded(7);
    let mut network = Network::new(&[2, 8, 1], 0.1, ActivationFunction::HyperbolicTangent, trainer.rng_mut())?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    let config = TrainConfig::epochs(5000).with_batch(inputs.len());
    let losses = trainer.fit(&mut network, &inputs, &expected_outputs, &config)?;

    for (epoch, loss) in losses.iter().enumerate().step_by(500) {
        println!("Epoch {epoch}: loss = {loss:.6}");
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)?[0]);
    }
    Ok(())
}
