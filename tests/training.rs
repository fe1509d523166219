//! End-to-end training runs through the public API.

use vanilla_mlp::{ActivationFunction, MlpError, Network, Numerics, NetworkConfig, TrainConfig, Trainer};

fn xor() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    (
        vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    )
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

fn solves_xor(network: &Network) -> bool {
    let (inputs, targets) = xor();
    let errors: Vec<f64> = inputs
        .iter()
        .zip(&targets)
        .map(|(x, y)| (network.predict(x).unwrap()[0] - y[0]).abs())
        .collect();
    mean(&errors) < 0.1 && network.predict(&[1.0, 1.0]).unwrap()[0] < 0.5
}

#[test]
fn full_batch_learns_xor() {
    let (inputs, targets) = xor();
    let mut solved = 0;

    for seed in 1..=5 {
        let mut trainer = Trainer::seeded(seed);
        let mut network =
            Network::new(&[2, 16, 16, 1], 0.2, ActivationFunction::HyperbolicTangent, trainer.rng_mut()).unwrap();

        let config = TrainConfig::epochs(10_000).with_batch(inputs.len());
        let losses = trainer.fit(&mut network, &inputs, &targets, &config).unwrap();

        assert_eq!(losses.len(), 10_000);
        assert!(mean(&losses[losses.len() - 100..]) < mean(&losses[..100]), "seed {} did not improve", seed);
        if solves_xor(&network) {
            solved += 1;
        }
    }

    assert!(solved >= 1, "no seed learned XOR");
}

#[test]
fn stochastic_tolerance_run_learns_xor() {
    let (inputs, targets) = xor();
    let mut trainer = Trainer::seeded(1);
    let mut network =
        Network::new(&[2, 16, 16, 1], 1e-3, ActivationFunction::HyperbolicTangent, trainer.rng_mut()).unwrap();

    let losses = trainer
        .fit(&mut network, &inputs, &targets, &TrainConfig::tolerance(1e-6, Some(10_000)))
        .unwrap();

    assert!(!losses.is_empty() && losses.len() <= 10_000);
    assert!(solves_xor(&network));
}

#[test]
fn stochastic_loss_trends_down() {
    let (inputs, targets) = xor();
    let mut trainer = Trainer::seeded(11);
    let mut network =
        Network::new(&[2, 8, 1], 0.05, ActivationFunction::HyperbolicTangent, trainer.rng_mut()).unwrap();

    let losses = trainer
        .fit(&mut network, &inputs, &targets, &TrainConfig::tolerance(0.0, Some(20_000)))
        .unwrap();

    assert_eq!(losses.len(), 20_000);
    assert!(mean(&losses[losses.len() - 1000..]) < mean(&losses[..1000]));
}

#[test]
fn same_seed_same_run() {
    let (inputs, targets) = xor();
    let run = || {
        let mut trainer = Trainer::seeded(99);
        let mut network = Network::new(&[2, 3, 1], 0.1, ActivationFunction::Sigmoid, trainer.rng_mut()).unwrap();
        let config = TrainConfig::epochs(50).with_batch(2);
        let losses = trainer.fit(&mut network, &inputs, &targets, &config).unwrap();
        (network, losses)
    };

    let (a, la) = run();
    let (b, lb) = run();
    assert_eq!(la, lb);
    assert_eq!(a, b);
}

#[test]
fn rejected_runs_leave_network_untouched() {
    let (inputs, targets) = xor();
    let mut trainer = Trainer::seeded(5);
    let mut network = Network::new(&[2, 3, 1], 0.1, ActivationFunction::ReLU, trainer.rng_mut()).unwrap();
    let before = network.clone();

    let oversized = TrainConfig::epochs(10).with_batch(5);
    assert!(matches!(
        trainer.fit(&mut network, &inputs, &targets, &oversized),
        Err(MlpError::InvalidArgument(_))
    ));

    let mut bad_targets = targets.clone();
    bad_targets[3] = vec![0.0, 1.0];
    assert!(matches!(
        trainer.fit(&mut network, &inputs, &bad_targets, &TrainConfig::epochs(10)),
        Err(MlpError::ShapeMismatch { .. })
    ));

    assert_eq!(network, before);
}

#[test]
fn zero_input_is_finite_for_every_activation() {
    for &activation in ActivationFunction::ALL.iter() {
        let mut trainer = Trainer::seeded(3);
        let config = NetworkConfig::new(vec![4, 5, 3], 0.1, activation).with_numerics(Numerics::Strict);
        let network = Network::from_config(&config, trainer.rng_mut()).unwrap();
        let out = network.predict(&[0.0; 4]).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|x| x.is_finite()), "{} produced {:?}", activation, out);
    }
}
