use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use vanilla_mlp::data::{self, PatternSet};
use vanilla_mlp::network::{write_loss_file, InputType, ModelMetadata};
use vanilla_mlp::{ActivationFunction, Network, NetworkConfig, Numerics, TrainConfig, Trainer};

#[derive(Parser)]
#[command(name = "vanilla-mlp", about = "Train and run small multi-layer perceptrons")]
struct Cli {
    /// Log every epoch.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Learn the XOR table and print the network's answers.
    Xor {
        /// Neurons per layer, input and output included.
        #[arg(long, value_delimiter = ',', default_value = "2,16,16,1")]
        layers: Vec<usize>,

        #[arg(long, default_value = "hyperbolic_tangent")]
        activation: ActivationFunction,

        #[arg(long, default_value_t = 1e-3)]
        learning_rate: f64,

        /// Stop once two consecutive losses differ by less than this.
        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,

        /// Epoch ceiling; 0 trains until the loss settles.
        #[arg(long, default_value_t = 10000)]
        max_epochs: usize,

        /// Train on mini-batches instead of single samples.
        #[arg(long)]
        batch_size: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Raise on NaN/infinity instead of clamping.
        #[arg(long)]
        strict: bool,

        /// Where to save the trained model.
        #[arg(long)]
        out: Option<String>,

        /// Where to write the loss history.
        #[arg(long)]
        loss_file: Option<String>,
    },

    /// Train a classifier on a folder of numbered pattern folders.
    TrainPatterns {
        /// Root folder holding `1/`, `2/`, ... with one image per sample.
        #[arg(long)]
        data: PathBuf,

        /// Network config JSON; overrides the topology flags.
        #[arg(long)]
        network: Option<String>,

        /// Hidden layer sizes.
        #[arg(long, value_delimiter = ',', default_value = "70,70,70")]
        hidden: Vec<usize>,

        #[arg(long, default_value = "sigmoid")]
        activation: ActivationFunction,

        #[arg(long, default_value = "identity")]
        output_activation: ActivationFunction,

        #[arg(long, default_value_t = 1e-3)]
        learning_rate: f64,

        #[arg(long, default_value_t = 0.5)]
        bias_learning_rate: f64,

        /// Images are resized to size×size.
        #[arg(long, default_value_t = 28)]
        size: u32,

        #[arg(long, default_value_t = 100)]
        batch_size: usize,

        #[arg(long, default_value_t = 600)]
        epochs: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "nn.json")]
        out: String,

        #[arg(long, default_value = "loss.txt")]
        loss_file: String,
    },

    /// Classify every image in a folder with a saved model.
    Classify {
        #[arg(long, default_value = "nn.json")]
        model: String,

        #[arg(long)]
        images: PathBuf,
    },

    /// Print a saved model's topology and parameters.
    Inspect {
        #[arg(long, default_value = "nn.json")]
        model: String,

        /// Also print every weight and bias.
        #[arg(long)]
        full: bool,
    },
}

fn trainer(seed: Option<u64>) -> Trainer {
    match seed {
        Some(seed) => Trainer::seeded(seed),
        None => Trainer::from_entropy(),
    }
}

fn xor_table() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    (
        vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]],
    )
}

/// `size²` inputs, the hidden layers, one output per class.
fn pattern_layer_sizes(size: u32, hidden: &[usize], classes: usize) -> Vec<usize> {
    let side = size as usize;
    let mut layer_sizes = vec![side * side];
    layer_sizes.extend_from_slice(hidden);
    layer_sizes.push(classes);
    layer_sizes
}

impl Command {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Command::Xor {
                layers,
                activation,
                learning_rate,
                tolerance,
                max_epochs,
                batch_size,
                seed,
                strict,
                out,
                loss_file,
            } => {
                let (inputs, targets) = xor_table();
                let numerics = if strict { Numerics::Strict } else { Numerics::Clamp };
                let config = NetworkConfig::new(layers, learning_rate, activation).with_numerics(numerics);

                let mut trainer = trainer(seed);
                let mut network = Network::from_config(&config, trainer.rng_mut())?;

                let mut train_config = TrainConfig::tolerance(tolerance, (max_epochs > 0).then_some(max_epochs));
                if let Some(batch_size) = batch_size {
                    train_config = train_config.with_batch(batch_size);
                }

                let losses = trainer.fit(&mut network, &inputs, &targets, &train_config)?;
                info!(epochs = losses.len(), final_loss = losses.last().copied().unwrap_or_default(), "done");

                for input in &inputs {
                    println!("{:?} -> {:.4?}", input, network.predict(input)?);
                }

                if let Some(path) = out {
                    network.save_json(&path).with_context(|| format!("saving model to {}", path))?;
                }
                if let Some(path) = loss_file {
                    write_loss_file(&losses, &path).with_context(|| format!("writing {}", path))?;
                }
                Ok(())
            }

            Command::TrainPatterns {
                data: root,
                network: network_file,
                hidden,
                activation,
                output_activation,
                learning_rate,
                bias_learning_rate,
                size,
                batch_size,
                epochs,
                seed,
                out,
                loss_file,
            } => {
                let set: PatternSet = data::load_pattern_folders(&root, size, size)
                    .with_context(|| format!("loading patterns from {}", root.display()))?;
                info!(samples = set.len(), classes = set.class_names.len(), "dataset loaded");

                let labels = if set.class_names.len() == data::PATTERN_ALPHABET.len() {
                    data::pattern_labels()
                } else {
                    set.class_names.clone()
                };
                let metadata = ModelMetadata {
                    description: Some(format!("pattern classifier trained on {}", root.display())),
                    input_type: Some(InputType::ImageGrayscale { width: size, height: size }),
                    output_labels: Some(labels),
                };

                let config = match network_file {
                    Some(path) => NetworkConfig::load_json(&path)
                        .with_context(|| format!("reading network config {}", path))?,
                    None => {
                        let layer_sizes = pattern_layer_sizes(size, &hidden, set.class_names.len());
                        NetworkConfig::new(layer_sizes, learning_rate, activation)
                            .with_output_activation(output_activation)
                            .with_bias_learning_rate(bias_learning_rate)
                    }
                }
                .with_metadata(metadata);

                let mut trainer = trainer(seed);
                let mut network = Network::from_config(&config, trainer.rng_mut())?;

                let train_config = TrainConfig::epochs(epochs).with_batch(batch_size.min(set.len()));
                let losses = trainer.fit(&mut network, &set.inputs, &set.targets, &train_config)?;

                info!(path = %out, "saving network and loss");
                network.save_json(&out).with_context(|| format!("saving model to {}", out))?;
                write_loss_file(&losses, &loss_file).with_context(|| format!("writing {}", loss_file))?;
                Ok(())
            }

            Command::Classify { model, images } => {
                let network = Network::load_json(&model).with_context(|| format!("loading {}", model))?;
                let metadata = network.metadata.clone().unwrap_or_default();
                let (width, height) = match metadata.input_type {
                    Some(InputType::ImageGrayscale { width, height }) => (width, height),
                    _ => {
                        let side = (network.input_size() as f64).sqrt() as u32;
                        anyhow::ensure!(
                            (side * side) as usize == network.input_size(),
                            "model input size {} is not a square image",
                            network.input_size()
                        );
                        (side, side)
                    }
                };

                for path in data::patterns::image_files(&images)? {
                    let input = data::load_grayscale(&path, width, height)
                        .with_context(|| format!("reading {}", path.display()))?;
                    let output = network.predict(&input)?;
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    println!("{}: {}", name, metadata.label(data::argmax(&output)));
                }
                Ok(())
            }

            Command::Inspect { model, full } => {
                let network = Network::load_json(&model).with_context(|| format!("loading {}", model))?;
                if full {
                    print!("{}", network);
                } else {
                    println!(
                        "{:?}: {} parameters, activation {}, output {}, lr {}, bias lr {}, numerics {:?}",
                        network.layer_sizes,
                        network.parameter_count(),
                        network.activation,
                        network.output_activation,
                        network.learning_rate,
                        network.bias_learning_rate,
                        network.numerics
                    );
                }
                if let Some(description) = network.metadata.as_ref().and_then(|m| m.description.as_ref()) {
                    println!("{}", description);
                }
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    cli.command.execute()
}
