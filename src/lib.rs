pub mod activation;
pub mod data;
pub mod error;
pub mod layers;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::{Activation, ActivationFunction};
pub use error::{MlpError, Result};
pub use layers::dense::DenseLayer;
pub use math::matrix::Matrix;
pub use math::numeric::Numerics;
pub use network::config::NetworkConfig;
pub use network::network::Network;
pub use optim::sgd::Sgd;
pub use train::train_config::{Regime, StopCondition, TrainConfig};
pub use train::trainer::Trainer;
