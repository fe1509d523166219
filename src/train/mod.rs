pub mod backprop;
pub mod epoch_stats;
pub mod train_config;
pub mod trainer;

pub use backprop::Gradients;
pub use epoch_stats::EpochStats;
pub use train_config::{Regime, StopCondition, TrainConfig};
pub use trainer::Trainer;
