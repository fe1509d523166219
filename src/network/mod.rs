pub mod config;
pub mod metadata;
pub mod network;
pub mod persistence;

pub use config::NetworkConfig;
pub use metadata::{InputType, ModelMetadata};
pub use network::{ForwardTrace, Network};
pub use persistence::{read_loss_file, write_loss_file};
