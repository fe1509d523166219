pub mod activation;

pub use activation::{Activation, ActivationFunction, LEAKY_RELU_ALPHA};
