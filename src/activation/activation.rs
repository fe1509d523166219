use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MlpError;

/// Slope of [`ActivationFunction::LeakyReLU`] for negative inputs.
pub const LEAKY_RELU_ALPHA: f64 = 0.01;

/// An elementwise nonlinearity together with its derivative.
///
/// Implementors must be pure: the same `z` always maps to the same value.
pub trait Activation {
    fn activate(&self, z: f64) -> f64;

    /// Derivative evaluated at the pre-activation `z`.
    fn derive(&self, z: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    /// Step function. Its derivative is reported as a constant `1`, which is
    /// not the true derivative but lets the error signal pass unchanged.
    Heaviside,
    HyperbolicTangent,
    Identity,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU,
    SoftPlus,
    SoftSign,
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 8] = [
        ActivationFunction::Sigmoid,
        ActivationFunction::Heaviside,
        ActivationFunction::HyperbolicTangent,
        ActivationFunction::Identity,
        ActivationFunction::ReLU,
        ActivationFunction::LeakyReLU,
        ActivationFunction::SoftPlus,
        ActivationFunction::SoftSign,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Heaviside => "heaviside",
            ActivationFunction::HyperbolicTangent => "hyperbolic_tangent",
            ActivationFunction::Identity => "identity",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::LeakyReLU => "leaky_relu",
            ActivationFunction::SoftPlus => "soft_plus",
            ActivationFunction::SoftSign => "soft_sign",
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Activation for ActivationFunction {
    fn activate(&self, z: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(z),
            ActivationFunction::Heaviside => if z < 0.0 { 0.0 } else { 1.0 },
            ActivationFunction::HyperbolicTangent => z.tanh(),
            ActivationFunction::Identity => z,
            ActivationFunction::ReLU => z.max(0.0),
            ActivationFunction::LeakyReLU => (LEAKY_RELU_ALPHA * z).max(z),
            ActivationFunction::SoftPlus => (1.0 + z.exp()).ln(),
            ActivationFunction::SoftSign => z / (1.0 + z.abs()),
        }
    }

    fn derive(&self, z: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let s = sigmoid(z);
                s * (1.0 - s)
            }
            ActivationFunction::Heaviside => 1.0,
            ActivationFunction::HyperbolicTangent => {
                let t = z.tanh();
                1.0 - t * t
            }
            ActivationFunction::Identity => 1.0,
            ActivationFunction::ReLU => if z > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU => if z > 0.0 { 1.0 } else { LEAKY_RELU_ALPHA },
            ActivationFunction::SoftPlus => sigmoid(z),
            ActivationFunction::SoftSign => 1.0 / (1.0 + z.abs()).powi(2),
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the snake_case names plus a few common short forms (`tanh`, `softplus`, ...).
impl FromStr for ActivationFunction {
    type Err = MlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let found = match normalized.as_str() {
            "tanh" => Some(ActivationFunction::HyperbolicTangent),
            "softplus" => Some(ActivationFunction::SoftPlus),
            "softsign" => Some(ActivationFunction::SoftSign),
            "leakyrelu" => Some(ActivationFunction::LeakyReLU),
            "step" => Some(ActivationFunction::Heaviside),
            other => ActivationFunction::ALL.into_iter().find(|a| a.name() == other),
        };
        found.ok_or_else(|| MlpError::invalid(format!("unknown activation function '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 9] = [-30.0, -4.0, -1.0, -0.25, 0.0, 0.25, 1.0, 4.0, 30.0];

    #[test]
    fn sigmoid_derivative_matches_closed_form() {
        let f = ActivationFunction::Sigmoid;
        for z in SAMPLES {
            let a = f.activate(z);
            assert_eq!(f.derive(z), a * (1.0 - a));
        }
    }

    #[test]
    fn table_values() {
        use ActivationFunction::*;
        assert_eq!(Heaviside.activate(-0.1), 0.0);
        assert_eq!(Heaviside.activate(0.0), 1.0);
        assert_eq!(Heaviside.derive(-5.0), 1.0);
        assert_eq!(Identity.activate(-3.0), -3.0);
        assert_eq!(Identity.derive(7.0), 1.0);
        assert_eq!(ReLU.activate(-2.0), 0.0);
        assert_eq!(ReLU.activate(2.0), 2.0);
        assert_eq!(ReLU.derive(0.0), 0.0);
        assert_eq!(LeakyReLU.activate(-2.0), -0.02);
        assert_eq!(LeakyReLU.derive(-2.0), LEAKY_RELU_ALPHA);
        assert_eq!(LeakyReLU.derive(3.0), 1.0);
        assert_eq!(SoftSign.activate(1.0), 0.5);
        assert_eq!(SoftSign.derive(1.0), 0.25);
        assert!((SoftPlus.activate(0.0) - 2f64.ln()).abs() < 1e-15);
        assert_eq!(SoftPlus.derive(0.0), 0.5);
        assert_eq!(HyperbolicTangent.derive(0.0), 1.0);
    }

    #[test]
    fn derivatives_agree_with_finite_differences() {
        use ActivationFunction::*;
        let h = 1e-6;
        for f in [Sigmoid, HyperbolicTangent, Identity, SoftPlus, SoftSign] {
            for z in [-2.0, -0.5, 0.3, 1.7] {
                let numeric = (f.activate(z + h) - f.activate(z - h)) / (2.0 * h);
                assert!((numeric - f.derive(z)).abs() < 1e-6, "{} at {}", f, z);
            }
        }
    }

    #[test]
    fn parses_names() {
        for f in ActivationFunction::ALL {
            assert_eq!(f.name().parse::<ActivationFunction>().unwrap(), f);
        }
        assert_eq!("tanh".parse::<ActivationFunction>().unwrap(), ActivationFunction::HyperbolicTangent);
        assert_eq!("Leaky-ReLU".parse::<ActivationFunction>().unwrap(), ActivationFunction::LeakyReLU);
        assert!("gelu".parse::<ActivationFunction>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ActivationFunction::HyperbolicTangent).unwrap();
        assert_eq!(json, "\"hyperbolic_tangent\"");
    }
}
