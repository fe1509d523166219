//! Guarded scalar arithmetic.
//!
//! Every addition and multiplication performed by [`Matrix`](super::matrix::Matrix)
//! goes through this module. In the default [`Numerics::Clamp`] mode the result
//! is sanitized: `NaN` becomes `0.0` and `±∞` becomes `±SATURATION`. This keeps
//! long training runs alive when an unbounded activation (ReLU family) blows up,
//! at the price of silently losing the blown-up values. It can hide real bugs,
//! so [`Numerics::Strict`] turns the same events into errors.

use serde::{Deserialize, Serialize};

use crate::error::{MlpError, Result};

/// Finite stand-in for an infinite result.
pub const SATURATION: f64 = 1e9;

/// How guarded operations treat non-finite results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Numerics {
    /// Replace NaN with 0 and infinities with `±SATURATION`.
    #[default]
    Clamp,
    /// Fail with [`MlpError::NonFinite`].
    Strict,
}

impl Numerics {
    /// Checks one freshly computed value according to the policy.
    #[inline]
    pub fn guard(self, op: &'static str, value: f64) -> Result<f64> {
        match self {
            Numerics::Clamp => Ok(sanitize(value)),
            Numerics::Strict if value.is_finite() => Ok(value),
            Numerics::Strict => Err(MlpError::NonFinite { op }),
        }
    }
}

/// Maps NaN to `0.0` and infinities to `±SATURATION`; finite values pass through.
#[inline]
pub fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value == f64::INFINITY {
        SATURATION
    } else if value == f64::NEG_INFINITY {
        -SATURATION
    } else {
        value
    }
}

#[inline]
pub fn valid_add(a: f64, b: f64) -> f64 {
    sanitize(a + b)
}

#[inline]
pub fn valid_mul(a: f64, b: f64) -> f64 {
    sanitize(a * b)
}
