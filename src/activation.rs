//! Activation functions.
//!
//! A trainable layer computes a pre-activation sum `z = W a + b` per neuron and
//! then applies an activation element-wise: `a' = activation(z)`.
//!
//! Both the value and the derivative are evaluated at `z`. Layers cache `z` in
//! their `sums` buffer during the forward pass so the backward pass can reuse it.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Slope applied to negative inputs by [`Activation::LeakyReLU`].
pub const LEAKY_SLOPE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Element-wise activation function.
pub enum Activation {
    #[default]
    Identity,
    ReLU,
    /// `max(0.1 x, x)` forward. The derivative is the plain ReLU step.
    LeakyReLU,
    /// Elliott "fast sigmoid": `x / (1 + |x|)`.
    FastSigmoid,
}

impl Activation {
    #[inline]
    pub fn value(self, x: f32) -> f32 {
        match self {
            Activation::Identity => x,
            Activation::ReLU => x.max(0.0),
            Activation::LeakyReLU => (LEAKY_SLOPE * x).max(x),
            Activation::FastSigmoid => x / (1.0 + x.abs()),
        }
    }

    /// Derivative of the activation, evaluated at the pre-activation sum `x`.
    ///
    /// The derivative at exactly `0` is `0` for both rectifiers. The fast sigmoid
    /// uses `s * (1 - s)` of its own value `s`.
    #[inline]
    pub fn derivative(self, x: f32) -> f32 {
        match self {
            Activation::Identity => 1.0,
            Activation::ReLU | Activation::LeakyReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::FastSigmoid => {
                let s = self.value(x);
                s * (1.0 - s)
            }
        }
    }

    /// Name used by [`FromStr`] and [`fmt::Display`].
    pub fn name(self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::ReLU => "relu",
            Activation::LeakyReLU => "leaky_relu",
            Activation::FastSigmoid => "fast_sigmoid",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "linear" | "none" => Ok(Activation::Identity),
            "relu" => Ok(Activation::ReLU),
            "leaky_relu" | "leaky-relu" | "leakyrelu" => Ok(Activation::LeakyReLU),
            "fast_sigmoid" | "fast-sigmoid" | "sigmoid" => Ok(Activation::FastSigmoid),
            other => Err(Error::InvalidConfig(format!(
                "unknown activation {other:?}"
            ))),
        }
    }
}
