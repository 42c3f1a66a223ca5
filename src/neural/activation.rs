//! Activation functions and their derivatives.
//!
//! Derivatives take the pre-activation value `z`, not the already activated output.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Slope of leaky ReLU for negative inputs
pub const LEAKY_RELU_SLOPE: f32 = 0.01;

/// Activation applied element-wise to a layer's pre-activation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    Step,
    Linear,
    Sigmoid,
    Tanh,
    Softsign,
    Sinusoid,
    Gaussian,
    Relu,
    LeakyRelu,
}

impl ActivationKind {
    pub const ALL: [ActivationKind; 9] = [
        ActivationKind::Step,
        ActivationKind::Linear,
        ActivationKind::Sigmoid,
        ActivationKind::Tanh,
        ActivationKind::Softsign,
        ActivationKind::Sinusoid,
        ActivationKind::Gaussian,
        ActivationKind::Relu,
        ActivationKind::LeakyRelu,
    ];

    /// The activation function for this kind
    pub fn function(self) -> fn(f32) -> f32 {
        match self {
            Self::Step => step,
            Self::Linear => linear,
            Self::Sigmoid => sigmoid,
            Self::Tanh => f32::tanh,
            Self::Softsign => softsign,
            Self::Sinusoid => f32::sin,
            Self::Gaussian => gaussian,
            Self::Relu => relu,
            Self::LeakyRelu => leaky_relu,
        }
    }

    /// The derivative for this kind, if it has a usable one
    pub fn derivative_function(self) -> Result<fn(f32) -> f32> {
        match self {
            Self::Linear => Ok(linear_derivative),
            Self::Sigmoid => Ok(sigmoid_derivative),
            Self::Tanh => Ok(tanh_derivative),
            Self::Softsign => Ok(softsign_derivative),
            Self::Sinusoid => Ok(f32::cos),
            Self::Gaussian => Ok(gaussian_derivative),
            Self::Step | Self::Relu | Self::LeakyRelu => Err(Error::UnsupportedOperation(
                format!("{:?} activation has no derivative", self),
            )),
        }
    }

    #[inline]
    pub fn activate(self, x: f32) -> f32 {
        (self.function())(x)
    }

    #[inline]
    pub fn derivative(self, x: f32) -> Result<f32> {
        Ok((self.derivative_function()?)(x))
    }

    /// Whether gradient-based training can use this kind
    pub fn is_differentiable(self) -> bool {
        self.derivative_function().is_ok()
    }
}

fn step(x: f32) -> f32 {
    if x >= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn linear(x: f32) -> f32 {
    x
}

fn linear_derivative(_: f32) -> f32 {
    1.0
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn sigmoid_derivative(x: f32) -> f32 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

fn tanh_derivative(x: f32) -> f32 {
    1.0 / x.cosh().powi(2)
}

fn softsign(x: f32) -> f32 {
    x / (1.0 + x.abs())
}

fn softsign_derivative(x: f32) -> f32 {
    1.0 / (1.0 + x.abs()).powi(2)
}

fn gaussian(x: f32) -> f32 {
    (-x * x).exp()
}

fn gaussian_derivative(x: f32) -> f32 {
    -2.0 * x * (-x * x).exp()
}

fn relu(x: f32) -> f32 {
    x.max(0.0)
}

fn leaky_relu(x: f32) -> f32 {
    (LEAKY_RELU_SLOPE * x).max(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLES: [f32; 7] = [-2.0, -0.75, -0.1, 0.0, 0.3, 1.0, 2.5];

    #[test]
    fn test_sigmoid_at_zero() {
        assert_relative_eq!(ActivationKind::Sigmoid.activate(0.0), 0.5);
        assert_relative_eq!(ActivationKind::Sigmoid.derivative(0.0).unwrap(), 0.25);
    }

    #[test]
    fn test_step_threshold() {
        assert_eq!(ActivationKind::Step.activate(0.0), 1.0);
        assert_eq!(ActivationKind::Step.activate(-1e-6), 0.0);
        assert_eq!(ActivationKind::Step.activate(3.0), 1.0);
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let h = 1e-3_f32;
        for kind in ActivationKind::ALL {
            if !kind.is_differentiable() {
                continue;
            }
            for &x in &SAMPLES {
                let numeric = (kind.activate(x + h) - kind.activate(x - h)) / (2.0 * h);
                let analytic = kind.derivative(x).unwrap();
                assert!(
                    (numeric - analytic).abs() < 1e-2,
                    "{:?} at {}: numeric {} vs analytic {}",
                    kind,
                    x,
                    numeric,
                    analytic
                );
            }
        }
    }

    #[test]
    fn test_non_differentiable_kinds() {
        for kind in [
            ActivationKind::Step,
            ActivationKind::Relu,
            ActivationKind::LeakyRelu,
        ] {
            assert!(matches!(
                kind.derivative(0.5),
                Err(Error::UnsupportedOperation(_))
            ));
        }
    }

    #[test]
    fn test_closed_forms() {
        assert_relative_eq!(ActivationKind::Softsign.activate(1.0), 0.5);
        assert_relative_eq!(ActivationKind::Softsign.activate(-3.0), -0.75);
        assert_relative_eq!(ActivationKind::Gaussian.activate(0.0), 1.0);
        assert_relative_eq!(ActivationKind::Relu.activate(-2.0), 0.0);
        assert_relative_eq!(ActivationKind::LeakyRelu.activate(-2.0), -0.02);
        assert_relative_eq!(ActivationKind::Linear.derivative(123.0).unwrap(), 1.0);
    }

    #[test]
    fn test_serde_names() {
        let yaml = serde_yaml::to_string(&ActivationKind::LeakyRelu).unwrap();
        assert_eq!(yaml.trim(), "leaky_relu");
    }
}
