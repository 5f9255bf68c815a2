//! Scalar activation functions and their derivatives.
//!
//! Each function comes with two derivative forms: one evaluated at the
//! pre-activation input, and one recovered from the stored activation value.
//! The backward pass keeps post-activation values only, so it always uses
//! the second form (`a * (1 - a)` for the sigmoid, `1 - a^2` for tanh).

use serde::{Deserialize, Serialize};

/// Inputs beyond this magnitude saturate the sigmoid to exactly 0.0 or 1.0.
pub const SATURATION_LIMIT: f64 = 40.0;

/// Slope used for negative inputs by the leaky rectifier.
pub const LEAKY_SLOPE: f64 = 0.24;

/// Clamp applied to the logit's domain near 0.0 and 1.0.
const LOGIT_EPSILON: f64 = 1e-10;

/// Logit value reported for inputs outside the clamped domain.
const LOGIT_LIMIT: f64 = 1000.0;

/// The nonlinearity applied to every neuron past the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
}

impl Activation {
    /// Applies the function to a pre-activation value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_SLOPE * x
                }
            }
        }
    }

    /// Derivative evaluated at a pre-activation value.
    #[must_use]
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => {
                if x.abs() > SATURATION_LIMIT {
                    0.0
                } else {
                    let s = sigmoid(x);
                    s * (1.0 - s)
                }
            }
            Activation::Tanh => 1.0 - x.tanh().powi(2),
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu => {
                if x > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
        }
    }

    /// Derivative recovered from a stored activation value `a = f(x)`.
    #[must_use]
    pub fn derivative_from_output(self, a: f64) -> f64 {
        match self {
            Activation::Sigmoid => a * (1.0 - a),
            Activation::Tanh => 1.0 - a * a,
            Activation::Relu => {
                if a > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu => {
                if a > 0.0 {
                    1.0
                } else {
                    LEAKY_SLOPE
                }
            }
        }
    }
}

/// Logistic sigmoid with hard saturation on extreme inputs.
///
/// # Examples
///
/// ```
/// use neural_network::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert_eq!(sigmoid(1000.0), 1.0);
/// ```
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    if x > SATURATION_LIMIT {
        1.0
    } else if x < -SATURATION_LIMIT {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

/// Inverse sigmoid (logit).
///
/// The domain is clamped to `[1e-10, 1 - 1e-10]`; inputs outside it report
/// -1000.0 or 1000.0 instead of diverging.
#[must_use]
pub fn sigmoid_inverse(x: f64) -> f64 {
    if x < LOGIT_EPSILON {
        -LOGIT_LIMIT
    } else if x > 1.0 - LOGIT_EPSILON {
        LOGIT_LIMIT
    } else {
        (x / (1.0 - x)).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_midpoint() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn test_sigmoid_saturates() {
        assert_eq!(sigmoid(40.5), 1.0);
        assert_eq!(sigmoid(-40.5), 0.0);
        assert_eq!(Activation::Sigmoid.derivative(41.0), 0.0);
        assert_eq!(Activation::Sigmoid.derivative(-41.0), 0.0);
    }

    #[test]
    fn test_sigmoid_inverse_round_trip() {
        for &x in &[-3.0, -0.5, 0.0, 1.2, 4.0] {
            assert_relative_eq!(sigmoid_inverse(sigmoid(x)), x, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sigmoid_inverse_clamps() {
        assert_eq!(sigmoid_inverse(0.0), -1000.0);
        assert_eq!(sigmoid_inverse(-0.2), -1000.0);
        assert_eq!(sigmoid_inverse(1.0), 1000.0);
        assert_eq!(sigmoid_inverse(1.4), 1000.0);
    }

    #[test]
    fn test_derivative_forms_agree() {
        let activations = [
            Activation::Sigmoid,
            Activation::Tanh,
            Activation::Relu,
            Activation::LeakyRelu,
        ];
        for activation in activations {
            for &x in &[-2.0, -0.3, 0.4, 1.7] {
                let from_output = activation.derivative_from_output(activation.apply(x));
                assert_relative_eq!(activation.derivative(x), from_output, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_leaky_relu_negative_slope() {
        assert_relative_eq!(Activation::LeakyRelu.apply(-2.0), -0.48);
        assert_eq!(Activation::LeakyRelu.derivative(-2.0), LEAKY_SLOPE);
        assert_eq!(Activation::LeakyRelu.derivative_from_output(-0.48), LEAKY_SLOPE);
    }

    #[test]
    fn test_tanh_matches_std() {
        assert_relative_eq!(Activation::Tanh.apply(0.7), 0.7_f64.tanh());
        assert_relative_eq!(
            Activation::Tanh.derivative(0.7),
            1.0 - 0.7_f64.tanh().powi(2)
        );
    }
}
