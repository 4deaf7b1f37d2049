//! The logistic activation shared by every layer.
//!
//! A layer computes a pre-activation `z = W a + b` and then applies `sigmoid`
//! element-wise. Backprop needs `sigmoid'(z)`, which is evaluated from the cached
//! `z` of the forward pass.

use crate::Matrix;

/// `1 / (1 + e^{-x})`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `sigmoid(x) * (1 - sigmoid(x))`.
#[inline]
pub fn sigmoid_prime(x: f64) -> f64 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

#[inline]
pub(crate) fn activate(z: &Matrix) -> Matrix {
    z.map(sigmoid)
}

#[inline]
pub(crate) fn activate_prime(z: &Matrix) -> Matrix {
    z.map(sigmoid_prime)
}
