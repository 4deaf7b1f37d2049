//! Low-precision inference for measuring quantization loss.
//!
//! [`QuantizedNetwork`] reads the same model format as [`Network`] and runs the same
//! forward pass, but every value is rounded to the nearest multiple of
//! [`QUANTIZATION_STEP`] as soon as it exists: parameters at load time, then the input,
//! each `W a` product, each pre-activation and each activation. There is no training
//! path.

use std::path::Path;

use crate::metrics::Inference;
use crate::{Network, Result, persist};

const SCALE: f64 = 100.0;

/// Precision of every quantized value.
pub const QUANTIZATION_STEP: f64 = 1.0 / SCALE;

/// Rounds to the nearest hundredth, ties to even.
#[inline]
pub fn quantize(x: f64) -> f64 {
    (x * SCALE).round_ties_even() / SCALE
}

/// Read-only network whose arithmetic is rounded to [`QUANTIZATION_STEP`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedNetwork {
    network: Network,
}

impl QuantizedNetwork {
    /// Quantizes a copy of `network`'s parameters.
    pub fn from_network(network: &Network) -> Self {
        let mut network = network.clone();
        network.map_parameters(quantize);
        Self { network }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let network = persist::decode(bytes)?;
        Ok(Self::from_network(&network))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let network = Network::load(path)?;
        Ok(Self::from_network(&network))
    }

    #[inline]
    pub fn sizes(&self) -> &[usize] {
        self.network.sizes()
    }

    /// The rounded parameters.
    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let pass = self
            .network
            .forward_pass(input, |m| m.map_in_place(quantize), false)?;
        pass.output().to_vec()
    }
}

impl Inference for QuantizedNetwork {
    #[inline]
    fn input_dim(&self) -> usize {
        self.network.input_dim()
    }

    #[inline]
    fn output_dim(&self) -> usize {
        self.network.output_dim()
    }

    fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        QuantizedNetwork::feed_forward(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Matrix;
    use crate::activation::sigmoid;

    fn is_quantized(x: f64) -> bool {
        (x - quantize(x)).abs() < 1e-12
    }

    #[test]
    fn rounds_to_hundredths_with_ties_to_even() {
        assert_eq!(quantize(0.123), 0.12);
        assert_eq!(quantize(-0.987), -0.99);
        assert_eq!(quantize(0.5), 0.5);
        // 12.5 and 37.5 hundredths are exact ties.
        assert_eq!(quantize(0.125), 0.12);
        assert_eq!(quantize(0.375), 0.38);
    }

    #[test]
    fn parameters_are_rounded_at_construction() {
        let net = Network::new_with_seed(&[4, 3, 2], 2).unwrap();
        let q = QuantizedNetwork::from_network(&net);
        for m in q.network().weights().iter().chain(q.network().biases()) {
            assert!(m.as_slice().iter().all(|&v| is_quantized(v)));
        }
        assert_eq!(q.sizes(), net.sizes());
    }

    #[test]
    fn rounds_every_stage_of_the_forward_pass() {
        // One weight of 0.333 on an input of 0.666: exact z = 0.221778.
        let net = Network::from_parts(
            vec![1, 1],
            vec![Matrix::from_vec(1, 1, vec![0.333]).unwrap()],
            vec![Matrix::from_vec(1, 1, vec![0.004]).unwrap()],
        )
        .unwrap();
        let q = QuantizedNetwork::from_network(&net);

        // w -> 0.33, b -> 0.0, x -> 0.67, w*x = 0.2211 -> 0.22, z -> 0.22.
        let expected = quantize(sigmoid(0.22));
        assert_eq!(q.feed_forward(&[0.666]).unwrap(), vec![expected]);
    }

    #[test]
    fn decode_reads_the_persisted_format() {
        let net = Network::new_with_seed(&[3, 2], 5).unwrap();
        let bytes = persist::encode(&net).unwrap();
        let q = QuantizedNetwork::decode(&bytes).unwrap();
        assert_eq!(q, QuantizedNetwork::from_network(&net));
    }
}
