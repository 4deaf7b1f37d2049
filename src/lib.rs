//! A small numeric engine for handwritten-digit classification.
//!
//! `digit-net` trains a fully-connected feed-forward network of sigmoid layers with
//! mini-batch stochastic gradient descent and persists it in a compact binary format.
//!
//! # Pieces
//!
//! - [`Matrix`]: dense row-major `f64` matrix with shape-checked arithmetic.
//! - [`Network`]: per-layer weights/biases, [`Network::feed_forward`],
//!   [`Network::backprop`] and the trainer [`Network::fit`].
//! - [`persist`]: the binary model format ([`Network::save`] / [`Network::load`]).
//! - [`QuantizedNetwork`]: inference with every value rounded to 0.01.
//!
//! Reading datasets, decoding images and presenting results are left to callers; the
//! crate consumes [`Sample`]s and returns output vectors.
//!
//! # Errors
//!
//! Shape-checked operations return [`Result`]. Raw element indexing on [`Matrix`]
//! panics on out-of-range access, like slice indexing.
//!
//! # Reproducibility
//!
//! All randomness (Gaussian initialization, per-epoch shuffling) comes from an injected
//! `rand::Rng`. Seeded constructors and [`FitConfig::seed`] make runs deterministic.
//!
//! # Quick start
//!
//! ```rust
//! use digit_net::{FitConfig, Inference, Network, Sample};
//!
//! # fn main() -> digit_net::Result<()> {
//! let train = vec![
//!     Sample::new(vec![0.0, 0.0], vec![0.0]),
//!     Sample::new(vec![0.0, 1.0], vec![1.0]),
//!     Sample::new(vec![1.0, 0.0], vec![1.0]),
//!     Sample::new(vec![1.0, 1.0], vec![1.0]),
//! ];
//!
//! let mut net = Network::new_with_seed(&[2, 3, 1], 0)?;
//! let report = net.fit(
//!     &train,
//!     &FitConfig {
//!         epochs: 100,
//!         batch_size: 2,
//!         learning_rate: 3.0,
//!         seed: Some(0),
//!     },
//! )?;
//! assert_eq!(report.batches_per_epoch, 2);
//!
//! let out = net.feed_forward(&[1.0, 0.0])?;
//! assert_eq!(out.len(), 1);
//! let _cost = net.mean_cost(&train)?;
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod data;
pub mod error;
pub mod init;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod persist;
pub mod quantized;
pub mod train;

pub use data::{Sample, one_hot};
pub use error::{Error, Result};
pub use matrix::{Axis, Matrix};
pub use metrics::{Inference, argmax};
pub use network::{Gradients, Network};
pub use quantized::{QUANTIZATION_STEP, QuantizedNetwork, quantize};
pub use train::{EpochReport, FitConfig, FitReport, shuffled_batches};
