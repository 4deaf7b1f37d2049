use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

use crate::metrics::{Inference, check_target};
use crate::{Error, Network, Result, Sample};

/// Mini-batch SGD hyperparameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for the per-epoch shuffle. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 10,
            learning_rate: 3.0,
            seed: None,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidArgument("epochs must be > 0".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidArgument("batch_size must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidArgument(
                "learning_rate must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl FitConfig {
    /// Parses a config from JSON. Missing fields take their default values.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: FitConfig = serde_json::from_str(s)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse fit config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean cost of the samples consumed this epoch, measured before each batch's update.
    pub mean_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub batches_per_epoch: usize,
    /// `batches_per_epoch * batch_size`; the shuffled remainder is skipped each epoch.
    pub samples_per_epoch: usize,
    pub epochs: Vec<EpochReport>,
}

impl FitReport {
    pub fn final_cost(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.mean_cost)
    }
}

/// Shuffles `0..len` and cuts it into full batches of `batch_size` indices.
///
/// When `len` is not a multiple of `batch_size`, the trailing `len % batch_size` shuffled
/// indices are left out.
pub fn shuffled_batches<R: Rng + ?Sized>(len: usize, batch_size: usize, rng: &mut R) -> Vec<Vec<usize>> {
    assert!(batch_size > 0, "batch_size must be > 0");
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
        .chunks_exact(batch_size)
        .map(<[usize]>::to_vec)
        .collect()
}

impl Network {
    /// Train with mini-batch SGD on the squared-error cost.
    ///
    /// Uses `cfg.seed` for shuffling; see [`Network::fit_with_rng`].
    pub fn fit(&mut self, samples: &[Sample], cfg: &FitConfig) -> Result<FitReport> {
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fit_with_rng(samples, cfg, &mut rng)
    }

    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        samples: &[Sample],
        cfg: &FitConfig,
        rng: &mut R,
    ) -> Result<FitReport> {
        self.fit_with_observer(samples, cfg, rng, |_, _| {})
    }

    /// Train, calling `on_epoch` with the updated network after every epoch.
    ///
    /// Each epoch reshuffles all samples, splits them into full batches (see
    /// [`shuffled_batches`]) and, for every batch, sums per-sample gradients and applies
    /// `param -= learning_rate / batch_size * sum`.
    pub fn fit_with_observer<R, F>(
        &mut self,
        samples: &[Sample],
        cfg: &FitConfig,
        rng: &mut R,
        mut on_epoch: F,
    ) -> Result<FitReport>
    where
        R: Rng + ?Sized,
        F: FnMut(&Network, &EpochReport),
    {
        cfg.validate()?;
        if samples.is_empty() {
            return Err(Error::InvalidArgument(
                "training samples must not be empty".to_owned(),
            ));
        }
        if cfg.batch_size > samples.len() {
            return Err(Error::InvalidArgument(format!(
                "batch_size {} exceeds the {} available samples",
                cfg.batch_size,
                samples.len()
            )));
        }
        for sample in samples {
            if sample.input.len() != self.input_dim() {
                return Err(Error::ShapeMismatch(format!(
                    "sample input len {} does not match network input_dim {}",
                    sample.input.len(),
                    self.input_dim()
                )));
            }
            check_target(self.output_dim(), sample)?;
        }

        let batches_per_epoch = samples.len() / cfg.batch_size;
        let samples_per_epoch = batches_per_epoch * cfg.batch_size;
        let scale = cfg.learning_rate / cfg.batch_size as f64;
        info!(
            "training on {} samples: {} epochs x {} batches of {}, lr {}",
            samples.len(),
            cfg.epochs,
            batches_per_epoch,
            cfg.batch_size,
            cfg.learning_rate
        );
        if samples_per_epoch < samples.len() {
            warn!(
                "{} of {} samples are left out of every epoch (batch_size {})",
                samples.len() - samples_per_epoch,
                samples.len(),
                cfg.batch_size
            );
        }

        let mut epochs = Vec::with_capacity(cfg.epochs);
        for epoch in 1..=cfg.epochs {
            let mut epoch_cost = 0.0;
            let batches = shuffled_batches(samples.len(), cfg.batch_size, rng);

            for (batch_idx, batch) in batches.iter().enumerate() {
                let mut acc = self.gradients();
                for &idx in batch {
                    let (grads, cost) = self.backprop_with_cost(&samples[idx])?;
                    acc.accumulate(&grads)?;
                    epoch_cost += cost;
                }
                self.apply_gradients(&acc, scale)?;
                debug!(
                    "epoch {epoch}/{}: batch {}/{batches_per_epoch}",
                    cfg.epochs,
                    batch_idx + 1
                );
            }

            let report = EpochReport {
                epoch,
                mean_cost: epoch_cost / samples_per_epoch as f64,
            };
            info!(
                "epoch {epoch}/{}: mean cost {:.6}",
                cfg.epochs, report.mean_cost
            );
            on_epoch(self, &report);
            epochs.push(report);
        }

        info!("training finished after {} epochs", cfg.epochs);
        Ok(FitReport {
            batches_per_epoch,
            samples_per_epoch,
            epochs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Matrix;
    use approx::assert_abs_diff_eq;
    use std::collections::HashSet;

    fn or_samples() -> Vec<Sample> {
        vec![
            Sample::new(vec![0.0, 0.0], vec![0.0]),
            Sample::new(vec![0.0, 1.0], vec![1.0]),
            Sample::new(vec![1.0, 0.0], vec![1.0]),
            Sample::new(vec![1.0, 1.0], vec![1.0]),
        ]
    }

    #[test]
    fn config_validation() {
        assert!(FitConfig::default().validate().is_ok());
        let bad = [
            FitConfig {
                epochs: 0,
                ..FitConfig::default()
            },
            FitConfig {
                batch_size: 0,
                ..FitConfig::default()
            },
            FitConfig {
                learning_rate: 0.0,
                ..FitConfig::default()
            },
            FitConfig {
                learning_rate: f64::NAN,
                ..FitConfig::default()
            },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn shuffled_batches_drop_the_remainder() {
        let mut rng = StdRng::seed_from_u64(0);
        let batches = shuffled_batches(23, 10, &mut rng);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 10));

        let seen: HashSet<usize> = batches.iter().flatten().copied().collect();
        assert_eq!(seen.len(), 20);
        assert!(seen.iter().all(|&i| i < 23));
    }

    #[test]
    fn shuffled_batches_cover_everything_when_divisible() {
        let mut rng = StdRng::seed_from_u64(1);
        let batches = shuffled_batches(12, 4, &mut rng);
        let mut all: Vec<usize> = batches.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn fit_rejects_bad_inputs_before_training() {
        let mut net = Network::new_with_seed(&[2, 2, 1], 0).unwrap();
        let before = net.clone();
        let cfg = FitConfig {
            epochs: 1,
            batch_size: 2,
            learning_rate: 1.0,
            seed: Some(0),
        };

        assert!(matches!(net.fit(&[], &cfg), Err(Error::InvalidArgument(_))));

        let too_big = FitConfig {
            batch_size: 5,
            ..cfg
        };
        assert!(matches!(
            net.fit(&or_samples(), &too_big),
            Err(Error::InvalidArgument(_))
        ));

        let mut wrong = or_samples();
        wrong[3].target = vec![1.0, 0.0];
        assert!(matches!(
            net.fit(&wrong, &cfg),
            Err(Error::ShapeMismatch(_))
        ));
        assert_eq!(net, before);
    }

    #[test]
    fn full_batch_epoch_equals_manual_update() {
        let samples = or_samples();
        let mut net = Network::new_with_seed(&[2, 3, 1], 11).unwrap();
        let mut manual = net.clone();

        let cfg = FitConfig {
            epochs: 1,
            batch_size: 4,
            learning_rate: 0.5,
            seed: Some(3),
        };
        net.fit(&samples, &cfg).unwrap();

        let mut acc = manual.gradients();
        for s in &samples {
            acc.accumulate(&manual.backprop(s).unwrap()).unwrap();
        }
        manual.apply_gradients(&acc, 0.5 / 4.0).unwrap();

        for layer in 0..net.num_layers() {
            let (a, b) = (&net.weights()[layer], &manual.weights()[layer]);
            for p in 0..a.len() {
                assert_abs_diff_eq!(a[p], b[p], epsilon = 1e-12);
            }
            let (a, b) = (&net.biases()[layer], &manual.biases()[layer]);
            for p in 0..a.len() {
                assert_abs_diff_eq!(a[p], b[p], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_training_run() {
        let samples = or_samples();
        let cfg = FitConfig {
            epochs: 20,
            batch_size: 2,
            learning_rate: 2.0,
            seed: Some(99),
        };
        let mut a = Network::new_with_seed(&[2, 3, 1], 4).unwrap();
        let mut b = a.clone();
        let ra = a.fit(&samples, &cfg).unwrap();
        let rb = b.fit(&samples, &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(ra, rb);
    }

    #[test]
    fn observer_sees_every_epoch() {
        let samples = or_samples();
        let mut net = Network::new_with_seed(&[2, 2, 1], 0).unwrap();
        let mut seen = Vec::new();
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = FitConfig {
            epochs: 3,
            batch_size: 1,
            learning_rate: 1.0,
            seed: None,
        };
        let report = net
            .fit_with_observer(&samples, &cfg, &mut rng, |_, r| seen.push(r.epoch))
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(report.batches_per_epoch, 4);
        assert_eq!(report.samples_per_epoch, 4);
    }

    #[test]
    fn zero_weight_network_trains_biases_and_weights() {
        let samples = or_samples();
        let mut net = Network::from_parts(
            vec![2, 1],
            vec![Matrix::zeros(1, 2)],
            vec![Matrix::zeros(1, 1)],
        )
        .unwrap();
        let cfg = FitConfig {
            epochs: 1,
            batch_size: 4,
            learning_rate: 1.0,
            seed: Some(0),
        };
        net.fit(&samples, &cfg).unwrap();

        // Outputs start at 0.5 and three of four targets are 1, so every parameter grows.
        assert!(net.biases()[0][0] > 0.0);
        assert!(net.weights()[0][0] > 0.0);
        assert!(net.weights()[0][1] > 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_from_json_uses_defaults_for_missing_fields() {
        let cfg = FitConfig::from_json_str(r#"{"epochs": 5, "seed": 7}"#).unwrap();
        assert_eq!(cfg.epochs, 5);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.learning_rate, 3.0);

        assert!(matches!(
            FitConfig::from_json_str("{not json"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            FitConfig::from_json_str(r#"{"batch_size": 0}"#),
            Err(Error::InvalidArgument(_))
        ));
    }
}
