//! Metrics.
//!
//! Metrics are evaluation helpers (they do not participate in backprop).

use crate::{Error, Result, Sample};

/// Index of the first maximal component; `None` for an empty slice.
///
/// NaN components never win a comparison, so they are skipped unless they come first.
pub fn argmax(values: &[f64]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut best = 0;
    for i in 1..values.len() {
        if values[best] < values[i] {
            best = i;
        }
    }
    Some(best)
}

/// Squared-error cost `0.5 * sum((pred - target)^2)` of a single sample.
///
/// Shape contract: `pred.len() == target.len()`.
pub fn squared_error(pred: &[f64], target: &[f64]) -> f64 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );
    let mut sum_sq = 0.0;
    for (&p, &t) in pred.iter().zip(target) {
        let diff = p - t;
        sum_sq += diff * diff;
    }
    0.5 * sum_sq
}

/// Forward inference, shared by the exact and the quantized network.
pub trait Inference {
    fn input_dim(&self) -> usize;

    fn output_dim(&self) -> usize;

    /// Runs one input vector through every layer and returns the output activation.
    fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>>;

    /// Index of the strongest output.
    fn classify(&self, input: &[f64]) -> Result<usize> {
        let out = self.feed_forward(input)?;
        argmax(&out).ok_or_else(|| Error::InvalidShape("network has no outputs".to_owned()))
    }

    /// Fraction of samples whose predicted class matches the target's argmax.
    fn accuracy(&self, samples: &[Sample]) -> Result<f64> {
        if samples.is_empty() {
            return Err(Error::InvalidArgument("samples must not be empty".to_owned()));
        }
        let mut hits = 0usize;
        for sample in samples {
            check_target(self.output_dim(), sample)?;
            if Some(self.classify(&sample.input)?) == sample.label() {
                hits += 1;
            }
        }
        Ok(hits as f64 / samples.len() as f64)
    }

    /// Mean squared-error cost over `samples`.
    fn mean_cost(&self, samples: &[Sample]) -> Result<f64> {
        if samples.is_empty() {
            return Err(Error::InvalidArgument("samples must not be empty".to_owned()));
        }
        let mut total = 0.0;
        for sample in samples {
            check_target(self.output_dim(), sample)?;
            let out = self.feed_forward(&sample.input)?;
            total += squared_error(&out, &sample.target);
        }
        Ok(total / samples.len() as f64)
    }
}

pub(crate) fn check_target(output_dim: usize, sample: &Sample) -> Result<()> {
    if sample.target.len() != output_dim {
        return Err(Error::ShapeMismatch(format!(
            "target len {} does not match network output_dim {}",
            sample.target.len(),
            output_dim
        )));
    }
    Ok(())
}
