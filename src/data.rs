//! Labeled samples.
//!
//! Decoding datasets and normalizing images happen outside this crate; the trainer
//! only sees `(input, target)` pairs.

use crate::{Error, Result};

/// One training pair: an input vector and its target vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Sample {
    #[inline]
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }

    /// Builds a sample whose target is the one-hot encoding of `label`.
    pub fn labeled(input: Vec<f64>, label: usize, classes: usize) -> Result<Self> {
        Ok(Self {
            input,
            target: one_hot(label, classes)?,
        })
    }

    /// Index of the target's largest component (the class label for one-hot targets).
    #[inline]
    pub fn label(&self) -> Option<usize> {
        crate::metrics::argmax(&self.target)
    }
}

/// A vector of `classes` zeros with a single 1 at `label`.
pub fn one_hot(label: usize, classes: usize) -> Result<Vec<f64>> {
    if label >= classes {
        return Err(Error::InvalidArgument(format!(
            "label {label} is out of range for {classes} classes"
        )));
    }
    let mut v = vec![0.0; classes];
    v[label] = 1.0;
    Ok(v)
}
