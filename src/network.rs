use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::{activate, activate_prime};
use crate::init::standard_normal;
use crate::metrics::{Inference, squared_error};
use crate::{Error, Matrix, Result, Sample};

/// A linear stack of fully-connected sigmoid layers.
///
/// `sizes` lists every layer width including the input, so a network with
/// `sizes.len() == L + 1` has `L` weight matrices (`sizes[i + 1] x sizes[i]`) and `L`
/// bias columns (`sizes[i + 1] x 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    sizes: Vec<usize>,
    weights: Vec<Matrix>,
    biases: Vec<Matrix>,
}

/// Per-layer parameter gradients, shaped like the network's weights and biases.
///
/// Summing the gradients of several samples is plain elementwise addition, so
/// accumulators built independently can be merged with [`Gradients::accumulate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    d_weights: Vec<Matrix>,
    d_biases: Vec<Matrix>,
}

/// Values recorded while running inputs through the layers.
pub(crate) struct ForwardPass {
    /// Pre-activations `z_i`, one per layer. Empty unless recorded.
    pub(crate) zs: Vec<Matrix>,
    /// `a_0` (the input) through `a_L` when recorded, otherwise only `a_L`.
    pub(crate) activations: Vec<Matrix>,
}

impl ForwardPass {
    #[inline]
    pub(crate) fn output(&self) -> &Matrix {
        self.activations
            .last()
            .expect("forward pass always produces an output")
    }
}

impl Network {
    /// Gaussian-initialized network from a deterministic seed.
    pub fn new_with_seed(sizes: &[usize], seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(sizes, &mut rng)
    }

    /// Every weight and bias is an independent standard-normal draw from `rng`.
    pub fn new_with_rng<R: Rng + ?Sized>(sizes: &[usize], rng: &mut R) -> Result<Self> {
        Self::from_fn(sizes, |_, _| standard_normal(&mut *rng))
    }

    /// Initializes parameters from a caller-supplied generator.
    ///
    /// Layer by layer, the bias column is filled before the weight matrix. The generator
    /// receives the shape of the matrix being filled.
    pub fn from_fn<F>(sizes: &[usize], mut generator: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        validate_sizes(sizes)?;

        let mut weights = Vec::with_capacity(sizes.len() - 1);
        let mut biases = Vec::with_capacity(sizes.len() - 1);
        for w in sizes.windows(2) {
            let (in_dim, out_dim) = (w[0], w[1]);
            biases.push(Matrix::from_fn(out_dim, 1, &mut generator));
            weights.push(Matrix::from_fn(out_dim, in_dim, &mut generator));
        }

        Ok(Self {
            sizes: sizes.to_vec(),
            weights,
            biases,
        })
    }

    /// Assembles a network from explicit parameters, validating every shape.
    pub fn from_parts(sizes: Vec<usize>, weights: Vec<Matrix>, biases: Vec<Matrix>) -> Result<Self> {
        validate_sizes(&sizes)?;
        let layers = sizes.len() - 1;
        if weights.len() != layers || biases.len() != layers {
            return Err(Error::ShapeMismatch(format!(
                "{layers} layers need {layers} weight and bias matrices, got {} and {}",
                weights.len(),
                biases.len()
            )));
        }

        for i in 0..layers {
            let (in_dim, out_dim) = (sizes[i], sizes[i + 1]);
            if weights[i].shape() != (out_dim, in_dim) {
                return Err(Error::ShapeMismatch(format!(
                    "layer {i} weights are {:?}, expected ({out_dim}, {in_dim})",
                    weights[i].shape()
                )));
            }
            if biases[i].shape() != (out_dim, 1) {
                return Err(Error::ShapeMismatch(format!(
                    "layer {i} biases are {:?}, expected ({out_dim}, 1)",
                    biases[i].shape()
                )));
            }
        }

        Ok(Self {
            sizes,
            weights,
            biases,
        })
    }

    /// Layer widths, input first.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Number of weight layers (`sizes().len() - 1`).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[Matrix] {
        &self.biases
    }

    /// Zeroed gradient accumulator for this network.
    pub fn gradients(&self) -> Gradients {
        Gradients {
            d_weights: self
                .weights
                .iter()
                .map(|w| Matrix::zeros(w.rows(), w.cols()))
                .collect(),
            d_biases: self
                .biases
                .iter()
                .map(|b| Matrix::zeros(b.rows(), b.cols()))
                .collect(),
        }
    }

    /// Forward pass for a single sample.
    ///
    /// Shape contract: `input.len() == self.sizes()[0]`.
    pub fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        let pass = self.forward_pass(input, |_| {}, false)?;
        pass.output().to_vec()
    }

    /// Runs `input` through every layer: `a = sigmoid(W a + b)`.
    ///
    /// `quantize` is applied to every freshly produced matrix: the input column, each
    /// `W a` product, each pre-activation and each activation. Exact inference passes a
    /// no-op.
    pub(crate) fn forward_pass<Q>(&self, input: &[f64], quantize: Q, record: bool) -> Result<ForwardPass>
    where
        Q: Fn(&mut Matrix),
    {
        if input.len() != self.sizes[0] {
            return Err(Error::ShapeMismatch(format!(
                "input len {} does not match network input_dim {}",
                input.len(),
                self.sizes[0]
            )));
        }

        let mut a = Matrix::column(input);
        quantize(&mut a);

        let layers = self.num_layers();
        let mut zs = Vec::with_capacity(if record { layers } else { 0 });
        let mut activations = Vec::with_capacity(if record { layers + 1 } else { 1 });

        for (w, b) in self.weights.iter().zip(&self.biases) {
            let mut wa = w.dot(&a)?;
            quantize(&mut wa);
            let mut z = wa.checked_add(b)?;
            quantize(&mut z);

            let mut next = activate(&z);
            quantize(&mut next);

            if record {
                zs.push(z);
                activations.push(std::mem::replace(&mut a, next));
            } else {
                a = next;
            }
        }
        activations.push(a);

        Ok(ForwardPass { zs, activations })
    }

    /// Gradients of the squared-error cost for one sample. Does not touch the parameters.
    pub fn backprop(&self, sample: &Sample) -> Result<Gradients> {
        self.backprop_with_cost(sample).map(|(grads, _)| grads)
    }

    /// Backprop that also reports the sample's cost `0.5 * |a_L - y|^2`.
    pub(crate) fn backprop_with_cost(&self, sample: &Sample) -> Result<(Gradients, f64)> {
        let output_dim = self.output_size();
        if sample.target.len() != output_dim {
            return Err(Error::ShapeMismatch(format!(
                "target len {} does not match network output_dim {output_dim}",
                sample.target.len()
            )));
        }

        let pass = self.forward_pass(&sample.input, |_| {}, true)?;
        let acts = &pass.activations;
        let zs = &pass.zs;
        let last = self.num_layers() - 1;

        let output = pass.output();
        let cost = squared_error(output.as_slice(), &sample.target);
        let target = Matrix::column(&sample.target);

        // Gradients are produced output layer first and reversed at the end.
        let mut d_weights = Vec::with_capacity(last + 1);
        let mut d_biases = Vec::with_capacity(last + 1);

        let mut delta = output
            .checked_sub(&target)?
            .hadamard(&activate_prime(&zs[last]))?;
        d_weights.push(delta.dot(&acts[last].transpose())?);
        d_biases.push(delta.clone());

        for i in (0..last).rev() {
            delta = self.weights[i + 1]
                .transpose()
                .dot(&delta)?
                .hadamard(&activate_prime(&zs[i]))?;
            d_weights.push(delta.dot(&acts[i].transpose())?);
            d_biases.push(delta.clone());
        }

        d_weights.reverse();
        d_biases.reverse();
        Ok((
            Gradients {
                d_weights,
                d_biases,
            },
            cost,
        ))
    }

    /// `param -= scale * grad` for every weight and bias.
    ///
    /// Shapes are checked for all layers before anything is written, so a mismatch leaves
    /// the network untouched.
    pub fn apply_gradients(&mut self, grads: &Gradients, scale: f64) -> Result<()> {
        if grads.num_layers() != self.num_layers() {
            return Err(Error::ShapeMismatch(format!(
                "gradients have {} layers, network has {}",
                grads.num_layers(),
                self.num_layers()
            )));
        }
        for i in 0..self.num_layers() {
            if grads.d_weights[i].shape() != self.weights[i].shape()
                || grads.d_biases[i].shape() != self.biases[i].shape()
            {
                return Err(Error::ShapeMismatch(format!(
                    "layer {i} gradient shapes do not match parameters"
                )));
            }
        }

        for i in 0..self.num_layers() {
            self.weights[i].sub_scaled_in_place(&grads.d_weights[i], scale)?;
            self.biases[i].sub_scaled_in_place(&grads.d_biases[i], scale)?;
        }
        Ok(())
    }

    /// Applies `f` to every parameter, biases first.
    pub(crate) fn map_parameters<F: Fn(f64) -> f64>(&mut self, f: F) {
        for b in &mut self.biases {
            b.map_in_place(&f);
        }
        for w in &mut self.weights {
            w.map_in_place(&f);
        }
    }

    #[inline]
    fn output_size(&self) -> usize {
        *self
            .sizes
            .last()
            .expect("network always has at least two layer sizes")
    }
}

impl Inference for Network {
    #[inline]
    fn input_dim(&self) -> usize {
        self.sizes[0]
    }

    #[inline]
    fn output_dim(&self) -> usize {
        self.output_size()
    }

    fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        Network::feed_forward(self, input)
    }
}

impl Gradients {
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.d_weights.len()
    }

    #[inline]
    pub fn d_weights(&self, layer_idx: usize) -> &Matrix {
        &self.d_weights[layer_idx]
    }

    #[inline]
    pub fn d_biases(&self, layer_idx: usize) -> &Matrix {
        &self.d_biases[layer_idx]
    }

    /// Adds `other` into `self`, layer by layer.
    pub fn accumulate(&mut self, other: &Gradients) -> Result<()> {
        if other.num_layers() != self.num_layers() {
            return Err(Error::ShapeMismatch(format!(
                "cannot accumulate {} gradient layers into {}",
                other.num_layers(),
                self.num_layers()
            )));
        }
        for (acc, g) in self.d_weights.iter_mut().zip(&other.d_weights) {
            acc.add_in_place(g)?;
        }
        for (acc, g) in self.d_biases.iter_mut().zip(&other.d_biases) {
            acc.add_in_place(g)?;
        }
        Ok(())
    }
}

fn validate_sizes(sizes: &[usize]) -> Result<()> {
    if sizes.len() < 2 {
        return Err(Error::InvalidArgument(
            "sizes must include input and output dims".to_owned(),
        ));
    }
    if sizes.contains(&0) {
        return Err(Error::InvalidArgument(
            "all layer sizes must be > 0".to_owned(),
        ));
    }
    Ok(())
}
