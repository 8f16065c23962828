//! Dense layers and their parameter initializers.

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::{Activation, Error, Result};

/// Parameter initializer.
///
/// All random initializers draw from a bounded uniform distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// Glorot/Xavier uniform: `U(-l, l)` with `l = sqrt(6 / (fan_in + fan_out))`.
    Xavier,
    /// He/Kaiming uniform: `U(-l, l)` with `l = sqrt(6 / fan_in)`.
    He,
    /// `U(low, high)`. Requires finite bounds with `low < high`.
    Uniform { low: f32, high: f32 },
    Zeros,
}

impl Init {
    pub fn validate(self) -> Result<()> {
        if let Init::Uniform { low, high } = self {
            // `Uniform` also needs the width of the range to be representable.
            if !(low.is_finite() && high.is_finite() && low < high && (high - low).is_finite()) {
                return Err(Error::InvalidConfig(format!(
                    "uniform init needs finite bounds with low < high and a finite width, \
                     got [{low}, {high})"
                )));
            }
        }
        Ok(())
    }

    fn fill<R: Rng + ?Sized>(self, buf: &mut [f32], fan_in: usize, fan_out: usize, rng: &mut R) {
        let (low, high) = match self {
            Init::Zeros => {
                buf.fill(0.0);
                return;
            }
            Init::Xavier => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                (-limit, limit)
            }
            Init::He => {
                let limit = (6.0 / fan_in as f32).sqrt();
                (-limit, limit)
            }
            Init::Uniform { low, high } => (low, high),
        };

        let dist = Uniform::new(low, high);
        for v in buf.iter_mut() {
            *v = dist.sample(rng);
        }
    }
}

/// A fixed-size group of neurons sharing one activation function.
///
/// The input layer (`in_dim == 0`) holds no parameters: it only carries the
/// current input in `activations`.
#[derive(Debug, Clone)]
pub struct Layer {
    size: usize,
    in_dim: usize,
    activation: Activation,
    /// Row-major matrix with shape (size, in_dim).
    weights: Vec<f32>,
    biases: Vec<f32>,
    /// Pre-activation sums from the last forward pass.
    sums: Vec<f32>,
    activations: Vec<f32>,
    sensitivities: Vec<f32>,
}

impl Layer {
    /// Creates the pass-through input layer.
    pub fn input(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig("layer size must be > 0".to_owned()));
        }
        Ok(Self {
            size,
            in_dim: 0,
            activation: Activation::Identity,
            weights: Vec::new(),
            biases: Vec::new(),
            sums: vec![0.0; size],
            activations: vec![0.0; size],
            sensitivities: vec![0.0; size],
        })
    }

    /// Creates a trainable layer with `size` neurons fed by `in_dim` inputs.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_dim: usize,
        size: usize,
        activation: Activation,
        weight_init: Init,
        bias_init: Init,
        rng: &mut R,
    ) -> Result<Self> {
        if in_dim == 0 || size == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} size={size}"
            )));
        }
        weight_init.validate()?;
        bias_init.validate()?;

        let mut weights = vec![0.0; size * in_dim];
        let mut biases = vec![0.0; size];
        weight_init.fill(&mut weights, in_dim, size, rng);
        bias_init.fill(&mut biases, in_dim, size, rng);

        Self::from_parts(in_dim, activation, weights, biases)
    }

    /// Creates a trainable layer from explicit parameters.
    ///
    /// `weights` is row-major `(biases.len(), in_dim)`.
    pub fn from_parts(
        in_dim: usize,
        activation: Activation,
        weights: Vec<f32>,
        biases: Vec<f32>,
    ) -> Result<Self> {
        let size = biases.len();
        if in_dim == 0 || size == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer dims must be > 0, got in_dim={in_dim} size={size}"
            )));
        }
        if weights.len() != size * in_dim {
            return Err(Error::InvalidConfig(format!(
                "weights len {} does not match size * in_dim ({size} * {in_dim})",
                weights.len()
            )));
        }

        Ok(Self {
            size,
            in_dim,
            activation,
            weights,
            biases,
            sums: vec![0.0; size],
            activations: vec![0.0; size],
            sensitivities: vec![0.0; size],
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.in_dim == 0
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[inline]
    pub fn sums(&self) -> &[f32] {
        &self.sums
    }

    #[inline]
    pub fn activations(&self) -> &[f32] {
        &self.activations
    }

    #[inline]
    pub fn sensitivities(&self) -> &[f32] {
        &self.sensitivities
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    #[cfg(test)]
    pub(crate) fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Copies an input sample into the activations of an input layer.
    #[inline]
    pub(crate) fn load(&mut self, input: &[f32]) {
        debug_assert!(self.is_input());
        debug_assert_eq!(input.len(), self.size);
        self.activations.copy_from_slice(input);
    }

    /// Forward pass: `sums = W prev + b`, `activations = f(sums)`.
    #[inline]
    pub(crate) fn forward(&mut self, prev: &[f32]) {
        debug_assert_eq!(prev.len(), self.in_dim);

        for i in 0..self.size {
            let row = &self.weights[i * self.in_dim..(i + 1) * self.in_dim];
            let mut z = self.biases[i];
            for (&w, &a) in row.iter().zip(prev) {
                z = w.mul_add(a, z);
            }
            self.sums[i] = z;
            self.activations[i] = self.activation.value(z);
        }
    }

    /// Output-layer deltas: `f'(z_i) * (a_i - t_i)`.
    #[inline]
    pub(crate) fn output_sensitivities(&mut self, target: &[f32]) {
        debug_assert_eq!(target.len(), self.size);

        for i in 0..self.size {
            let diff = self.activations[i] - target[i];
            self.sensitivities[i] = self.activation.derivative(self.sums[i]) * diff;
        }
    }

    /// Hidden-layer deltas: `f'(z_i) * sum_k W_next[k][i] * delta_next[k]`.
    #[inline]
    pub(crate) fn hidden_sensitivities(&mut self, next: &Layer) {
        debug_assert_eq!(next.in_dim, self.size);

        for i in 0..self.size {
            let mut back = 0.0_f32;
            for k in 0..next.size {
                back = next.weights[k * next.in_dim + i].mul_add(next.sensitivities[k], back);
            }
            self.sensitivities[i] = self.activation.derivative(self.sums[i]) * back;
        }
    }

    /// Gradient-descent step using the stored sensitivities.
    #[inline]
    pub(crate) fn apply_update(&mut self, prev: &[f32], lr: f32) {
        debug_assert_eq!(prev.len(), self.in_dim);

        for i in 0..self.size {
            let step = lr * self.sensitivities[i];
            let row = &mut self.weights[i * self.in_dim..(i + 1) * self.in_dim];
            for (w, &a) in row.iter_mut().zip(prev) {
                *w -= step * a;
            }
            self.biases[i] -= step;
        }
    }
}
