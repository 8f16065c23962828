use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Error, Layer, NetworkBuilder, Result, loss};

/// A dense feed-forward network.
///
/// Layer 0 is a pass-through input holder; every following layer is a dense
/// layer fully connected to its predecessor. The network owns every buffer and
/// only mutates them through [`Network::forward`], [`Network::backward`] and
/// the training loop.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Builds a network from `(size, activation)` pairs using a deterministic seed.
    ///
    /// The first pair describes the input layer; its activation is ignored.
    pub fn new_with_seed(topology: &[(usize, Activation)], seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(topology, &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        topology: &[(usize, Activation)],
        rng: &mut R,
    ) -> Result<Self> {
        NetworkBuilder::from_topology(topology)?.build_with_rng(rng)
    }

    /// Assembles a network from already constructed layers.
    ///
    /// `layers[0]` must be an input layer, every other layer must be trainable
    /// and fed by its predecessor.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "network needs at least 2 layers, got {}",
                layers.len()
            )));
        }
        if !layers[0].is_input() {
            return Err(Error::InvalidConfig(
                "layer 0 must be an input layer".to_owned(),
            ));
        }
        for (idx, pair) in layers.windows(2).enumerate() {
            let (prev, layer) = (&pair[0], &pair[1]);
            if layer.is_input() {
                return Err(Error::InvalidConfig(format!(
                    "layer {} is an input layer; only layer 0 may be",
                    idx + 1
                )));
            }
            if layer.in_dim() != prev.size() {
                return Err(Error::InvalidConfig(format!(
                    "layer {} expects {} inputs, previous layer has size {}",
                    idx + 1,
                    layer.in_dim(),
                    prev.size()
                )));
            }
        }

        debug!(
            "built network with sizes {:?}",
            layers.iter().map(Layer::size).collect::<Vec<_>>()
        );
        Ok(Self { layers })
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0].size()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.output_layer().size()
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn layer(&self, idx: usize) -> Option<&Layer> {
        self.layers.get(idx)
    }

    #[cfg(test)]
    pub(crate) fn layer_mut(&mut self, idx: usize) -> &mut Layer {
        &mut self.layers[idx]
    }

    /// Output activations from the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f32] {
        self.output_layer().activations()
    }

    #[inline]
    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Forward pass for a single sample.
    ///
    /// Writes every layer's sums and activations and returns the output slice.
    pub fn forward(&mut self, input: &[f32]) -> Result<&[f32]> {
        if input.len() != self.input_dim() {
            return Err(Error::InvalidShape(format!(
                "input len {} does not match network input_dim {}",
                input.len(),
                self.input_dim()
            )));
        }

        self.layers[0].load(input);
        for idx in 1..self.layers.len() {
            // Borrow the previous layer immutably and the current one mutably.
            let (left, right) = self.layers.split_at_mut(idx);
            right[0].forward(left[idx - 1].activations());
        }

        Ok(self.output())
    }

    /// Backward pass plus one gradient-descent step.
    ///
    /// Must follow a [`Network::forward`] over the input that `target` belongs
    /// to. Every layer's sensitivities are computed with the current weights
    /// before any weight is updated. With `lr == 0` the parameters are left
    /// untouched.
    pub fn backward(&mut self, target: &[f32], lr: f32) -> Result<()> {
        if target.len() != self.output_dim() {
            return Err(Error::InvalidShape(format!(
                "target len {} does not match network output_dim {}",
                target.len(),
                self.output_dim()
            )));
        }
        if !(lr.is_finite() && lr >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and >= 0, got {lr}"
            )));
        }

        let last = self.layers.len() - 1;
        self.layers[last].output_sensitivities(target);

        for idx in (1..last).rev() {
            let (left, right) = self.layers.split_at_mut(idx + 1);
            left[idx].hidden_sensitivities(&right[0]);
        }

        if lr == 0.0 {
            return Ok(());
        }

        for idx in 1..self.layers.len() {
            let (left, right) = self.layers.split_at_mut(idx);
            right[0].apply_update(left[idx - 1].activations(), lr);
        }

        Ok(())
    }

    /// Squared error of the current output against `target`.
    pub fn error(&self, target: &[f32]) -> Result<f32> {
        if target.len() != self.output_dim() {
            return Err(Error::InvalidShape(format!(
                "target len {} does not match network output_dim {}",
                target.len(),
                self.output_dim()
            )));
        }
        Ok(loss::squared_error(self.output(), target))
    }

    /// Runs a forward pass and returns a snapshot of the output layer.
    pub fn predict(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        Ok(self.forward(input)?.to_vec())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, layer) in self.layers.iter().enumerate() {
            write!(f, "layer {idx} ({}, {}):", layer.size(), layer.activation())?;
            for a in layer.activations() {
                write!(f, " {a:.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(w: f32, b: f32) -> Network {
        Network::from_layers(vec![
            Layer::input(1).unwrap(),
            Layer::from_parts(1, Activation::Identity, vec![w], vec![b]).unwrap(),
        ])
        .unwrap()
    }

    fn params(net: &Network) -> Vec<(Vec<f32>, Vec<f32>)> {
        net.layers()
            .iter()
            .map(|l| (l.weights().to_vec(), l.biases().to_vec()))
            .collect()
    }

    fn assert_close(analytic: f32, numeric: f32, abs_tol: f32, rel_tol: f32) {
        let diff = (analytic - numeric).abs();
        let scale = analytic.abs().max(numeric.abs()).max(1.0);
        assert!(
            diff <= abs_tol || diff / scale <= rel_tol,
            "analytic={analytic} numeric={numeric} diff={diff}"
        );
    }

    #[test]
    fn seeded_init_is_deterministic() {
        let topo = [
            (2, Activation::Identity),
            (3, Activation::ReLU),
            (2, Activation::FastSigmoid),
        ];
        let mut a = Network::new_with_seed(&topo, 123).unwrap();
        let mut b = Network::new_with_seed(&topo, 123).unwrap();
        assert_eq!(params(&a), params(&b));

        let input = [0.3_f32, -0.7_f32];
        assert_eq!(a.predict(&input).unwrap(), b.predict(&input).unwrap());
    }

    #[test]
    fn forward_is_idempotent() {
        let topo = [
            (3, Activation::Identity),
            (5, Activation::LeakyReLU),
            (3, Activation::Identity),
        ];
        let mut net = Network::new_with_seed(&topo, 9).unwrap();
        let x = [0.2_f32, -1.0, 0.4];
        let first = net.forward(&x).unwrap().to_vec();
        let second = net.forward(&x).unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn from_layers_rejects_bad_topologies() {
        assert!(Network::from_layers(vec![Layer::input(2).unwrap()]).is_err());

        let no_input = vec![
            Layer::from_parts(1, Activation::Identity, vec![1.0], vec![0.0]).unwrap(),
            Layer::from_parts(1, Activation::Identity, vec![1.0], vec![0.0]).unwrap(),
        ];
        assert!(Network::from_layers(no_input).is_err());

        let mismatched = vec![
            Layer::input(2).unwrap(),
            Layer::from_parts(3, Activation::Identity, vec![0.0; 3], vec![0.0]).unwrap(),
        ];
        assert!(Network::from_layers(mismatched).is_err());

        let second_input = vec![Layer::input(2).unwrap(), Layer::input(2).unwrap()];
        assert!(Network::from_layers(second_input).is_err());
    }

    #[test]
    fn shape_mismatches_are_errors() {
        let mut net = linear(1.0, 0.0);
        assert!(matches!(net.forward(&[1.0, 2.0]), Err(Error::InvalidShape(_))));
        assert!(matches!(net.forward(&[]), Err(Error::InvalidShape(_))));
        net.forward(&[1.0]).unwrap();
        assert!(matches!(net.backward(&[1.0, 2.0], 0.1), Err(Error::InvalidShape(_))));
        assert!(matches!(net.predict(&[]), Err(Error::InvalidShape(_))));
    }

    #[test]
    fn negative_or_nan_learning_rate_is_rejected() {
        let mut net = linear(1.0, 0.0);
        net.forward(&[1.0]).unwrap();
        assert!(matches!(net.backward(&[1.0], -0.1), Err(Error::InvalidConfig(_))));
        assert!(matches!(net.backward(&[1.0], f32::NAN), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_learning_rate_keeps_parameters() {
        let topo = [
            (3, Activation::Identity),
            (4, Activation::FastSigmoid),
            (4, Activation::LeakyReLU),
            (3, Activation::Identity),
        ];
        let mut net = Network::new_with_seed(&topo, 5).unwrap();
        let before = params(&net);

        net.forward(&[0.5, -0.25, 1.5]).unwrap();
        net.backward(&[1.0, 0.0, -1.0], 0.0).unwrap();

        assert_eq!(params(&net), before);
        assert!(net.output_layer().sensitivities().iter().any(|&d| d != 0.0));
    }

    #[test]
    fn hidden_deltas_use_pre_update_weights() {
        // 1 -> 1 -> 1 identity chain: w1 = 2, w2 = 3, zero biases.
        let mut net = Network::from_layers(vec![
            Layer::input(1).unwrap(),
            Layer::from_parts(1, Activation::Identity, vec![2.0], vec![0.0]).unwrap(),
            Layer::from_parts(1, Activation::Identity, vec![3.0], vec![0.0]).unwrap(),
        ])
        .unwrap();

        // a1 = 2, a2 = 6, target 4 -> delta2 = 2, delta1 = w2 * delta2 = 6.
        net.forward(&[1.0]).unwrap();
        net.backward(&[4.0], 0.1).unwrap();

        assert_eq!(net.layers()[2].sensitivities(), &[2.0]);
        assert_eq!(net.layers()[1].sensitivities(), &[6.0]);
        // w2 -= 0.1 * 2 * 2, w1 -= 0.1 * 6 * 1
        assert!((net.layers()[2].weights()[0] - 2.6).abs() < 1e-6);
        assert!((net.layers()[1].weights()[0] - 1.4).abs() < 1e-6);
    }

    #[test]
    fn backward_matches_numeric_gradients() {
        let topo = [
            (2, Activation::Identity),
            (3, Activation::FastSigmoid),
            (2, Activation::Identity),
        ];
        let mut net = Network::new_with_seed(&topo, 0).unwrap();
        let input = [0.3_f32, -0.7_f32];
        let target = [0.2_f32, -0.1_f32];

        // Analytic gradient of a parameter = its change under lr = 1, negated.
        let before = params(&net);
        let mut stepped = net.clone();
        stepped.forward(&input).unwrap();
        stepped.backward(&target, 1.0).unwrap();
        let after = params(&stepped);

        let eps = 1e-3_f32;
        let loss_at = |net: &mut Network| {
            net.forward(&input).unwrap();
            net.error(&target).unwrap()
        };

        for idx in 1..net.num_layers() {
            // The fast sigmoid derivative is not the true slope of its value,
            // so only check layers whose upstream path is exact.
            if idx == 1 {
                continue;
            }
            for p in 0..before[idx].0.len() {
                let orig = net.layer_mut(idx).weights_mut()[p];
                net.layer_mut(idx).weights_mut()[p] = orig + eps;
                let plus = loss_at(&mut net);
                net.layer_mut(idx).weights_mut()[p] = orig - eps;
                let minus = loss_at(&mut net);
                net.layer_mut(idx).weights_mut()[p] = orig;

                let numeric = (plus - minus) / (2.0 * eps);
                let analytic = before[idx].0[p] - after[idx].0[p];
                assert_close(analytic, numeric, 1e-3, 1e-2);
            }
            for p in 0..before[idx].1.len() {
                let orig = net.layer_mut(idx).biases_mut()[p];
                net.layer_mut(idx).biases_mut()[p] = orig + eps;
                let plus = loss_at(&mut net);
                net.layer_mut(idx).biases_mut()[p] = orig - eps;
                let minus = loss_at(&mut net);
                net.layer_mut(idx).biases_mut()[p] = orig;

                let numeric = (plus - minus) / (2.0 * eps);
                let analytic = before[idx].1[p] - after[idx].1[p];
                assert_close(analytic, numeric, 1e-3, 1e-2);
            }
        }
    }

    #[test]
    fn relu_network_gradients_match_numeric() {
        let topo = [
            (2, Activation::Identity),
            (4, Activation::ReLU),
            (2, Activation::Identity),
        ];
        let mut net = Network::new_with_seed(&topo, 3).unwrap();
        let input = [0.8_f32, -0.4_f32];
        let target = [0.5_f32, 0.25_f32];

        let before = params(&net);
        let mut stepped = net.clone();
        stepped.forward(&input).unwrap();
        stepped.backward(&target, 1.0).unwrap();
        let after = params(&stepped);

        let eps = 1e-3_f32;
        for idx in 1..net.num_layers() {
            for p in 0..before[idx].0.len() {
                let orig = net.layer_mut(idx).weights_mut()[p];
                net.layer_mut(idx).weights_mut()[p] = orig + eps;
                net.forward(&input).unwrap();
                let plus = net.error(&target).unwrap();
                net.layer_mut(idx).weights_mut()[p] = orig - eps;
                net.forward(&input).unwrap();
                let minus = net.error(&target).unwrap();
                net.layer_mut(idx).weights_mut()[p] = orig;

                let numeric = (plus - minus) / (2.0 * eps);
                let analytic = before[idx].0[p] - after[idx].0[p];
                assert_close(analytic, numeric, 1e-3, 1e-2);
            }
        }
    }

    #[test]
    fn predict_returns_a_snapshot() {
        let mut net = linear(0.5, 0.0);
        let first = net.predict(&[2.0]).unwrap();
        net.backward(&[3.0], 0.1).unwrap();
        net.forward(&[2.0]).unwrap();

        assert_eq!(first, vec![1.0]);
        assert_ne!(net.output(), first.as_slice());
    }

    #[test]
    fn display_lists_every_layer() {
        let mut net = linear(1.0, 0.0);
        net.forward(&[2.0]).unwrap();
        let dump = net.to_string();
        assert_eq!(dump.lines().count(), 2);
        assert!(dump.starts_with("layer 0 (1, identity): 2.000000"));
        assert!(dump.contains("layer 1 (1, identity): 2.000000"));
    }
}
