//! Network builder.
//!
//! `NetworkBuilder` makes the topology explicit (layer sizes + activations)
//! and picks a bounded uniform weight initializer per activation:
//!
//! - `identity` / `fast sigmoid`: Xavier/Glorot
//! - `relu` / `leaky relu`: He/Kaiming
//!
//! Biases start at zero unless another [`Init`] is given.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Error, Init, Layer, Network, Result};

#[derive(Debug, Clone, Copy)]
struct LayerSpec {
    size: usize,
    activation: Activation,
}

#[derive(Debug, Clone)]
/// Builder for a `Network`.
///
/// Example:
///
/// ```rust
/// use rust_ffnn::{Activation, NetworkBuilder};
///
/// # fn main() -> rust_ffnn::Result<()> {
/// let net = NetworkBuilder::new(4)?
///     .add_layer(8, Activation::ReLU)?
///     .add_layer(4, Activation::Identity)?
///     .build_with_seed(0)?;
/// assert_eq!(net.num_layers(), 3);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    input_size: usize,
    layers: Vec<LayerSpec>,
    weight_init: Option<Init>,
    bias_init: Init,
}

impl NetworkBuilder {
    /// Start building a network that accepts inputs of length `input_size`.
    pub fn new(input_size: usize) -> Result<Self> {
        if input_size == 0 {
            return Err(Error::InvalidConfig("input size must be > 0".to_owned()));
        }
        Ok(Self {
            input_size,
            layers: Vec::new(),
            weight_init: None,
            bias_init: Init::Zeros,
        })
    }

    /// Convenience constructor from `(size, activation)` pairs.
    ///
    /// The first pair is the input layer; its activation is ignored since the
    /// input layer only passes values through.
    pub fn from_topology(topology: &[(usize, Activation)]) -> Result<Self> {
        if topology.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "topology needs at least 2 layers, got {}",
                topology.len()
            )));
        }

        let mut b = Self::new(topology[0].0)?;
        for &(size, activation) in &topology[1..] {
            b = b.add_layer(size, activation)?;
        }
        Ok(b)
    }

    /// Add a dense layer with `size` neurons.
    pub fn add_layer(mut self, size: usize, activation: Activation) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig("layer size must be > 0".to_owned()));
        }
        self.layers.push(LayerSpec { size, activation });
        Ok(self)
    }

    /// Use `init` for every layer's weights instead of the per-activation default.
    pub fn weight_init(mut self, init: Init) -> Result<Self> {
        init.validate()?;
        self.weight_init = Some(init);
        Ok(self)
    }

    pub fn bias_init(mut self, init: Init) -> Result<Self> {
        init.validate()?;
        self.bias_init = init;
        Ok(self)
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        if self.layers.is_empty() {
            return Err(Error::InvalidConfig(
                "network needs at least one layer after the input".to_owned(),
            ));
        }

        debug!(
            "building network: input={} layers={:?}",
            self.input_size, self.layers
        );

        let mut layers = Vec::with_capacity(self.layers.len() + 1);
        layers.push(Layer::input(self.input_size)?);

        let mut in_dim = self.input_size;
        for spec in self.layers {
            let init = self
                .weight_init
                .unwrap_or_else(|| default_init_for_activation(spec.activation));
            let layer =
                Layer::new_with_rng(in_dim, spec.size, spec.activation, init, self.bias_init, rng)?;
            layers.push(layer);
            in_dim = spec.size;
        }

        Network::from_layers(layers)
    }
}

#[inline]
fn default_init_for_activation(act: Activation) -> Init {
    match act {
        Activation::Identity | Activation::FastSigmoid => Init::Xavier,
        Activation::ReLU | Activation::LeakyReLU => Init::He,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_topologies() {
        assert!(NetworkBuilder::new(0).is_err());
        assert!(NetworkBuilder::from_topology(&[(3, Activation::ReLU)]).is_err());
        let zero_width = [(3, Activation::ReLU), (0, Activation::ReLU)];
        assert!(NetworkBuilder::from_topology(&zero_width).is_err());
        assert!(NetworkBuilder::new(3).unwrap().build_with_seed(0).is_err());
    }

    #[test]
    fn uniform_init_wider_than_f32_is_rejected() {
        let wide = Init::Uniform {
            low: -3.0e38,
            high: 3.0e38,
        };
        let builder = NetworkBuilder::new(2).unwrap();
        assert!(matches!(builder.weight_init(wide), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn builds_layers_in_order() {
        let net = NetworkBuilder::from_topology(&[
            (4, Activation::ReLU),
            (8, Activation::LeakyReLU),
            (4, Activation::FastSigmoid),
        ])
        .unwrap()
        .build_with_seed(1)
        .unwrap();

        let sizes: Vec<_> = net.layers().iter().map(Layer::size).collect();
        assert_eq!(sizes, vec![4, 8, 4]);
        assert_eq!(net.layers()[0].activation(), Activation::Identity);
        assert_eq!(net.layers()[1].activation(), Activation::LeakyReLU);
        assert_eq!(net.layers()[2].weights().len(), 32);
        assert!(net.layers()[1].biases().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn custom_inits_are_applied() {
        let init = Init::Uniform { low: 0.1, high: 1.0 };
        let net = NetworkBuilder::new(2)
            .unwrap()
            .add_layer(3, Activation::ReLU)
            .unwrap()
            .weight_init(init)
            .unwrap()
            .bias_init(init)
            .unwrap()
            .build_with_seed(4)
            .unwrap();

        let layer = &net.layers()[1];
        assert!(layer.weights().iter().all(|w| (0.1..1.0).contains(w)));
        assert!(layer.biases().iter().all(|b| (0.1..1.0).contains(b)));

        assert!(
            NetworkBuilder::new(2)
                .unwrap()
                .weight_init(Init::Uniform { low: 1.0, high: 0.0 })
                .is_err()
        );
    }
}
