//! A small dense feed-forward network trained online by backpropagation.
//!
//! `rust-ffnn` keeps every layer's state (weights, biases, pre-activation sums,
//! activations and sensitivities) inside the [`Network`] that owns it. Training
//! is plain per-sample gradient descent on the squared error
//! `E = 0.5 * sum((y - t)^2)`, and the default training loop uses each sample
//! as its own target (self-reconstruction).
//!
//! # Data layout and shapes
//!
//! - Scalars are `f32`.
//! - Layer 0 is a pass-through input layer with no parameters.
//! - Layer weights are row-major with shape `(size, in_dim)`.
//! - Shape mismatches at the API boundary return [`Error::InvalidShape`].
//!
//! # Quick start
//!
//! ```rust
//! use rust_ffnn::{Activation, NetworkBuilder, Samples, TrainConfig};
//!
//! # fn main() -> rust_ffnn::Result<()> {
//! let mut samples = Samples::from_rows(
//!     2,
//!     &[vec![0.1, 0.9], vec![0.8, 0.2], vec![0.5, 0.5]],
//! )?;
//!
//! let mut net = NetworkBuilder::new(2)?
//!     .add_layer(4, Activation::LeakyReLU)?
//!     .add_layer(2, Activation::Identity)?
//!     .build_with_seed(0)?;
//!
//! let report = net.train(
//!     &mut samples,
//!     TrainConfig {
//!         epochs: 50,
//!         learning_rate: 0.05,
//!     },
//! )?;
//! assert_eq!(report.epochs.len(), 50);
//!
//! let y = net.predict(&[0.1, 0.9])?;
//! assert_eq!(y.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Driving training yourself
//!
//! ```rust
//! use rust_ffnn::{Activation, Network};
//!
//! # fn main() -> rust_ffnn::Result<()> {
//! let mut net = Network::new_with_seed(
//!     &[(3, Activation::Identity), (5, Activation::ReLU), (3, Activation::Identity)],
//!     0,
//! )?;
//!
//! let x = [0.1_f32, -0.2, 0.3];
//! net.forward(&x)?;
//! let _err = net.error(&x)?;
//! net.backward(&x, 1e-2)?;
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub mod network;
pub mod train;

pub use activation::Activation;
pub use builder::NetworkBuilder;
pub use config::RunConfig;
pub use data::{LineFile, SampleSource, Samples};
pub use error::{Error, Result};
pub use layer::{Init, Layer};
pub use network::Network;
pub use train::{EpochReport, TrainConfig, TrainReport};
