//! Run configuration for the `rust-ffnn` binary.
//!
//! Values come from environment variables:
//!
//! | key             | default               |
//! |-----------------|-----------------------|
//! | `DATA_PATH`     | required              |
//! | `TOPOLOGY`      | `4:relu,8:relu,4:relu` |
//! | `EPOCHS`        | `100`                 |
//! | `LEARNING_RATE` | `0.001`               |
//! | `SEED`          | `0`                   |
//! | `PREDICT`       | unset                 |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Activation, Error, Result, TrainConfig};

pub const DEFAULT_TOPOLOGY: &str = "4:relu,8:relu,4:relu";

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub topology: Vec<(usize, Activation)>,
    pub train: TrainConfig,
    pub seed: u64,
    /// Input to run through the trained network, if any.
    pub predict: Option<Vec<f32>>,
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_path = lookup("DATA_PATH")
            .map(PathBuf::from)
            .ok_or_else(|| Error::InvalidConfig("DATA_PATH is not set".to_owned()))?;

        let topology = parse_topology(lookup("TOPOLOGY").as_deref().unwrap_or(DEFAULT_TOPOLOGY))?;

        let defaults = TrainConfig::default();
        let train = TrainConfig {
            epochs: parse_or("EPOCHS", lookup("EPOCHS"), defaults.epochs)?,
            learning_rate: parse_or(
                "LEARNING_RATE",
                lookup("LEARNING_RATE"),
                defaults.learning_rate,
            )?,
        };
        train.validate()?;

        let seed = parse_or("SEED", lookup("SEED"), 0)?;
        let predict = lookup("PREDICT").map(|v| parse_values(&v)).transpose()?;
        if let Some(input) = &predict {
            let width = topology[0].0;
            if input.len() != width {
                return Err(Error::InvalidConfig(format!(
                    "PREDICT has {} values, the input layer takes {width}",
                    input.len()
                )));
            }
        }

        Ok(Self {
            data_path,
            topology,
            train,
            seed,
            predict,
        })
    }

    /// Width of the samples read from `data_path`.
    pub fn sample_width(&self) -> usize {
        self.topology[0].0
    }
}

/// Parses `size:activation` entries separated by commas, e.g. `4:relu,8:relu,4:identity`.
///
/// The activation may be omitted and defaults to `identity`.
pub fn parse_topology(s: &str) -> Result<Vec<(usize, Activation)>> {
    let mut topology = Vec::new();
    for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (size, act) = match entry.split_once(':') {
            Some((size, act)) => (size, act.parse::<Activation>()?),
            None => (entry, Activation::Identity),
        };
        let size = size.trim().parse::<usize>().map_err(|_| {
            Error::InvalidConfig(format!("invalid layer size in topology entry {entry:?}"))
        })?;
        if size == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer size must be > 0 in topology entry {entry:?}"
            )));
        }
        topology.push((size, act));
    }

    if topology.len() < 2 {
        return Err(Error::InvalidConfig(format!(
            "topology {s:?} needs at least 2 layers"
        )));
    }
    Ok(topology)
}

fn parse_values(s: &str) -> Result<Vec<f32>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<f32>()
                .map_err(|_| Error::InvalidConfig(format!("invalid number {v:?} in PREDICT")))
        })
        .collect()
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid value {v:?} for {key}"))),
    }
}
