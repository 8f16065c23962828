use log::{debug, info, trace, warn};

use crate::{Error, Network, Result, SampleSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 1e-3,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Summary of one pass over the sample source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    /// Zero-based epoch index.
    pub epoch: usize,
    /// Number of samples seen. `0` means the source was empty.
    pub samples: usize,
    /// Mean squared error over the epoch, or `0.0` when `samples == 0`.
    pub mean_error: f32,
}

impl EpochReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainReport {
    pub epochs: Vec<EpochReport>,
}

impl TrainReport {
    /// Mean error of the last epoch.
    pub fn final_error(&self) -> Option<f32> {
        self.epochs.last().map(|e| e.mean_error)
    }
}

impl Network {
    /// One online training step.
    ///
    /// Runs a forward pass over `input`, measures the squared error against
    /// `target`, then backpropagates and updates the parameters. Returns the
    /// error measured before the update.
    pub fn step(&mut self, input: &[f32], target: &[f32], lr: f32) -> Result<f32> {
        self.forward(input)?;
        let err = self.error(target)?;
        self.backward(target, lr)?;
        Ok(err)
    }

    /// Trains the network to reconstruct its own input, logging each epoch.
    ///
    /// See [`Network::train_with`].
    pub fn train<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
        cfg: TrainConfig,
    ) -> Result<TrainReport> {
        self.train_with(source, cfg, |report| {
            info!(
                "epoch {}: mean error {} over {} samples",
                report.epoch, report.mean_error, report.samples
            );
        })
    }

    /// Trains the network to reconstruct its own input.
    ///
    /// Every epoch restarts `source` and runs [`Network::step`] with each sample
    /// as both input and target. `on_epoch` receives the report at the end of
    /// every epoch.
    ///
    /// A failing source aborts training with its error; the parameters keep
    /// whatever the last completed step produced.
    pub fn train_with<S, F>(
        &mut self,
        source: &mut S,
        cfg: TrainConfig,
        mut on_epoch: F,
    ) -> Result<TrainReport>
    where
        S: SampleSource + ?Sized,
        F: FnMut(&EpochReport),
    {
        cfg.validate()?;
        if self.input_dim() != self.output_dim() {
            return Err(Error::InvalidConfig(format!(
                "self-reconstruction needs input_dim == output_dim, got {} and {}",
                self.input_dim(),
                self.output_dim()
            )));
        }

        debug!(
            "training for {} epochs with learning rate {}",
            cfg.epochs, cfg.learning_rate
        );

        // `epochs` is unbounded, so the report grows as epochs complete.
        let mut report = TrainReport::default();

        for epoch in 0..cfg.epochs {
            let mut total = 0.0_f32;
            let mut count = 0_usize;

            for sample in source.samples()? {
                let sample = sample?;
                let err = self.step(&sample, &sample, cfg.learning_rate)?;
                trace!("epoch {epoch} sample {count}: error {err}");
                total += err;
                count += 1;
            }

            let mean_error = if count == 0 {
                warn!("epoch {epoch}: sample source yielded no samples");
                0.0
            } else {
                total / count as f32
            };

            let epoch_report = EpochReport {
                epoch,
                samples: count,
                mean_error,
            };
            on_epoch(&epoch_report);
            report.epochs.push(epoch_report);
        }

        Ok(report)
    }
}
