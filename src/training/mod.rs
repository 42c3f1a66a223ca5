//! Training strategies behind a common [`Trainer`] interface.
//!
//! - [`Perceptron`] and [`Adaline`]: delta-rule training of a single-output, single-layer network
//! - [`BackPropagation`]: mini-batch SGD over any stack of differentiable layers

mod backprop;
mod delta_rule;

pub use backprop::BackPropagation;
pub use delta_rule::{Adaline, Perceptron};

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::neural::{Network, TrainingSet};
use ndarray::Array2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Which algorithm `Network::train_net` dispatches to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingKind {
    Perceptron,
    Adaline,
    BackPropagation,
}

impl TrainingKind {
    /// Build the trainer for this kind from the training hyperparameters
    pub fn trainer(self, config: &TrainingConfig) -> Box<dyn Trainer> {
        match self {
            Self::Perceptron => Box::new(Perceptron::from_config(config)),
            Self::Adaline => Box::new(Adaline::from_config(config)),
            Self::BackPropagation => Box::new(BackPropagation::from_config(config)),
        }
    }
}

/// Why a training run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every epoch up to `max_epochs` was run
    EpochLimit,
    /// Epoch error fell to the target error
    Converged,
}

/// Outcome of one training run
#[derive(Clone, Debug)]
pub struct TrainingReport {
    pub kind: TrainingKind,
    pub epochs_run: usize,
    /// Mean squared error of each epoch
    pub mse_history: Vec<f32>,
    /// Error of the last processed sample (delta rule) or last epoch MSE (back-propagation)
    pub training_error: f32,
    /// Network output for every training row after training, one row per sample
    pub outputs: Array2<f32>,
    pub stop: StopReason,
}

impl TrainingReport {
    pub fn final_mse(&self) -> Option<f32> {
        self.mse_history.last().copied()
    }
}

/// A training algorithm. Trainers hold only hyperparameters; all learned
/// state lives in the network they are given.
pub trait Trainer {
    fn kind(&self) -> TrainingKind;

    fn train(
        &self,
        network: &mut Network,
        data: &TrainingSet,
        rng: &mut dyn RngCore,
    ) -> Result<TrainingReport>;
}

impl Network {
    /// Train with the algorithm selected by `config.kind` and keep the report
    pub fn train_net(
        &mut self,
        config: &TrainingConfig,
        data: &TrainingSet,
        rng: &mut dyn RngCore,
    ) -> Result<&TrainingReport> {
        config.validate()?;
        self.set_gradient_mode(config.gradient_mode);

        let trainer = config.kind.trainer(config);
        let report = trainer.train(self, data, rng)?;
        log::info!(
            "{:?} training finished after {} epochs ({:?}), error={:.6}",
            report.kind,
            report.epochs_run,
            report.stop,
            report.training_error
        );

        self.set_report(report);
        self.training_report()
    }
}

/// Cache-free outputs of `network` for every row of `data`
pub(crate) fn outputs_for(network: &Network, data: &TrainingSet) -> Result<Array2<f32>> {
    let mut outputs = Array2::zeros((data.rows(), network.output_size()));
    for (i, sample) in data.samples().iter().enumerate() {
        let out = network.evaluate(&sample.input)?;
        outputs.row_mut(i).assign(&out.column(0));
    }
    Ok(outputs)
}
