//! Multi-layer error back-propagation trained by mini-batch SGD.

use super::{outputs_for, StopReason, Trainer, TrainingKind, TrainingReport};
use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::neural::{Network, TrainingSet};
use rand::RngCore;

#[derive(Clone, Debug, PartialEq)]
pub struct BackPropagation {
    pub learning_rate: f32,
    /// Stop once an epoch's MSE is at or below this value
    pub target_error: f32,
    pub max_epochs: usize,
    pub batch_size: usize,
    pub log_interval: usize,
}

impl BackPropagation {
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            target_error: config.target_error,
            max_epochs: config.max_epochs,
            batch_size: config.batch_size,
            log_interval: config.log_interval,
        }
    }
}

impl Trainer for BackPropagation {
    fn kind(&self) -> TrainingKind {
        TrainingKind::BackPropagation
    }

    fn train(
        &self,
        network: &mut Network,
        data: &TrainingSet,
        rng: &mut dyn RngCore,
    ) -> Result<TrainingReport> {
        if data.input_width() != network.input_size() {
            return Err(Error::len(
                "training inputs",
                network.input_size(),
                data.input_width(),
            ));
        }
        if data.target_width() != network.output_size() {
            return Err(Error::len(
                "training targets",
                network.output_size(),
                data.target_width(),
            ));
        }

        let samples = data.samples();
        let mut order = samples.clone();
        let mut mse_history = Vec::new();
        let mut stop = StopReason::EpochLimit;

        for epoch in 0..self.max_epochs {
            network.train_epoch(&mut order, self.batch_size, self.learning_rate, rng)?;
            let mse = network.mean_squared_error(&samples)?;
            mse_history.push(mse);

            if !mse.is_finite() {
                log::warn!("back-propagation diverged at epoch {} (mse={})", epoch + 1, mse);
            }
            if self.log_interval > 0 && (epoch + 1) % self.log_interval == 0 {
                log::info!("back-propagation epoch {}/{}: mse={:.6}", epoch + 1, self.max_epochs, mse);
            }
            if mse <= self.target_error {
                log::debug!("back-propagation converged at epoch {}", epoch + 1);
                stop = StopReason::Converged;
                break;
            }
        }

        Ok(TrainingReport {
            kind: TrainingKind::BackPropagation,
            epochs_run: mse_history.len(),
            training_error: mse_history.last().copied().unwrap_or(f32::NAN),
            mse_history,
            outputs: outputs_for(network, data)?,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::{ActivationKind, Sample, Topology};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn linear_data() -> TrainingSet {
        let samples: Vec<Sample> = (0..6)
            .map(|i| {
                let x = i as f32 / 5.0;
                Sample::new(&[x], &[0.5 - x])
            })
            .collect();
        TrainingSet::from_samples(&samples).unwrap()
    }

    fn trainer(target_error: f32, max_epochs: usize) -> BackPropagation {
        BackPropagation {
            learning_rate: 0.5,
            target_error,
            max_epochs,
            batch_size: 2,
            log_interval: 0,
        }
    }

    #[test]
    fn test_stops_when_converged() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let topology = Topology::new(1).layer(1, ActivationKind::Linear);
        let mut net = Network::random(&topology, &mut rng).unwrap();

        let report = trainer(1e-4, 5_000).train(&mut net, &linear_data(), &mut rng).unwrap();

        assert_eq!(report.stop, StopReason::Converged);
        assert!(report.epochs_run < 5_000);
        assert!(report.training_error <= 1e-4);
        assert_eq!(report.mse_history.len(), report.epochs_run);
    }

    #[test]
    fn test_learns_xor() {
        let data = TrainingSet::from_samples(&[
            Sample::new(&[0.0, 0.0], &[0.0]),
            Sample::new(&[0.0, 1.0], &[1.0]),
            Sample::new(&[1.0, 0.0], &[1.0]),
            Sample::new(&[1.0, 1.0], &[0.0]),
        ])
        .unwrap();
        let topology = Topology::new(2)
            .layer(3, ActivationKind::Sigmoid)
            .layer(1, ActivationKind::Sigmoid);
        let trainer = BackPropagation {
            learning_rate: 3.0,
            target_error: 1e-3,
            max_epochs: 3_000,
            batch_size: 1,
            log_interval: 0,
        };

        // A 2-3-1 net occasionally lands in a local minimum; one of a few seeds must solve it
        let errors: Vec<f32> = (0..5)
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut net = Network::random(&topology, &mut rng).unwrap();
                trainer.train(&mut net, &data, &mut rng).unwrap().training_error
            })
            .collect();
        assert!(errors.iter().any(|&e| e < 0.05), "xor errors {:?}", errors);
    }

    #[test]
    fn test_runs_to_epoch_limit() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let topology = Topology::new(1).layer(1, ActivationKind::Linear);
        let mut net = Network::random(&topology, &mut rng).unwrap();

        let report = trainer(0.0, 3).train(&mut net, &linear_data(), &mut rng).unwrap();

        assert_eq!(report.stop, StopReason::EpochLimit);
        assert_eq!(report.epochs_run, 3);
    }

    #[test]
    fn test_rejects_target_width_mismatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let topology = Topology::new(1).layer(2, ActivationKind::Linear);
        let mut net = Network::random(&topology, &mut rng).unwrap();

        let result = trainer(0.0, 3).train(&mut net, &linear_data(), &mut rng);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_step_output_is_unsupported() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let topology = Topology::new(1).layer(1, ActivationKind::Step);
        let mut net = Network::random(&topology, &mut rng).unwrap();

        let result = trainer(0.0, 3).train(&mut net, &linear_data(), &mut rng);
        assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
    }
}
