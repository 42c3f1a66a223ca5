//! Delta-rule training for single-layer, single-output networks.
//!
//! The training matrix carries the bias as a constant input column, so the
//! layer's own bias is pinned to zero for the run. Training always runs for
//! `max_epochs`; there is no early stop on convergence.

use super::{outputs_for, StopReason, Trainer, TrainingKind, TrainingReport};
use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::neural::{ActivationKind, Network, TrainingSet};
use rand::RngCore;

#[derive(Clone, Copy, Debug, PartialEq)]
struct DeltaRuleParams {
    learning_rate: f32,
    target_error: f32,
    max_epochs: usize,
    log_interval: usize,
}

impl DeltaRuleParams {
    fn from_config(config: &TrainingConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            target_error: config.target_error,
            max_epochs: config.max_epochs,
            log_interval: config.log_interval,
        }
    }
}

/// Rosenblatt perceptron rule: `wⱼ += η·e·xⱼ`
#[derive(Clone, Debug, PartialEq)]
pub struct Perceptron {
    params: DeltaRuleParams,
}

impl Perceptron {
    pub fn new(learning_rate: f32, target_error: f32, max_epochs: usize) -> Self {
        Self {
            params: DeltaRuleParams {
                learning_rate,
                target_error,
                max_epochs,
                log_interval: 0,
            },
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            params: DeltaRuleParams::from_config(config),
        }
    }
}

impl Trainer for Perceptron {
    fn kind(&self) -> TrainingKind {
        TrainingKind::Perceptron
    }

    fn train(
        &self,
        network: &mut Network,
        data: &TrainingSet,
        _rng: &mut dyn RngCore,
    ) -> Result<TrainingReport> {
        train_delta_rule(network, data, &self.params, TrainingKind::Perceptron)
    }
}

/// Widrow–Hoff rule: `wⱼ += η·e·xⱼ·f'(net)`
#[derive(Clone, Debug, PartialEq)]
pub struct Adaline {
    params: DeltaRuleParams,
}

impl Adaline {
    pub fn new(learning_rate: f32, target_error: f32, max_epochs: usize) -> Self {
        Self {
            params: DeltaRuleParams {
                learning_rate,
                target_error,
                max_epochs,
                log_interval: 0,
            },
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            params: DeltaRuleParams::from_config(config),
        }
    }
}

impl Trainer for Adaline {
    fn kind(&self) -> TrainingKind {
        TrainingKind::Adaline
    }

    fn train(
        &self,
        network: &mut Network,
        data: &TrainingSet,
        _rng: &mut dyn RngCore,
    ) -> Result<TrainingReport> {
        train_delta_rule(network, data, &self.params, TrainingKind::Adaline)
    }
}

fn check_single_layer(network: &Network, data: &TrainingSet) -> Result<()> {
    let layers = network.layers();
    if layers.len() != 1 || layers[0].outputs() != 1 {
        return Err(Error::InvalidParameter(format!(
            "delta-rule training needs one layer with one output, got {} layer(s) and {} output(s)",
            layers.len(),
            network.output_size()
        )));
    }
    if data.input_width() != network.input_size() {
        return Err(Error::len(
            "training matrix columns",
            network.input_size(),
            data.input_width(),
        ));
    }
    if data.target_width() != 1 {
        return Err(Error::len("training targets", 1, data.target_width()));
    }
    Ok(())
}

fn train_delta_rule(
    network: &mut Network,
    data: &TrainingSet,
    params: &DeltaRuleParams,
    kind: TrainingKind,
) -> Result<TrainingReport> {
    check_single_layer(network, data)?;

    let layer = &mut network.layers_mut()[0];
    let activation: ActivationKind = layer.activation_kind();
    if kind == TrainingKind::Adaline {
        // fail before any weight moves
        activation.derivative_function()?;
    }
    if layer.bias().iter().any(|&b| b != 0.0) {
        log::warn!("delta-rule training zeroes the layer bias; use a constant input column instead");
        layer.bias_mut().fill(0.0);
    }

    let rows = data.rows();
    let targets = data.targets();
    let mut mse_history = Vec::with_capacity(params.max_epochs);
    let mut error = 0.0;

    for epoch in 0..params.max_epochs {
        let mut squared = 0.0;

        for i in 0..rows {
            let sample = data.input_row(i);
            let net_value = layer.weights().row(0).dot(&sample);
            let estimated = activation.activate(net_value);
            error = targets[[i, 0]] - estimated;
            squared += error * error;

            if error.abs() > params.target_error {
                let slope = match kind {
                    TrainingKind::Adaline => activation.derivative(net_value)?,
                    _ => 1.0,
                };
                layer
                    .weights_mut()
                    .row_mut(0)
                    .scaled_add(params.learning_rate * error * slope, &sample);
            }
        }

        let mse = squared / rows as f32;
        mse_history.push(mse);
        log::debug!("{:?} epoch {}: mse={:.6}", kind, epoch + 1, mse);
        if params.log_interval > 0 && (epoch + 1) % params.log_interval == 0 {
            log::info!("{:?} epoch {}/{}: mse={:.6}", kind, epoch + 1, params.max_epochs, mse);
        }
    }

    Ok(TrainingReport {
        kind,
        epochs_run: params.max_epochs,
        mse_history,
        training_error: error,
        outputs: outputs_for(network, data)?,
        stop: StopReason::EpochLimit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::Layer;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // Two logical inputs plus the constant bias column in front
    fn and_gate() -> TrainingSet {
        TrainingSet::from_rows(
            3,
            vec![
                1.0, 0.0, 0.0, //
                1.0, 0.0, 1.0, //
                1.0, 1.0, 0.0, //
                1.0, 1.0, 1.0,
            ],
            vec![0.0, 0.0, 0.0, 1.0],
        )
        .unwrap()
    }

    fn single_layer(weights: Array2<f32>, activation: ActivationKind) -> Network {
        let outputs = weights.nrows();
        let mut net = Network::new(weights.ncols());
        net.add_layer(Layer::from_parts(weights, Array2::zeros((outputs, 1)), activation).unwrap())
            .unwrap();
        net
    }

    #[test]
    fn test_perceptron_and_gate_from_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut net = single_layer(Array2::zeros((1, 3)), ActivationKind::Step);

        let report = Perceptron::new(1.0, 0.002, 10)
            .train(&mut net, &and_gate(), &mut rng)
            .unwrap();

        assert_eq!(net.layers()[0].weights(), &array![[-3.0, 2.0, 1.0]]);
        assert_eq!(report.outputs.column(0).to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(*report.mse_history.last().unwrap(), 0.0);
    }

    #[test]
    fn test_runs_every_epoch_without_early_stop() {
        // Converges within a few epochs, yet all epochs still run
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut net = single_layer(Array2::zeros((1, 3)), ActivationKind::Step);

        let report = Perceptron::new(1.0, 0.002, 25)
            .train(&mut net, &and_gate(), &mut rng)
            .unwrap();

        assert_eq!(report.epochs_run, 25);
        assert_eq!(report.mse_history.len(), 25);
        assert_eq!(report.stop, StopReason::EpochLimit);
        assert_eq!(report.mse_history[24], 0.0);
    }

    #[test]
    fn test_zero_epochs_leaves_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut net = single_layer(array![[0.1, 0.2, 0.3]], ActivationKind::Step);

        let report = Perceptron::new(1.0, 0.002, 0)
            .train(&mut net, &and_gate(), &mut rng)
            .unwrap();

        assert_eq!(report.epochs_run, 0);
        assert!(report.mse_history.is_empty());
        assert_eq!(net.layers()[0].weights(), &array![[0.1, 0.2, 0.3]]);
    }

    #[test]
    fn test_adaline_reduces_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let data = TrainingSet::from_rows(
            4,
            vec![
                1.0, 0.98, 0.94, 0.95, //
                1.0, 0.60, 0.60, 0.85, //
                1.0, 0.35, 0.15, 0.15, //
                1.0, 0.25, 0.30, 0.98, //
                1.0, 0.75, 0.85, 0.91, //
                1.0, 0.43, 0.57, 0.87, //
                1.0, 0.05, 0.06, 0.01,
            ],
            vec![0.80, 0.59, 0.23, 0.45, 0.74, 0.63, 0.10],
        )
        .unwrap();
        let mut net = single_layer(Array2::zeros((1, 4)), ActivationKind::Linear);

        let report = Adaline::new(0.1, 0.0001, 200)
            .train(&mut net, &data, &mut rng)
            .unwrap();

        let first = report.mse_history[0];
        let last = report.final_mse().unwrap();
        assert!(last < first, "mse {} -> {}", first, last);
        assert!(last < 0.01, "final mse {}", last);
        for (out, target) in report.outputs.column(0).iter().zip(data.targets().column(0)) {
            assert!((out - target).abs() < 0.25);
        }
    }

    #[test]
    fn test_adaline_with_step_is_unsupported() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut net = single_layer(Array2::zeros((1, 3)), ActivationKind::Step);

        let result = Adaline::new(0.5, 0.0, 5).train(&mut net, &and_gate(), &mut rng);
        assert!(matches!(result, Err(Error::UnsupportedOperation(_))));
        assert_eq!(net.layers()[0].weights(), &Array2::<f32>::zeros((1, 3)));
    }

    #[test]
    fn test_bias_is_zeroed() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut net = Network::new(3);
        net.add_layer(Layer::new(&mut rng, 3, 1, ActivationKind::Step)).unwrap();

        Perceptron::new(1.0, 0.002, 1)
            .train(&mut net, &and_gate(), &mut rng)
            .unwrap();
        assert_relative_eq!(net.layers()[0].bias()[[0, 0]], 0.0);
    }

    #[test]
    fn test_rejects_multi_layer() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let topology = crate::neural::Topology::new(3)
            .layer(2, ActivationKind::Step)
            .layer(1, ActivationKind::Step);
        let mut net = Network::random(&topology, &mut rng).unwrap();

        let result = Perceptron::new(1.0, 0.0, 1).train(&mut net, &and_gate(), &mut rng);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_column_mismatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut net = single_layer(Array2::zeros((1, 2)), ActivationKind::Step);

        let result = Perceptron::new(1.0, 0.0, 1).train(&mut net, &and_gate(), &mut rng);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }
}
