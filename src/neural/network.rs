//! Feed-forward network: forward pass, back-propagation and mini-batch SGD.

use super::activation::ActivationKind;
use super::data::{column, Sample};
use super::layer::{GradientMode, Layer};
use crate::error::{Error, Result};
use crate::training::TrainingReport;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Width and activation of one layer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerShape {
    pub neurons: usize,
    pub activation: ActivationKind,
}

/// Shape of a network, independent of its parameter values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub inputs: usize,
    pub layers: Vec<LayerShape>,
}

impl Topology {
    pub fn new(inputs: usize) -> Self {
        Self {
            inputs,
            layers: Vec::new(),
        }
    }

    /// Append a layer (builder style)
    pub fn layer(mut self, neurons: usize, activation: ActivationKind) -> Self {
        self.layers.push(LayerShape {
            neurons,
            activation,
        });
        self
    }

    pub fn outputs(&self) -> usize {
        self.layers.last().map_or(self.inputs, |l| l.neurons)
    }

    /// `(outputs, inputs)` of every layer in order
    pub fn layer_dims(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut prev = self.inputs;
        self.layers.iter().map(move |l| {
            let dims = (l.neurons, prev);
            prev = l.neurons;
            dims
        })
    }

    pub fn weight_count(&self) -> usize {
        self.layer_dims().map(|(o, i)| o * i).sum()
    }

    pub fn bias_count(&self) -> usize {
        self.layers.iter().map(|l| l.neurons).sum()
    }

    /// Total number of parameters (weights + biases)
    pub fn parameter_count(&self) -> usize {
        self.weight_count() + self.bias_count()
    }

    pub fn validate(&self) -> Result<()> {
        if self.inputs == 0 {
            return Err(Error::InvalidParameter(
                "topology needs at least one input".to_string(),
            ));
        }
        if self.layers.is_empty() {
            return Err(Error::InvalidParameter(
                "topology needs at least one layer".to_string(),
            ));
        }
        if let Some(i) = self.layers.iter().position(|l| l.neurons == 0) {
            return Err(Error::InvalidParameter(format!("layer {} has no neurons", i)));
        }
        Ok(())
    }
}

/// Ordered stack of dense layers
#[derive(Clone, Debug)]
pub struct Network {
    input_size: usize,
    layers: Vec<Layer>,
    gradient_mode: GradientMode,
    report: Option<TrainingReport>,
}

impl Network {
    /// Empty network accepting `input_size` inputs
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            layers: Vec::new(),
            gradient_mode: GradientMode::default(),
            report: None,
        }
    }

    /// Network with freshly initialised layers for `topology`
    pub fn random<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Result<Self> {
        topology.validate()?;
        let mut net = Self::new(topology.inputs);
        for (shape, (outputs, inputs)) in topology.layers.iter().zip(topology.layer_dims()) {
            net.add_layer(Layer::new(rng, inputs, outputs, shape.activation))?;
        }
        Ok(net)
    }

    /// Append a layer; its input width must match the current output width
    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        let expected = self.output_size();
        if layer.inputs() != expected {
            return Err(Error::len("layer input width", expected, layer.inputs()));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Width of the last layer (the input size while there are no layers)
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, Layer::outputs)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn gradient_mode(&self) -> GradientMode {
        self.gradient_mode
    }

    pub fn set_gradient_mode(&mut self, mode: GradientMode) {
        self.gradient_mode = mode;
    }

    pub fn topology(&self) -> Topology {
        Topology {
            inputs: self.input_size,
            layers: self
                .layers
                .iter()
                .map(|l| LayerShape {
                    neurons: l.outputs(),
                    activation: l.activation_kind(),
                })
                .collect(),
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Layer::parameter_count).sum()
    }

    /// Check if network is valid (no NaN/Inf)
    pub fn is_valid(&self) -> bool {
        self.layers.iter().all(Layer::is_valid)
    }

    fn ensure_layers(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::InvalidParameter(
                "network has no layers".to_string(),
            ));
        }
        Ok(())
    }

    /// Forward pass through every layer, refreshing their caches
    pub fn feedforward(&mut self, input: &Array2<f32>) -> Result<Array2<f32>> {
        self.ensure_layers()?;
        self.layers
            .iter_mut()
            .try_fold(input.clone(), |a, layer| layer.forward(&a))
    }

    /// Cache-free forward pass
    pub fn evaluate(&self, input: &Array2<f32>) -> Result<Array2<f32>> {
        self.ensure_layers()?;
        self.layers
            .iter()
            .try_fold(input.clone(), |a, layer| layer.evaluate(&a))
    }

    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        Ok(self.evaluate(&column(input))?.into_iter().collect())
    }

    /// Compute every layer's gradient for one sample and fold it into the
    /// layer accumulators according to the gradient mode. Returns the output.
    pub fn backpropagate(
        &mut self,
        input: &Array2<f32>,
        target: &Array2<f32>,
    ) -> Result<Array2<f32>> {
        let output = self.feedforward(input)?;
        if target.dim() != output.dim() {
            return Err(Error::dims("target", output.dim(), target.dim()));
        }
        let cost = &output - target;

        let last = self.layers.len() - 1;
        let mut delta = self.layers[last].output_error(&cost)?;
        // ΔW of the output layer uses its cached input, which is the previous
        // layer's activation (or the network input for a single layer)
        self.layers[last].set_gradient(&delta)?;

        for i in (0..last).rev() {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            delta = head[i].propagate_error(&delta, &tail[0])?;
        }

        let mode = self.gradient_mode;
        for layer in &mut self.layers {
            layer.accumulate_gradient(mode);
        }
        Ok(output)
    }

    /// One gradient step over `batch`
    pub fn update_mini_batch(&mut self, batch: &[Sample], learning_rate: f32) -> Result<()> {
        if batch.is_empty() {
            return Err(Error::InvalidParameter("mini-batch is empty".to_string()));
        }
        for layer in &mut self.layers {
            layer.reset_accumulator();
        }
        for sample in batch {
            self.backpropagate(&sample.input, &sample.target)?;
        }
        for layer in &mut self.layers {
            layer.apply_update(batch.len(), learning_rate)?;
        }
        Ok(())
    }

    /// Shuffle `data` in place and run one pass of mini-batch updates over it
    pub fn train_epoch<R: Rng + ?Sized>(
        &mut self,
        data: &mut [Sample],
        batch_size: usize,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<()> {
        if batch_size == 0 {
            return Err(Error::InvalidParameter(
                "batch size must be greater than zero".to_string(),
            ));
        }
        data.shuffle(rng);
        for batch in data.chunks(batch_size) {
            self.update_mini_batch(batch, learning_rate)?;
        }
        Ok(())
    }

    /// Mini-batch stochastic gradient descent. Returns the MSE after each epoch.
    pub fn stochastic_gradient_descent<R: Rng + ?Sized>(
        &mut self,
        data: &[Sample],
        epochs: usize,
        batch_size: usize,
        learning_rate: f32,
        rng: &mut R,
    ) -> Result<Vec<f32>> {
        let mut shuffled = data.to_vec();
        let mut history = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            self.train_epoch(&mut shuffled, batch_size, learning_rate, rng)?;
            let mse = self.mean_squared_error(data)?;
            log::debug!("SGD epoch {}: mse={:.6}", epoch + 1, mse);
            history.push(mse);
        }

        Ok(history)
    }

    /// Mean over samples of the per-output mean squared error
    pub fn mean_squared_error(&self, data: &[Sample]) -> Result<f32> {
        if data.is_empty() {
            return Err(Error::InvalidParameter("no samples to evaluate".to_string()));
        }
        let mut total = 0.0;
        for sample in data {
            let output = self.evaluate(&sample.input)?;
            if output.dim() != sample.target.dim() {
                return Err(Error::dims("target", output.dim(), sample.target.dim()));
            }
            total += (&output - &sample.target).mapv(|e| e * e).mean().unwrap_or(0.0);
        }
        Ok(total / data.len() as f32)
    }

    /// Report of the most recent `train_net` call
    pub fn training_report(&self) -> Result<&TrainingReport> {
        self.report
            .as_ref()
            .ok_or_else(|| Error::NotTrained("network has not been trained".to_string()))
    }

    pub(crate) fn set_report(&mut self, report: TrainingReport) {
        self.report = Some(report);
    }
}
