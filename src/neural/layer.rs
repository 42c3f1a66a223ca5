//! Dense layer with the caches and gradient buffers used by back-propagation.

use super::activation::ActivationKind;
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::Rng;
use std::f32::consts::PI;

/// Bias value given to freshly created layers
pub const DEFAULT_BIAS: f32 = 1.0;

/// How the gradients of consecutive samples combine before a weight update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMode {
    /// Sum every sample's gradient; the update divides by the batch size
    #[default]
    Sum,
    /// Keep only the most recent sample's gradient
    LastSample,
}

/// How a new layer's bias is initialised
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BiasInit {
    Constant(f32),
    /// Standard normal draws, like the weights
    Gaussian,
}

impl Default for BiasInit {
    fn default() -> Self {
        Self::Constant(DEFAULT_BIAS)
    }
}

/// Values recorded by the most recent forward pass
#[derive(Clone, Debug)]
struct ForwardCache {
    input: Array2<f32>,
    z: Array2<f32>,
    a: Array2<f32>,
}

/// Fully connected layer: `a = f(W·x + b)`
#[derive(Clone, Debug)]
pub struct Layer {
    /// `outputs x inputs`
    weights: Array2<f32>,
    /// `outputs x 1`
    bias: Array2<f32>,
    activation: ActivationKind,
    cache: Option<ForwardCache>,
    weight_grad: Array2<f32>,
    bias_grad: Array2<f32>,
    weight_acc: Array2<f32>,
    bias_acc: Array2<f32>,
    accumulated: usize,
}

impl Layer {
    /// Layer with standard-normal weights and the default constant bias
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        inputs: usize,
        outputs: usize,
        activation: ActivationKind,
    ) -> Self {
        Self::with_bias_init(rng, inputs, outputs, activation, BiasInit::default())
    }

    pub fn with_bias_init<R: Rng + ?Sized>(
        rng: &mut R,
        inputs: usize,
        outputs: usize,
        activation: ActivationKind,
        bias_init: BiasInit,
    ) -> Self {
        let weights = Array2::from_shape_simple_fn((outputs, inputs), || box_muller(rng));
        let bias = match bias_init {
            BiasInit::Constant(value) => Array2::from_elem((outputs, 1), value),
            BiasInit::Gaussian => Array2::from_shape_simple_fn((outputs, 1), || box_muller(rng)),
        };
        Self::assemble(weights, bias, activation)
    }

    /// Layer from explicit parameters; `bias` must be `weights.nrows() x 1`
    pub fn from_parts(
        weights: Array2<f32>,
        bias: Array2<f32>,
        activation: ActivationKind,
    ) -> Result<Self> {
        if bias.dim() != (weights.nrows(), 1) {
            return Err(Error::dims("layer bias", (weights.nrows(), 1), bias.dim()));
        }
        Ok(Self::assemble(weights, bias, activation))
    }

    fn assemble(weights: Array2<f32>, bias: Array2<f32>, activation: ActivationKind) -> Self {
        Self {
            weight_grad: Array2::zeros(weights.dim()),
            bias_grad: Array2::zeros(bias.dim()),
            weight_acc: Array2::zeros(weights.dim()),
            bias_acc: Array2::zeros(bias.dim()),
            accumulated: 0,
            cache: None,
            weights,
            bias,
            activation,
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn activation_kind(&self) -> ActivationKind {
        self.activation
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn bias(&self) -> &Array2<f32> {
        &self.bias
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f32> {
        &mut self.weights
    }

    pub(crate) fn bias_mut(&mut self) -> &mut Array2<f32> {
        &mut self.bias
    }

    pub fn weight_grad(&self) -> &Array2<f32> {
        &self.weight_grad
    }

    pub fn bias_grad(&self) -> &Array2<f32> {
        &self.bias_grad
    }

    /// Number of samples folded into the pending update
    pub fn accumulated_samples(&self) -> usize {
        self.accumulated
    }

    /// Input of the last forward pass
    pub fn last_input(&self) -> Option<&Array2<f32>> {
        self.cache.as_ref().map(|c| &c.input)
    }

    /// Pre-activation `z` of the last forward pass
    pub fn pre_activation(&self) -> Option<&Array2<f32>> {
        self.cache.as_ref().map(|c| &c.z)
    }

    /// Activation `a` of the last forward pass
    pub fn activation(&self) -> Option<&Array2<f32>> {
        self.cache.as_ref().map(|c| &c.a)
    }

    fn check_input(&self, input: &Array2<f32>) -> Result<()> {
        if input.dim() != (self.inputs(), 1) {
            return Err(Error::dims("layer input", (self.inputs(), 1), input.dim()));
        }
        Ok(())
    }

    fn pre_activate(&self, input: &Array2<f32>) -> Array2<f32> {
        self.weights.dot(input) + &self.bias
    }

    /// Forward pass that leaves the caches untouched
    pub fn evaluate(&self, input: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_input(input)?;
        let f = self.activation.function();
        Ok(self.pre_activate(input).mapv_into(f))
    }

    /// Forward pass; overwrites the input, `z` and `a` caches
    pub fn forward(&mut self, input: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_input(input)?;
        let z = self.pre_activate(input);
        let a = z.mapv(self.activation.function());
        self.cache = Some(ForwardCache {
            input: input.clone(),
            z,
            a: a.clone(),
        });
        Ok(a)
    }

    fn cache(&self) -> Result<&ForwardCache> {
        self.cache.as_ref().ok_or(Error::MissingForwardPass)
    }

    /// `f'(z)` of the last forward pass
    fn activation_prime(&self) -> Result<Array2<f32>> {
        let derivative = self.activation.derivative_function()?;
        Ok(self.cache()?.z.mapv(derivative))
    }

    /// Output-layer delta: `cost ⊙ f'(z)`
    pub fn output_error(&self, cost: &Array2<f32>) -> Result<Array2<f32>> {
        let prime = self.activation_prime()?;
        if cost.dim() != prime.dim() {
            return Err(Error::dims("output cost", prime.dim(), cost.dim()));
        }
        Ok(cost * &prime)
    }

    /// Set the pending gradients from this layer's own delta
    pub fn set_gradient(&mut self, delta: &Array2<f32>) -> Result<()> {
        if delta.dim() != (self.outputs(), 1) {
            return Err(Error::dims("layer delta", (self.outputs(), 1), delta.dim()));
        }
        let weight_grad = delta.dot(&self.cache()?.input.t());
        self.weight_grad = weight_grad;
        self.bias_grad = delta.clone();
        Ok(())
    }

    /// Hidden-layer delta: `(Wₙₑₓₜᵀ · δₙₑₓₜ) ⊙ f'(z)`.
    ///
    /// Overwrites the pending gradients with this sample's contribution.
    pub fn propagate_error(
        &mut self,
        next_delta: &Array2<f32>,
        next_layer: &Layer,
    ) -> Result<Array2<f32>> {
        if next_layer.inputs() != self.outputs() {
            return Err(Error::len(
                "next layer inputs",
                self.outputs(),
                next_layer.inputs(),
            ));
        }
        if next_delta.dim() != (next_layer.outputs(), 1) {
            return Err(Error::dims(
                "next layer delta",
                (next_layer.outputs(), 1),
                next_delta.dim(),
            ));
        }

        let back = next_layer.weights.t().dot(next_delta);
        let delta = back * &self.activation_prime()?;
        self.set_gradient(&delta)?;
        Ok(delta)
    }

    /// Fold the pending gradients into the batch accumulator
    pub fn accumulate_gradient(&mut self, mode: GradientMode) {
        match mode {
            GradientMode::Sum => {
                self.weight_acc += &self.weight_grad;
                self.bias_acc += &self.bias_grad;
            }
            GradientMode::LastSample => {
                self.weight_acc.assign(&self.weight_grad);
                self.bias_acc.assign(&self.bias_grad);
            }
        }
        self.accumulated += 1;
    }

    pub fn reset_accumulator(&mut self) {
        self.weight_acc.fill(0.0);
        self.bias_acc.fill(0.0);
        self.accumulated = 0;
    }

    /// `W -= (η / m)·ΔW`, `b -= (η / m)·Δb`, then clear the accumulator.
    ///
    /// `ΔW` is the batch accumulator when samples were accumulated, otherwise
    /// the pending gradient left by `set_gradient` / `propagate_error`.
    pub fn apply_update(&mut self, batch_size: usize, learning_rate: f32) -> Result<()> {
        if batch_size == 0 {
            return Err(Error::InvalidParameter(
                "batch size must be greater than zero".to_string(),
            ));
        }
        let step = learning_rate / batch_size as f32;
        if self.accumulated > 0 {
            self.weights.scaled_add(-step, &self.weight_acc);
            self.bias.scaled_add(-step, &self.bias_acc);
        } else {
            self.weights.scaled_add(-step, &self.weight_grad);
            self.bias.scaled_add(-step, &self.bias_grad);
        }
        self.reset_accumulator();
        Ok(())
    }

    /// No NaN or infinite parameters
    pub fn is_valid(&self) -> bool {
        self.weights.iter().chain(self.bias.iter()).all(|v| v.is_finite())
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

/// Standard normal sample via the Box–Muller transform
pub fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    // gen() is in [0, 1); flip it so ln() stays finite
    let u: f32 = 1.0 - rng.gen::<f32>();
    let v: f32 = rng.gen();
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}
