//! Neural network engine.
//!
//! Matrix-based feed-forward networks with:
//! - Activation registry with derivatives
//! - Dense layers with forward/backward caches
//! - Back-propagation and mini-batch SGD

mod activation;
mod data;
mod layer;
mod network;

pub use activation::{ActivationKind, LEAKY_RELU_SLOPE};
pub use data::{column, Sample, TrainingSet};
pub use layer::{box_muller, BiasInit, GradientMode, Layer, DEFAULT_BIAS};
pub use network::{LayerShape, Network, Topology};
