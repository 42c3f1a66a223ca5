//! # neuroevo
//!
//! Feed-forward neural networks trained by gradient descent or evolved
//! through a genetic algorithm over their flattened weights.
//!
//! ## Features
//!
//! - **Trainable**: Perceptron and Adaline delta rules, back-propagation with mini-batch SGD
//! - **Evolvable**: genome encoding, one-point crossover, five mutation operators
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neuroevo::neural::{ActivationKind, Network, Sample, Topology, TrainingSet};
//! use neuroevo::{Config, TrainingKind};
//!
//! let mut config = Config::default();
//! config.training.kind = TrainingKind::BackPropagation;
//! config.training.learning_rate = 3.0;
//! config.training.batch_size = 1;
//! let mut rng = config.rng();
//!
//! let topology = Topology::new(2)
//!     .layer(3, ActivationKind::Sigmoid)
//!     .layer(1, ActivationKind::Sigmoid);
//! let mut net = Network::random(&topology, &mut rng).unwrap();
//!
//! let data = TrainingSet::from_samples(&[
//!     Sample::new(&[0.0, 0.0], &[0.0]),
//!     Sample::new(&[0.0, 1.0], &[1.0]),
//!     Sample::new(&[1.0, 0.0], &[1.0]),
//!     Sample::new(&[1.0, 1.0], &[0.0]),
//! ])
//! .unwrap();
//!
//! let report = net.train_net(&config.training, &data, &mut rng).unwrap();
//! println!("MSE after {} epochs: {}", report.epochs_run, report.training_error);
//! ```
//!
//! ## Evolution
//!
//! ```rust,no_run
//! use neuroevo::evolution::{EvolutionEngine, Population};
//! use neuroevo::neural::{ActivationKind, Topology};
//! use neuroevo::Config;
//!
//! let config = Config::default();
//! let mut rng = config.rng();
//! let engine = EvolutionEngine::from_config(&config.evolution).unwrap();
//!
//! let topology = Topology::new(2).layer(1, ActivationKind::Tanh);
//! let mut population = Population::random(&topology, 20, &mut rng).unwrap();
//!
//! for _ in 0..50 {
//!     population
//!         .evaluate(|net| net.predict(&[1.0, -1.0]).unwrap()[0])
//!         .unwrap();
//!     population.evolve(&engine, &mut rng).unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod evolution;
pub mod genetics;
pub mod neural;
pub mod training;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use genetics::Genome;
pub use neural::{ActivationKind, Layer, Network, Topology};
pub use training::{Trainer, TrainingKind, TrainingReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
