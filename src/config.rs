//! Configuration for training and evolution runs.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::error::{check_rate, Error, Result};
use crate::genetics::{MutationKind, SelectionStrategy};
use crate::neural::GradientMode;
use crate::training::TrainingKind;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Seed of the run's random number generator
    pub seed: u64,
    pub training: TrainingConfig,
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gradient and delta-rule training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Algorithm used by `Network::train_net`
    pub kind: TrainingKind,
    pub learning_rate: f32,
    /// Delta rule: per-sample error below which no update is made.
    /// Back-propagation: epoch MSE at which training stops.
    pub target_error: f32,
    pub max_epochs: usize,
    /// Samples per mini-batch (back-propagation only)
    pub batch_size: usize,
    #[serde(default)]
    pub gradient_mode: GradientMode,
    /// Epochs between progress logs (0 disables)
    #[serde(default)]
    pub log_interval: usize,
}

/// One mutation operator and the probability it fires per offspring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationRule {
    pub kind: MutationKind,
    pub rate: f32,
}

/// Neuroevolution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Genomes per generation
    pub population_size: usize,
    /// Best genomes copied unchanged into the next generation
    pub elite_count: usize,
    /// Probability of one-point crossover per pair of parents
    pub crossover_rate: f32,
    /// Applied in order to every offspring
    pub mutations: Vec<MutationRule>,
    #[serde(default)]
    pub selection: SelectionStrategy,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 42,
            training: TrainingConfig::default(),
            evolution: EvolutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            kind: TrainingKind::BackPropagation,
            learning_rate: 0.5,
            target_error: 0.002,
            max_epochs: 1000,
            batch_size: 10,
            gradient_mode: GradientMode::Sum,
            log_interval: 100,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            elite_count: 2,
            crossover_rate: 0.5,
            mutations: vec![MutationRule {
                kind: MutationKind::Inverse,
                rate: 0.7,
            }],
            selection: SelectionStrategy::Elitist,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "learning_rate must be > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.target_error >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "target_error must be >= 0, got {}",
                self.target_error
            )));
        }
        if self.max_epochs == 0 {
            return Err(Error::InvalidParameter("max_epochs must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidParameter("batch_size must be > 0".to_string()));
        }
        Ok(())
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::InvalidParameter(
                "population_size must be at least 2".to_string(),
            ));
        }
        if self.elite_count >= self.population_size {
            return Err(Error::InvalidParameter(format!(
                "elite_count ({}) must be below population_size ({})",
                self.elite_count, self.population_size
            )));
        }
        check_rate("crossover_rate", self.crossover_rate)?;
        for rule in &self.mutations {
            check_rate("mutation rate", rule.rate)?;
        }
        if let SelectionStrategy::Tournament { size: 0 } = self.selection {
            return Err(Error::InvalidParameter(
                "tournament size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl LoggingConfig {
    /// Install the `env_logger` backend. `RUST_LOG` overrides `log_level`;
    /// calling this more than once is harmless.
    pub fn init(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        if env_logger::Builder::from_env(env).try_init().is_err() {
            log::debug!("logger already initialised");
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.training.validate()?;
        self.evolution.validate()
    }

    /// Seeded generator for a reproducible run
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}
