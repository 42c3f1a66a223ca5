//! Evolution mechanics: breeding generations of genomes from a fitness signal.

use crate::config::{EvolutionConfig, MutationRule};
use crate::error::{Error, Result};
use crate::genetics::{one_point_crossover, Genome, SelectionStrategy};
use crate::neural::{Network, Topology};
use rand::Rng;
use std::cmp::Ordering;

/// Evolution engine for managing population genetics
#[derive(Clone, Debug)]
pub struct EvolutionEngine {
    pub population_size: usize,
    pub elite_count: usize,
    pub crossover_rate: f32,
    pub mutations: Vec<MutationRule>,
    pub selection: SelectionStrategy,
}

impl EvolutionEngine {
    /// Create evolution engine from config
    pub fn from_config(config: &EvolutionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            population_size: config.population_size,
            elite_count: config.elite_count,
            crossover_rate: config.crossover_rate,
            mutations: config.mutations.clone(),
            selection: config.selection,
        })
    }

    /// Run every configured mutation over `genotype`. Returns how many fired.
    pub fn mutate<R: Rng + ?Sized>(&self, genotype: &mut [f32], rng: &mut R) -> Result<usize> {
        let mut applied = 0;
        for rule in &self.mutations {
            if rule.kind.apply(rule.rate, genotype, rng)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Crossover two parents, then mutate both children
    pub fn breed<R: Rng + ?Sized>(
        &self,
        parent_a: &Genome,
        parent_b: &Genome,
        rng: &mut R,
    ) -> Result<(Genome, Genome)> {
        let (mut a, mut b) =
            one_point_crossover(self.crossover_rate, &parent_a.genotype, &parent_b.genotype, rng)?;
        self.mutate(&mut a, rng)?;
        self.mutate(&mut b, rng)?;
        Ok((Genome::new(a), Genome::new(b)))
    }

    /// Get elite genomes (top performers); unevaluated genomes rank last
    pub fn get_elites<'a>(&self, genomes: &'a [Genome], count: usize) -> Vec<&'a Genome> {
        let mut ranked: Vec<&Genome> = genomes.iter().collect();
        ranked.sort_by(|a, b| match (a.fitness, b.fitness) {
            (Some(fa), Some(fb)) => fb.partial_cmp(&fa).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ranked.into_iter().take(count).collect()
    }

    /// Breed a replacement generation: elites carried over unchanged, the
    /// rest filled with offspring of selected parents. Every returned genome
    /// is unevaluated.
    pub fn next_generation<R: Rng + ?Sized>(
        &self,
        genomes: &[Genome],
        rng: &mut R,
    ) -> Result<Vec<Genome>> {
        if self.elite_count >= self.population_size {
            return Err(Error::InvalidParameter(format!(
                "elite_count ({}) must be below population_size ({})",
                self.elite_count, self.population_size
            )));
        }

        let mut next: Vec<Genome> = self
            .get_elites(genomes, self.elite_count)
            .into_iter()
            .map(|g| Genome::new(g.genotype.clone()))
            .collect();

        while next.len() < self.population_size {
            let (a, b) = self.selection.select(genomes, rng)?;
            let (child_a, child_b) = self.breed(a, b, rng)?;
            next.push(child_a);
            if next.len() < self.population_size {
                next.push(child_b);
            }
        }

        Ok(next)
    }
}

/// Summary of one evaluated generation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitnessStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// Genomes of one network topology, evolved generation by generation
#[derive(Clone, Debug)]
pub struct Population {
    topology: Topology,
    genomes: Vec<Genome>,
    generation: u32,
    best: Option<Genome>,
}

impl Population {
    /// `size` genomes encoded from freshly initialised networks
    pub fn random<R: Rng + ?Sized>(topology: &Topology, size: usize, rng: &mut R) -> Result<Self> {
        let genomes = (0..size)
            .map(|_| Network::random(topology, rng).map(|net| Genome::from_network(&net)))
            .collect::<Result<Vec<_>>>()?;
        Self::from_genomes(topology.clone(), genomes)
    }

    pub fn from_genomes(topology: Topology, genomes: Vec<Genome>) -> Result<Self> {
        topology.validate()?;
        let expected = topology.parameter_count();
        if let Some(bad) = genomes.iter().find(|g| g.len() != expected) {
            return Err(Error::len("genome length", expected, bad.len()));
        }
        Ok(Self {
            topology,
            genomes,
            generation: 0,
            best: None,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Best genome seen in any evaluated generation
    pub fn best(&self) -> Option<&Genome> {
        self.best.as_ref()
    }

    pub fn best_network(&self) -> Result<Network> {
        self.best
            .as_ref()
            .ok_or_else(|| Error::NotTrained("population has not been evaluated".to_string()))?
            .to_network(&self.topology)
    }

    /// Decode every genome and score it with the caller's fitness function
    pub fn evaluate<F>(&mut self, mut fitness: F) -> Result<FitnessStats>
    where
        F: FnMut(&Network) -> f32,
    {
        for genome in &mut self.genomes {
            let network = genome.to_network(&self.topology)?;
            genome.set_fitness(fitness(&network));
        }

        for genome in &self.genomes {
            let score = genome.fitness.unwrap_or(f32::NEG_INFINITY);
            let best_score = self
                .best
                .as_ref()
                .and_then(|b| b.fitness)
                .unwrap_or(f32::NEG_INFINITY);
            if self.best.is_none() || score > best_score {
                self.best = Some(genome.clone());
            }
        }

        let stats = self
            .fitness_stats()
            .ok_or_else(|| Error::InvalidParameter("population is empty".to_string()))?;
        log::info!(
            "Generation {}: best={:.4} mean={:.4} worst={:.4}",
            self.generation,
            stats.max,
            stats.mean,
            stats.min
        );
        Ok(stats)
    }

    /// Min/max/mean over evaluated genomes of the current generation
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        let scores: Vec<f32> = self.genomes.iter().filter_map(|g| g.fitness).collect();
        if scores.is_empty() {
            return None;
        }
        let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = scores.iter().sum::<f32>() / scores.len() as f32;
        Some(FitnessStats { min, max, mean })
    }

    /// Replace the population wholesale with the engine's next generation
    pub fn evolve<R: Rng + ?Sized>(&mut self, engine: &EvolutionEngine, rng: &mut R) -> Result<()> {
        self.genomes = engine.next_generation(&self.genomes, rng)?;
        self.generation += 1;
        log::debug!(
            "Bred generation {} ({} genomes)",
            self.generation,
            self.genomes.len()
        );
        Ok(())
    }
}
