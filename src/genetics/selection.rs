//! Parent selection over an evaluated population.

use super::genome::Genome;
use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How two parents are drawn from a population
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Best genome, then best of the remainder
    #[default]
    Elitist,
    /// Each parent is the fittest of `size` genomes sampled without replacement
    Tournament { size: usize },
}

impl SelectionStrategy {
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        genomes: &'a [Genome],
        rng: &mut R,
    ) -> Result<(&'a Genome, &'a Genome)> {
        match *self {
            Self::Elitist => select_parents(genomes),
            Self::Tournament { size } => tournament_select(genomes, size, rng),
        }
    }
}

fn fitness_values(genomes: &[Genome]) -> Result<Vec<f32>> {
    if genomes.len() < 2 {
        return Err(Error::InvalidParameter(format!(
            "selection needs at least two genomes, got {}",
            genomes.len()
        )));
    }
    genomes
        .iter()
        .enumerate()
        .map(|(i, g)| {
            g.fitness.ok_or_else(|| {
                Error::InvalidParameter(format!("genome {} has not been evaluated", i))
            })
        })
        .collect()
}

fn by_fitness(fitness: &[f32]) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    // Ties resolve to the lower index
    move |a: &usize, b: &usize| {
        fitness[*a]
            .partial_cmp(&fitness[*b])
            .unwrap_or(Ordering::Equal)
            .then(b.cmp(a))
    }
}

/// Fittest genome and the fittest of the rest
pub fn select_parents(genomes: &[Genome]) -> Result<(&Genome, &Genome)> {
    let fitness = fitness_values(genomes)?;
    let cmp = by_fitness(&fitness);

    let mut pool: Vec<usize> = (0..genomes.len()).collect();
    let take_best = |pool: &mut Vec<usize>| {
        let pos = (0..pool.len())
            .max_by(|&x, &y| cmp(&pool[x], &pool[y]))
            .unwrap_or(0);
        pool.swap_remove(pos)
    };

    let best = take_best(&mut pool);
    let second = take_best(&mut pool);
    Ok((&genomes[best], &genomes[second]))
}

/// Two distinct parents, each the winner of a `size`-genome tournament
pub fn tournament_select<'a, R: Rng + ?Sized>(
    genomes: &'a [Genome],
    size: usize,
    rng: &mut R,
) -> Result<(&'a Genome, &'a Genome)> {
    if size == 0 {
        return Err(Error::InvalidParameter(
            "tournament size must be > 0".to_string(),
        ));
    }
    let fitness = fitness_values(genomes)?;
    let cmp = by_fitness(&fitness);

    let all: Vec<usize> = (0..genomes.len()).collect();
    let first = tournament(&all, size, rng, &cmp);
    let rest: Vec<usize> = all.into_iter().filter(|&i| i != first).collect();
    let second = tournament(&rest, size, rng, &cmp);

    Ok((&genomes[first], &genomes[second]))
}

fn tournament<R: Rng + ?Sized>(
    pool: &[usize],
    size: usize,
    rng: &mut R,
    cmp: &impl Fn(&usize, &usize) -> Ordering,
) -> usize {
    pool.choose_multiple(rng, size.min(pool.len()))
        .copied()
        .max_by(|a, b| cmp(a, b))
        .unwrap_or(pool[0])
}
