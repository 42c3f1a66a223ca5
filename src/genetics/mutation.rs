//! Rate-gated mutation operators on genotypes.
//!
//! Each operator draws once from `[0, 1)` and mutates in place only when the
//! draw is below `rate`. The return value says whether the gate opened; a
//! closed gate is `Ok(false)`, never an error.

use crate::error::{check_rate, Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Exchange two genes
    Swap,
    /// Move one gene to just after another
    Insert,
    /// Shuffle a sub-range
    Scramble,
    /// Reverse a sub-range
    Inverse,
    /// Flip every 0 to 1 and 1 to 0 (binary genomes)
    BitFlip,
}

impl MutationKind {
    pub const ALL: [MutationKind; 5] = [
        MutationKind::Swap,
        MutationKind::Insert,
        MutationKind::Scramble,
        MutationKind::Inverse,
        MutationKind::BitFlip,
    ];

    pub fn apply<R: Rng + ?Sized>(self, rate: f32, genome: &mut [f32], rng: &mut R) -> Result<bool> {
        match self {
            Self::Swap => swap(rate, genome, rng),
            Self::Insert => insert(rate, genome, rng),
            Self::Scramble => scramble(rate, genome, rng),
            Self::Inverse => inverse(rate, genome, rng),
            Self::BitFlip => bit_flip(rate, genome, rng),
        }
    }
}

/// Two distinct indices in `[0, n)`; the second is redrawn until it differs
pub fn random_index_pair<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<(usize, usize)> {
    if n <= 1 {
        return Err(Error::InvalidParameter(format!(
            "index pair needs at least two positions, got {}",
            n
        )));
    }
    let first = rng.gen_range(0..n);
    let mut second = rng.gen_range(0..n);
    while second == first {
        second = rng.gen_range(0..n);
    }
    Ok((first, second))
}

fn gate<R: Rng + ?Sized>(rate: f32, rng: &mut R) -> bool {
    rng.gen::<f32>() < rate
}

/// Validation shared by the index-pair operators, done before the gate
fn check_pair_operator(rate: f32, genome: &[f32]) -> Result<()> {
    check_rate("mutation rate", rate)?;
    if genome.len() <= 1 {
        return Err(Error::InvalidParameter(format!(
            "mutation needs a genome of length >= 2, got {}",
            genome.len()
        )));
    }
    Ok(())
}

fn ordered((a, b): (usize, usize)) -> (usize, usize) {
    (a.min(b), a.max(b))
}

pub fn swap<R: Rng + ?Sized>(rate: f32, genome: &mut [f32], rng: &mut R) -> Result<bool> {
    check_pair_operator(rate, genome)?;
    if !gate(rate, rng) {
        return Ok(false);
    }
    let (i, j) = random_index_pair(genome.len(), rng)?;
    genome.swap(i, j);
    Ok(true)
}

pub fn insert<R: Rng + ?Sized>(rate: f32, genome: &mut [f32], rng: &mut R) -> Result<bool> {
    check_pair_operator(rate, genome)?;
    if !gate(rate, rng) {
        return Ok(false);
    }
    let (anchor, moved) = random_index_pair(genome.len(), rng)?;
    move_after(genome, anchor, moved);
    Ok(true)
}

/// Remove the gene at `moved` and reinsert it right after the gene at `anchor`.
/// When it already sits there the two genes are swapped instead.
fn move_after(genome: &mut [f32], anchor: usize, moved: usize) {
    if moved == anchor + 1 {
        genome.swap(anchor, moved);
    } else if moved > anchor {
        genome[anchor + 1..=moved].rotate_right(1);
    } else {
        genome[moved..=anchor].rotate_left(1);
    }
}

pub fn scramble<R: Rng + ?Sized>(rate: f32, genome: &mut [f32], rng: &mut R) -> Result<bool> {
    check_pair_operator(rate, genome)?;
    if !gate(rate, rng) {
        return Ok(false);
    }
    let (lo, hi) = ordered(random_index_pair(genome.len(), rng)?);
    let range = &mut genome[lo..=hi];
    let before = range.to_vec();
    range.shuffle(rng);
    if *range == before[..] {
        range.rotate_left(1);
    }
    Ok(true)
}

pub fn inverse<R: Rng + ?Sized>(rate: f32, genome: &mut [f32], rng: &mut R) -> Result<bool> {
    check_pair_operator(rate, genome)?;
    if !gate(rate, rng) {
        return Ok(false);
    }
    let (lo, hi) = ordered(random_index_pair(genome.len(), rng)?);
    genome[lo..=hi].reverse();
    Ok(true)
}

/// Genes other than exactly 0 or 1 are left untouched
pub fn bit_flip<R: Rng + ?Sized>(rate: f32, genome: &mut [f32], rng: &mut R) -> Result<bool> {
    check_rate("mutation rate", rate)?;
    if !gate(rate, rng) {
        return Ok(false);
    }
    for gene in genome.iter_mut() {
        if *gene == 0.0 {
            *gene = 1.0;
        } else if *gene == 1.0 {
            *gene = 0.0;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn distinct_genome() -> Vec<f32> {
        vec![0.5, -1.0, 2.0, 3.5, -0.25, 4.0]
    }

    #[test]
    fn test_index_pair_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..200 {
            let (a, b) = random_index_pair(2, &mut rng).unwrap();
            assert_ne!(a, b);
            assert!(a < 2 && b < 2);
        }
    }

    #[test]
    fn test_index_pair_degenerate() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(random_index_pair(0, &mut rng), Err(Error::InvalidParameter(_))));
        assert!(matches!(random_index_pair(1, &mut rng), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_move_after() {
        let mut g = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        move_after(&mut g, 1, 3);
        assert_eq!(g, vec![0.0, 1.0, 3.0, 2.0, 4.0]);

        let mut g = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        move_after(&mut g, 3, 0);
        assert_eq!(g, vec![1.0, 2.0, 3.0, 0.0, 4.0]);

        let mut g = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        move_after(&mut g, 1, 2);
        assert_eq!(g, vec![0.0, 2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_full_rate_always_changes() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for kind in [
                MutationKind::Swap,
                MutationKind::Insert,
                MutationKind::Scramble,
                MutationKind::Inverse,
            ] {
                let mut genome = distinct_genome();
                assert!(kind.apply(1.0, &mut genome, &mut rng).unwrap());
                assert_ne!(genome, distinct_genome(), "{:?} seed {}", kind, seed);

                let mut sorted = genome.clone();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let mut expected = distinct_genome();
                expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
                assert_eq!(sorted, expected, "{:?} must permute", kind);
            }
        }
    }

    #[test]
    fn test_zero_rate_never_changes() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for kind in MutationKind::ALL {
            for _ in 0..20 {
                let mut genome = vec![0.0, 1.0, 0.25, 1.0, 0.0];
                assert!(!kind.apply(0.0, &mut genome, &mut rng).unwrap());
                assert_eq!(genome, vec![0.0, 1.0, 0.25, 1.0, 0.0]);
            }
        }
    }

    #[test]
    fn test_bit_flip() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut genome = vec![0.0, 1.0, 1.0, 0.5];
        assert!(bit_flip(1.0, &mut genome, &mut rng).unwrap());
        assert_eq!(genome, vec![1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_inverse_reverses_contiguous_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let original: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let mut genome = original.clone();
        inverse(1.0, &mut genome, &mut rng).unwrap();

        let lo = genome.iter().zip(&original).position(|(a, b)| a != b).unwrap();
        let hi = genome.iter().zip(&original).rposition(|(a, b)| a != b).unwrap();
        let mut reversed = original[lo..=hi].to_vec();
        reversed.reverse();
        assert_eq!(&genome[lo..=hi], reversed.as_slice());
    }

    #[test]
    fn test_invalid_arguments() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut short = vec![1.0];
        // Length is checked even when the gate would stay closed
        assert!(matches!(swap(0.0, &mut short, &mut rng), Err(Error::InvalidParameter(_))));
        assert!(matches!(
            scramble(1.5, &mut distinct_genome(), &mut rng),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            bit_flip(-0.1, &mut short, &mut rng),
            Err(Error::InvalidParameter(_))
        ));
        assert!(bit_flip(1.0, &mut short, &mut rng).unwrap());
        assert_eq!(short, vec![0.0]);
    }
}
