//! One-point crossover on genotypes.

use crate::error::{check_rate, Error, Result};
use rand::Rng;

/// With probability `rate`, cut both parents at one random pivot in
/// `[0, len)` and swap their tails. Otherwise the children are copies of
/// the parents.
pub fn one_point_crossover<R: Rng + ?Sized>(
    rate: f32,
    parent_a: &[f32],
    parent_b: &[f32],
    rng: &mut R,
) -> Result<(Vec<f32>, Vec<f32>)> {
    check_rate("crossover rate", rate)?;
    check_lengths(parent_a, parent_b)?;

    if parent_a.is_empty() || rng.gen::<f32>() >= rate {
        return Ok((parent_a.to_vec(), parent_b.to_vec()));
    }
    let pivot = rng.gen_range(0..parent_a.len());
    crossover_at(pivot, parent_a, parent_b)
}

/// `(A[..pivot] ++ B[pivot..], B[..pivot] ++ A[pivot..])`
pub fn crossover_at(
    pivot: usize,
    parent_a: &[f32],
    parent_b: &[f32],
) -> Result<(Vec<f32>, Vec<f32>)> {
    check_lengths(parent_a, parent_b)?;
    if pivot > parent_a.len() {
        return Err(Error::InvalidParameter(format!(
            "pivot {} out of range for genome of length {}",
            pivot,
            parent_a.len()
        )));
    }

    let (a_head, a_tail) = parent_a.split_at(pivot);
    let (b_head, b_tail) = parent_b.split_at(pivot);
    Ok(([a_head, b_tail].concat(), [b_head, a_tail].concat()))
}

fn check_lengths(parent_a: &[f32], parent_b: &[f32]) -> Result<()> {
    if parent_a.len() != parent_b.len() {
        return Err(Error::len("crossover parent", parent_a.len(), parent_b.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_crossover_at_pivot() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        let (ca, cb) = crossover_at(1, &a, &b).unwrap();
        assert_eq!(ca, vec![1.0, 6.0, 7.0, 8.0]);
        assert_eq!(cb, vec![5.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_crossover_always_at_full_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let a = vec![0.0; 10];
        let b = vec![1.0; 10];

        for _ in 0..50 {
            let (ca, cb) = one_point_crossover(1.0, &a, &b, &mut rng).unwrap();
            let pivot = ca.iter().take_while(|&&g| g == 0.0).count();
            assert!(pivot < 10);
            assert!(ca[pivot..].iter().all(|&g| g == 1.0));
            assert!(cb[..pivot].iter().all(|&g| g == 1.0));
            assert!(cb[pivot..].iter().all(|&g| g == 0.0));
            if pivot > 0 {
                assert_ne!(ca, a);
                assert_ne!(cb, b);
            }
        }
    }

    #[test]
    fn test_crossover_never_at_zero_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let a = [0.1, 0.2, 0.3];
        let b = [0.4, 0.5, 0.6];
        for _ in 0..20 {
            let (ca, cb) = one_point_crossover(0.0, &a, &b, &mut rng).unwrap();
            assert_eq!(ca, a);
            assert_eq!(cb, b);
        }
    }

    #[test]
    fn test_crossover_rejects_bad_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        assert!(matches!(
            one_point_crossover(1.0, &[0.0, 1.0], &[0.0], &mut rng),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            one_point_crossover(1.1, &[0.0], &[1.0], &mut rng),
            Err(Error::InvalidParameter(_))
        ));
        assert!(crossover_at(3, &[0.0, 1.0], &[1.0, 0.0]).is_err());
    }
}
