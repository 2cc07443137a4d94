// Single-trial categorical draw.
//
// Uniform number scaled by the total weight, then a linear cumulative search.
// K is small (tens of clusters), so a search per draw is cheaper than
// building an alias table.

use rand::Rng;

/// Draw one index from `weights`, proportionally to its weight.
///
/// Weights need not be normalized. When they sum to zero (every score
/// underflowed) all of the mass is treated as sitting on the last index,
/// matching how a multinomial draw assigns the residual probability.
///
/// Panics if `weights` is empty.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    assert!(!weights.is_empty(), "cannot sample from an empty distribution");
    let last = weights.len() - 1;

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return last;
    }

    let target = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if target < cumulative {
            return i;
        }
    }

    // Rounding can leave target == total; fall back to the last non-zero weight
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_never_picks_zero_weight() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let i = sample(&mut rng, &[0.0, 0.3, 0.0, 0.7]);
            assert!(i == 1 || i == 3, "picked zero-weight index {i}");
        }
    }

    #[test]
    fn test_point_mass() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(sample(&mut rng, &[0.0, 1.0, 0.0]), 1);
        }
    }

    #[test]
    fn test_all_zero_goes_to_last() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample(&mut rng, &[0.0, 0.0, 0.0]), 2);
    }

    #[test]
    fn test_roughly_proportional() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = [0usize; 2];
        for _ in 0..10_000 {
            hits[sample(&mut rng, &[1.0, 3.0])] += 1;
        }
        let share = hits[1] as f64 / 10_000.0;
        assert!((share - 0.75).abs() < 0.03, "Expected ~0.75, got {share}");
    }
}
