//! Randomized placement with guaranteed termination
//!
//! Rejection sampling gets a fixed attempt budget per pick. When the budget
//! runs out the remaining picks come from an in-order scan of the candidates,
//! so placement always terminates and is deterministic for a given seed.

use rand::Rng;

/// Attempts per pick before falling back to the scan
pub const DEFAULT_ATTEMPTS: usize = 32;

/// Pick up to `count` distinct indices in `0..slots` accepted by `accept`.
///
/// `accept(index, picked_so_far)` decides whether a candidate is usable.
/// Returns fewer than `count` indices only when not enough slots are
/// acceptable at all.
pub fn sample_distinct<R, F>(
    rng: &mut R,
    slots: usize,
    count: usize,
    max_attempts: usize,
    mut accept: F,
) -> Vec<usize>
where
    R: Rng,
    F: FnMut(usize, &[usize]) -> bool,
{
    let mut picked: Vec<usize> = Vec::with_capacity(count.min(slots));
    if slots == 0 {
        return picked;
    }

    while picked.len() < count {
        let mut found = None;
        for _ in 0..max_attempts {
            let i = rng.random_range(0..slots);
            if !picked.contains(&i) && accept(i, &picked) {
                found = Some(i);
                break;
            }
        }
        match found {
            Some(i) => picked.push(i),
            None => break,
        }
    }

    // Deterministic fallback: scan in order
    if picked.len() < count {
        for i in 0..slots {
            if picked.len() >= count {
                break;
            }
            if !picked.contains(&i) && accept(i, &picked) {
                picked.push(i);
            }
        }
    }

    picked
}

/// Pick one acceptable slot, or `None` if no slot is acceptable
pub fn sample_one<R, F>(rng: &mut R, slots: usize, max_attempts: usize, mut accept: F) -> Option<usize>
where
    R: Rng,
    F: FnMut(usize) -> bool,
{
    sample_distinct(rng, slots, 1, max_attempts, |i, _| accept(i))
        .first()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_distinct_and_accepted() {
        let mut rng = Pcg32::seed_from_u64(1);
        let picks = sample_distinct(&mut rng, 20, 8, DEFAULT_ATTEMPTS, |i, _| i % 2 == 0);
        assert_eq!(picks.len(), 8);
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 8);
        assert!(picks.iter().all(|i| i % 2 == 0));
    }

    #[test]
    fn test_terminates_when_nearly_full() {
        // Only slot 399 is acceptable: random attempts almost always miss
        let mut rng = Pcg32::seed_from_u64(2);
        let pick = sample_one(&mut rng, 400, 4, |i| i == 399);
        assert_eq!(pick, Some(399));
    }

    #[test]
    fn test_no_acceptable_slot() {
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(sample_one(&mut rng, 50, DEFAULT_ATTEMPTS, |_| false), None);
        assert!(sample_distinct(&mut rng, 0, 3, DEFAULT_ATTEMPTS, |_, _| true).is_empty());
    }

    #[test]
    fn test_count_larger_than_slots() {
        let mut rng = Pcg32::seed_from_u64(4);
        let picks = sample_distinct(&mut rng, 5, 10, DEFAULT_ATTEMPTS, |_, _| true);
        assert_eq!(picks.len(), 5);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = sample_distinct(&mut Pcg32::seed_from_u64(9), 100, 10, 8, |i, p| {
            p.iter().all(|&q| q.abs_diff(i) > 3)
        });
        let b = sample_distinct(&mut Pcg32::seed_from_u64(9), 100, 10, 8, |i, p| {
            p.iter().all(|&q| q.abs_diff(i) > 3)
        });
        assert_eq!(a, b);
    }
}
