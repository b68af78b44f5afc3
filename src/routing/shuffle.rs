//! Seeded Fisher–Yates shuffle used for scatter-fill.
//!
//! Swap partners come from one LCG step mixed with the position; the seed
//! then advances with a second LCG. All arithmetic is mod 2^32.

/// Multiplier mixed with the position to pick the swap partner
const PICK_MULTIPLIER: u32 = 1103515245;
/// Increment mixed into the swap partner pick
const PICK_INCREMENT: u32 = 12345;
/// Seed advance multiplier (Numerical Recipes LCG)
const ADVANCE_MULTIPLIER: u32 = 1664525;
/// Seed advance increment
const ADVANCE_INCREMENT: u32 = 1013904223;

/// Shuffle `items` in place, deterministically for a given `seed`.
pub fn seeded_shuffle<T>(items: &mut [T], seed: u32) {
    let mut seed = seed;
    for i in (1..items.len()).rev() {
        let span = (i + 1) as u32;
        let pick = seed
            .wrapping_mul(span)
            .wrapping_mul(PICK_MULTIPLIER)
            .wrapping_add(PICK_INCREMENT);
        let j = (pick % span) as usize;
        items.swap(i, j);
        seed = seed
            .wrapping_mul(ADVANCE_MULTIPLIER)
            .wrapping_add(ADVANCE_INCREMENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_reference_order() {
        let mut items: Vec<usize> = (1..8).collect();
        seeded_shuffle(&mut items, 0);
        assert_eq!(items, vec![3, 4, 1, 6, 7, 2, 5]);
    }

    #[test]
    fn test_is_permutation() {
        let mut items: Vec<usize> = (1..32).collect();
        seeded_shuffle(&mut items, 744039943);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_deterministic() {
        let mut a: Vec<usize> = (1..32).collect();
        let mut b = a.clone();
        seeded_shuffle(&mut a, 98262);
        seeded_shuffle(&mut b, 98262);
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_slices() {
        let mut empty: Vec<usize> = Vec::new();
        seeded_shuffle(&mut empty, 7);
        assert!(empty.is_empty());

        let mut one = vec![1usize];
        seeded_shuffle(&mut one, 7);
        assert_eq!(one, vec![1]);
    }
}
