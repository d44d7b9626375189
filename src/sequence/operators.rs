//! Permutation operators for tour search.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Croes (1958), "A Method for Solving Traveling-Salesman Problems" (2-opt)

use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Order crossover (OX): keep a random slice of `keep` in place and fill the
/// remaining positions with the stops of `fill`, in their order, skipping
/// stops already taken. Always yields a valid permutation.
///
/// # Panics
/// Panics if the parents differ in length.
pub fn order_crossover<R: Rng>(keep: &[usize], fill: &[usize], rng: &mut R) -> Vec<usize> {
    let n = keep.len();
    assert_eq!(n, fill.len(), "parents must have equal length");
    if n < 2 {
        return keep.to_vec();
    }

    let (start, end) = random_segment(n, rng);
    let mut child = vec![usize::MAX; n];
    let mut used = vec![false; n];
    for i in start..=end {
        child[i] = keep[i];
        used[keep[i]] = true;
    }

    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let gene = fill[(end + 1 + offset) % n];
        if used[gene] {
            continue;
        }
        child[pos] = gene;
        used[gene] = true;
        pos = (pos + 1) % n;
    }
    child
}

// ============================================================================
// Moves
// ============================================================================

/// Exchanges two distinct random positions.
pub fn swap_mutation<R: Rng>(tour: &mut [usize], rng: &mut R) {
    let n = tour.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    tour.swap(i, j);
}

/// Reverses `tour[i..=j]`.
pub fn two_opt(tour: &[usize], i: usize, j: usize) -> Vec<usize> {
    let mut next = tour.to_vec();
    next[i..=j].reverse();
    next
}

/// Moves the stop at `from` so that it ends up at position `to`.
pub fn relocate(tour: &[usize], from: usize, to: usize) -> Vec<usize> {
    let mut next = tour.to_vec();
    let stop = next.remove(from);
    next.insert(to, stop);
    next
}

fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn is_permutation(tour: &[usize], n: usize) -> bool {
        let mut seen = vec![false; n];
        tour.len() == n
            && tour.iter().all(|&g| {
                if g >= n || seen[g] {
                    return false;
                }
                seen[g] = true;
                true
            })
    }

    #[test]
    fn test_ox_valid() {
        let mut rng = create_rng(42);
        let a: Vec<usize> = (0..10).collect();
        let b: Vec<usize> = (0..10).rev().collect();
        for _ in 0..200 {
            let child = order_crossover(&a, &b, &mut rng);
            assert!(is_permutation(&child, 10));
        }
    }

    #[test]
    fn test_ox_identical_parents() {
        let mut rng = create_rng(1);
        let a = vec![3, 1, 4, 0, 2];
        assert_eq!(order_crossover(&a, &a, &mut rng), a);
    }

    #[test]
    fn test_swap_changes_two_positions() {
        let mut rng = create_rng(5);
        let mut t: Vec<usize> = (0..6).collect();
        swap_mutation(&mut t, &mut rng);
        assert!(is_permutation(&t, 6));
        let moved = t.iter().enumerate().filter(|(i, &g)| *i != g).count();
        assert_eq!(moved, 2);
    }

    #[test]
    fn test_two_opt_and_relocate() {
        let t = vec![0, 1, 2, 3, 4];
        assert_eq!(two_opt(&t, 1, 3), vec![0, 3, 2, 1, 4]);
        assert_eq!(relocate(&t, 0, 4), vec![1, 2, 3, 4, 0]);
        assert_eq!(relocate(&t, 3, 1), vec![0, 3, 1, 2, 4]);
    }
}
