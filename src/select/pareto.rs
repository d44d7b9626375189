//! Pareto fronts over minimised objectives.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"

/// Pareto front index for each row of `objectives`; 0 is the
/// non-dominated front. All objectives are minimised.
///
/// # Example
///
/// ```
/// use u_fleet::select::pareto_fronts;
///
/// let fronts = pareto_fronts(&[
///     [1.0, 5.0, 0.0],
///     [3.0, 3.0, 0.0],
///     [4.0, 4.0, 0.0], // dominated by the second row
/// ]);
/// assert_eq!(fronts, vec![0, 0, 1]);
/// ```
pub fn pareto_fronts<const M: usize>(objectives: &[[f64; M]]) -> Vec<usize> {
    let n = objectives.len();
    let mut domination_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut fronts = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance(&objectives[i], &objectives[j]) {
                Some(true) => {
                    dominates[i].push(j);
                    domination_count[j] += 1;
                }
                Some(false) => {
                    dominates[j].push(i);
                    domination_count[i] += 1;
                }
                None => {}
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut level = 0;
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            fronts[i] = level;
            for &j in &dominates[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        current = next;
        level += 1;
    }
    fronts
}

/// `Some(true)` if `a` dominates `b`, `Some(false)` if `b` dominates `a`.
fn dominance(a: &[f64], b: &[f64]) -> Option<bool> {
    let mut a_better = false;
    let mut b_better = false;
    for (&va, &vb) in a.iter().zip(b) {
        if va < vb {
            a_better = true;
        } else if vb < va {
            b_better = true;
        }
    }
    match (a_better, b_better) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}
