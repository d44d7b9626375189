//! Seeded k-means (Lloyd's algorithm with k-means++ seeding).
//!
//! # References
//!
//! - Lloyd (1982), "Least squares quantization in PCM"
//! - Arthur & Vassilvitskii (2007), "k-means++: The Advantages of Careful Seeding"

use rand::Rng;

use crate::models::GeoPoint;

/// Result of a k-means run.
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Group index per input point, in `0..centroids.len()`.
    pub labels: Vec<usize>,
    pub centroids: Vec<GeoPoint>,
    /// Lloyd iterations performed.
    pub iterations: usize,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f64,
}

/// Partitions `points` into `k` groups minimizing within-group squared distance.
///
/// Deterministic for a given generator state. `k` is clamped to
/// `points.len()`.
///
/// # Panics
/// Panics if `points` is empty or `k == 0`.
pub fn kmeans<R: Rng>(points: &[GeoPoint], k: usize, max_iterations: usize, tolerance: f64, rng: &mut R) -> KMeansResult {
    assert!(!points.is_empty(), "points must not be empty");
    assert!(k > 0, "k must be positive");
    let k = k.min(points.len());

    let mut centroids = seed_centroids(points, k, rng);
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;

        // Assignment step
        let mut changed = iterations == 1;
        for (i, p) in points.iter().enumerate() {
            let best = nearest(p, &centroids);
            if best != labels[i] {
                changed = true;
                labels[i] = best;
            }
        }

        // Update step
        let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];
        for (p, &l) in points.iter().zip(&labels) {
            sums[l].0 += p.lat;
            sums[l].1 += p.lon;
            sums[l].2 += 1;
        }

        let mut shift = 0.0f64;
        for c in 0..k {
            let (lat, lon, n) = sums[c];
            let next = if n > 0 {
                GeoPoint::new(lat / n as f64, lon / n as f64)
            } else {
                // Empty group: move it onto the point farthest from its centroid.
                farthest_point(points, &labels, &centroids)
            };
            shift = shift.max(centroids[c].planar_sq(&next));
            centroids[c] = next;
        }

        if !changed || shift <= tolerance {
            break;
        }
    }

    // Final assignment against the settled centroids.
    for (i, p) in points.iter().enumerate() {
        labels[i] = nearest(p, &centroids);
    }
    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| p.planar_sq(&centroids[l]))
        .sum();

    KMeansResult {
        labels,
        centroids,
        iterations,
        inertia,
    }
}

/// k-means++ seeding: first centre uniform, the rest proportional to D².
fn seed_centroids<R: Rng>(points: &[GeoPoint], k: usize, rng: &mut R) -> Vec<GeoPoint> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())]);
    let mut d2: Vec<f64> = points.iter().map(|p| p.planar_sq(&centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let idx = if total <= 0.0 {
            // All remaining points coincide with chosen centres.
            rng.random_range(0..points.len())
        } else {
            let mut roll = rng.random_range(0.0..total);
            let mut chosen = points.len() - 1;
            for (i, &w) in d2.iter().enumerate() {
                roll -= w;
                if roll <= 0.0 && w > 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        };
        let c = points[idx];
        centroids.push(c);
        for (i, p) in points.iter().enumerate() {
            d2[i] = d2[i].min(p.planar_sq(&c));
        }
    }
    centroids
}

fn nearest(p: &GeoPoint, centroids: &[GeoPoint]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = p.planar_sq(centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn farthest_point(points: &[GeoPoint], labels: &[usize], centroids: &[GeoPoint]) -> GeoPoint {
    points
        .iter()
        .zip(labels)
        .max_by(|(a, &la), (b, &lb)| {
            a.planar_sq(&centroids[la])
                .partial_cmp(&b.planar_sq(&centroids[lb]))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(p, _)| *p)
        .unwrap_or(points[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn two_blobs() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.1, 0.0),
            GeoPoint::new(0.0, 0.1),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.1, 10.0),
            GeoPoint::new(10.0, 10.1),
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let pts = two_blobs();
        let r = kmeans(&pts, 2, 100, 1e-12, &mut create_rng(42));
        assert_eq!(r.labels[0], r.labels[1]);
        assert_eq!(r.labels[1], r.labels[2]);
        assert_eq!(r.labels[3], r.labels[4]);
        assert_ne!(r.labels[0], r.labels[3]);
        assert!(r.inertia < 0.1);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let pts: Vec<GeoPoint> = (0..40)
            .map(|i| GeoPoint::new((i * 7 % 13) as f64, (i * 5 % 11) as f64))
            .collect();
        let a = kmeans(&pts, 4, 100, 1e-12, &mut create_rng(9));
        let b = kmeans(&pts, 4, 100, 1e-12, &mut create_rng(9));
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_k_clamped() {
        let pts = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        let r = kmeans(&pts, 5, 10, 1e-12, &mut create_rng(1));
        assert_eq!(r.centroids.len(), 2);
        assert_ne!(r.labels[0], r.labels[1]);
    }

    #[test]
    fn test_single_group() {
        let pts = two_blobs();
        let r = kmeans(&pts, 1, 10, 1e-12, &mut create_rng(1));
        assert!(r.labels.iter().all(|&l| l == 0));
        let c = GeoPoint::centroid(pts.iter()).expect("non-empty");
        assert!(r.centroids[0].planar(&c) < 1e-9);
    }

    #[test]
    fn test_identical_points() {
        let pts = vec![GeoPoint::new(1.0, 1.0); 4];
        let r = kmeans(&pts, 2, 10, 1e-12, &mut create_rng(3));
        assert_eq!(r.labels.len(), 4);
        assert!(r.inertia.abs() < 1e-12);
    }
}
