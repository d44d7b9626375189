//! Density-Based Spatial Clustering of Applications with Noise (DBSCAN).
//!
//! # References
//!
//! - Ester et al. (1996), "A Density-Based Algorithm for Discovering Clusters
//!   in Large Spatial Databases with Noise"

use std::collections::HashSet;

use crate::models::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointType {
    Noise,
    Clustered,
}

/// Labels every point with a cluster index, or `None` for noise.
///
/// `neighborhood(i)` must return the indices within the radius of point `i`,
/// including `i` itself. A point is a core point when its neighbourhood has
/// at least `min_points` members. Cluster indices follow the order in which
/// their first core point appears in the input.
pub fn dbscan_with<F>(n: usize, min_points: usize, neighborhood: F) -> Vec<Option<usize>>
where
    F: Fn(usize) -> Vec<usize>,
{
    let mut point_types: Vec<Option<PointType>> = vec![None; n];
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut next_cluster = 0;

    for point in 0..n {
        if point_types[point].is_some() {
            continue;
        }

        let mut neighbors = neighborhood(point);
        if neighbors.len() < min_points {
            point_types[point] = Some(PointType::Noise);
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        point_types[point] = Some(PointType::Clustered);
        labels[point] = Some(cluster);

        let mut seen: HashSet<usize> = neighbors.iter().copied().collect();
        let mut index = 0;
        while index < neighbors.len() {
            let other = neighbors[index];
            let other_type = point_types[other];

            if other_type.is_none() {
                let expansion = neighborhood(other);
                if expansion.len() >= min_points {
                    for candidate in expansion {
                        if seen.insert(candidate) {
                            neighbors.push(candidate);
                        }
                    }
                }
            }

            // Border points previously marked as noise join the cluster too.
            if other_type != Some(PointType::Clustered) {
                point_types[other] = Some(PointType::Clustered);
                labels[other] = Some(cluster);
            }

            index += 1;
        }
    }

    labels
}

/// DBSCAN over great-circle distance in metres.
pub fn dbscan(points: &[GeoPoint], eps_m: f64, min_points: usize) -> Vec<Option<usize>> {
    dbscan_with(points.len(), min_points, |i| {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| points[i].haversine_m(p) <= eps_m)
            .map(|(j, _)| j)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_neighbors(xs: &[f64], eps: f64) -> impl Fn(usize) -> Vec<usize> + '_ {
        move |i| {
            xs.iter()
                .enumerate()
                .filter(|(_, x)| (xs[i] - **x).abs() <= eps)
                .map(|(j, _)| j)
                .collect()
        }
    }

    #[test]
    fn test_two_groups_and_noise() {
        let xs = [0.0, 0.5, 1.0, 10.0, 10.5, 11.0, 50.0];
        let labels = dbscan_with(xs.len(), 2, line_neighbors(&xs, 0.6));
        assert_eq!(labels[0], Some(0));
        assert_eq!(labels[1], Some(0));
        assert_eq!(labels[2], Some(0));
        assert_eq!(labels[3], Some(1));
        assert_eq!(labels[5], Some(1));
        assert_eq!(labels[6], None);
    }

    #[test]
    fn test_border_point_adopted() {
        // Point 0 has only itself and point 1 nearby; point 1 is core.
        let xs = [0.0, 1.0, 1.5, 2.0];
        let labels = dbscan_with(xs.len(), 3, line_neighbors(&xs, 1.0));
        assert!(labels.iter().all(|l| *l == Some(0)));
    }

    #[test]
    fn test_all_noise() {
        let xs = [0.0, 10.0, 20.0];
        let labels = dbscan_with(xs.len(), 2, line_neighbors(&xs, 1.0));
        assert!(labels.iter().all(|l| l.is_none()));
    }

    #[test]
    fn test_geo_points() {
        // ~111 m apart along a meridian, plus one point far away.
        let pts = vec![
            GeoPoint::new(-23.5500, -46.6300),
            GeoPoint::new(-23.5510, -46.6300),
            GeoPoint::new(-23.5520, -46.6300),
            GeoPoint::new(-22.9000, -43.2000),
        ];
        let labels = dbscan(&pts, 150.0, 2);
        assert_eq!(labels[0], Some(0));
        assert_eq!(labels[2], Some(0));
        assert_eq!(labels[3], None);
    }
}
