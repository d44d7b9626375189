//! Clustering execution.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::config::{ClusterConfig, ClusterMethod, NoisePolicy};
use super::dbscan::dbscan;
use super::kmeans::kmeans;
use super::ranking::{criterion_value, rank_descending};
use crate::error::{FleetError, Result};
use crate::models::{ClusterLabel, GeoPoint, Order};
use crate::random::create_rng;

/// A spatial group of orders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster {
    pub id: usize,
    pub centroid: GeoPoint,
    /// 1 = largest criterion total.
    pub priority_rank: usize,
    /// Criterion total over the members.
    pub total: f64,
    pub order_ids: Vec<String>,
}

/// Result of a clustering run.
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Clusters sorted by ascending priority rank.
    pub clusters: Vec<Cluster>,

    /// Orders left as noise under [`NoisePolicy::Trailing`].
    pub unclustered: Vec<String>,
}

impl ClusterResult {
    pub fn cluster(&self, id: usize) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }
}

/// Groups orders by proximity and ranks the groups.
pub struct RegionClusterer;

impl RegionClusterer {
    /// Clusters `orders` in place.
    ///
    /// On success every order carries a [`ClusterLabel`]; clustered orders
    /// also carry the rank of their cluster. Nothing is modified on error.
    ///
    /// # Errors
    /// [`FleetError::Input`] for an invalid configuration, empty input,
    /// invalid coordinates, or a criterion value that cannot be derived.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fleet::cluster::{ClusterConfig, ClusterMethod, RegionClusterer};
    /// use u_fleet::models::Order;
    ///
    /// let mut orders = vec![
    ///     Order::new("A", 10.0, 0.0, 0.0),
    ///     Order::new("B", 5.0, 0.0, 0.01),
    ///     Order::new("C", 50.0, 5.0, 5.0),
    /// ];
    /// let config = ClusterConfig::default().with_method(ClusterMethod::Centroid { k: 2 });
    /// let result = RegionClusterer::run(&mut orders, &config).unwrap();
    ///
    /// assert_eq!(result.clusters.len(), 2);
    /// assert_eq!(orders[2].priority_rank, Some(1));
    /// assert_eq!(orders[0].priority_rank, Some(2));
    /// ```
    pub fn run(orders: &mut [Order], config: &ClusterConfig) -> Result<ClusterResult> {
        config.validate().map_err(FleetError::Input)?;
        if orders.is_empty() {
            return Err(FleetError::input("no orders to cluster"));
        }

        let mut values = Vec::with_capacity(orders.len());
        for order in orders.iter() {
            if !order.location.is_valid() {
                return Err(FleetError::input(format!(
                    "order {}: invalid coordinates ({}, {})",
                    order.id, order.location.lat, order.location.lon
                )));
            }
            values.push(criterion_value(order, config.criterion)?);
        }

        let points: Vec<GeoPoint> = orders.iter().map(|o| o.location).collect();
        let raw = Self::label(&points, config);

        // Compact raw labels into 0..m in order of first appearance.
        let mut remap: BTreeMap<usize, usize> = BTreeMap::new();
        let mut first_seen: Vec<usize> = Vec::new();
        for label in raw.iter().flatten() {
            if !remap.contains_key(label) {
                remap.insert(*label, first_seen.len());
                first_seen.push(*label);
            }
        }
        let mut labels: Vec<Option<usize>> = raw.iter().map(|l| l.map(|x| remap[&x])).collect();

        if config.noise_policy == NoisePolicy::Singleton {
            let mut next = first_seen.len();
            for label in labels.iter_mut().filter(|l| l.is_none()) {
                *label = Some(next);
                next += 1;
            }
        }

        let count = labels.iter().flatten().max().map_or(0, |m| m + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (i, label) in labels.iter().enumerate() {
            if let Some(c) = label {
                members[*c].push(i);
            }
        }

        let totals: Vec<f64> = members
            .iter()
            .map(|m| m.iter().map(|&i| values[i]).sum())
            .collect();
        let ranks = rank_descending(&totals);

        let mut clusters: Vec<Cluster> = members
            .iter()
            .enumerate()
            .map(|(id, m)| Cluster {
                id,
                centroid: GeoPoint::centroid(m.iter().map(|&i| &points[i]))
                    .unwrap_or(points[m[0]]),
                priority_rank: ranks[id],
                total: totals[id],
                order_ids: m.iter().map(|&i| orders[i].id.clone()).collect(),
            })
            .collect();
        clusters.sort_by_key(|c| c.priority_rank);

        let mut unclustered = Vec::new();
        for (i, order) in orders.iter_mut().enumerate() {
            match labels[i] {
                Some(c) => {
                    order.cluster = Some(ClusterLabel::Assigned(c));
                    order.priority_rank = Some(ranks[c]);
                }
                None => {
                    order.cluster = Some(ClusterLabel::Unclustered);
                    order.priority_rank = None;
                    unclustered.push(order.id.clone());
                }
            }
        }

        for c in &clusters {
            debug!(
                cluster = c.id,
                rank = c.priority_rank,
                members = c.order_ids.len(),
                total = c.total,
                "cluster ranked"
            );
        }
        info!(
            orders = orders.len(),
            clusters = clusters.len(),
            unclustered = unclustered.len(),
            criterion = config.criterion.name(),
            "clustering complete"
        );

        Ok(ClusterResult {
            clusters,
            unclustered,
        })
    }

    fn label(points: &[GeoPoint], config: &ClusterConfig) -> Vec<Option<usize>> {
        match config.method {
            ClusterMethod::Centroid { k } => {
                let mut rng = create_rng(config.seed);
                let result = kmeans(points, k, config.max_iterations, config.tolerance, &mut rng);
                debug!(iterations = result.iterations, inertia = result.inertia, "k-means converged");
                result.labels.into_iter().map(Some).collect()
            }
            ClusterMethod::Density { eps_m, min_points } => dbscan(points, eps_m, min_points),
        }
    }
}
