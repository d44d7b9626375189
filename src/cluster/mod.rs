//! Spatial clustering and priority ranking of orders.
//!
//! Orders are grouped either by seeded k-means (fixed group count) or by
//! DBSCAN (neighbourhood radius and minimum neighbours). Each group is then
//! ranked by the sum of a priority criterion over its members, with rank 1
//! for the largest sum.
//!
//! DBSCAN noise is handled by an explicit [`NoisePolicy`].
//!
//! # References
//!
//! - Lloyd (1982), "Least squares quantization in PCM"
//! - Ester et al. (1996), "A Density-Based Algorithm for Discovering Clusters"

mod config;
mod dbscan;
mod kmeans;
mod ranking;
mod runner;

pub use config::{ClusterConfig, ClusterMethod, NoisePolicy, PriorityCriterion};
pub use dbscan::{dbscan, dbscan_with};
pub use kmeans::{kmeans, KMeansResult};
pub use ranking::{criterion_value, rank_descending};
pub use runner::{Cluster, ClusterResult, RegionClusterer};
