//! Clustering configuration.

/// How orders are grouped.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClusterMethod {
    /// Lloyd-style k-means with a fixed group count.
    Centroid {
        /// Number of groups. Clamped to the number of orders.
        k: usize,
    },

    /// DBSCAN over great-circle distances.
    Density {
        /// Neighbourhood radius in metres.
        eps_m: f64,
        /// Minimum neighbourhood size (the point itself included) for a core point.
        min_points: usize,
    },
}

impl Default for ClusterMethod {
    fn default() -> Self {
        ClusterMethod::Centroid { k: 5 }
    }
}

/// Value summed per cluster to rank clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriorityCriterion {
    /// Total kilograms.
    #[default]
    Weight,
    /// Total cubic metres.
    Volume,
    /// Total urgency score; every order must carry a priority.
    Urgency,
    /// Number of orders.
    OrderCount,
}

impl PriorityCriterion {
    pub fn name(&self) -> &'static str {
        match self {
            PriorityCriterion::Weight => "weight",
            PriorityCriterion::Volume => "volume",
            PriorityCriterion::Urgency => "urgency",
            PriorityCriterion::OrderCount => "order_count",
        }
    }
}

/// What happens to orders DBSCAN labels as noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoisePolicy {
    /// Each noise order becomes its own single-member cluster and is ranked
    /// like any other cluster.
    #[default]
    Singleton,

    /// Noise orders keep the `Unclustered` label and no rank; the allocator
    /// handles them after every ranked cluster.
    Trailing,
}

/// Configuration for [`RegionClusterer`](super::RegionClusterer).
///
/// # Examples
///
/// ```
/// use u_fleet::cluster::{ClusterConfig, ClusterMethod, PriorityCriterion};
///
/// let config = ClusterConfig::default()
///     .with_method(ClusterMethod::Centroid { k: 3 })
///     .with_criterion(PriorityCriterion::Volume)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterConfig {
    pub method: ClusterMethod,
    pub criterion: PriorityCriterion,
    pub noise_policy: NoisePolicy,

    /// Lloyd iteration cap.
    pub max_iterations: usize,

    /// Centroid movement (squared, in degrees²) below which k-means stops.
    pub tolerance: f64,

    /// Seed for k-means initialization.
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            method: ClusterMethod::default(),
            criterion: PriorityCriterion::default(),
            noise_policy: NoisePolicy::default(),
            max_iterations: 300,
            tolerance: 1e-12,
            seed: 42,
        }
    }
}

impl ClusterConfig {
    pub fn with_method(mut self, method: ClusterMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_criterion(mut self, criterion: PriorityCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_noise_policy(mut self, policy: NoisePolicy) -> Self {
        self.noise_policy = policy;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.method {
            ClusterMethod::Centroid { k } => {
                if k == 0 {
                    return Err("k must be at least 1".into());
                }
            }
            ClusterMethod::Density { eps_m, min_points } => {
                if !eps_m.is_finite() || eps_m <= 0.0 {
                    return Err(format!("eps_m must be positive, got {eps_m}"));
                }
                if min_points == 0 {
                    return Err("min_points must be at least 1".into());
                }
            }
        }
        if self.max_iterations == 0 {
            return Err("max_iterations must be at least 1".into());
        }
        if self.tolerance < 0.0 {
            return Err("tolerance must be non-negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = ClusterConfig::default();
        assert_eq!(c.method, ClusterMethod::Centroid { k: 5 });
        assert_eq!(c.criterion, PriorityCriterion::Weight);
        assert_eq!(c.noise_policy, NoisePolicy::Singleton);
        assert_eq!(c.seed, 42);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_k() {
        let c = ClusterConfig::default().with_method(ClusterMethod::Centroid { k: 0 });
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_bad_density() {
        let c = ClusterConfig::default().with_method(ClusterMethod::Density {
            eps_m: -1.0,
            min_points: 3,
        });
        assert!(c.validate().is_err());
        let c = ClusterConfig::default().with_method(ClusterMethod::Density {
            eps_m: 500.0,
            min_points: 0,
        });
        assert!(c.validate().is_err());
    }
}
