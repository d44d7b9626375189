//! Sequencing configuration.

use std::time::Duration;

/// Which search produces each vehicle's visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Guided local search when any stop has a time window, annealing
    /// otherwise. A guided search that times out falls back to a repaired
    /// nearest-neighbour tour.
    #[default]
    Auto,
    /// Cheapest-arc construction improved by guided local search.
    GuidedLocalSearch,
    /// Nearest-neighbour construction improved by simulated annealing.
    Annealing,
    /// Nearest-neighbour seeded genetic algorithm.
    Genetic,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Auto => "auto",
            Strategy::GuidedLocalSearch => "guided_local_search",
            Strategy::Annealing => "annealing",
            Strategy::Genetic => "genetic",
        }
    }
}

/// Guided local search parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlsConfig {
    /// Penalty weight relative to the mean arc cost of the first local optimum.
    pub lambda: f64,

    /// Penalization rounds (local optimum → penalize → descend again).
    pub max_rounds: usize,
}

impl Default for GlsConfig {
    fn default() -> Self {
        Self {
            lambda: 0.3,
            max_rounds: 200,
        }
    }
}

/// Simulated annealing parameters (geometric cooling).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    pub initial_temperature: f64,
    /// Multiplier applied after each temperature level, in (0, 1).
    pub cooling_rate: f64,
    /// The search stops once the temperature falls to this value.
    pub min_temperature: f64,
    pub iterations_per_temperature: usize,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1_000.0,
            cooling_rate: 0.99,
            min_temperature: 1.0,
            iterations_per_temperature: 20,
        }
    }
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Fraction of the population copied unchanged into the next generation.
    pub elite_ratio: f64,
    /// Per-child probability of a swap mutation.
    pub mutation_rate: f64,
    pub tournament_size: usize,
    /// Evaluate the population with rayon (requires the `parallel` feature).
    pub parallel: bool,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 200,
            elite_ratio: 0.1,
            mutation_rate: 0.05,
            tournament_size: 3,
            parallel: true,
        }
    }
}

/// Configuration for [`RouteSequencer`](super::RouteSequencer).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fleet::sequence::{SequencerConfig, Strategy};
///
/// let config = SequencerConfig::balanced()
///     .with_strategy(Strategy::Annealing)
///     .with_time_budget(Duration::from_secs(5))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequencerConfig {
    pub strategy: Strategy,

    /// Wall-clock budget for the whole sequencing phase.
    pub time_budget: Duration,

    /// Longest wait, in seconds, allowed when arriving before a window opens.
    pub max_wait_s: f64,

    /// Seconds spent at every stop.
    pub service_time_s: f64,

    /// Whether routes return to the vehicle's start.
    pub closed_tour: bool,

    /// Sequence vehicles concurrently (requires the `parallel` feature).
    pub parallel: bool,

    pub gls: GlsConfig,
    pub anneal: AnnealConfig,
    pub genetic: GeneticConfig,

    /// Seed for the randomized searches; `None` draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            time_budget: Duration::from_secs(30),
            max_wait_s: 1_800.0,
            service_time_s: 0.0,
            closed_tour: true,
            parallel: false,
            gls: GlsConfig::default(),
            anneal: AnnealConfig::default(),
            genetic: GeneticConfig::default(),
            seed: None,
        }
    }
}

impl SequencerConfig {
    /// Short budget and light searches for interactive use.
    pub fn fast() -> Self {
        Self {
            time_budget: Duration::from_secs(2),
            gls: GlsConfig {
                max_rounds: 30,
                ..GlsConfig::default()
            },
            anneal: AnnealConfig {
                cooling_rate: 0.95,
                iterations_per_temperature: 10,
                ..AnnealConfig::default()
            },
            genetic: GeneticConfig {
                population_size: 20,
                generations: 50,
                ..GeneticConfig::default()
            },
            ..Self::default()
        }
    }

    /// The defaults.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Longer searches for batch planning.
    pub fn quality() -> Self {
        Self {
            time_budget: Duration::from_secs(120),
            gls: GlsConfig {
                max_rounds: 2_000,
                ..GlsConfig::default()
            },
            anneal: AnnealConfig {
                cooling_rate: 0.995,
                iterations_per_temperature: 100,
                ..AnnealConfig::default()
            },
            genetic: GeneticConfig {
                population_size: 100,
                generations: 1_000,
                ..GeneticConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_max_wait_s(mut self, seconds: f64) -> Self {
        self.max_wait_s = seconds;
        self
    }

    pub fn with_service_time_s(mut self, seconds: f64) -> Self {
        self.service_time_s = seconds;
        self
    }

    pub fn with_closed_tour(mut self, closed: bool) -> Self {
        self.closed_tour = closed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.time_budget.is_zero() {
            return Err("time_budget must be positive".into());
        }
        if self.max_wait_s.is_nan() || self.max_wait_s < 0.0 {
            return Err("max_wait_s must be non-negative".into());
        }
        if self.service_time_s.is_nan() || self.service_time_s < 0.0 {
            return Err("service_time_s must be non-negative".into());
        }
        if self.gls.lambda.is_nan() || self.gls.lambda < 0.0 {
            return Err("gls.lambda must be non-negative".into());
        }

        let a = &self.anneal;
        if a.initial_temperature <= 0.0 || a.initial_temperature.is_nan() {
            return Err("anneal.initial_temperature must be positive".into());
        }
        if !(a.cooling_rate > 0.0 && a.cooling_rate < 1.0) {
            return Err(format!("anneal.cooling_rate must be in (0, 1), got {}", a.cooling_rate));
        }
        if a.min_temperature <= 0.0 || a.min_temperature >= a.initial_temperature {
            return Err("anneal.min_temperature must be in (0, initial_temperature)".into());
        }
        if a.iterations_per_temperature == 0 {
            return Err("anneal.iterations_per_temperature must be at least 1".into());
        }

        let g = &self.genetic;
        if g.population_size < 2 {
            return Err("genetic.population_size must be at least 2".into());
        }
        if !(0.0..1.0).contains(&g.elite_ratio) {
            return Err(format!("genetic.elite_ratio must be in [0, 1), got {}", g.elite_ratio));
        }
        if !(0.0..=1.0).contains(&g.mutation_rate) {
            return Err(format!("genetic.mutation_rate must be in [0, 1], got {}", g.mutation_rate));
        }
        if g.tournament_size == 0 {
            return Err("genetic.tournament_size must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = SequencerConfig::default();
        assert_eq!(c.time_budget, Duration::from_secs(30));
        assert_eq!(c.max_wait_s, 1_800.0);
        assert!(c.closed_tour);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_presets_valid() {
        assert!(SequencerConfig::fast().validate().is_ok());
        assert!(SequencerConfig::balanced().validate().is_ok());
        assert!(SequencerConfig::quality().validate().is_ok());
        assert!(SequencerConfig::fast().time_budget < SequencerConfig::quality().time_budget);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(SequencerConfig::default()
            .with_time_budget(Duration::ZERO)
            .validate()
            .is_err());
        assert!(SequencerConfig::default().with_max_wait_s(-1.0).validate().is_err());

        let mut c = SequencerConfig::default();
        c.anneal.cooling_rate = 1.0;
        assert!(c.validate().is_err());

        let mut c = SequencerConfig::default();
        c.genetic.population_size = 1;
        assert!(c.validate().is_err());
    }
}
