//! Genetic algorithm over tour permutations.

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::GeneticConfig;
use super::evaluator::RouteProblem;
use super::operators::{order_crossover, swap_mutation};
use super::types::{SearchOutcome, StopCondition};
use crate::random::shuffle;

#[derive(Debug, Clone)]
struct Individual {
    tour: Vec<usize>,
    cost: f64,
}

/// Evolves a population seeded with `seed_tour` plus random permutations.
///
/// Each generation keeps the elite unchanged and breeds the rest through
/// tournament selection, order crossover and a low-probability swap
/// mutation. Fitness is the penalized tour length. Runs for
/// `config.generations` or until `stop` fires.
pub fn evolve<R: Rng>(
    problem: &RouteProblem<'_>,
    seed_tour: Vec<usize>,
    config: &GeneticConfig,
    rng: &mut R,
    stop: &StopCondition,
) -> SearchOutcome {
    let seed_cost = problem.penalized_cost(&seed_tour);
    if seed_tour.len() < 2 {
        return SearchOutcome {
            tour: seed_tour,
            cost: seed_cost,
            iterations: 0,
            interrupted: false,
        };
    }

    // 1. Initial population
    let mut population = Vec::with_capacity(config.population_size);
    population.push(Individual {
        tour: seed_tour.clone(),
        cost: seed_cost,
    });
    while population.len() < config.population_size {
        let mut tour = seed_tour.clone();
        shuffle(&mut tour, rng);
        population.push(Individual {
            tour,
            cost: f64::INFINITY,
        });
    }
    evaluate(problem, &mut population[1..], config.parallel);

    let mut best = population[0].clone();
    let elite_count = ((config.population_size as f64 * config.elite_ratio).round() as usize)
        .clamp(1, config.population_size);
    let mut generations = 0;
    let mut interrupted = false;

    // 2. Evolutionary loop
    for _ in 0..config.generations {
        if stop.should_stop() {
            interrupted = true;
            break;
        }

        population.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        let mut next: Vec<Individual> = population[..elite_count].to_vec();

        while next.len() < config.population_size {
            let p1 = tournament(&population, config.tournament_size, rng);
            let p2 = tournament(&population, config.tournament_size, rng);
            let mut tour = order_crossover(&population[p1].tour, &population[p2].tour, rng);
            if rng.random_bool(config.mutation_rate) {
                swap_mutation(&mut tour, rng);
            }
            next.push(Individual {
                tour,
                cost: f64::INFINITY,
            });
        }

        evaluate(problem, &mut next[elite_count..], config.parallel);
        population = next;
        generations += 1;

        if let Some(champion) = population.iter().min_by(|a, b| a.cost.total_cmp(&b.cost)) {
            if champion.cost < best.cost {
                best = champion.clone();
            }
        }
    }

    SearchOutcome {
        tour: best.tour,
        cost: best.cost,
        iterations: generations,
        interrupted,
    }
}

fn tournament<R: Rng>(population: &[Individual], size: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..population.len());
    for _ in 1..size {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].cost < population[winner].cost {
            winner = challenger;
        }
    }
    winner
}

#[cfg(feature = "parallel")]
fn evaluate(problem: &RouteProblem<'_>, individuals: &mut [Individual], parallel: bool) {
    if parallel {
        individuals
            .par_iter_mut()
            .for_each(|ind| ind.cost = problem.penalized_cost(&ind.tour));
    } else {
        evaluate_serial(problem, individuals);
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate(problem: &RouteProblem<'_>, individuals: &mut [Individual], _parallel: bool) {
    evaluate_serial(problem, individuals);
}

fn evaluate_serial(problem: &RouteProblem<'_>, individuals: &mut [Individual]) {
    for ind in individuals.iter_mut() {
        ind.cost = problem.penalized_cost(&ind.tour);
    }
}
