//! A population of trees built and scored together.
//!
//! # Genetic Programming
//!
//! The genetic programming process can be described as follows:
//!
//! 1. Initialise a *Population* of random trees.
//! 2. Evaluate the *Fitness* of each of the trees.
//! 3. Based on the *Fitness*, create a new generation via applying some genetic operator (e.g.
//!    Mutation, Crossover and Selection).
//! 4. If the terminal condition is met, we're done.
//! 5. GOTO 2.
//!
//! This module covers steps 1 and 2.

use crate::error::Result;
use crate::gp::expr::{Fitness, Tree};
use crate::gp::gen::{self, ConstructionInfo, Init};
use crate::gp::registry::{Registry, TypeId};
use crate::random::Random;

/// How the individuals of a new population are grown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PopulationInit {
    Grow,
    Full,
    BrettGrow,
    /// Each individual is grown with either `Grow` or `Full`, chosen by a fair coin.
    RampedHalfHalf,
    /// Each individual is grown with `Grow` (30%), otherwise `Full` (30%), otherwise `BrettGrow`.
    RampedTriHalf,
}

/// Parameters for initialising a population.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PopulationConfig {
    pub init: PopulationInit,
    pub size: usize,
    pub min_depth: usize,
    pub max_depth: usize,
    /// The type every individual's root must produce, or `None` for any type.
    pub starting_type: Option<TypeId>,
    pub terminal_chance: f64,
}

/// A set of individuals built against the same registry.
#[derive(Debug)]
pub struct Population<'r, E = ()> {
    individuals: Vec<Tree<'r, E>>,
}

// Impls.

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            init: PopulationInit::RampedHalfHalf,
            size: 100,
            min_depth: 2,
            max_depth: 6,
            starting_type: None,
            terminal_chance: ConstructionInfo::DEFAULT_TERMINAL_CHANCE,
        }
    }
}

impl PopulationInit {
    // The tree policy for the next individual.
    fn tree_init(self, rng: &mut Random) -> Init {
        match self {
            PopulationInit::Grow => Init::Grow,
            PopulationInit::Full => Init::Full,
            PopulationInit::BrettGrow => Init::BrettGrow,
            PopulationInit::RampedHalfHalf => {
                if rng.choice() {
                    Init::Grow
                } else {
                    Init::Full
                }
            }
            PopulationInit::RampedTriHalf => {
                if rng.chance(0.3) {
                    Init::Grow
                } else if rng.chance(0.3) {
                    Init::Full
                } else {
                    Init::BrettGrow
                }
            }
        }
    }
}

impl<'r, E> Population<'r, E> {
    /// Build a new population of random individuals.
    ///
    /// Each individual draws from its own generator, forked from `rng` in index order, so the
    /// whole population is reproducible from `rng`'s seed.
    #[tracing::instrument(level = "debug", skip_all, fields(
        init = ?config.init,
        size = config.size,
    ))]
    pub fn init(
        registry: &'r Registry<E>,
        rng: &mut Random,
        config: &PopulationConfig,
    ) -> Result<Self> {
        let mut individuals = Vec::with_capacity(config.size);
        for _ in 0..config.size {
            let mut tree_rng = rng.fork();
            let init = config.init.tree_init(&mut tree_rng);
            let info = ConstructionInfo::new(init).terminal_chance(config.terminal_chance);
            let tree = gen::make_tree(
                &info,
                registry,
                &mut tree_rng,
                config.min_depth,
                config.max_depth,
                config.starting_type,
            )?;
            individuals.push(tree);
        }
        Ok(Population { individuals })
    }

    /// Evaluate and score every individual, then sort the population by fitness.
    ///
    /// Individuals scored `NaN` rank below every other individual.
    ///
    /// `individual` runs whatever evaluation the problem needs (e.g. `Tree::execute` once per
    /// sample, stashing the accumulated error with `Tree::set_data`). `fitness` then scores the
    /// individual, and the score is cached on the tree.
    #[tracing::instrument(level = "debug", skip_all, fields(size = self.individuals.len()))]
    pub fn execute<I, F>(&mut self, mut individual: I, mut fitness: F)
    where
        I: FnMut(&mut Tree<'r, E>),
        F: FnMut(&Tree<'r, E>) -> Fitness,
    {
        for tree in &mut self.individuals {
            individual(tree);
            let score = fitness(tree);
            tree.set_fitness(score);
        }
        self.individuals.sort_by(|a, b| rank(a).total_cmp(&rank(b)));
    }

    /// View the current individuals.
    ///
    /// After `execute` this slice is sorted by ascending fitness.
    pub fn individuals(&self) -> &[Tree<'r, E>] {
        &self.individuals
    }

    pub fn into_individuals(self) -> Vec<Tree<'r, E>> {
        self.individuals
    }

    /// The individual with the greatest fitness.
    pub fn most_fit(&self) -> Option<&Tree<'r, E>> {
        self.individuals.last()
    }

    /// The individual with the worst fitness.
    pub fn least_fit(&self) -> Option<&Tree<'r, E>> {
        self.individuals.first()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

// Sort key. Unscored and `NaN` individuals are the least fit.
fn rank<E>(tree: &Tree<E>) -> f64 {
    match tree.fitness() {
        Some(f) if !f.fitness.is_nan() => f.fitness,
        _ => f64::NEG_INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register_type("num").unwrap();
        reg.register_function(
            "add",
            "num",
            |v: &mut Value, args: &[Value], _: &()| {
                let a = args[0].as_f64().unwrap_or(0.0);
                let b = args[1].as_f64().unwrap_or(0.0);
                *v = Value::Double(a + b);
            },
            2,
            None,
        )
        .unwrap();
        reg.register_terminal_function(
            "one",
            "num",
            |v: &mut Value, _: &[Value], _: &()| *v = Value::Double(1.0),
            None,
        )
        .unwrap();
        reg.associate_input("add", &["num", "num"]).unwrap();
        reg
    }

    #[test]
    fn ramped_trees_mix_policies() {
        let mut rng = Random::new(8);
        let mut inits = Vec::new();
        for _ in 0..64 {
            inits.push(PopulationInit::RampedTriHalf.tree_init(&mut rng));
        }
        assert!(inits.contains(&Init::Grow));
        assert!(inits.contains(&Init::Full));
        assert!(inits.contains(&Init::BrettGrow));
    }

    #[test]
    fn every_init_builds_the_requested_size() {
        let reg = registry();
        for init in [
            PopulationInit::Grow,
            PopulationInit::Full,
            PopulationInit::BrettGrow,
            PopulationInit::RampedHalfHalf,
            PopulationInit::RampedTriHalf,
        ] {
            let mut rng = Random::new(21);
            let config = PopulationConfig { init, size: 10, ..PopulationConfig::default() };
            let pop = Population::init(&reg, &mut rng, &config).unwrap();
            assert_eq!(pop.len(), 10);
            assert!(pop.individuals().iter().all(|t| t.depth() <= config.max_depth));
        }
    }

    #[test]
    fn execute_sorts_by_fitness() {
        let reg = registry();
        let mut rng = Random::new(4);
        let config = PopulationConfig { size: 20, ..PopulationConfig::default() };
        let mut pop = Population::init(&reg, &mut rng, &config).unwrap();
        // Every leaf is `one`, so the sum is the number of leaves.
        pop.execute(
            |tree| {
                tree.execute(&());
            },
            |tree| Fitness { fitness: tree.value().as_f64().unwrap_or(0.0), hits: 0 },
        );
        let scores = pop
            .individuals()
            .iter()
            .map(|t| t.fitness().map(|f| f.fitness).unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        let best = pop.most_fit().unwrap();
        assert_eq!(best.value().as_f64(), Some(scores[scores.len() - 1]));
        assert!(pop.least_fit().unwrap().fitness().is_some());
    }

    #[test]
    fn nan_fitness_ranks_least_fit() {
        let reg = registry();
        let mut rng = Random::new(9);
        let config = PopulationConfig {
            init: PopulationInit::Grow,
            size: 200,
            ..PopulationConfig::default()
        };
        let mut pop = Population::init(&reg, &mut rng, &config).unwrap();
        let mut scored = 0;
        pop.execute(
            |_| {},
            |_| {
                scored += 1;
                let fitness = if scored % 3 == 0 { f64::NAN } else { -(scored as f64) };
                Fitness { fitness, hits: 0 }
            },
        );
        let scores = pop
            .individuals()
            .iter()
            .map(|t| t.fitness().unwrap().fitness)
            .collect::<Vec<_>>();
        let nans = scores.iter().take_while(|f| f.is_nan()).count();
        assert_eq!(nans, 200 / 3);
        assert!(scores[nans..].iter().all(|f| !f.is_nan()));
        assert!(scores[nans..].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(pop.most_fit().unwrap().fitness().unwrap().fitness, -1.0);
        assert!(pop.least_fit().unwrap().fitness().unwrap().fitness.is_nan());
    }

    #[test]
    fn empty_population_has_no_best() {
        let reg = registry();
        let mut rng = Random::new(4);
        let config = PopulationConfig { size: 0, ..PopulationConfig::default() };
        let pop = Population::init(&reg, &mut rng, &config).unwrap();
        assert!(pop.is_empty());
        assert!(pop.most_fit().is_none());
    }
}
