mod common;

use pretty_assertions::assert_eq;
use typegp::{Fitness, Population, PopulationConfig, PopulationInit, Random};

fn signatures(pop: &Population) -> Vec<String> {
    pop.individuals().iter().map(|tree| tree.to_string()).collect()
}

#[test]
fn populations_are_reproducible_from_the_master_seed() {
    let reg = common::typed();
    let config = PopulationConfig {
        init: PopulationInit::RampedTriHalf,
        size: 25,
        ..PopulationConfig::default()
    };
    let a = Population::init(&reg, &mut Random::new(2024), &config).unwrap();
    let b = Population::init(&reg, &mut Random::new(2024), &config).unwrap();
    let c = Population::init(&reg, &mut Random::new(2025), &config).unwrap();
    assert_eq!(signatures(&a), signatures(&b));
    assert!(signatures(&a) != signatures(&c));
}

#[test]
fn starting_type_constrains_every_root() {
    let reg = common::typed();
    let boolean = reg.type_id("bool").unwrap();
    let config = PopulationConfig {
        size: 30,
        starting_type: Some(boolean),
        ..PopulationConfig::default()
    };
    let pop = Population::init(&reg, &mut Random::new(5), &config).unwrap();
    assert!(pop.individuals().iter().all(|tree| tree.output_type() == boolean));
}

#[test]
fn regression_fitness_over_samples() {
    let reg = common::typed();
    let num = reg.type_id("num").unwrap();
    let config = PopulationConfig {
        init: PopulationInit::RampedHalfHalf,
        size: 40,
        starting_type: Some(num),
        ..PopulationConfig::default()
    };
    let mut pop = Population::init(&reg, &mut Random::new(31), &config).unwrap();
    pop.execute(
        |tree| {
            let (value, _) = tree.execute(&());
            let error = (value.as_f64().unwrap_or(0.0) - 9.0).abs();
            tree.set_data(error);
        },
        |tree| {
            let error = tree.data::<f64>().cloned().unwrap_or(f64::INFINITY);
            Fitness { fitness: 1.0 / (1.0 + error), hits: (error == 0.0) as u64 }
        },
    );
    let best = pop.most_fit().unwrap().fitness().unwrap();
    let worst = pop.least_fit().unwrap().fitness().unwrap();
    assert!(best.fitness >= worst.fitness);
    assert!(pop.individuals().iter().all(|tree| tree.fitness().is_some()));
}
