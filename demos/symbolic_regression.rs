//! Demonstrates building and scoring a population of programs for symbolic regression.
//!
//! 1. What is the "Terminal Set"?
//!
//! - The input `x`.
//! - Random constants in the range -1..1.
//!
//! 2. What is the "Function Set"?
//!
//! - `+` `-` `*` `/` (division by zero yields zero)
//! - `sin` `cos` `exp` `log` (log of zero yields zero)
//!
//! 3. What is the "Fitness Measure"?
//!
//! - `1 / (1 + mean absolute error)` over samples of the target `x^4 + x^3 + x^2 + x`.
//! - Hits are the samples guessed within `0.01`.
//!
//! Set `RUST_LOG=typegp=debug` to watch the trees being built.

use tracing_subscriber::EnvFilter;
use typegp::{Fitness, Population, PopulationConfig, PopulationInit, Random, Registry, Value};

// Constants.

const SEED: u64 = 691;
const SAMPLES: usize = 20;
const POPULATION_SIZE: usize = 500;
const MIN_DEPTH: usize = 2;
const MAX_DEPTH: usize = 6;
const HIT_TOLERANCE: f64 = 0.01;

fn target(x: f64) -> f64 {
    x * x * x * x + x * x * x + x * x + x
}

fn arg(args: &[Value], i: usize) -> f64 {
    args[i].as_f64().unwrap_or(0.0)
}

fn unary(registry: &mut Registry<f64>, name: &str, f: fn(f64) -> f64) -> typegp::Result<()> {
    let call = move |out: &mut Value, args: &[Value], _: &f64| {
        *out = Value::Double(f(arg(args, 0)));
    };
    registry.register_function(name, "num", call, 1, None)?;
    registry.associate_input(name, &["num"])?;
    Ok(())
}

fn binary(registry: &mut Registry<f64>, name: &str, f: fn(f64, f64) -> f64) -> typegp::Result<()> {
    let call = move |out: &mut Value, args: &[Value], _: &f64| {
        *out = Value::Double(f(arg(args, 0), arg(args, 1)));
    };
    registry.register_function(name, "num", call, 2, None)?;
    registry.associate_input(name, &["num", "num"])?;
    Ok(())
}

/// The function set and terminal set of the problem.
fn registry() -> typegp::Result<Registry<f64>> {
    let mut registry = Registry::new();
    registry.register_type("num")?;

    binary(&mut registry, "add", |a, b| a + b)?;
    binary(&mut registry, "sub", |a, b| a - b)?;
    binary(&mut registry, "mul", |a, b| a * b)?;
    binary(&mut registry, "div", |a, b| if b == 0.0 { 0.0 } else { a / b })?;
    unary(&mut registry, "sin", f64::sin)?;
    unary(&mut registry, "cos", f64::cos)?;
    unary(&mut registry, "exp", f64::exp)?;
    unary(&mut registry, "log", |a| if a == 0.0 { 0.0 } else { a.abs().ln() })?;

    registry.register_terminal_function(
        "x",
        "num",
        |out: &mut Value, _: &[Value], x: &f64| *out = Value::Double(*x),
        None,
    )?;
    registry.register_terminal_function(
        "const",
        "num",
        |_: &mut Value, _: &[Value], _: &f64| {},
        Some(Box::new(|out: &mut Value, rng: &mut Random| {
            *out = Value::Double(rng.random_double(-1.0, 1.0));
        })),
    )?;

    Ok(registry)
}

// Exe.

fn main() -> typegp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = registry()?;
    let num = registry.type_id("num")?;
    let samples = (0..SAMPLES)
        .map(|i| -1.0 + 2.0 * i as f64 / (SAMPLES - 1) as f64)
        .collect::<Vec<_>>();

    println!("Initialising population...");

    let mut rng = Random::new(SEED);
    let config = PopulationConfig {
        init: PopulationInit::RampedHalfHalf,
        size: POPULATION_SIZE,
        min_depth: MIN_DEPTH,
        max_depth: MAX_DEPTH,
        starting_type: Some(num),
        ..PopulationConfig::default()
    };
    let mut population = Population::init(&registry, &mut rng, &config)?;

    println!("Evaluating population...");

    let start = std::time::Instant::now();
    population.execute(
        |tree| {
            let mut error = 0.0;
            let mut hits = 0u64;
            for &x in &samples {
                let (value, _) = tree.execute(&x);
                let diff = (value.as_f64().unwrap_or(0.0) - target(x)).abs();
                if diff <= HIT_TOLERANCE {
                    hits += 1;
                }
                error += if diff.is_finite() { diff } else { f64::MAX / SAMPLES as f64 };
            }
            tree.set_data((error / SAMPLES as f64, hits));
        },
        |tree| {
            let &(error, hits) = tree.data::<(f64, u64)>().unwrap_or(&(f64::MAX, 0));
            Fitness { fitness: 1.0 / (1.0 + error), hits }
        },
    );
    println!("Evaluation duration: {:?}", start.elapsed());

    let sum: f64 = population
        .individuals()
        .iter()
        .filter_map(|tree| tree.fitness())
        .map(|f| f.fitness)
        .sum();
    println!("Average fitness: {:?}", sum / population.len() as f64);

    if let Some(fittest) = population.most_fit() {
        println!(
            "Fittest expression ({:?}, depth {}, {} nodes):\n{}",
            fittest.fitness(),
            fittest.depth(),
            fittest.node_count(),
            fittest,
        );
    }
    Ok(())
}
