//! The seeded random number generator threaded through tree construction.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

/// A deterministic, re-seedable random number generator.
///
/// Every randomised decision made while building trees goes through an instance of this type.
/// Two generators created from the same seed produce the same stream of values.
#[derive(Clone, Debug)]
pub struct Random {
    seed: u64,
    engine: XorShiftRng,
}

impl Random {
    /// Create a new generator from the given seed.
    pub fn new(seed: u64) -> Self {
        let engine = XorShiftRng::seed_from_u64(seed);
        Random { seed, engine }
    }

    /// The seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from the original seed.
    pub fn reset(&mut self) {
        self.engine = XorShiftRng::seed_from_u64(self.seed);
    }

    /// A fair coin flip.
    pub fn choice(&mut self) -> bool {
        self.engine.gen()
    }

    /// Returns `true` with the given probability.
    ///
    /// `0.0` never succeeds and `1.0` always does.
    pub fn chance(&mut self, chance: f64) -> bool {
        self.random_double(0.0, 1.0) < chance
    }

    /// A float in `[min, max)`.
    ///
    /// Returns `min` when the range is empty or either bound is not finite.
    pub fn random_float(&mut self, min: f32, max: f32) -> f32 {
        if min >= max || !min.is_finite() || !max.is_finite() {
            return min;
        }
        if !(max - min).is_finite() {
            // The width overflows, so interpolate between the bounds instead.
            let t: f32 = self.engine.gen();
            return (min * (1.0 - t) + max * t).max(min).min(max);
        }
        self.engine.gen_range(min..max)
    }

    /// A double in `[min, max)`.
    ///
    /// Returns `min` when the range is empty or either bound is not finite.
    pub fn random_double(&mut self, min: f64, max: f64) -> f64 {
        if min >= max || !min.is_finite() || !max.is_finite() {
            return min;
        }
        if !(max - min).is_finite() {
            // The width overflows, so interpolate between the bounds instead.
            let t: f64 = self.engine.gen();
            return (min * (1.0 - t) + max * t).max(min).min(max);
        }
        self.engine.gen_range(min..max)
    }

    /// An integer in `[min, max]`.
    pub fn random_long(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.engine.gen_range(min..=max)
    }

    /// An integer in `[min, max]`.
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.engine.gen_range(min..=max)
    }

    /// An index in `[0, len)`.
    ///
    /// `len` must be non-zero.
    pub fn random_index(&mut self, len: usize) -> usize {
        self.engine.gen_range(0..len)
    }

    /// Pick an element uniformly at random, or `None` if the slice is empty.
    pub fn select<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.engine)
    }

    /// A new generator seeded from the next value of this one.
    ///
    /// Forking in a fixed order (e.g. once per individual) keeps the child streams reproducible
    /// from the parent's seed, independently of the order in which the children are consumed.
    pub fn fork(&mut self) -> Random {
        Random::new(self.engine.gen())
    }
}

impl RngCore for Random {
    fn next_u32(&mut self) -> u32 {
        self.engine.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.engine.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.engine.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.engine.try_fill_bytes(dest)
    }
}
