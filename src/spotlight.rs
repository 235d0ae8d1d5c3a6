use crate::catalog::{Item, Tier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Replays a fixed sequence, wrapping around at the end.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }
}

#[cfg(test)]
impl RandomSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Deterministic generator for a given seed.
pub struct SeededSource(StdRng);

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededSource {
    fn next_f64(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// Thread-local OS-seeded generator.
#[derive(Default)]
pub struct ThreadSource;

impl RandomSource for ThreadSource {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Gold and silver members are eligible for the spotlight.
pub fn qualifies(item: &Item) -> bool {
    matches!(item.tier(), Tier::Gold | Tier::Silver)
}

/// Pick 2 or 3 qualifying items without replacement.
///
/// The first draw decides the size (3 when above 0.5); each further draw picks
/// one of the remaining candidates (partial Fisher-Yates).
pub fn select<'a>(items: &'a [Item], rng: &mut dyn RandomSource) -> Vec<&'a Item> {
    let mut pool: Vec<&Item> = items.iter().filter(|i| qualifies(i)).collect();
    let size = if rng.next_f64() > 0.5 { 3 } else { 2 };
    let count = size.min(pool.len());

    for i in 0..count {
        let remaining = pool.len() - i;
        let offset = ((rng.next_f64() * remaining as f64) as usize).min(remaining - 1);
        pool.swap(i, i + offset);
    }
    pool.truncate(count);
    pool
}
