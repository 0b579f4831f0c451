use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::work::models::Polarity;

/// Probability that a simulated reaction is positive
pub const POSITIVE_REACTION_CHANCE: f64 = 0.7;

/// Source of uniform draws in `[0, 1)` for the weighted coin flip
pub trait DrawSource: Send {
    fn next_draw(&mut self) -> f64;
}

/// `draw < threshold` is positive, anything else negative
pub fn draw_polarity(draw: f64, threshold: f64) -> Polarity {
    if draw < threshold {
        Polarity::Positive
    } else {
        Polarity::Negative
    }
}

/// OS-seeded draws used in production
pub struct RandomDrawSource {
    rng: StdRng,
}

impl RandomDrawSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for RandomDrawSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSource for RandomDrawSource {
    fn next_draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Reproducible draws from a fixed seed
pub struct SeededDrawSource {
    rng: StdRng,
}

impl SeededDrawSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DrawSource for SeededDrawSource {
    fn next_draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around when exhausted
pub struct SequenceDrawSource {
    draws: Vec<f64>,
    position: usize,
}

impl SequenceDrawSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, position: 0 }
    }
}

impl DrawSource for SequenceDrawSource {
    fn next_draw(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.position % self.draws.len()];
        self.position += 1;
        draw
    }
}
