use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::models::ScoringWindow;
use crate::work::WorkModel;

/// Constants for the two scoring formulas
pub mod weights {
    /// Floor for the recency multiplier; in-window works never drop to zero
    pub const MIN_DECAY_WEIGHT: f64 = 0.1;
    /// Flat points per qualifying work in the decay-weighted formula
    pub const DECAY_ENGAGEMENT_BONUS: f64 = 2.0;
    /// Flat points per qualifying work in the flat-bonus formula
    pub const FLAT_WORK_BONUS: f64 = 10.0;
}

/// Recency multiplier in `[0.1, 1.0]`: 1.0 for a work created at the
/// cutoff instant, falling linearly to the floor at the window boundary.
pub fn decay_weight(age_days: f64, window_days: f64) -> f64 {
    (1.0 - age_days / window_days).clamp(weights::MIN_DECAY_WEIGHT, 1.0)
}

/// A formula turning one contributor's in-window works into a score
pub trait ScoringStrategy: Send + Sync {
    /// `works` are already restricted to `window`
    fn score(&self, works: &[WorkModel], window: &ScoringWindow) -> f64;

    fn strategy_name(&self) -> &'static str;
}

/// `Σ positive × decay_weight + 2 × works`. Backs the live windowed query.
pub struct DecayWeightedStrategy;

impl ScoringStrategy for DecayWeightedStrategy {
    fn score(&self, works: &[WorkModel], window: &ScoringWindow) -> f64 {
        let window_days = window.window_days as f64;
        let weighted: f64 = works
            .iter()
            .map(|work| {
                let weight = decay_weight(work.age_in_days(window.as_of), window_days);
                work.positive_count as f64 * weight
            })
            .sum();

        weighted + works.len() as f64 * weights::DECAY_ENGAGEMENT_BONUS
    }

    fn strategy_name(&self) -> &'static str {
        "DecayWeighted"
    }
}

/// `Σ positive + 10 × works`, no recency decay. Backs the award-writing paths.
pub struct FlatBonusStrategy;

impl ScoringStrategy for FlatBonusStrategy {
    fn score(&self, works: &[WorkModel], _window: &ScoringWindow) -> f64 {
        let likes: i64 = works.iter().map(|work| work.positive_count).sum();
        likes as f64 + works.len() as f64 * weights::FLAT_WORK_BONUS
    }

    fn strategy_name(&self) -> &'static str {
        "FlatBonus"
    }
}

/// Named scoring variants. Callers pick one explicitly; the two are not
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringVariant {
    DecayWeighted,
    FlatBonus,
}

impl ScoringVariant {
    pub fn strategy(&self) -> Arc<dyn ScoringStrategy> {
        match self {
            ScoringVariant::DecayWeighted => Arc::new(DecayWeightedStrategy),
            ScoringVariant::FlatBonus => Arc::new(FlatBonusStrategy),
        }
    }
}
