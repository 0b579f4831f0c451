use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Database model for works table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkModel {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub language: String,
    pub positive_count: i64, // Maintained by reaction lifecycle only
    pub negative_count: i64,
    pub created_at: DateTime<Utc>,
}

impl WorkModel {
    pub fn new(author_id: String, title: String, content: String, language: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author_id,
            title,
            content,
            language,
            positive_count: 0,
            negative_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Age of the work in fractional days at `as_of`
    pub fn age_in_days(&self, as_of: DateTime<Utc>) -> f64 {
        (as_of - self.created_at).num_milliseconds() as f64 / MILLIS_PER_DAY
    }

    pub(crate) fn apply_delta(&mut self, polarity: Polarity, delta: i64) {
        let counter = match polarity {
            Polarity::Positive => &mut self.positive_count,
            Polarity::Negative => &mut self.negative_count,
        };
        *counter = (*counter + delta).max(0);
    }
}

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Reaction polarity, stored as `like` / `dislike`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Polarity {
    #[serde(rename = "like")]
    #[strum(serialize = "like")]
    Positive,
    #[serde(rename = "dislike")]
    #[strum(serialize = "dislike")]
    Negative,
}

/// Database model for reactions table. Unique per (work_id, reactor_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionModel {
    pub work_id: String,
    pub reactor_id: String,
    pub polarity: Polarity,
    pub created_at: DateTime<Utc>,
}

impl ReactionModel {
    pub fn new(work_id: String, reactor_id: String, polarity: Polarity) -> Self {
        Self {
            work_id,
            reactor_id,
            polarity,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of an upsert-or-reject reaction write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Inserted,
    Replaced { previous: Polarity },
    Unchanged,
}
