use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

use crate::shared::AppError;

/// Trailing window a ranking is computed over
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PeriodKind {
    Day,
    Week,
    Month,
}

impl PeriodKind {
    pub fn window_days(&self) -> i64 {
        match self {
            PeriodKind::Day => 1,
            PeriodKind::Week => 7,
            PeriodKind::Month => 30,
        }
    }

    /// Parses a client-supplied period; anything but day/week/month is rejected
    pub fn parse(value: &str) -> Result<Self, AppError> {
        PeriodKind::from_str(value).map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid type '{}'. Must be day, week, or month",
                value
            ))
        })
    }
}

/// Time span a score is computed over: `[as_of - window_days, as_of]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWindow {
    pub window_days: i64,
    pub as_of: DateTime<Utc>,
}

impl ScoringWindow {
    pub fn new(window_days: i64, as_of: DateTime<Utc>) -> Result<Self, AppError> {
        if window_days <= 0 {
            return Err(AppError::BadRequest(format!(
                "Window must span at least one day, got {}",
                window_days
            )));
        }
        Ok(Self { window_days, as_of })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.as_of - chrono::Duration::days(self.window_days)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start() && instant <= self.as_of
    }
}

/// One entry of a computed ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedContributor {
    pub contributor_id: String,
    pub score: f64,
}

/// Database model for awards table. Unique per (contributor, period_kind, period_date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardModel {
    pub id: String,
    pub contributor_id: String,
    pub period_kind: PeriodKind,
    pub period_date: NaiveDate,
    pub rank: i32,
    pub score: f64,
}

impl AwardModel {
    /// Builds an award whose id is derived from its natural key, so a
    /// recomputation with the same inputs yields identical rows
    pub fn new(
        contributor_id: String,
        period_kind: PeriodKind,
        period_date: NaiveDate,
        rank: i32,
        score: f64,
    ) -> Self {
        Self {
            id: format!("{}:{}:{}", period_kind, period_date, contributor_id),
            contributor_id,
            period_kind,
            period_date,
            rank,
            score,
        }
    }
}
