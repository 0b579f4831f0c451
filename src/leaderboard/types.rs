use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{models::RankedContributor, reconciler::ReconcileOutcome};

/// Query string for leaderboard reads: `?type=day|week|month`
#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One row of a leaderboard view, joined with contributor display data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub contributor_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_synthetic: bool,
    pub score: f64,
    pub period_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// Outcome of recomputing one period's awards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodUpdate {
    pub period_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
    pub top: Vec<RankedContributor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardUpdateReport {
    pub success: bool,
    pub periods: BTreeMap<String, PeriodUpdate>,
}
