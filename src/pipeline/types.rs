use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::contributor::SyntheticStats;
use crate::engagement::ReactionTally;
use crate::leaderboard::types::PeriodUpdate;

/// A work created by the generation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkSummary {
    pub work_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyPipelineReport {
    pub success: bool,
    pub duration_ms: u64,
    /// One key per variant; `None` when that variant produced nothing this run
    pub works_generated: BTreeMap<String, Option<GeneratedWorkSummary>>,
    pub generation_errors: BTreeMap<String, String>,
    pub reactions_added: BTreeMap<String, ReactionTally>,
    pub reactions_inserted: u64,
    pub reaction_errors: BTreeMap<String, String>,
    pub awards: PeriodUpdate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReactionsRunReport {
    pub success: bool,
    pub reactions_added: BTreeMap<String, ReactionTally>,
    pub reactions_inserted: u64,
    pub reaction_errors: BTreeMap<String, String>,
    pub stats: BTreeMap<String, SyntheticStats>,
}
