use serde::{Deserialize, Serialize};

use super::models::{Polarity, ReactionChange};

/// Request payload for submitting a new work
#[derive(Debug, Deserialize)]
pub struct SubmitWorkRequest {
    pub author_id: String,
    pub title: String,
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "english".to_string()
}

/// Request payload for reacting to a work.
/// Identity comes from the body since authentication is handled upstream.
#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub contributor_id: String,
    pub polarity: Polarity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub work_id: String,
    pub contributor_id: String,
    pub polarity: Option<Polarity>,
    pub change: String,
    pub positive_count: i64,
    pub negative_count: i64,
}

pub(crate) fn change_label(change: ReactionChange) -> &'static str {
    match change {
        ReactionChange::Inserted => "inserted",
        ReactionChange::Replaced { .. } => "replaced",
        ReactionChange::Unchanged => "unchanged",
    }
}
