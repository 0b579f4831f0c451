use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{AwardModel, PeriodKind, RankedContributor},
    repository::AwardRepository,
};
use crate::shared::AppError;

/// Awards kept per period by the persisting paths
pub const AWARDED_TOP_N: usize = 3;

/// Result of one period's reconciliation. `errors` is empty on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub awarded: u64,
    pub errors: Vec<String>,
}

/// Turns a ranking into the persisted award set of one period
pub struct AwardReconciler {
    repository: Arc<dyn AwardRepository>,
}

impl AwardReconciler {
    pub fn new(repository: Arc<dyn AwardRepository>) -> Self {
        Self { repository }
    }

    /// Replaces the awards of `(kind, date)` with the first `top_n` entries of
    /// `ranked`. Idempotent: the same inputs always leave the same rows.
    ///
    /// Store failures are reported in the outcome, not returned; the previous
    /// award set stays in place when the replace fails.
    #[instrument(skip(self, ranked), fields(period = %kind, ranked = ranked.len()))]
    pub async fn reconcile_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
        ranked: &[RankedContributor],
        top_n: usize,
    ) -> ReconcileOutcome {
        let awards: Vec<AwardModel> = ranked
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(index, entry)| {
                AwardModel::new(
                    entry.contributor_id.clone(),
                    kind,
                    date,
                    index as i32 + 1,
                    entry.score,
                )
            })
            .collect();

        match self.repository.replace_awards(kind, date, &awards).await {
            Ok(awarded) => {
                info!(%date, awarded, "Awards reconciled");
                ReconcileOutcome {
                    awarded,
                    errors: Vec::new(),
                }
            }
            Err(err) => {
                warn!(%date, error = %err, "Award reconciliation failed");
                ReconcileOutcome {
                    awarded: 0,
                    errors: vec![err.to_string()],
                }
            }
        }
    }

    pub async fn current_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
    ) -> Result<Vec<AwardModel>, AppError> {
        self.repository.list_awards(kind, date).await
    }
}
