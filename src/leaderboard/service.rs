use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{PeriodKind, RankedContributor},
    reconciler::{AwardReconciler, ReconcileOutcome, AWARDED_TOP_N},
    repository::AwardRepository,
    scorer::Scorer,
    scoring::ScoringVariant,
    types::{LeaderboardEntry, LeaderboardUpdateReport, PeriodUpdate},
};
use crate::{
    contributor::{models::ContributorModel, repository::ContributorRepository},
    shared::AppError,
    work::repository::WorkRepository,
};

/// Entries shown by the live, non-persisted ranking
pub const LIVE_TOP_N: usize = 10;

/// Leaderboard reads and award recomputation.
///
/// The live view ranks with `DecayWeighted`; every path that persists awards
/// ranks with `FlatBonus`. Award recomputation for one period kind runs one
/// at a time, whichever caller (scheduler loop or HTTP) starts it.
pub struct LeaderboardService {
    contributors: Arc<dyn ContributorRepository>,
    awards: Arc<dyn AwardRepository>,
    live_scorer: Scorer,
    award_scorer: Scorer,
    reconciler: AwardReconciler,
    reconcile_locks: HashMap<PeriodKind, Mutex<()>>,
}

impl LeaderboardService {
    pub fn new(
        contributors: Arc<dyn ContributorRepository>,
        works: Arc<dyn WorkRepository>,
        awards: Arc<dyn AwardRepository>,
    ) -> Self {
        Self {
            live_scorer: Scorer::new(
                Arc::clone(&contributors),
                Arc::clone(&works),
                ScoringVariant::DecayWeighted,
            ),
            award_scorer: Scorer::new(Arc::clone(&contributors), works, ScoringVariant::FlatBonus),
            reconciler: AwardReconciler::new(Arc::clone(&awards)),
            reconcile_locks: PeriodKind::iter().map(|kind| (kind, Mutex::new(()))).collect(),
            contributors,
            awards,
        }
    }

    /// Last persisted awards for `kind`; never recomputes
    #[instrument(skip(self))]
    pub async fn list_awards(&self, kind: PeriodKind) -> Result<Vec<LeaderboardEntry>, AppError> {
        let awards = self.awards.list_latest_awards(kind).await?;
        let ids: Vec<String> = awards.iter().map(|a| a.contributor_id.clone()).collect();
        let profiles = self.profiles(&ids).await?;

        Ok(awards
            .into_iter()
            .filter_map(|award| {
                let Some(contributor) = profiles.get(&award.contributor_id) else {
                    warn!(contributor_id = %award.contributor_id, "Award references unknown contributor");
                    return None;
                };
                Some(entry(award.rank, contributor, award.score, award.period_date))
            })
            .collect())
    }

    /// Ad hoc decay-weighted ranking, top 10, nothing persisted.
    /// Scores are rounded for display.
    #[instrument(skip(self))]
    pub async fn windowed_ranking(
        &self,
        kind: PeriodKind,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let mut ranking = self
            .live_scorer
            .compute_ranking(kind.window_days(), as_of)
            .await?;
        ranking.truncate(LIVE_TOP_N);

        let ids: Vec<String> = ranking.iter().map(|r| r.contributor_id.clone()).collect();
        let profiles = self.profiles(&ids).await?;
        let period_date = as_of.date_naive();

        Ok(ranking
            .iter()
            .enumerate()
            .filter_map(|(index, ranked)| {
                profiles.get(&ranked.contributor_id).map(|contributor| {
                    entry(index as i32 + 1, contributor, ranked.score.round(), period_date)
                })
            })
            .collect())
    }

    /// Recomputes and persists the awards of one period dated `as_of`'s day
    #[instrument(skip(self))]
    pub async fn update_period(
        &self,
        kind: PeriodKind,
        as_of: DateTime<Utc>,
        top_n: usize,
    ) -> PeriodUpdate {
        // Held from ranking through the replace
        let _reconciling = match self.reconcile_locks.get(&kind) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };
        debug!(period = %kind, "Reconcile lock acquired");

        let ranking = match self
            .award_scorer
            .compute_ranking(kind.window_days(), as_of)
            .await
        {
            Ok(ranking) => ranking,
            Err(err) => {
                warn!(period = %kind, error = %err, "Ranking failed, awards left untouched");
                return PeriodUpdate {
                    period_date: None,
                    outcome: ReconcileOutcome {
                        awarded: 0,
                        errors: vec![err.to_string()],
                    },
                    top: Vec::new(),
                };
            }
        };

        let period_date = as_of.date_naive();
        let outcome = self
            .reconciler
            .reconcile_awards(kind, period_date, &ranking, top_n)
            .await;
        let top: Vec<RankedContributor> = ranking.into_iter().take(top_n).collect();

        PeriodUpdate {
            period_date: Some(period_date),
            outcome,
            top,
        }
    }

    /// Recomputes day, week and month awards independently
    #[instrument(skip(self))]
    pub async fn update_leaderboards(&self, as_of: DateTime<Utc>) -> LeaderboardUpdateReport {
        let mut periods = BTreeMap::new();
        for kind in PeriodKind::iter() {
            let update = self.update_period(kind, as_of, AWARDED_TOP_N).await;
            periods.insert(kind.to_string(), update);
        }

        let success = periods.values().all(|update| update.outcome.errors.is_empty());
        info!(success, "Leaderboard update finished");

        LeaderboardUpdateReport { success, periods }
    }

    async fn profiles(&self, ids: &[String]) -> Result<HashMap<String, ContributorModel>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let contributors = self.contributors.get_contributors(ids).await?;
        Ok(contributors
            .into_iter()
            .map(|contributor| (contributor.id.clone(), contributor))
            .collect())
    }
}

fn entry(
    rank: i32,
    contributor: &ContributorModel,
    score: f64,
    period_date: chrono::NaiveDate,
) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        contributor_id: contributor.id.clone(),
        username: contributor.username.clone(),
        display_name: contributor.display_name.clone(),
        avatar_url: contributor.avatar_url.clone(),
        is_synthetic: contributor.is_synthetic,
        score,
        period_date,
    }
}
