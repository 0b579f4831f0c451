use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{
    models::{RankedContributor, ScoringWindow},
    scoring::{ScoringStrategy, ScoringVariant},
};
use crate::{
    contributor::repository::ContributorRepository, shared::AppError,
    work::repository::WorkRepository,
};

/// Works fetches in flight at once while ranking
pub const RANKING_FETCH_CONCURRENCY: usize = 8;

/// Ranks non-synthetic contributors over a trailing window with one
/// scoring strategy.
pub struct Scorer {
    contributors: Arc<dyn ContributorRepository>,
    works: Arc<dyn WorkRepository>,
    strategy: Arc<dyn ScoringStrategy>,
}

impl Scorer {
    pub fn new(
        contributors: Arc<dyn ContributorRepository>,
        works: Arc<dyn WorkRepository>,
        variant: ScoringVariant,
    ) -> Self {
        Self {
            contributors,
            works,
            strategy: variant.strategy(),
        }
    }

    /// Scores every eligible contributor over `[as_of - window_days, as_of]`.
    ///
    /// Ordered by score descending, then contributor id ascending. Scores of
    /// zero or less are dropped. A failed works fetch skips that contributor
    /// only.
    #[instrument(skip(self), fields(strategy = self.strategy.strategy_name()))]
    pub async fn compute_ranking(
        &self,
        window_days: i64,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<RankedContributor>, AppError> {
        let window = ScoringWindow::new(window_days, as_of)?;
        let eligible = self.contributors.list_contributors(false).await?;

        let fetched: Vec<_> = stream::iter(eligible.iter())
            .map(|contributor| async move {
                let result = self
                    .works
                    .list_works_by_author(&contributor.id, Some(window.start()))
                    .await;
                (contributor.id.as_str(), result)
            })
            .buffered(RANKING_FETCH_CONCURRENCY)
            .boxed()
            .collect()
            .await;

        let mut ranking = Vec::new();
        for (contributor_id, result) in fetched {
            let works = match result {
                Ok(works) => works,
                Err(err) => {
                    warn!(contributor_id = %contributor_id, error = %err, "Skipping contributor, works fetch failed");
                    continue;
                }
            };

            let in_window: Vec<_> = works
                .into_iter()
                .filter(|work| window.contains(work.created_at))
                .collect();
            let score = self.strategy.score(&in_window, &window);

            if score > 0.0 {
                ranking.push(RankedContributor {
                    contributor_id: contributor_id.to_string(),
                    score,
                });
            }
        }

        sort_ranking(&mut ranking);
        debug!(ranked = ranking.len(), eligible = eligible.len(), "Ranking computed");
        Ok(ranking)
    }
}

/// Score descending, then contributor id ascending
pub fn sort_ranking(ranking: &mut [RankedContributor]) {
    ranking.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.contributor_id.cmp(&b.contributor_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributor::{
        models::{ContributorModel, SyntheticVariant},
        repository::InMemoryContributorRepository,
    };
    use crate::work::{
        models::{Polarity, ReactionChange, ReactionModel, WorkModel},
        repository::InMemoryWorkRepository,
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn contributor(id: &str) -> ContributorModel {
        let mut contributor = ContributorModel::new(format!("user_{}", id), None);
        contributor.id = id.to_string();
        contributor
    }

    fn work(author_id: &str, positive: i64, age: Duration, as_of: DateTime<Utc>) -> WorkModel {
        let mut work = WorkModel::new(author_id.into(), "t".into(), "c".into(), "english".into());
        work.positive_count = positive;
        work.created_at = as_of - age;
        work
    }

    async fn scorer_with(
        contributors: Vec<ContributorModel>,
        works: Vec<WorkModel>,
        variant: ScoringVariant,
    ) -> Scorer {
        let work_repo = Arc::new(InMemoryWorkRepository::new());
        for work in &works {
            work_repo.create_work(work).await.unwrap();
        }
        Scorer::new(
            Arc::new(InMemoryContributorRepository::with_contributors(contributors)),
            work_repo,
            variant,
        )
    }

    #[tokio::test]
    async fn test_ranking_orders_by_score_then_id() {
        let as_of = Utc::now();
        let scorer = scorer_with(
            vec![contributor("b"), contributor("a"), contributor("c")],
            vec![
                work("b", 5, Duration::zero(), as_of),
                work("a", 5, Duration::zero(), as_of),
                work("c", 9, Duration::zero(), as_of),
            ],
            ScoringVariant::DecayWeighted,
        )
        .await;

        let ranking = scorer.compute_ranking(1, as_of).await.unwrap();
        let ids: Vec<_> = ranking.iter().map(|r| r.contributor_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!((ranking[1].score - 7.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ranking_is_deterministic() {
        let as_of = Utc::now();
        let scorer = scorer_with(
            (0..6).map(|i| contributor(&format!("c{}", i))).collect(),
            (0..6)
                .map(|i| work(&format!("c{}", i), i % 2, Duration::hours(i), as_of))
                .collect(),
            ScoringVariant::DecayWeighted,
        )
        .await;

        let first = scorer.compute_ranking(7, as_of).await.unwrap();
        let second = scorer.compute_ranking(7, as_of).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_synthetic_contributors_are_never_ranked() {
        let as_of = Utc::now();
        let bot = ContributorModel::synthetic(SyntheticVariant::Rooh);
        let bot_id = bot.id.clone();
        let scorer = scorer_with(
            vec![bot, contributor("human")],
            vec![
                work(&bot_id, 10_000, Duration::zero(), as_of),
                work("human", 1, Duration::zero(), as_of),
            ],
            ScoringVariant::FlatBonus,
        )
        .await;

        let ranking = scorer.compute_ranking(30, as_of).await.unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].contributor_id, "human");
    }

    #[tokio::test]
    async fn test_works_outside_window_are_ignored() {
        let as_of = Utc::now();
        let scorer = scorer_with(
            vec![contributor("old"), contributor("new")],
            vec![
                work("old", 50, Duration::days(2), as_of),
                work("new", 0, Duration::hours(1), as_of),
                // created after as_of
                work("old", 50, Duration::hours(-1), as_of),
            ],
            ScoringVariant::FlatBonus,
        )
        .await;

        let ranking = scorer.compute_ranking(1, as_of).await.unwrap();
        assert_eq!(
            ranking,
            vec![RankedContributor {
                contributor_id: "new".into(),
                score: 10.0
            }]
        );
    }

    #[tokio::test]
    async fn test_inactive_contributors_are_dropped() {
        let scorer = scorer_with(
            vec![contributor("idle")],
            vec![],
            ScoringVariant::DecayWeighted,
        )
        .await;

        assert!(scorer.compute_ranking(7, Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_window_is_rejected() {
        let scorer = scorer_with(vec![], vec![], ScoringVariant::DecayWeighted).await;
        assert!(matches!(
            scorer.compute_ranking(0, Utc::now()).await,
            Err(AppError::BadRequest(_))
        ));
    }

    /// Fails every fetch for one author
    struct FlakyWorks {
        inner: InMemoryWorkRepository,
        failing_author: String,
    }

    #[async_trait]
    impl WorkRepository for FlakyWorks {
        async fn create_work(&self, work: &WorkModel) -> Result<(), AppError> {
            self.inner.create_work(work).await
        }
        async fn get_work(&self, work_id: &str) -> Result<Option<WorkModel>, AppError> {
            self.inner.get_work(work_id).await
        }
        async fn list_works(&self) -> Result<Vec<WorkModel>, AppError> {
            self.inner.list_works().await
        }
        async fn list_works_by_author(
            &self,
            author_id: &str,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<WorkModel>, AppError> {
            if author_id == self.failing_author {
                return Err(AppError::DatabaseError("connection reset".into()));
            }
            self.inner.list_works_by_author(author_id, since).await
        }
        async fn list_reactions_by_reactor(
            &self,
            reactor_id: &str,
        ) -> Result<Vec<ReactionModel>, AppError> {
            self.inner.list_reactions_by_reactor(reactor_id).await
        }
        async fn insert_reactions(
            &self,
            reactions: &[ReactionModel],
        ) -> Result<Vec<ReactionModel>, AppError> {
            self.inner.insert_reactions(reactions).await
        }
        async fn upsert_reaction(
            &self,
            reaction: &ReactionModel,
        ) -> Result<ReactionChange, AppError> {
            self.inner.upsert_reaction(reaction).await
        }
        async fn delete_reaction(
            &self,
            work_id: &str,
            reactor_id: &str,
        ) -> Result<Option<Polarity>, AppError> {
            self.inner.delete_reaction(work_id, reactor_id).await
        }
    }

    #[tokio::test]
    async fn test_store_failure_skips_only_that_contributor() {
        let as_of = Utc::now();
        let works = FlakyWorks {
            inner: InMemoryWorkRepository::new(),
            failing_author: "broken".into(),
        };
        works
            .create_work(&work("healthy", 3, Duration::zero(), as_of))
            .await
            .unwrap();
        works
            .create_work(&work("broken", 99, Duration::zero(), as_of))
            .await
            .unwrap();

        let scorer = Scorer::new(
            Arc::new(InMemoryContributorRepository::with_contributors(vec![
                contributor("healthy"),
                contributor("broken"),
            ])),
            Arc::new(works),
            ScoringVariant::FlatBonus,
        );

        let ranking = scorer.compute_ranking(1, as_of).await.unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].contributor_id, "healthy");
        assert_eq!(ranking[0].score, 13.0);
    }

    /// Tracks how many author fetches overlap
    struct CountingWorks {
        inner: InMemoryWorkRepository,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl WorkRepository for CountingWorks {
        async fn create_work(&self, work: &WorkModel) -> Result<(), AppError> {
            self.inner.create_work(work).await
        }
        async fn get_work(&self, work_id: &str) -> Result<Option<WorkModel>, AppError> {
            self.inner.get_work(work_id).await
        }
        async fn list_works(&self) -> Result<Vec<WorkModel>, AppError> {
            self.inner.list_works().await
        }
        async fn list_works_by_author(
            &self,
            author_id: &str,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<WorkModel>, AppError> {
            let now = self.in_flight.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            self.peak.fetch_max(now, AtomicOrdering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let result = self.inner.list_works_by_author(author_id, since).await;
            self.in_flight.fetch_sub(1, AtomicOrdering::SeqCst);
            result
        }
        async fn list_reactions_by_reactor(
            &self,
            reactor_id: &str,
        ) -> Result<Vec<ReactionModel>, AppError> {
            self.inner.list_reactions_by_reactor(reactor_id).await
        }
        async fn insert_reactions(
            &self,
            reactions: &[ReactionModel],
        ) -> Result<Vec<ReactionModel>, AppError> {
            self.inner.insert_reactions(reactions).await
        }
        async fn upsert_reaction(
            &self,
            reaction: &ReactionModel,
        ) -> Result<ReactionChange, AppError> {
            self.inner.upsert_reaction(reaction).await
        }
        async fn delete_reaction(
            &self,
            work_id: &str,
            reactor_id: &str,
        ) -> Result<Option<Polarity>, AppError> {
            self.inner.delete_reaction(work_id, reactor_id).await
        }
    }

    #[tokio::test]
    async fn test_works_fetches_are_bounded() {
        let as_of = Utc::now();
        let works = CountingWorks {
            inner: InMemoryWorkRepository::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let ids: Vec<String> = (0..30).map(|i| format!("c{:02}", i)).collect();
        for id in &ids {
            works
                .create_work(&work(id, 1, Duration::zero(), as_of))
                .await
                .unwrap();
        }
        let works = Arc::new(works);

        let scorer = Scorer::new(
            Arc::new(InMemoryContributorRepository::with_contributors(
                ids.iter().map(|id| contributor(id)).collect(),
            )),
            works.clone(),
            ScoringVariant::FlatBonus,
        );

        let ranking = scorer.compute_ranking(1, as_of).await.unwrap();
        assert_eq!(ranking.len(), 30);
        assert_eq!(ranking[0].contributor_id, "c00");
        let peak = works.peak.load(AtomicOrdering::SeqCst);
        assert!(peak >= 1 && peak <= RANKING_FETCH_CONCURRENCY, "peak {}", peak);
    }
}
