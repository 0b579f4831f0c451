use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{AwardModel, PeriodKind};
use crate::shared::{database_error, AppError};

/// Trait for award storage.
///
/// `replace_awards` swaps the whole row set of one (kind, date) period in a
/// single step: readers observe either the old set or the new one. An empty
/// set still marks the period as reconciled.
#[async_trait]
pub trait AwardRepository: Send + Sync {
    async fn replace_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
        awards: &[AwardModel],
    ) -> Result<u64, AppError>;

    /// Awards of the most recently reconciled period_date for `kind`, ordered
    /// by rank. Empty when that period had no winners.
    async fn list_latest_awards(&self, kind: PeriodKind) -> Result<Vec<AwardModel>, AppError>;

    async fn list_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
    ) -> Result<Vec<AwardModel>, AppError>;
}

fn check_period(kind: PeriodKind, date: NaiveDate, awards: &[AwardModel]) -> Result<(), AppError> {
    if let Some(stray) = awards
        .iter()
        .find(|award| award.period_kind != kind || award.period_date != date)
    {
        return Err(AppError::BadRequest(format!(
            "Award {} does not belong to period {} {}",
            stray.id, kind, date
        )));
    }

    let mut seen = std::collections::HashSet::new();
    if let Some(duplicate) = awards
        .iter()
        .find(|award| !seen.insert(award.contributor_id.as_str()))
    {
        return Err(AppError::Conflict(format!(
            "Contributor {} awarded twice in period {} {}",
            duplicate.contributor_id, kind, date
        )));
    }

    Ok(())
}

/// In-memory implementation of AwardRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryAwardRepository {
    periods: RwLock<BTreeMap<(PeriodKind, NaiveDate), Vec<AwardModel>>>,
}

impl InMemoryAwardRepository {
    pub fn new() -> Self {
        Self {
            periods: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl AwardRepository for InMemoryAwardRepository {
    #[instrument(skip(self, awards))]
    async fn replace_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
        awards: &[AwardModel],
    ) -> Result<u64, AppError> {
        check_period(kind, date, awards)?;

        let mut rows = awards.to_vec();
        rows.sort_by_key(|award| award.rank);

        self.periods.write().await.insert((kind, date), rows);

        debug!(period = %kind, %date, count = awards.len(), "Replaced awards in memory");
        Ok(awards.len() as u64)
    }

    async fn list_latest_awards(&self, kind: PeriodKind) -> Result<Vec<AwardModel>, AppError> {
        let periods = self.periods.read().await;
        Ok(periods
            .iter()
            .rev()
            .find(|((period, _), _)| *period == kind)
            .map(|(_, awards)| awards.clone())
            .unwrap_or_default())
    }

    async fn list_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
    ) -> Result<Vec<AwardModel>, AppError> {
        let periods = self.periods.read().await;
        Ok(periods.get(&(kind, date)).cloned().unwrap_or_default())
    }
}

/// PostgreSQL implementation of AwardRepository
pub struct PostgresAwardRepository {
    pool: PgPool,
}

impl PostgresAwardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const AWARD_COLUMNS: &str = "id, contributor_id, period_kind, period_date, rank, score";

fn award_from_row(row: &PgRow) -> Result<AwardModel, AppError> {
    let kind: String = row.get("period_kind");
    Ok(AwardModel {
        id: row.get("id"),
        contributor_id: row.get("contributor_id"),
        period_kind: PeriodKind::parse(&kind)
            .map_err(|_| AppError::DatabaseError(format!("Unknown period kind: {}", kind)))?,
        period_date: row.get("period_date"),
        rank: row.get("rank"),
        score: row.get("score"),
    })
}

#[async_trait]
impl AwardRepository for PostgresAwardRepository {
    #[instrument(skip(self, awards))]
    async fn replace_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
        awards: &[AwardModel],
    ) -> Result<u64, AppError> {
        check_period(kind, date, awards)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to open award transaction");
            database_error(e)
        })?;

        let deleted = sqlx::query("DELETE FROM awards WHERE period_kind = $1 AND period_date = $2")
            .bind(kind.to_string())
            .bind(date)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?
            .rows_affected();

        sqlx::query(
            "INSERT INTO award_periods (period_kind, period_date, reconciled_at) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (period_kind, period_date) DO UPDATE SET reconciled_at = EXCLUDED.reconciled_at",
        )
        .bind(kind.to_string())
        .bind(date)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        for award in awards {
            sqlx::query(
                "INSERT INTO awards (id, contributor_id, period_kind, period_date, rank, score) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&award.id)
            .bind(&award.contributor_id)
            .bind(award.period_kind.to_string())
            .bind(award.period_date)
            .bind(award.rank)
            .bind(award.score)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(award_id = %award.id, error = %e, "Failed to insert award, rolling back period");
                database_error(e)
            })?;
        }

        tx.commit().await.map_err(database_error)?;

        info!(period = %kind, %date, deleted, inserted = awards.len(), "Replaced awards");
        Ok(awards.len() as u64)
    }

    async fn list_latest_awards(&self, kind: PeriodKind) -> Result<Vec<AwardModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM awards WHERE period_kind = $1 AND period_date = \
             (SELECT MAX(period_date) FROM award_periods WHERE period_kind = $1) ORDER BY rank",
            AWARD_COLUMNS
        ))
        .bind(kind.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(period = %kind, error = %e, "Failed to list latest awards");
            database_error(e)
        })?;

        rows.iter().map(award_from_row).collect()
    }

    async fn list_awards(
        &self,
        kind: PeriodKind,
        date: NaiveDate,
    ) -> Result<Vec<AwardModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM awards WHERE period_kind = $1 AND period_date = $2 ORDER BY rank",
            AWARD_COLUMNS
        ))
        .bind(kind.to_string())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.iter().map(award_from_row).collect()
    }
}
