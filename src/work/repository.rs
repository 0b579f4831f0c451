use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::models::{Polarity, ReactionChange, ReactionModel, WorkModel};
use crate::shared::{database_error, AppError};

/// Trait for work and reaction storage.
///
/// Reactions are unique per (work, reactor). Implementations must enforce that
/// at the storage layer: callers may race, and the application-level checks
/// they run beforehand are only a fast path.
#[async_trait]
pub trait WorkRepository: Send + Sync {
    async fn create_work(&self, work: &WorkModel) -> Result<(), AppError>;
    async fn get_work(&self, work_id: &str) -> Result<Option<WorkModel>, AppError>;

    /// Full work set ordered by creation time, then id
    async fn list_works(&self) -> Result<Vec<WorkModel>, AppError>;

    /// Works by one author, optionally restricted to `created_at >= since`
    async fn list_works_by_author(
        &self,
        author_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<WorkModel>, AppError>;

    async fn list_reactions_by_reactor(
        &self,
        reactor_id: &str,
    ) -> Result<Vec<ReactionModel>, AppError>;

    /// Batch insert that skips any (work, reactor) pair already present,
    /// including duplicates inside the batch. Returns the rows actually written.
    async fn insert_reactions(
        &self,
        reactions: &[ReactionModel],
    ) -> Result<Vec<ReactionModel>, AppError>;

    /// Inserts the reaction, or replaces the polarity of the existing row
    async fn upsert_reaction(&self, reaction: &ReactionModel) -> Result<ReactionChange, AppError>;

    /// Removes a reaction, returning the polarity it had
    async fn delete_reaction(
        &self,
        work_id: &str,
        reactor_id: &str,
    ) -> Result<Option<Polarity>, AppError>;
}

#[derive(Debug, Default)]
struct WorkStore {
    works: HashMap<String, WorkModel>,
    reactions: HashMap<(String, String), ReactionModel>, // (work_id, reactor_id)
}

/// In-memory implementation of WorkRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryWorkRepository {
    store: RwLock<WorkStore>,
}

impl InMemoryWorkRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(WorkStore::default()),
        }
    }

    /// Returns the number of stored reactions (useful for assertions)
    pub async fn reaction_count(&self) -> usize {
        self.store.read().await.reactions.len()
    }
}

fn sorted_works(mut works: Vec<WorkModel>) -> Vec<WorkModel> {
    works.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    works
}

#[async_trait]
impl WorkRepository for InMemoryWorkRepository {
    #[instrument(skip(self, work))]
    async fn create_work(&self, work: &WorkModel) -> Result<(), AppError> {
        debug!(work_id = %work.id, author_id = %work.author_id, "Creating work in memory");

        let mut store = self.store.write().await;
        if store.works.contains_key(&work.id) {
            warn!(work_id = %work.id, "Work already exists in memory");
            return Err(AppError::Conflict("Work already exists".to_string()));
        }
        store.works.insert(work.id.clone(), work.clone());

        Ok(())
    }

    async fn get_work(&self, work_id: &str) -> Result<Option<WorkModel>, AppError> {
        let store = self.store.read().await;
        Ok(store.works.get(work_id).cloned())
    }

    async fn list_works(&self) -> Result<Vec<WorkModel>, AppError> {
        let store = self.store.read().await;
        Ok(sorted_works(store.works.values().cloned().collect()))
    }

    async fn list_works_by_author(
        &self,
        author_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<WorkModel>, AppError> {
        let store = self.store.read().await;
        let works = store
            .works
            .values()
            .filter(|work| work.author_id == author_id)
            .filter(|work| since.map_or(true, |since| work.created_at >= since))
            .cloned()
            .collect();
        Ok(sorted_works(works))
    }

    async fn list_reactions_by_reactor(
        &self,
        reactor_id: &str,
    ) -> Result<Vec<ReactionModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .reactions
            .values()
            .filter(|reaction| reaction.reactor_id == reactor_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, reactions), fields(batch_size = reactions.len()))]
    async fn insert_reactions(
        &self,
        reactions: &[ReactionModel],
    ) -> Result<Vec<ReactionModel>, AppError> {
        let mut store = self.store.write().await;

        // Fail the whole batch up front, like a foreign-key violation would
        if let Some(missing) = reactions
            .iter()
            .find(|reaction| !store.works.contains_key(&reaction.work_id))
        {
            return Err(AppError::NotFound(format!(
                "Work not found: {}",
                missing.work_id
            )));
        }

        let mut inserted = Vec::new();
        for reaction in reactions {
            let key = (reaction.work_id.clone(), reaction.reactor_id.clone());
            if store.reactions.contains_key(&key) {
                debug!(work_id = %reaction.work_id, reactor_id = %reaction.reactor_id, "Reaction already present, skipping");
                continue;
            }
            store.reactions.insert(key, reaction.clone());
            if let Some(work) = store.works.get_mut(&reaction.work_id) {
                work.apply_delta(reaction.polarity, 1);
            }
            inserted.push(reaction.clone());
        }

        info!(inserted = inserted.len(), "Reactions inserted in memory");
        Ok(inserted)
    }

    #[instrument(skip(self, reaction))]
    async fn upsert_reaction(&self, reaction: &ReactionModel) -> Result<ReactionChange, AppError> {
        let mut store = self.store.write().await;
        if !store.works.contains_key(&reaction.work_id) {
            return Err(AppError::NotFound(format!(
                "Work not found: {}",
                reaction.work_id
            )));
        }

        let key = (reaction.work_id.clone(), reaction.reactor_id.clone());
        let change = match store.reactions.get(&key).map(|existing| existing.polarity) {
            None => ReactionChange::Inserted,
            Some(previous) if previous == reaction.polarity => ReactionChange::Unchanged,
            Some(previous) => ReactionChange::Replaced { previous },
        };

        if change != ReactionChange::Unchanged {
            store.reactions.insert(key, reaction.clone());
            if let Some(work) = store.works.get_mut(&reaction.work_id) {
                if let ReactionChange::Replaced { previous } = change {
                    work.apply_delta(previous, -1);
                }
                work.apply_delta(reaction.polarity, 1);
            }
        }

        Ok(change)
    }

    #[instrument(skip(self))]
    async fn delete_reaction(
        &self,
        work_id: &str,
        reactor_id: &str,
    ) -> Result<Option<Polarity>, AppError> {
        let mut store = self.store.write().await;
        let removed = store
            .reactions
            .remove(&(work_id.to_string(), reactor_id.to_string()));

        if let Some(reaction) = &removed {
            if let Some(work) = store.works.get_mut(work_id) {
                work.apply_delta(reaction.polarity, -1);
            }
        }

        Ok(removed.map(|reaction| reaction.polarity))
    }
}

/// PostgreSQL implementation of work repository
pub struct PostgresWorkRepository {
    pool: PgPool,
}

impl PostgresWorkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const WORK_COLUMNS: &str =
    "id, author_id, title, content, language, positive_count, negative_count, created_at";

fn work_from_row(row: &PgRow) -> WorkModel {
    WorkModel {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        language: row.get("language"),
        positive_count: row.get("positive_count"),
        negative_count: row.get("negative_count"),
        created_at: row.get("created_at"),
    }
}

fn parse_polarity(tag: &str) -> Result<Polarity, AppError> {
    Polarity::from_str(tag)
        .map_err(|_| AppError::DatabaseError(format!("Unknown reaction polarity: {}", tag)))
}

fn reaction_from_row(row: &PgRow) -> Result<ReactionModel, AppError> {
    let polarity: String = row.get("polarity");
    Ok(ReactionModel {
        work_id: row.get("work_id"),
        reactor_id: row.get("reactor_id"),
        polarity: parse_polarity(&polarity)?,
        created_at: row.get("created_at"),
    })
}

async fn adjust_counter(
    tx: &mut Transaction<'_, Postgres>,
    work_id: &str,
    polarity: Polarity,
    delta: i64,
) -> Result<(), AppError> {
    let (positive, negative) = match polarity {
        Polarity::Positive => (delta, 0),
        Polarity::Negative => (0, delta),
    };

    sqlx::query(
        "UPDATE works SET positive_count = GREATEST(positive_count + $2, 0), \
         negative_count = GREATEST(negative_count + $3, 0) WHERE id = $1",
    )
    .bind(work_id)
    .bind(positive)
    .bind(negative)
    .execute(&mut **tx)
    .await
    .map_err(database_error)?;

    Ok(())
}

#[async_trait]
impl WorkRepository for PostgresWorkRepository {
    #[instrument(skip(self, work))]
    async fn create_work(&self, work: &WorkModel) -> Result<(), AppError> {
        debug!(work_id = %work.id, "Creating work in database");

        sqlx::query(
            "INSERT INTO works (id, author_id, title, content, language, positive_count, negative_count, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&work.id)
        .bind(&work.author_id)
        .bind(&work.title)
        .bind(&work.content)
        .bind(&work.language)
        .bind(work.positive_count)
        .bind(work.negative_count)
        .bind(work.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, work_id = %work.id, "Failed to create work in database");
            database_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_work(&self, work_id: &str) -> Result<Option<WorkModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM works WHERE id = $1", WORK_COLUMNS))
            .bind(work_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, work_id = %work_id, "Failed to fetch work");
                database_error(e)
            })?;

        Ok(row.as_ref().map(work_from_row))
    }

    #[instrument(skip(self))]
    async fn list_works(&self) -> Result<Vec<WorkModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM works ORDER BY created_at, id",
            WORK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list works");
            database_error(e)
        })?;

        Ok(rows.iter().map(work_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn list_works_by_author(
        &self,
        author_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<WorkModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM works WHERE author_id = $1 AND ($2::timestamptz IS NULL OR created_at >= $2) \
             ORDER BY created_at, id",
            WORK_COLUMNS
        ))
        .bind(author_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, author_id = %author_id, "Failed to list works for author");
            database_error(e)
        })?;

        Ok(rows.iter().map(work_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn list_reactions_by_reactor(
        &self,
        reactor_id: &str,
    ) -> Result<Vec<ReactionModel>, AppError> {
        let rows = sqlx::query(
            "SELECT work_id, reactor_id, polarity, created_at FROM reactions WHERE reactor_id = $1",
        )
        .bind(reactor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, reactor_id = %reactor_id, "Failed to list reactions");
            database_error(e)
        })?;

        rows.iter().map(reaction_from_row).collect()
    }

    #[instrument(skip(self, reactions), fields(batch_size = reactions.len()))]
    async fn insert_reactions(
        &self,
        reactions: &[ReactionModel],
    ) -> Result<Vec<ReactionModel>, AppError> {
        if reactions.is_empty() {
            return Ok(Vec::new());
        }

        let work_ids: Vec<String> = reactions.iter().map(|r| r.work_id.clone()).collect();
        let reactor_ids: Vec<String> = reactions.iter().map(|r| r.reactor_id.clone()).collect();
        let polarities: Vec<String> = reactions.iter().map(|r| r.polarity.to_string()).collect();
        let created_at: Vec<DateTime<Utc>> = reactions.iter().map(|r| r.created_at).collect();

        // One statement: skip existing pairs, then bump counters for what landed
        let rows = sqlx::query(
            "WITH inserted AS ( \
                 INSERT INTO reactions (work_id, reactor_id, polarity, created_at) \
                 SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::timestamptz[]) \
                 ON CONFLICT (work_id, reactor_id) DO NOTHING \
                 RETURNING work_id, reactor_id, polarity, created_at \
             ), tallied AS ( \
                 SELECT work_id, \
                        COUNT(*) FILTER (WHERE polarity = 'like') AS likes, \
                        COUNT(*) FILTER (WHERE polarity = 'dislike') AS dislikes \
                 FROM inserted GROUP BY work_id \
             ), bumped AS ( \
                 UPDATE works w SET positive_count = w.positive_count + t.likes, \
                                    negative_count = w.negative_count + t.dislikes \
                 FROM tallied t WHERE w.id = t.work_id \
                 RETURNING w.id \
             ) \
             SELECT work_id, reactor_id, polarity, created_at FROM inserted",
        )
        .bind(&work_ids)
        .bind(&reactor_ids)
        .bind(&polarities)
        .bind(&created_at)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to batch insert reactions");
            database_error(e)
        })?;

        info!(inserted = rows.len(), "Reactions inserted in database");
        rows.iter().map(reaction_from_row).collect()
    }

    #[instrument(skip(self, reaction))]
    async fn upsert_reaction(&self, reaction: &ReactionModel) -> Result<ReactionChange, AppError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT polarity FROM reactions WHERE work_id = $1 AND reactor_id = $2 FOR UPDATE",
        )
        .bind(&reaction.work_id)
        .bind(&reaction.reactor_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let change = match existing {
            None => {
                // A concurrent first insert loses on the primary key and surfaces as Conflict
                sqlx::query(
                    "INSERT INTO reactions (work_id, reactor_id, polarity, created_at) VALUES ($1, $2, $3, $4)",
                )
                .bind(&reaction.work_id)
                .bind(&reaction.reactor_id)
                .bind(reaction.polarity.to_string())
                .bind(reaction.created_at)
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
                adjust_counter(&mut tx, &reaction.work_id, reaction.polarity, 1).await?;
                ReactionChange::Inserted
            }
            Some(previous) => {
                let previous = parse_polarity(&previous)?;
                if previous == reaction.polarity {
                    ReactionChange::Unchanged
                } else {
                    sqlx::query(
                        "UPDATE reactions SET polarity = $3, created_at = $4 WHERE work_id = $1 AND reactor_id = $2",
                    )
                    .bind(&reaction.work_id)
                    .bind(&reaction.reactor_id)
                    .bind(reaction.polarity.to_string())
                    .bind(reaction.created_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(database_error)?;
                    adjust_counter(&mut tx, &reaction.work_id, previous, -1).await?;
                    adjust_counter(&mut tx, &reaction.work_id, reaction.polarity, 1).await?;
                    ReactionChange::Replaced { previous }
                }
            }
        };

        tx.commit().await.map_err(database_error)?;
        Ok(change)
    }

    #[instrument(skip(self))]
    async fn delete_reaction(
        &self,
        work_id: &str,
        reactor_id: &str,
    ) -> Result<Option<Polarity>, AppError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let removed: Option<String> = sqlx::query_scalar(
            "DELETE FROM reactions WHERE work_id = $1 AND reactor_id = $2 RETURNING polarity",
        )
        .bind(work_id)
        .bind(reactor_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let removed = match removed {
            Some(tag) => {
                let polarity = parse_polarity(&tag)?;
                adjust_counter(&mut tx, work_id, polarity, -1).await?;
                Some(polarity)
            }
            None => None,
        };

        tx.commit().await.map_err(database_error)?;
        Ok(removed)
    }
}
