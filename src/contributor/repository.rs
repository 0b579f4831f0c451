use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{ContributorModel, SyntheticVariant};
use crate::shared::{database_error, AppError};

/// Trait for contributor repository operations
#[async_trait]
pub trait ContributorRepository: Send + Sync {
    async fn create_contributor(&self, contributor: &ContributorModel) -> Result<(), AppError>;
    async fn get_contributor(&self, id: &str) -> Result<Option<ContributorModel>, AppError>;
    async fn get_contributors(&self, ids: &[String]) -> Result<Vec<ContributorModel>, AppError>;

    /// Lists contributors with the given synthetic flag, ordered by id
    async fn list_contributors(&self, is_synthetic: bool)
        -> Result<Vec<ContributorModel>, AppError>;

    async fn find_synthetic(
        &self,
        variant: SyntheticVariant,
    ) -> Result<Option<ContributorModel>, AppError>;
}

/// In-memory implementation of ContributorRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryContributorRepository {
    contributors: RwLock<HashMap<String, ContributorModel>>,
}

impl InMemoryContributorRepository {
    pub fn new() -> Self {
        Self {
            contributors: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_contributors(contributors: Vec<ContributorModel>) -> Self {
        let map = contributors
            .into_iter()
            .map(|contributor| (contributor.id.clone(), contributor))
            .collect();

        Self {
            contributors: RwLock::new(map),
        }
    }
}

#[async_trait]
impl ContributorRepository for InMemoryContributorRepository {
    #[instrument(skip(self, contributor))]
    async fn create_contributor(&self, contributor: &ContributorModel) -> Result<(), AppError> {
        debug!(contributor_id = %contributor.id, username = %contributor.username, "Creating contributor in memory");

        let mut contributors = self.contributors.write().await;
        let username_taken = contributors
            .values()
            .any(|existing| existing.username == contributor.username);
        if contributors.contains_key(&contributor.id) || username_taken {
            warn!(contributor_id = %contributor.id, "Contributor already exists in memory");
            return Err(AppError::Conflict("Contributor already exists".to_string()));
        }
        contributors.insert(contributor.id.clone(), contributor.clone());

        Ok(())
    }

    async fn get_contributor(&self, id: &str) -> Result<Option<ContributorModel>, AppError> {
        let contributors = self.contributors.read().await;
        Ok(contributors.get(id).cloned())
    }

    async fn get_contributors(&self, ids: &[String]) -> Result<Vec<ContributorModel>, AppError> {
        let contributors = self.contributors.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| contributors.get(id).cloned())
            .collect())
    }

    async fn list_contributors(
        &self,
        is_synthetic: bool,
    ) -> Result<Vec<ContributorModel>, AppError> {
        let contributors = self.contributors.read().await;
        let mut matching: Vec<ContributorModel> = contributors
            .values()
            .filter(|contributor| contributor.is_synthetic == is_synthetic)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }

    async fn find_synthetic(
        &self,
        variant: SyntheticVariant,
    ) -> Result<Option<ContributorModel>, AppError> {
        let contributors = self.contributors.read().await;
        Ok(contributors
            .values()
            .find(|contributor| {
                contributor.is_synthetic && contributor.synthetic_variant == Some(variant)
            })
            .cloned())
    }
}

/// PostgreSQL implementation of contributor repository
pub struct PostgresContributorRepository {
    pool: PgPool,
}

impl PostgresContributorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CONTRIBUTOR_COLUMNS: &str =
    "id, username, display_name, avatar_url, bio, is_synthetic, synthetic_variant, created_at";

fn contributor_from_row(row: &PgRow) -> ContributorModel {
    let variant: Option<String> = row.get("synthetic_variant");
    ContributorModel {
        id: row.get("id"),
        username: row.get("username"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        bio: row.get("bio"),
        is_synthetic: row.get("is_synthetic"),
        synthetic_variant: variant.and_then(|tag| SyntheticVariant::from_str(&tag).ok()),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ContributorRepository for PostgresContributorRepository {
    #[instrument(skip(self, contributor))]
    async fn create_contributor(&self, contributor: &ContributorModel) -> Result<(), AppError> {
        debug!(contributor_id = %contributor.id, "Creating contributor in database");

        sqlx::query(
            "INSERT INTO contributors (id, username, display_name, avatar_url, bio, is_synthetic, synthetic_variant, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&contributor.id)
        .bind(&contributor.username)
        .bind(&contributor.display_name)
        .bind(&contributor.avatar_url)
        .bind(&contributor.bio)
        .bind(contributor.is_synthetic)
        .bind(contributor.synthetic_variant.map(|variant| variant.to_string()))
        .bind(contributor.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create contributor in database");
            database_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_contributor(&self, id: &str) -> Result<Option<ContributorModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM contributors WHERE id = $1",
            CONTRIBUTOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, contributor_id = %id, "Failed to fetch contributor");
            database_error(e)
        })?;

        Ok(row.as_ref().map(contributor_from_row))
    }

    #[instrument(skip(self, ids))]
    async fn get_contributors(&self, ids: &[String]) -> Result<Vec<ContributorModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contributors WHERE id = ANY($1)",
            CONTRIBUTOR_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch contributors");
            database_error(e)
        })?;

        Ok(rows.iter().map(contributor_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn list_contributors(
        &self,
        is_synthetic: bool,
    ) -> Result<Vec<ContributorModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM contributors WHERE is_synthetic = $1 ORDER BY id",
            CONTRIBUTOR_COLUMNS
        ))
        .bind(is_synthetic)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, is_synthetic, "Failed to list contributors");
            database_error(e)
        })?;

        Ok(rows.iter().map(contributor_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn find_synthetic(
        &self,
        variant: SyntheticVariant,
    ) -> Result<Option<ContributorModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM contributors WHERE is_synthetic = TRUE AND synthetic_variant = $1",
            CONTRIBUTOR_COLUMNS
        ))
        .bind(variant.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, variant = %variant, "Failed to fetch synthetic contributor");
            database_error(e)
        })?;

        Ok(row.as_ref().map(contributor_from_row))
    }
}
