use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

use super::{
    models::{ContributorModel, SyntheticVariant},
    repository::ContributorRepository,
};
use crate::{shared::AppError, work::repository::WorkRepository};

/// Works and likes accumulated by one synthetic contributor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticStats {
    pub works_count: u64,
    pub likes_count: i64,
}

/// Service for contributor bootstrap and synthetic bookkeeping
pub struct ContributorService {
    repository: Arc<dyn ContributorRepository>,
    works: Arc<dyn WorkRepository>,
}

impl ContributorService {
    pub fn new(repository: Arc<dyn ContributorRepository>, works: Arc<dyn WorkRepository>) -> Self {
        Self { repository, works }
    }

    /// Gets or creates the synthetic contributor for one variant
    #[instrument(skip(self))]
    pub async fn ensure_synthetic(
        &self,
        variant: SyntheticVariant,
    ) -> Result<ContributorModel, AppError> {
        if let Some(existing) = self.repository.find_synthetic(variant).await? {
            return Ok(existing);
        }

        let contributor = ContributorModel::synthetic(variant);
        match self.repository.create_contributor(&contributor).await {
            Ok(()) => {
                info!(contributor_id = %contributor.id, variant = %variant, "Created synthetic contributor");
                Ok(contributor)
            }
            // Lost a race with a concurrent bootstrap; the winner's row is authoritative
            Err(AppError::Conflict(_)) => self
                .repository
                .find_synthetic(variant)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!(
                        "Username {} is taken by a non-synthetic contributor",
                        variant.username()
                    ))
                }),
            Err(err) => Err(err),
        }
    }

    /// Ensures every variant has a synthetic contributor. Failures are logged
    /// per variant and do not stop the others.
    #[instrument(skip(self))]
    pub async fn ensure_synthetic_contributors(
        &self,
    ) -> (Vec<ContributorModel>, BTreeMap<SyntheticVariant, String>) {
        let mut ensured = Vec::new();
        let mut errors = BTreeMap::new();

        for variant in SyntheticVariant::iter() {
            match self.ensure_synthetic(variant).await {
                Ok(contributor) => ensured.push(contributor),
                Err(err) => {
                    warn!(variant = %variant, error = %err, "Failed to bootstrap synthetic contributor");
                    errors.insert(variant, err.to_string());
                }
            }
        }

        (ensured, errors)
    }

    pub async fn synthetic_contributors(&self) -> Result<Vec<ContributorModel>, AppError> {
        self.repository.list_contributors(true).await
    }

    /// Per-variant counts of works authored and likes received. Every variant
    /// is reported, with zeros until its contributor exists.
    #[instrument(skip(self))]
    pub async fn synthetic_stats(&self) -> Result<BTreeMap<String, SyntheticStats>, AppError> {
        let mut stats: BTreeMap<String, SyntheticStats> = SyntheticVariant::iter()
            .map(|variant| (variant.to_string(), SyntheticStats::default()))
            .collect();

        for contributor in self.synthetic_contributors().await? {
            let Some(variant) = contributor.synthetic_variant else {
                continue;
            };

            match self.works.list_works_by_author(&contributor.id, None).await {
                Ok(works) => {
                    stats.insert(
                        variant.to_string(),
                        SyntheticStats {
                            works_count: works.len() as u64,
                            likes_count: works.iter().map(|work| work.positive_count).sum(),
                        },
                    );
                }
                Err(err) => {
                    warn!(contributor_id = %contributor.id, error = %err, "Skipping stats for contributor");
                }
            }
        }

        Ok(stats)
    }
}
