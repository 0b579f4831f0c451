use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{Polarity, ReactionChange, ReactionModel, WorkModel},
    repository::WorkRepository,
    types::{change_label, ReactionResponse, SubmitWorkRequest},
};
use crate::{contributor::repository::ContributorRepository, shared::AppError};

/// Service for work submission and the user-facing reaction lifecycle
pub struct WorkService {
    repository: Arc<dyn WorkRepository>,
    contributors: Arc<dyn ContributorRepository>,
}

impl WorkService {
    pub fn new(
        repository: Arc<dyn WorkRepository>,
        contributors: Arc<dyn ContributorRepository>,
    ) -> Self {
        Self {
            repository,
            contributors,
        }
    }

    #[instrument(skip(self, request), fields(author_id = %request.author_id))]
    pub async fn submit_work(&self, request: SubmitWorkRequest) -> Result<WorkModel, AppError> {
        let title = request.title.trim();
        let content = request.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(AppError::BadRequest(
                "Title and content must not be empty".to_string(),
            ));
        }

        self.contributors
            .get_contributor(&request.author_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Contributor not found: {}", request.author_id))
            })?;

        let work = WorkModel::new(
            request.author_id,
            title.to_string(),
            content.to_string(),
            request.language,
        );
        self.repository.create_work(&work).await?;

        info!(work_id = %work.id, "Work submitted");
        Ok(work)
    }

    /// Records a reaction, replacing any previous polarity from the same
    /// contributor. Human contributors cannot react to their own work.
    #[instrument(skip(self))]
    pub async fn react(
        &self,
        work_id: &str,
        contributor_id: &str,
        polarity: Polarity,
    ) -> Result<ReactionResponse, AppError> {
        let work = self
            .repository
            .get_work(work_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work not found: {}", work_id)))?;

        let contributor = self
            .contributors
            .get_contributor(contributor_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Contributor not found: {}", contributor_id))
            })?;

        if work.author_id == contributor.id && !contributor.is_synthetic {
            warn!(work_id, contributor_id, "Rejected self-reaction");
            return Err(AppError::BadRequest(
                "Contributors cannot react to their own work".to_string(),
            ));
        }

        let reaction = ReactionModel::new(work.id.clone(), contributor.id.clone(), polarity);
        let change = self.repository.upsert_reaction(&reaction).await?;
        debug!(work_id, contributor_id, change = ?change, "Reaction recorded");

        self.response_for(work_id, contributor_id, Some(polarity), change)
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_reaction(
        &self,
        work_id: &str,
        contributor_id: &str,
    ) -> Result<ReactionResponse, AppError> {
        let removed = self
            .repository
            .delete_reaction(work_id, contributor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reaction not found".to_string()))?;

        debug!(work_id, contributor_id, polarity = %removed, "Reaction removed");
        let mut response = self
            .response_for(work_id, contributor_id, None, ReactionChange::Unchanged)
            .await?;
        response.change = "removed".to_string();
        Ok(response)
    }

    async fn response_for(
        &self,
        work_id: &str,
        contributor_id: &str,
        polarity: Option<Polarity>,
        change: ReactionChange,
    ) -> Result<ReactionResponse, AppError> {
        let work = self
            .repository
            .get_work(work_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work not found: {}", work_id)))?;

        Ok(ReactionResponse {
            work_id: work.id,
            contributor_id: contributor_id.to_string(),
            polarity,
            change: change_label(change).to_string(),
            positive_count: work.positive_count,
            negative_count: work.negative_count,
        })
    }
}
