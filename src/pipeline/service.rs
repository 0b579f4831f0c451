use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

use super::types::{DailyPipelineReport, GeneratedWorkSummary, ReactionsRunReport};
use crate::{
    contributor::{ContributorModel, ContributorService, SyntheticVariant},
    engagement::{EngagementSimulator, SimulationReport},
    generation::{prompt_for, WorkGenerator},
    leaderboard::{LeaderboardService, PeriodKind, AWARDED_TOP_N},
    shared::AppError,
    work::{WorkModel, WorkRepository},
};

/// Batch workflows run by the scheduler or on demand over HTTP
pub struct PipelineService {
    contributors: Arc<ContributorService>,
    works: Arc<dyn WorkRepository>,
    simulator: Arc<EngagementSimulator>,
    leaderboard: Arc<LeaderboardService>,
    generator: Option<Arc<dyn WorkGenerator>>,
}

impl PipelineService {
    pub fn new(
        contributors: Arc<ContributorService>,
        works: Arc<dyn WorkRepository>,
        simulator: Arc<EngagementSimulator>,
        leaderboard: Arc<LeaderboardService>,
        generator: Option<Arc<dyn WorkGenerator>>,
    ) -> Self {
        Self {
            contributors,
            works,
            simulator,
            leaderboard,
            generator,
        }
    }

    /// Full daily run: bootstrap synthetic contributors, simulate reactions,
    /// generate one work per variant, then reconcile the day's awards.
    ///
    /// Only a missing generator fails the whole run. Every other failure is
    /// isolated to its variant or step and listed in the report.
    #[instrument(skip(self))]
    pub async fn run_daily_pipeline(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<DailyPipelineReport, AppError> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            AppError::Configuration("generation API key is not configured".to_string())
        })?;

        let started = Instant::now();
        let mut report = DailyPipelineReport::default();

        let (synthetic, bootstrap_errors) = self.contributors.ensure_synthetic_contributors().await;
        for (variant, message) in bootstrap_errors {
            report
                .generation_errors
                .insert(variant.to_string(), format!("bootstrap failed: {}", message));
        }

        info!(contributors = synthetic.len(), "Simulating synthetic engagement");
        let simulation = self.simulate(&synthetic).await;
        report.reactions_added = simulation.reactions_added;
        report.reactions_inserted = simulation.inserted;
        report.reaction_errors = simulation.errors;

        for variant in SyntheticVariant::iter() {
            report.works_generated.insert(variant.to_string(), None);
        }
        for contributor in &synthetic {
            let Some(variant) = contributor.synthetic_variant else {
                continue;
            };
            match self
                .generate_for(&**generator, contributor, variant)
                .await
            {
                Ok(summary) => {
                    report.works_generated.insert(variant.to_string(), Some(summary));
                }
                Err(message) => {
                    warn!(variant = %variant, error = %message, "Skipping generation for variant");
                    report.generation_errors.insert(variant.to_string(), message);
                }
            }
        }

        report.awards = self
            .leaderboard
            .update_period(PeriodKind::Day, as_of, AWARDED_TOP_N)
            .await;

        report.success = true;
        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            duration_ms = report.duration_ms,
            reactions_inserted = report.reactions_inserted,
            generation_errors = report.generation_errors.len(),
            awarded = report.awards.outcome.awarded,
            "Daily pipeline completed"
        );

        Ok(report)
    }

    /// Engagement simulation alone, for the existing synthetic contributors
    #[instrument(skip(self))]
    pub async fn run_reactions(&self) -> Result<ReactionsRunReport, AppError> {
        let synthetic = self.contributors.synthetic_contributors().await?;
        let simulation = self.simulate(&synthetic).await;
        let stats = self.contributors.synthetic_stats().await?;

        Ok(ReactionsRunReport {
            success: true,
            reactions_added: simulation.reactions_added,
            reactions_inserted: simulation.inserted,
            reaction_errors: simulation.errors,
            stats,
        })
    }

    async fn simulate(&self, synthetic: &[ContributorModel]) -> SimulationReport {
        match self.simulator.simulate_reactions(synthetic).await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "Engagement simulation failed");
                let mut report = SimulationReport::default();
                report.errors.insert("batch".to_string(), err.to_string());
                report
            }
        }
    }

    async fn generate_for(
        &self,
        generator: &dyn WorkGenerator,
        contributor: &ContributorModel,
        variant: SyntheticVariant,
    ) -> Result<GeneratedWorkSummary, String> {
        let generated = generator
            .generate_work(prompt_for(variant))
            .await
            .map_err(|e| e.to_string())?;

        let work = WorkModel::new(
            contributor.id.clone(),
            generated.title,
            generated.content,
            variant.language().to_string(),
        );
        self.works
            .create_work(&work)
            .await
            .map_err(|e| e.to_string())?;

        info!(variant = %variant, work_id = %work.id, "Generated work stored");
        Ok(GeneratedWorkSummary {
            work_id: work.id,
            title: work.title,
        })
    }
}
