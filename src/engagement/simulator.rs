use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::draw::{draw_polarity, DrawSource, RandomDrawSource, POSITIVE_REACTION_CHANCE};
use crate::{
    contributor::models::ContributorModel,
    shared::AppError,
    work::{
        models::{Polarity, ReactionModel},
        repository::WorkRepository,
    },
};

/// Reactions written for one synthetic contributor in a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    pub liked: u32,
    pub disliked: u32,
}

impl ReactionTally {
    fn record(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Positive => self.liked += 1,
            Polarity::Negative => self.disliked += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Keyed by variant tag; counts only rows the store accepted
    pub reactions_added: BTreeMap<String, ReactionTally>,
    pub drawn: u64,
    /// Rows actually written; lower than `drawn` when a concurrent run got there first
    pub inserted: u64,
    pub errors: BTreeMap<String, String>,
}

/// Assigns one content-blind reaction from each synthetic contributor to
/// every work it has not reacted to yet.
pub struct EngagementSimulator {
    works: Arc<dyn WorkRepository>,
    draws: Mutex<Box<dyn DrawSource>>,
    threshold: f64,
}

impl EngagementSimulator {
    pub fn new(works: Arc<dyn WorkRepository>) -> Self {
        Self {
            works,
            draws: Mutex::new(Box::new(RandomDrawSource::new())),
            threshold: POSITIVE_REACTION_CHANCE,
        }
    }

    pub fn with_draw_source(mut self, source: Box<dyn DrawSource>) -> Self {
        self.draws = Mutex::new(source);
        self
    }

    /// Draws reactions for every unreacted (work, contributor) pair and writes
    /// them in one batch. Works are visited oldest first.
    ///
    /// A contributor whose reactions cannot be read is skipped and reported.
    /// The set difference is only a fast path: the store drops any pair that
    /// already exists at insert time.
    #[instrument(skip(self, contributors), fields(contributors = contributors.len()))]
    pub async fn simulate_reactions(
        &self,
        contributors: &[ContributorModel],
    ) -> Result<SimulationReport, AppError> {
        let works = self.works.list_works().await?;
        let mut report = SimulationReport::default();

        let fetches = contributors.iter().map(|contributor| async move {
            let existing = self.works.list_reactions_by_reactor(&contributor.id).await;
            (contributor, existing)
        });
        let existing_by_contributor = join_all(fetches).await;

        let mut batch = Vec::new();
        let mut keys: HashMap<&str, String> = HashMap::new();
        {
            let mut draws = self.draws.lock().await;

            for (contributor, existing) in existing_by_contributor {
                let key = contributor.report_key();
                let reacted: HashSet<String> = match existing {
                    Ok(reactions) => reactions.into_iter().map(|r| r.work_id).collect(),
                    Err(err) => {
                        warn!(contributor_id = %contributor.id, error = %err, "Skipping contributor, reactions fetch failed");
                        report.errors.insert(key, err.to_string());
                        continue;
                    }
                };

                report.reactions_added.entry(key.clone()).or_default();
                keys.insert(contributor.id.as_str(), key);
                for work in works.iter().filter(|work| !reacted.contains(&work.id)) {
                    let polarity = draw_polarity(draws.next_draw(), self.threshold);
                    batch.push(ReactionModel::new(
                        work.id.clone(),
                        contributor.id.clone(),
                        polarity,
                    ));
                }
            }
        }

        report.drawn = batch.len() as u64;
        if !batch.is_empty() {
            let written = self.works.insert_reactions(&batch).await?;
            report.inserted = written.len() as u64;
            for reaction in &written {
                if let Some(key) = keys.get(reaction.reactor_id.as_str()) {
                    if let Some(tally) = report.reactions_added.get_mut(key) {
                        tally.record(reaction.polarity);
                    }
                }
            }
        }

        info!(drawn = report.drawn, inserted = report.inserted, "Simulated reactions written");
        Ok(report)
    }
}
