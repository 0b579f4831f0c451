use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use super::service::PipelineService;
use crate::leaderboard::LeaderboardService;

/// Configuration for the background batch loops
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// How often day, week and month awards are recomputed
    pub leaderboard_interval: Duration,
    /// How often the full daily pipeline runs
    pub daily_pipeline_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            leaderboard_interval: Duration::from_secs(60 * 60), // 1 hour
            daily_pipeline_interval: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }
}

/// Periodically recomputes every period's awards. A tick waits for the
/// previous run, so reconciliations of one period never overlap.
#[instrument(skip(leaderboard))]
pub async fn start_leaderboard_task(leaderboard: Arc<LeaderboardService>, every: Duration) {
    info!(interval_secs = every.as_secs(), "Starting leaderboard update task");

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let report = leaderboard.update_leaderboards(Utc::now()).await;
        if report.success {
            info!("Scheduled leaderboard update completed");
        } else {
            let failed: Vec<&String> = report
                .periods
                .iter()
                .filter(|(_, update)| !update.outcome.errors.is_empty())
                .map(|(period, _)| period)
                .collect();
            warn!(?failed, "Scheduled leaderboard update had failures");
        }
    }
}

/// Periodically runs the full daily pipeline
#[instrument(skip(pipeline))]
pub async fn start_daily_pipeline_task(pipeline: Arc<PipelineService>, every: Duration) {
    info!(interval_secs = every.as_secs(), "Starting daily pipeline task");

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match pipeline.run_daily_pipeline(Utc::now()).await {
            Ok(report) => {
                info!(
                    duration_ms = report.duration_ms,
                    reactions_inserted = report.reactions_inserted,
                    "Scheduled daily pipeline completed"
                );
            }
            Err(e) => {
                error!(error = %e, "Scheduled daily pipeline failed");
            }
        }
    }
}

/// Spawns both loops when enabled
pub fn spawn_scheduler(
    leaderboard: Arc<LeaderboardService>,
    pipeline: Arc<PipelineService>,
    config: SchedulerConfig,
) {
    if !config.enabled {
        info!("Scheduler disabled");
        return;
    }

    tokio::spawn(start_leaderboard_task(
        leaderboard,
        config.leaderboard_interval,
    ));
    tokio::spawn(start_daily_pipeline_task(
        pipeline,
        config.daily_pipeline_interval,
    ));
}
