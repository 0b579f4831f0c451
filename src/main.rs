use alfaaz::{
    config::AppConfig,
    contributor::{ContributorRepository, InMemoryContributorRepository, PostgresContributorRepository},
    generation::{HttpWorkGenerator, WorkGenerator},
    leaderboard::{AwardRepository, InMemoryAwardRepository, PostgresAwardRepository},
    pipeline::spawn_scheduler,
    routes::build_router,
    shared::AppState,
    work::{InMemoryWorkRepository, PostgresWorkRepository, WorkRepository},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alfaaz=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting alfaaz server");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let (contributors, works, awards): (
        Arc<dyn ContributorRepository>,
        Arc<dyn WorkRepository>,
        Arc<dyn AwardRepository>,
    ) = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .expect("Failed to connect to database");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");
            info!("Using PostgreSQL stores");
            (
                Arc::new(PostgresContributorRepository::new(pool.clone())),
                Arc::new(PostgresWorkRepository::new(pool.clone())),
                Arc::new(PostgresAwardRepository::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory stores");
            (
                Arc::new(InMemoryContributorRepository::new()),
                Arc::new(InMemoryWorkRepository::new()),
                Arc::new(InMemoryAwardRepository::new()),
            )
        }
    };

    let generator: Option<Arc<dyn WorkGenerator>> = match &config.generation {
        Some(generation) => Some(Arc::new(
            HttpWorkGenerator::new(&generation.api_key, &generation.api_url, &generation.model)
                .expect("Failed to build generation client"),
        )),
        None => {
            warn!("GENERATION_API_KEY not set, daily pipeline will report a configuration error");
            None
        }
    };

    let app_state = AppState::new(contributors, works, awards, generator);

    spawn_scheduler(
        Arc::clone(&app_state.leaderboard_service),
        Arc::clone(&app_state.pipeline_service),
        config.scheduler.clone(),
    );

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap();
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.unwrap();
}
