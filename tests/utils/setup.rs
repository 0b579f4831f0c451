use axum::Router;
use std::sync::Arc;

use alfaaz::{
    build_router,
    contributor::InMemoryContributorRepository,
    engagement::{EngagementSimulator, SequenceDrawSource},
    leaderboard::InMemoryAwardRepository,
    work::InMemoryWorkRepository,
    AppState, ContributorModel, WorkGenerator, WorkModel, WorkRepository,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub router: Router,
    pub state: AppState,
    pub works: Arc<InMemoryWorkRepository>,
}

pub struct TestSetupBuilder {
    poets: Vec<ContributorModel>,
    works: Vec<WorkModel>,
    generator: Option<Arc<dyn WorkGenerator>>,
    draws: Vec<f64>,
    work_store: Option<Arc<dyn WorkRepository>>,
    shared_works: Arc<InMemoryWorkRepository>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            poets: vec![],
            works: vec![],
            generator: None,
            draws: vec![0.2, 0.8, 0.5],
            work_store: None,
            shared_works: Arc::new(InMemoryWorkRepository::new()),
        }
    }

    /// Human contributors whose id equals their username
    pub fn with_poets(mut self, names: &[&str]) -> Self {
        for name in names {
            let mut poet = ContributorModel::new(name.to_string(), Some(capitalise(name)));
            poet.id = name.to_string();
            self.poets.push(poet);
        }
        self
    }

    pub fn with_contributor(mut self, contributor: ContributorModel) -> Self {
        self.poets.push(contributor);
        self
    }

    pub fn with_work(mut self, work: WorkModel) -> Self {
        self.works.push(work);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn WorkGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_draws(mut self, draws: Vec<f64>) -> Self {
        self.draws = draws;
        self
    }

    /// Wraps the in-memory work store; the wrapper sees the seeded works
    pub fn with_work_store<F>(mut self, wrap: F) -> Self
    where
        F: FnOnce(Arc<InMemoryWorkRepository>) -> Arc<dyn WorkRepository>,
    {
        self.work_store = Some(wrap(Arc::clone(&self.shared_works)));
        self
    }

    pub async fn build(self) -> TestSetup {
        let works = self.shared_works;
        for work in &self.works {
            works.create_work(work).await.unwrap();
        }
        let work_store: Arc<dyn WorkRepository> = match self.work_store {
            Some(store) => store,
            None => works.clone(),
        };

        let simulator = Arc::new(
            EngagementSimulator::new(Arc::clone(&work_store))
                .with_draw_source(Box::new(SequenceDrawSource::new(self.draws))),
        );
        let state = AppState::with_simulator(
            Arc::new(InMemoryContributorRepository::with_contributors(self.poets)),
            work_store,
            Arc::new(InMemoryAwardRepository::new()),
            self.generator,
            simulator,
        );

        TestSetup {
            router: build_router(state.clone()),
            state,
            works,
        }
    }
}

fn capitalise(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
