use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alfaaz::{
    generation::{parse_generated_work, prompt_for, GeneratedWork, GenerationError, WorkGenerator},
    work::{
        InMemoryWorkRepository, Polarity, ReactionChange, ReactionModel, WorkModel, WorkRepository,
    },
    AppError, SyntheticVariant,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Replies with a fixed raw payload per variant prompt, or fails when none is scripted
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: HashMap<&'static str, String>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, variant: SyntheticVariant, raw: &str) -> Self {
        self.replies.insert(prompt_for(variant), raw.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkGenerator for ScriptedGenerator {
    async fn generate_work(&self, prompt: &str) -> Result<GeneratedWork, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(prompt) {
            Some(raw) => parse_generated_work(raw),
            None => Err(GenerationError::Api {
                status: 503,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// Work store whose reaction reads fail for one reactor
pub struct FailingWorkRepository {
    inner: Arc<InMemoryWorkRepository>,
    failing_reactor: String,
}

impl FailingWorkRepository {
    pub fn new(inner: Arc<InMemoryWorkRepository>, failing_reactor: &str) -> Self {
        Self {
            inner,
            failing_reactor: failing_reactor.to_string(),
        }
    }
}

#[async_trait]
impl WorkRepository for FailingWorkRepository {
    async fn create_work(&self, work: &WorkModel) -> Result<(), AppError> {
        self.inner.create_work(work).await
    }

    async fn get_work(&self, work_id: &str) -> Result<Option<WorkModel>, AppError> {
        self.inner.get_work(work_id).await
    }

    async fn list_works(&self) -> Result<Vec<WorkModel>, AppError> {
        self.inner.list_works().await
    }

    async fn list_works_by_author(
        &self,
        author_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<WorkModel>, AppError> {
        self.inner.list_works_by_author(author_id, since).await
    }

    async fn list_reactions_by_reactor(
        &self,
        reactor_id: &str,
    ) -> Result<Vec<ReactionModel>, AppError> {
        if reactor_id == self.failing_reactor {
            return Err(AppError::DatabaseError("read timed out".to_string()));
        }
        self.inner.list_reactions_by_reactor(reactor_id).await
    }

    async fn insert_reactions(
        &self,
        reactions: &[ReactionModel],
    ) -> Result<Vec<ReactionModel>, AppError> {
        self.inner.insert_reactions(reactions).await
    }

    async fn upsert_reaction(&self, reaction: &ReactionModel) -> Result<ReactionChange, AppError> {
        self.inner.upsert_reaction(reaction).await
    }

    async fn delete_reaction(
        &self,
        work_id: &str,
        reactor_id: &str,
    ) -> Result<Option<Polarity>, AppError> {
        self.inner.delete_reaction(work_id, reactor_id).await
    }
}
