use chrono::{Duration, Utc};

use alfaaz::WorkModel;

// ============================================================================
// Fixture Builders
// ============================================================================

pub struct WorkBuilder {
    author_id: String,
    title: String,
    likes: i64,
    age: Duration,
}

impl WorkBuilder {
    pub fn by(author_id: &str) -> Self {
        Self {
            author_id: author_id.to_string(),
            title: "Untitled".to_string(),
            likes: 0,
            age: Duration::minutes(1),
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_likes(mut self, likes: i64) -> Self {
        self.likes = likes;
        self
    }

    pub fn aged(mut self, age: Duration) -> Self {
        self.age = age;
        self
    }

    pub fn build(self) -> WorkModel {
        let mut work = WorkModel::new(
            self.author_id,
            self.title,
            "a line\nanother line".to_string(),
            "english".to_string(),
        );
        work.positive_count = self.likes;
        work.created_at = Utc::now() - self.age;
        work
    }
}
