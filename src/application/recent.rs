use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_repository::DocumentRepository;
use crate::domain::values::recent_limit::RecentLimit;
use std::sync::Arc;

pub struct RecentUseCase {
    repo: Arc<dyn DocumentRepository>,
}

impl RecentUseCase {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self { repo }
    }

    pub fn execute(&self, limit: RecentLimit) -> Result<Vec<Document>, DomainError> {
        self.repo.recent(limit.value())
    }

    pub fn texts(&self, limit: RecentLimit) -> Result<Vec<String>, DomainError> {
        Ok(self.execute(limit)?.into_iter().map(|d| d.text).collect())
    }
}
