use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::document_repository::DocumentRepository;
use crate::domain::values::recent_limit::RecentLimit;
use std::sync::Arc;

pub struct SearchUseCase {
    repo: Arc<dyn DocumentRepository>,
}

impl SearchUseCase {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self { repo }
    }

    /// Keyword search: documents containing `text`, newest first.
    pub fn keyword_search(&self, text: &str, limit: RecentLimit) -> Result<Vec<Document>, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("search text must not be empty".into()));
        }
        self.repo.search(text, limit.value())
    }
}
