use crate::domain::entities::document::normalize_lines;
use crate::domain::error::DomainError;
use crate::domain::ports::document_repository::DocumentRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_SOURCE: &str = "trades";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub lines: usize,
}

pub struct IngestUseCase {
    repo: Arc<dyn DocumentRepository>,
}

impl IngestUseCase {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self { repo }
    }

    /// Stores every non-blank line of `raw_text` under `source`.
    ///
    /// Not atomic: on a storage failure the lines inserted before it remain.
    pub fn execute(&self, source: &str, raw_text: &str) -> Result<IngestReport, DomainError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(DomainError::Validation("source label must not be empty".into()));
        }

        let lines = normalize_lines(raw_text);
        let inserted = if lines.is_empty() {
            0
        } else {
            self.repo.append(source, &lines)?
        };
        info!(source, lines = inserted, "Ingested document lines");

        Ok(IngestReport {
            source: source.to_string(),
            lines: inserted,
        })
    }
}
