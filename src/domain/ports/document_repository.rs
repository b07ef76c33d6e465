use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DocumentStats {
    pub total_documents: usize,
    pub by_source: Vec<(String, usize)>,
}

/// Append-only store of ingested lines.
pub trait DocumentRepository: Send + Sync {
    /// Inserts one document per line, in order. Lines are committed one at a
    /// time: if this fails part-way, the lines before the failure stay stored.
    fn append(&self, source: &str, lines: &[String]) -> Result<usize, DomainError>;
    /// Newest first.
    fn recent(&self, limit: usize) -> Result<Vec<Document>, DomainError>;
    fn search(&self, text: &str, limit: usize) -> Result<Vec<Document>, DomainError>;
    fn stats(&self) -> Result<DocumentStats, DomainError>;
}
