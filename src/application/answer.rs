use crate::application::recent::RecentUseCase;
use crate::domain::error::DomainError;
use crate::domain::values::recent_limit::RecentLimit;
use serde::Serialize;
use std::sync::Arc;

/// How many of the retrieved lines are quoted in the answer body.
const CONTEXT_LINES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
}

/// Canned reply over the most recent documents. Plain string templating:
/// the same store contents and question always give the same answer.
pub struct AnswerUseCase {
    recent: Arc<RecentUseCase>,
}

impl AnswerUseCase {
    pub fn new(recent: Arc<RecentUseCase>) -> Self {
        Self { recent }
    }

    pub fn execute(&self, question: &str, limit: RecentLimit) -> Result<Answer, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::Validation("question must not be empty".into()));
        }
        let sources = self.recent.texts(limit)?;
        Ok(Answer {
            answer: render_answer(question, &sources),
            sources,
        })
    }
}

pub fn render_answer(question: &str, context: &[String]) -> String {
    let quoted: Vec<&str> = context
        .iter()
        .take(CONTEXT_LINES)
        .map(String::as_str)
        .collect();
    format!(
        "I checked your recent trades and market facts:\n{}\n\nYou asked: {question}\n\n(Reply: this is the MVP assistant. Connect an LLM for richer answers.)",
        quoted.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_four_lines_quoted() {
        let ctx: Vec<String> = (1..=6).map(|i| format!("line {i}")).collect();
        let out = render_answer("q?", &ctx);
        assert!(out.contains("line 1\nline 2\nline 3\nline 4\n"));
        assert!(!out.contains("line 5"));
        assert!(out.contains("You asked: q?"));
    }

    #[test]
    fn test_empty_context() {
        let out = render_answer("anything?", &[]);
        assert!(out.starts_with("I checked your recent trades and market facts:\n\n"));
        assert!(out.contains("anything?"));
    }
}
