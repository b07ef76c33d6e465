pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod server;

use crate::application::answer::{Answer, AnswerUseCase};
use crate::application::ingest::{IngestReport, IngestUseCase};
use crate::application::recent::RecentUseCase;
use crate::application::search::SearchUseCase;
use crate::application::session::{ConnectOutcome, SessionManager, SessionStatus};
use crate::application::stats::StatsUseCase;
use crate::config::{AppConfig, BrokerKind};
use crate::domain::entities::credentials::Credentials;
use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::broker::{BrokerClient, OptionChainRequest, QuoteRequest};
use crate::domain::ports::document_repository::{DocumentRepository, DocumentStats};
use crate::domain::values::recent_limit::RecentLimit;
use crate::infrastructure::broker::paper::PaperBroker;
use crate::infrastructure::broker::smartapi::SmartApiBroker;
use crate::infrastructure::sqlite::document_repo::SqliteDocumentRepo;
use std::sync::Arc;

pub struct BotPro {
    ingest_uc: IngestUseCase,
    recent_uc: Arc<RecentUseCase>,
    answer_uc: AnswerUseCase,
    search_uc: SearchUseCase,
    stats_uc: StatsUseCase,
    session: SessionManager,
}

impl BotPro {
    pub fn new(config: &AppConfig, credentials: Credentials) -> Result<Self, DomainError> {
        let broker: Arc<dyn BrokerClient> = match config.broker {
            BrokerKind::SmartApi => Arc::new(SmartApiBroker::new(
                config.broker_base_url.clone(),
                credentials.api_key.clone(),
                config.login_timeout,
            )),
            BrokerKind::Paper => Arc::new(PaperBroker),
        };

        Self::with_providers(config, credentials, broker)
    }

    pub fn with_providers(
        config: &AppConfig,
        credentials: Credentials,
        broker: Arc<dyn BrokerClient>,
    ) -> Result<Self, DomainError> {
        let repo: Arc<dyn DocumentRepository> =
            Arc::new(SqliteDocumentRepo::open(&config.db_path, config.store_timeout)?);
        let recent_uc = Arc::new(RecentUseCase::new(repo.clone()));

        Ok(Self {
            ingest_uc: IngestUseCase::new(repo.clone()),
            answer_uc: AnswerUseCase::new(recent_uc.clone()),
            recent_uc,
            search_uc: SearchUseCase::new(repo.clone()),
            stats_uc: StatsUseCase::new(repo),
            session: SessionManager::new(credentials, broker, config.login_timeout),
        })
    }

    // Document store

    pub fn ingest(&self, source: &str, raw_text: &str) -> Result<IngestReport, DomainError> {
        self.ingest_uc.execute(source, raw_text)
    }

    pub fn recent(&self, limit: i64) -> Result<Vec<Document>, DomainError> {
        self.recent_uc.execute(parse_limit(limit)?)
    }

    pub fn answer(&self, question: &str, limit: i64) -> Result<Answer, DomainError> {
        self.answer_uc.execute(question, parse_limit(limit)?)
    }

    pub fn search(&self, text: &str, limit: i64) -> Result<Vec<Document>, DomainError> {
        self.search_uc.keyword_search(text, parse_limit(limit)?)
    }

    pub fn stats(&self) -> Result<DocumentStats, DomainError> {
        self.stats_uc.stats()
    }

    // Brokerage session

    pub async fn connect(&self) -> ConnectOutcome {
        self.session.connect().await
    }

    pub async fn ensure_connected(&self) -> ConnectOutcome {
        self.session.ensure_connected().await
    }

    pub fn get_feed_token(&self) -> Result<String, DomainError> {
        self.session.get_feed_token()
    }

    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }

    pub async fn logout(&self) -> Result<(), DomainError> {
        self.session.logout().await
    }

    pub async fn balance(&self) -> Result<serde_json::Value, DomainError> {
        self.session.balance().await
    }

    pub async fn ltp(&self, quote: &QuoteRequest) -> Result<serde_json::Value, DomainError> {
        self.session.ltp(quote).await
    }

    pub async fn option_chain(&self, request: &OptionChainRequest) -> Result<serde_json::Value, DomainError> {
        self.session.option_chain(request).await
    }
}

fn parse_limit(limit: i64) -> Result<RecentLimit, DomainError> {
    RecentLimit::new(limit).map_err(DomainError::Validation)
}
