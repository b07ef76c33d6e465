pub mod broker;
pub mod document_repository;
