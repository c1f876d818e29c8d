pub mod http;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::models::{
    CatalogSnapshot, FilePayload, HealthStatus, QueryRequest, QueryResponse, SuggestionResult,
    UploadResult,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Service connection error: {0}")]
    Connection(String),
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },
    #[error("Unexpected service response: {0}")]
    Decode(String),
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

/// Natural-language query translation and execution.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError>;

    async fn suggest_query(&self) -> Result<SuggestionResult, ServiceError>;
}

/// File ingestion and the table catalog it maintains.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, ServiceError>;

    async fn upload_file(&self, file: &FilePayload) -> Result<UploadResult, ServiceError>;

    async fn remove_table(&self, table_name: &str) -> Result<(), ServiceError>;

    /// Server-rendered CSV for a whole table.
    async fn export_table(&self, table_name: &str) -> Result<Vec<u8>, ServiceError>;

    async fn fetch_sample(&self, file_name: &str) -> Result<Vec<u8>, ServiceError>;

    async fn health(&self) -> Result<HealthStatus, ServiceError>;
}
