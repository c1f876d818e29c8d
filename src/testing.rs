//! Fakes shared by the unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::models::{
    CatalogSnapshot, ColumnInfo, FilePayload, HealthStatus, QueryRequest, QueryResponse,
    SuggestionResult, TableSchema, UploadResult,
};
use crate::api::{CatalogService, QueryService, ServiceError};
use crate::downloads::DownloadSink;
use crate::ui::Confirm;

pub fn sample_response() -> QueryResponse {
    QueryResponse {
        sql: "SELECT id, name FROM users".to_string(),
        columns: vec!["id".to_string(), "name".to_string()],
        results: vec![
            json!({"id": 1, "name": "Alice"}).as_object().unwrap().clone(),
            json!({"id": 2, "name": null}).as_object().unwrap().clone(),
        ],
        row_count: 2,
        execution_time_ms: 4.2,
        error: None,
    }
}

pub fn table(name: &str, row_count: u64) -> TableSchema {
    TableSchema {
        name: name.to_string(),
        columns: vec![
            ColumnInfo {
                name: "id".to_string(),
                type_tag: "INTEGER".to_string(),
                nullable: false,
                primary_key: true,
            },
            ColumnInfo {
                name: "name".to_string(),
                type_tag: "TEXT".to_string(),
                nullable: true,
                primary_key: false,
            },
        ],
        row_count,
        created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
    }
}

/// In-memory stand-in for both remote services. Records every call.
pub struct FakeBackend {
    queries: Mutex<Vec<QueryRequest>>,
    query_reply: Mutex<Result<QueryResponse, ServiceError>>,
    query_gate: Mutex<Option<Arc<Notify>>>,
    query_panics: AtomicBool,
    suggestion_reply: Mutex<Result<SuggestionResult, ServiceError>>,
    suggestions: AtomicUsize,
    catalog_reply: Mutex<Result<CatalogSnapshot, ServiceError>>,
    catalog_fetches: AtomicUsize,
    upload_reply: Mutex<Result<UploadResult, ServiceError>>,
    uploads: Mutex<Vec<FilePayload>>,
    remove_error: Mutex<Option<ServiceError>>,
    deletions: Mutex<Vec<String>>,
    samples: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            query_reply: Mutex::new(Ok(sample_response())),
            query_gate: Mutex::new(None),
            query_panics: AtomicBool::new(false),
            suggestion_reply: Mutex::new(Ok(SuggestionResult {
                query: "SELECT * FROM users LIMIT 5".to_string(),
                error: None,
                status: None,
            })),
            suggestions: AtomicUsize::new(0),
            catalog_reply: Mutex::new(Ok(CatalogSnapshot::default())),
            catalog_fetches: AtomicUsize::new(0),
            upload_reply: Mutex::new(Ok(UploadResult {
                table_name: "users".to_string(),
                table_schema: HashMap::from([("id".to_string(), "INTEGER".to_string())]),
                row_count: 3,
                sample_data: vec![],
                error: None,
            })),
            uploads: Mutex::new(Vec::new()),
            remove_error: Mutex::new(None),
            deletions: Mutex::new(Vec::new()),
            samples: Mutex::new(Vec::new()),
        }
    }

    pub fn set_query_reply(&self, reply: Result<QueryResponse, ServiceError>) {
        *self.query_reply.lock().unwrap() = reply;
    }

    /// Holds every query call until the returned handle is notified.
    pub fn gate_queries(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.query_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes the next query call panic instead of answering.
    pub fn panic_next_query(&self) {
        self.query_panics.store(true, Ordering::SeqCst);
    }

    pub fn set_suggestion(&self, reply: Result<SuggestionResult, ServiceError>) {
        *self.suggestion_reply.lock().unwrap() = reply;
    }

    pub fn set_catalog(&self, reply: Result<CatalogSnapshot, ServiceError>) {
        *self.catalog_reply.lock().unwrap() = reply;
    }

    pub fn set_tables(&self, tables: Vec<TableSchema>) {
        let total_tables = tables.len() as u64;
        self.set_catalog(Ok(CatalogSnapshot {
            tables,
            total_tables,
            error: None,
        }));
    }

    pub fn set_upload_reply(&self, reply: Result<UploadResult, ServiceError>) {
        *self.upload_reply.lock().unwrap() = reply;
    }

    pub fn set_remove_error(&self, error: Option<ServiceError>) {
        *self.remove_error.lock().unwrap() = error;
    }

    pub fn queries(&self) -> Vec<QueryRequest> {
        self.queries.lock().unwrap().clone()
    }

    pub fn suggestion_calls(&self) -> usize {
        self.suggestions.load(Ordering::SeqCst)
    }

    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<FilePayload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }

    pub fn samples(&self) -> Vec<String> {
        self.samples.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryService for FakeBackend {
    async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError> {
        self.queries.lock().unwrap().push(request.clone());
        if self.query_panics.swap(false, Ordering::SeqCst) {
            panic!("query backend crashed");
        }
        let gate = self.query_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.query_reply.lock().unwrap().clone()
    }

    async fn suggest_query(&self) -> Result<SuggestionResult, ServiceError> {
        self.suggestions.fetch_add(1, Ordering::SeqCst);
        self.suggestion_reply.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogService for FakeBackend {
    async fn fetch_catalog(&self) -> Result<CatalogSnapshot, ServiceError> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        self.catalog_reply.lock().unwrap().clone()
    }

    async fn upload_file(&self, file: &FilePayload) -> Result<UploadResult, ServiceError> {
        self.uploads.lock().unwrap().push(file.clone());
        self.upload_reply.lock().unwrap().clone()
    }

    async fn remove_table(&self, table_name: &str) -> Result<(), ServiceError> {
        if let Some(e) = self.remove_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.deletions.lock().unwrap().push(table_name.to_string());
        Ok(())
    }

    async fn export_table(&self, table_name: &str) -> Result<Vec<u8>, ServiceError> {
        Ok(format!("id,name\n1,{}\n", table_name).into_bytes())
    }

    async fn fetch_sample(&self, file_name: &str) -> Result<Vec<u8>, ServiceError> {
        self.samples.lock().unwrap().push(file_name.to_string());
        Ok(b"[{\"id\": 1}]".to_vec())
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            database_connected: true,
            tables_count: 0,
            version: "test".to_string(),
            uptime_seconds: 1.0,
        })
    }
}

/// Keeps downloads in memory keyed by file name.
#[derive(Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn saved(&self) -> Vec<String> {
        self.files.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn text(&self, file_name: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == file_name)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).to_string())
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.files
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// Answers every confirmation with a fixed choice and remembers the prompts.
pub struct StubConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl StubConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for StubConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}
