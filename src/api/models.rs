use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Error text the suggestion endpoint uses when the catalog is empty.
pub const NO_TABLES_SENTINEL: &str = "No tables found in database";

// Translation backends understood by the query service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "anthropic")]
    Anthropic,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
        }
    }
}

// Query types

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(rename = "llm_provider")]
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub execution_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    /// Error text, treating an empty string the same as no error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// True when the response carries rows that can be exported.
    pub fn has_tabular_output(&self) -> bool {
        self.error_message().is_none() && !self.results.is_empty()
    }
}

/// Text shown for one cell: null renders empty, strings render bare.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// Catalog types

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub row_count: u64,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
    #[serde(default)]
    pub total_tables: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogSnapshot {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub table_schema: HashMap<String, String>,
    #[serde(default)]
    pub row_count: u64,
    #[serde(default)]
    pub sample_data: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

// Suggestion types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCode {
    Ok,
    NoTables,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SuggestionCode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStatus<'a> {
    Ready,
    /// Informational: the catalog is empty and `query` holds a hint instead.
    NoTables,
    Failed(&'a str),
}

impl SuggestionResult {
    pub fn status(&self) -> SuggestionStatus<'_> {
        if self.status == Some(SuggestionCode::NoTables) {
            return SuggestionStatus::NoTables;
        }
        match self.error.as_deref() {
            None | Some("") => SuggestionStatus::Ready,
            Some(NO_TABLES_SENTINEL) => SuggestionStatus::NoTables,
            Some(other) => SuggestionStatus::Failed(other),
        }
    }
}

// Health check

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database_connected: bool,
    #[serde(default)]
    pub tables_count: u64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub uptime_seconds: f64,
}

// File payloads

/// A file-like object handed to the ingestion service.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Bundled datasets the service can hand out for a quick start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDataset {
    Users,
    Products,
    Events,
}

impl SampleDataset {
    pub fn file_name(&self) -> &'static str {
        match self {
            SampleDataset::Users => "users.json",
            SampleDataset::Products => "products.csv",
            SampleDataset::Events => "events.jsonl",
        }
    }
}

impl FromStr for SampleDataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(SampleDataset::Users),
            "products" => Ok(SampleDataset::Products),
            "events" => Ok(SampleDataset::Events),
            other => Err(format!("Unknown sample type: {}", other)),
        }
    }
}

// The catalog service emits naive ISO timestamps; accept RFC 3339 as well
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.naive_utc());
        }
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(serde::de::Error::custom)
    }
}
