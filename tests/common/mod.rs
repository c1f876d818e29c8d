//! In-process stand-in for the query and catalog service.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct Recorded {
    pub queries: Vec<Value>,
    pub uploads: Vec<ReceivedFile>,
    pub deletions: Vec<String>,
    pub tables: Vec<String>,
}

pub type MockState = Arc<Mutex<Recorded>>;

type ApiError = (StatusCode, Json<Value>);

fn detail(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": message.into() })))
}

fn table_json(name: &str) -> Value {
    json!({
        "name": name,
        "columns": [
            {"name": "id", "type": "INTEGER", "nullable": false, "primary_key": true},
            {"name": "name", "type": "VARCHAR", "nullable": true, "primary_key": false}
        ],
        "row_count": 2,
        "created_at": "2024-05-01T10:00:00"
    })
}

async fn query(
    State(state): State<MockState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.lock().unwrap().queries.push(payload.clone());

    if payload["query"] == "break things" {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "Query translation failed"));
    }

    Ok(Json(json!({
        "sql": "SELECT id, name FROM users",
        "columns": ["id", "name"],
        "results": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Smith, Bob"}],
        "row_count": 2,
        "execution_time_ms": 3.5
    })))
}

async fn suggest(State(state): State<MockState>) -> Json<Value> {
    if state.lock().unwrap().tables.is_empty() {
        return Json(json!({
            "query": "Upload a file to get started",
            "error": "No tables found in database"
        }));
    }
    Json(json!({ "query": "Show me the first 5 rows of users" }))
}

async fn schema(State(state): State<MockState>) -> Json<Value> {
    let tables: Vec<Value> = state
        .lock()
        .unwrap()
        .tables
        .iter()
        .map(|name| table_json(name))
        .collect();
    Json(json!({ "total_tables": tables.len(), "tables": tables }))
}

async fn upload(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| detail(StatusCode::BAD_REQUEST, e.to_string()))?
            .to_vec();

        let table_name = file_name
            .as_deref()
            .and_then(|n| n.split('.').next())
            .unwrap_or("upload")
            .to_string();

        let mut recorded = state.lock().unwrap();
        recorded.uploads.push(ReceivedFile {
            file_name,
            content_type,
            bytes,
        });
        recorded.tables.push(table_name.clone());

        return Ok(Json(json!({
            "table_name": table_name,
            "table_schema": {"id": "INTEGER", "name": "VARCHAR"},
            "row_count": 2,
            "sample_data": [{"id": 1, "name": "Alice"}]
        })));
    }

    Err(detail(StatusCode::BAD_REQUEST, "No file provided"))
}

async fn remove(
    State(state): State<MockState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut recorded = state.lock().unwrap();
    let Some(index) = recorded.tables.iter().position(|t| *t == name) else {
        return Err(detail(
            StatusCode::NOT_FOUND,
            format!("Table '{}' not found", name),
        ));
    };
    recorded.tables.remove(index);
    recorded.deletions.push(name.clone());
    Ok(Json(json!({ "message": format!("Table '{}' deleted successfully", name) })))
}

async fn export(Path(name): Path<String>) -> String {
    format!("id,name\n1,{}\n", name)
}

async fn sample(Path(file): Path<String>) -> Result<Vec<u8>, (StatusCode, String)> {
    match file.as_str() {
        "users.json" => Ok(br#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#.to_vec()),
        _ => Err((StatusCode::NOT_FOUND, "Not Found".to_string())),
    }
}

async fn health(State(state): State<MockState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "database_connected": true,
        "tables_count": state.lock().unwrap().tables.len(),
        "version": "1.0.0",
        "uptime_seconds": 12.5
    }))
}

/// Starts the mock on an ephemeral port; returns its base URL and the record of calls.
pub async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/query", post(query))
        .route("/api/generate-random-query", get(suggest))
        .route("/api/schema", get(schema))
        .route("/api/upload", post(upload))
        .route("/api/table/{name}", delete(remove))
        .route("/api/table/{name}/export", get(export))
        .route("/sample-data/{file}", get(sample))
        .route("/api/health", get(health))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}
