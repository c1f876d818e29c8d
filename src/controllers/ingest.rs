use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::api::models::{FilePayload, SampleDataset};
use crate::api::CatalogService;
use crate::ui::notices::post_transient;
use crate::ui::SharedScreen;
use crate::views::catalog::CatalogView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Created { table_name: String, row_count: u64 },
    Failed(String),
}

/// Funnels picked files, dropped files and bundled samples into one upload path.
#[derive(Clone)]
pub struct IngestController {
    service: Arc<dyn CatalogService>,
    catalog: CatalogView,
    screen: SharedScreen,
    notice_ttl: Duration,
}

impl IngestController {
    pub fn new(
        service: Arc<dyn CatalogService>,
        catalog: CatalogView,
        screen: SharedScreen,
        notice_ttl: Duration,
    ) -> Self {
        Self {
            service,
            catalog,
            screen,
            notice_ttl,
        }
    }

    fn fail(&self, message: String) -> IngestOutcome {
        error!("Ingest failed: {}", message);
        self.screen.show_error(message.clone());
        IngestOutcome::Failed(message)
    }

    /// Uploads the file; on success confirms and reloads the catalog.
    pub async fn ingest(&self, file: FilePayload) -> IngestOutcome {
        info!("Ingesting {}", file.file_name);
        let result = match self.service.upload_file(&file).await {
            Ok(result) => result,
            Err(e) => return self.fail(e.to_string()),
        };

        if let Some(e) = result.error_message() {
            return self.fail(e.to_string());
        }

        post_transient(
            &self.screen,
            format!(
                "Table \"{}\" created successfully with {} rows!",
                result.table_name, result.row_count
            ),
            self.notice_ttl,
        );
        self.catalog.refresh().await;

        IngestOutcome::Created {
            table_name: result.table_name,
            row_count: result.row_count,
        }
    }

    /// File chosen through a picker.
    pub async fn pick_file(&self, path: &Path) -> IngestOutcome {
        match read_payload(path).await {
            Ok(file) => self.ingest(file).await,
            Err(message) => self.fail(message),
        }
    }

    pub fn drag_enter(&self) {
        self.screen.update(|s| s.drop_zone.highlight());
    }

    pub fn drag_leave(&self) {
        if self.screen.update(|s| s.drop_zone.clear()) {
            debug!("Drop zone highlight cleared");
        }
    }

    /// Completes a drag: clears the highlight, then ingests the dropped file.
    pub async fn drop_file(&self, path: &Path) -> IngestOutcome {
        self.drag_leave();
        self.pick_file(path).await
    }

    /// Fetches a bundled dataset by name and ingests it like any other file.
    pub async fn load_sample(&self, sample: &str) -> IngestOutcome {
        let dataset: SampleDataset = match sample.parse() {
            Ok(dataset) => dataset,
            Err(message) => return self.fail(message),
        };

        let bytes = match self.service.fetch_sample(dataset.file_name()).await {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(format!("Failed to load sample data: {}", e)),
        };

        self.ingest(FilePayload::new(dataset.file_name(), bytes)).await
    }
}

async fn read_payload(path: &Path) -> Result<FilePayload, String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Not a file: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(FilePayload::new(file_name, bytes))
}
