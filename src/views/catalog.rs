use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::models::{CatalogSnapshot, TableSchema};
use crate::api::CatalogService;
use crate::downloads::DownloadSink;
use crate::ui::dispatch::{Command, Control, Dispatcher, Region};
use crate::ui::notices::post_transient;
use crate::ui::{Confirm, SharedScreen};
use crate::views::icons::type_icon;

pub const EMPTY_CATALOG_TEXT: &str =
    "No tables loaded. Upload data or use sample data to get started.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTag {
    pub name: String,
    pub type_tag: String,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableEntry {
    pub name: String,
    pub summary: String,
    pub columns: Vec<ColumnTag>,
    pub download: Control,
    pub remove: Control,
}

impl TableEntry {
    fn build(table: &TableSchema, dispatcher: &mut Dispatcher) -> Self {
        Self {
            name: table.name.clone(),
            summary: format!("{} rows, {} columns", table.row_count, table.columns.len()),
            columns: table
                .columns
                .iter()
                .map(|column| ColumnTag {
                    name: column.name.clone(),
                    type_tag: column.type_tag.clone(),
                    icon: type_icon(&column.type_tag),
                })
                .collect(),
            download: dispatcher.control(
                Region::Catalog,
                Command::DownloadTable(table.name.clone()),
                "⇩",
                "Download as CSV",
            ),
            remove: dispatcher.control(
                Region::Catalog,
                Command::RemoveTable(table.name.clone()),
                "×",
                "Remove table",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogBody {
    Loading,
    Placeholder { text: String },
    Tables { entries: Vec<TableEntry> },
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPanel {
    pub body: CatalogBody,
    /// Last snapshot that was rendered; replaced wholesale on each refresh.
    #[serde(skip)]
    pub snapshot: Option<CatalogSnapshot>,
}

impl Default for CatalogPanel {
    fn default() -> Self {
        Self {
            body: CatalogBody::Loading,
            snapshot: None,
        }
    }
}

impl CatalogPanel {
    pub fn entries(&self) -> &[TableEntry] {
        match &self.body {
            CatalogBody::Tables { entries } => entries,
            _ => &[],
        }
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.entries().iter().map(|e| e.name.as_str()).collect()
    }

    pub fn entry(&self, name: &str) -> Option<&TableEntry> {
        self.entries().iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Declined,
    Removed,
    Failed,
}

/// Owns the table list: the only writer of the rendered catalog.
#[derive(Clone)]
pub struct CatalogView {
    service: Arc<dyn CatalogService>,
    screen: SharedScreen,
    downloads: Arc<dyn DownloadSink>,
    notice_ttl: Duration,
}

impl CatalogView {
    pub fn new(
        service: Arc<dyn CatalogService>,
        screen: SharedScreen,
        downloads: Arc<dyn DownloadSink>,
        notice_ttl: Duration,
    ) -> Self {
        Self {
            service,
            screen,
            downloads,
            notice_ttl,
        }
    }

    /// Fetches the catalog and re-renders it in full. Failures are logged and
    /// leave the current list untouched; returns whether a snapshot was applied.
    pub async fn refresh(&self) -> bool {
        match self.service.fetch_catalog().await {
            Ok(snapshot) => {
                if let Some(e) = snapshot.error_message() {
                    warn!("Catalog service reported an error: {}", e);
                    return false;
                }
                info!("Catalog refreshed: {} tables", snapshot.tables.len());
                self.apply(snapshot);
                true
            }
            Err(e) => {
                error!("Failed to load schema: {}", e);
                false
            }
        }
    }

    fn apply(&self, snapshot: CatalogSnapshot) {
        self.screen.update(|screen| {
            let released = screen.dispatcher.release_region(Region::Catalog);
            debug!("Released {} stale catalog controls", released);

            let body = if snapshot.tables.is_empty() {
                CatalogBody::Placeholder {
                    text: EMPTY_CATALOG_TEXT.to_string(),
                }
            } else {
                CatalogBody::Tables {
                    entries: snapshot
                        .tables
                        .iter()
                        .map(|table| TableEntry::build(table, &mut screen.dispatcher))
                        .collect(),
                }
            };

            screen.catalog = CatalogPanel {
                body,
                snapshot: Some(snapshot),
            };
        });
    }

    /// Asks for confirmation, deletes the table, then reloads the catalog.
    pub async fn remove_table(&self, table_name: &str, confirm: &dyn Confirm) -> RemoveOutcome {
        let prompt = format!("Are you sure you want to remove the table \"{}\"?", table_name);
        if !confirm.confirm(&prompt).await {
            debug!("Removal of {} declined", table_name);
            return RemoveOutcome::Declined;
        }

        if let Err(e) = self.service.remove_table(table_name).await {
            error!("Failed to remove table {}: {}", table_name, e);
            self.screen.show_error(format!("Failed to remove table: {}", e));
            return RemoveOutcome::Failed;
        }

        self.refresh().await;
        post_transient(
            &self.screen,
            format!("Table \"{}\" removed successfully!", table_name),
            self.notice_ttl,
        );
        RemoveOutcome::Removed
    }

    pub async fn download_table(&self, table_name: &str) -> Option<PathBuf> {
        let bytes = match self.service.export_table(table_name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.screen.show_error(format!("Failed to download table: {}", e));
                return None;
            }
        };

        match self.downloads.save(&format!("{}.csv", table_name), &bytes).await {
            Ok(path) => Some(path),
            Err(e) => {
                self.screen.show_error(format!("Failed to save table: {}", e));
                None
            }
        }
    }
}
