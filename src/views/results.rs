use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::api::models::{display_value, QueryResponse, Row};
use crate::downloads::DownloadSink;
use crate::export::results_to_csv;
use crate::ui::dispatch::{Command, Control, Dispatcher, Region};
use crate::ui::SharedScreen;

pub const NO_RESULTS_TEXT: &str = "No results found.";
pub const EXPORT_FILE_NAME: &str = "query_results.csv";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultBody {
    Empty,
    Error { message: String },
    NoResults,
    Table { table: TableView },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    /// Cells follow `columns` order; keys a row lacks render empty.
    pub fn build(columns: &[String], rows: &[Row]) -> Self {
        Self {
            headers: columns.to_vec(),
            rows: rows
                .iter()
                .map(|row| columns.iter().map(|c| display_value(row.get(c))).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsPanel {
    pub visible: bool,
    pub expanded: bool,
    pub query_text: String,
    pub sql: String,
    pub row_count: u64,
    pub execution_time_ms: f64,
    pub body: ResultBody,
    pub actions: Vec<Control>,
    #[serde(skip)]
    pub response: Option<QueryResponse>,
}

impl Default for ResultsPanel {
    fn default() -> Self {
        Self {
            visible: false,
            expanded: true,
            query_text: String::new(),
            sql: String::new(),
            row_count: 0,
            execution_time_ms: 0.0,
            body: ResultBody::Empty,
            actions: Vec::new(),
            response: None,
        }
    }
}

impl ResultsPanel {
    pub fn toggle_control(&self) -> Option<&Control> {
        self.actions.iter().find(|c| c.title == TOGGLE_TITLE)
    }

    pub fn export_control(&self) -> Option<&Control> {
        self.actions.iter().find(|c| c.title == EXPORT_TITLE)
    }

    /// Replaces the body with `message`, expanded so it is always seen. The
    /// rows it replaces are gone, so their export control goes too.
    pub fn show_error(&mut self, message: String, dispatcher: &mut Dispatcher) {
        self.visible = true;
        self.expanded = true;
        self.body = ResultBody::Error { message };
        self.response = None;
        self.actions.retain(|control| {
            if control.title != EXPORT_TITLE {
                return true;
            }
            dispatcher.release(control.id);
            false
        });
        if let Some(toggle) = self.actions.iter_mut().find(|c| c.title == TOGGLE_TITLE) {
            toggle.label = toggle_label(true).to_string();
        }
    }
}

const TOGGLE_TITLE: &str = "Show or hide results";
const EXPORT_TITLE: &str = "Download results as CSV";

fn toggle_label(expanded: bool) -> &'static str {
    if expanded { "Hide" } else { "Show" }
}

/// Renders query responses into the results panel.
#[derive(Clone)]
pub struct ResultView {
    screen: SharedScreen,
    downloads: Arc<dyn DownloadSink>,
}

impl ResultView {
    pub fn new(screen: SharedScreen, downloads: Arc<dyn DownloadSink>) -> Self {
        Self { screen, downloads }
    }

    pub fn render(&self, response: QueryResponse, query_text: &str) {
        let body = if let Some(message) = response.error_message() {
            ResultBody::Error {
                message: message.to_string(),
            }
        } else if response.results.is_empty() {
            ResultBody::NoResults
        } else {
            ResultBody::Table {
                table: TableView::build(&response.columns, &response.results),
            }
        };

        self.screen.update(|screen| {
            if matches!(body, ResultBody::Error { .. }) {
                screen.results.expanded = true;
            }
            let released = screen.dispatcher.release_region(Region::Results);
            debug!("Released {} stale result controls", released);

            // Action area is rebuilt from scratch on every render
            let mut actions = Vec::new();
            if response.has_tabular_output() {
                actions.push(screen.dispatcher.control(
                    Region::Results,
                    Command::ExportResults,
                    "⇩ Download",
                    EXPORT_TITLE,
                ));
            }
            actions.push(screen.dispatcher.control(
                Region::Results,
                Command::ToggleResults,
                toggle_label(screen.results.expanded),
                TOGGLE_TITLE,
            ));

            let panel = &mut screen.results;
            panel.visible = true;
            panel.query_text = query_text.to_string();
            panel.sql = response.sql.clone();
            panel.row_count = response.row_count;
            panel.execution_time_ms = response.execution_time_ms;
            panel.body = body;
            panel.actions = actions;
            panel.response = Some(response);
        });
    }

    /// Collapses or expands the body; returns whether it is now expanded.
    pub fn toggle(&self) -> bool {
        self.screen.update(|screen| {
            let panel = &mut screen.results;
            panel.expanded = !panel.expanded;
            let expanded = panel.expanded;
            if let Some(toggle) = panel.actions.iter_mut().find(|c| c.title == TOGGLE_TITLE) {
                toggle.label = toggle_label(expanded).to_string();
            }
            expanded
        })
    }

    /// Writes the currently displayed rows as CSV through the download sink.
    pub async fn export(&self) -> Option<PathBuf> {
        let response = self.screen.read(|s| {
            s.results
                .response
                .clone()
                .filter(QueryResponse::has_tabular_output)
        })?;

        let csv = match results_to_csv(&response.columns, &response.results) {
            Ok(csv) => csv,
            Err(e) => {
                error!("Failed to encode results: {}", e);
                self.screen.show_error(format!("Failed to export results: {}", e));
                return None;
            }
        };

        match self.downloads.save(EXPORT_FILE_NAME, &csv).await {
            Ok(path) => {
                info!("Exported {} rows to {}", response.results.len(), path.display());
                Some(path)
            }
            Err(e) => {
                self.screen.show_error(format!("Failed to export results: {}", e));
                None
            }
        }
    }
}
