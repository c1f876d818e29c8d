use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::models::HealthStatus;
use crate::api::{CatalogService, QueryService, ServiceError};
use crate::config::AppConfig;
use crate::controllers::ingest::IngestController;
use crate::controllers::query::QueryController;
use crate::controllers::suggest::SuggestionController;
use crate::downloads::DownloadSink;
use crate::ui::dispatch::{Command, ControlId};
use crate::ui::{Confirm, SharedScreen};
use crate::views::catalog::{CatalogView, RemoveOutcome};
use crate::views::results::ResultView;

/// What happened when a rendered control was clicked.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The id belongs to no live control (stale or never rendered).
    Unknown,
    Toggled { expanded: bool },
    Saved(Option<PathBuf>),
    Removal(RemoveOutcome),
}

/// The whole client: one screen, the views that draw it and the
/// controllers that drive it.
pub struct App {
    screen: SharedScreen,
    pub query: QueryController,
    pub suggestions: SuggestionController,
    pub ingest: IngestController,
    pub catalog: CatalogView,
    pub results: ResultView,
    catalog_service: Arc<dyn CatalogService>,
    confirm: Arc<dyn Confirm>,
}

impl App {
    pub fn new(
        config: &AppConfig,
        query_service: Arc<dyn QueryService>,
        catalog_service: Arc<dyn CatalogService>,
        downloads: Arc<dyn DownloadSink>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        let screen = SharedScreen::default();
        let results = ResultView::new(screen.clone(), downloads.clone());
        let catalog = CatalogView::new(
            catalog_service.clone(),
            screen.clone(),
            downloads,
            config.notice_ttl(),
        );

        Self {
            query: QueryController::new(
                query_service.clone(),
                results.clone(),
                screen.clone(),
                config.query.provider,
                config.debounce(),
            ),
            suggestions: SuggestionController::new(query_service, screen.clone()),
            ingest: IngestController::new(
                catalog_service.clone(),
                catalog.clone(),
                screen.clone(),
                config.notice_ttl(),
            ),
            catalog,
            results,
            catalog_service,
            confirm,
            screen,
        }
    }

    pub fn screen(&self) -> &SharedScreen {
        &self.screen
    }

    /// Initial best-effort catalog load.
    pub async fn start(&self) {
        info!("Loading table catalog");
        self.catalog.refresh().await;
    }

    pub async fn health(&self) -> Result<HealthStatus, ServiceError> {
        self.catalog_service.health().await
    }

    /// Routes a click on control `id` to whichever view registered it.
    pub async fn click(&self, id: ControlId) -> ClickOutcome {
        let Some(command) = self.screen.read(|s| s.dispatcher.command(id).cloned()) else {
            debug!("Click on unknown control {}", id.get());
            return ClickOutcome::Unknown;
        };

        match command {
            Command::ToggleResults => ClickOutcome::Toggled {
                expanded: self.results.toggle(),
            },
            Command::ExportResults => ClickOutcome::Saved(self.results.export().await),
            Command::DownloadTable(name) => {
                ClickOutcome::Saved(self.catalog.download_table(&name).await)
            }
            Command::RemoveTable(name) => ClickOutcome::Removal(
                self.catalog.remove_table(&name, self.confirm.as_ref()).await,
            ),
        }
    }

    /// Clicks the rendered control for `command`, if one is live.
    pub async fn click_command(&self, command: &Command) -> ClickOutcome {
        let id = self.screen.read(|s| {
            let results = s.results.actions.iter().map(|c| c.id);
            let catalog = s
                .catalog
                .entries()
                .iter()
                .flat_map(|e| [e.download.id, e.remove.id]);
            results
                .chain(catalog)
                .find(|id| s.dispatcher.command(*id) == Some(command))
        });
        match id {
            Some(id) => self.click(id).await,
            None => ClickOutcome::Unknown,
        }
    }
}
