use std::sync::Arc;
use tracing::{debug, info};

use crate::api::models::SuggestionStatus;
use crate::api::QueryService;
use crate::ui::{SharedScreen, SUGGEST_LABEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// Input populated with a runnable example query.
    Populated,
    /// Input populated with the service's hint; nothing shown as an error.
    NoTables,
    Failed(String),
    /// The suggest button was already busy.
    Ignored,
}

/// Re-enables the suggest button however the request ends.
struct ButtonGuard<'a> {
    screen: &'a SharedScreen,
}

impl Drop for ButtonGuard<'_> {
    fn drop(&mut self) {
        self.screen.update(|s| s.suggest_button.restore(SUGGEST_LABEL));
    }
}

/// Fetches an example query and drops it into the input. Uses its own busy
/// flag (the suggest button), independent of the query guard.
#[derive(Clone)]
pub struct SuggestionController {
    service: Arc<dyn QueryService>,
    screen: SharedScreen,
}

impl SuggestionController {
    pub fn new(service: Arc<dyn QueryService>, screen: SharedScreen) -> Self {
        Self { service, screen }
    }

    pub async fn request_suggestion(&self) -> SuggestionOutcome {
        let started = self.screen.update(|s| {
            if s.suggest_button.disabled {
                return false;
            }
            s.suggest_button.set_busy();
            true
        });
        if !started {
            debug!("Suggestion already in progress");
            return SuggestionOutcome::Ignored;
        }
        let _guard = ButtonGuard {
            screen: &self.screen,
        };

        let result = match self.service.suggest_query().await {
            Ok(result) => result,
            Err(e) => {
                let message = e.to_string();
                self.screen.show_error(message.clone());
                return SuggestionOutcome::Failed(message);
            }
        };

        // The text is useful even when the catalog is empty, so it is always shown
        self.screen.update(|s| s.input.text = result.query.clone());

        match result.status() {
            SuggestionStatus::Ready => {
                info!("Suggested query: {}", result.query);
                SuggestionOutcome::Populated
            }
            SuggestionStatus::NoTables => {
                info!("No tables available for suggestions");
                SuggestionOutcome::NoTables
            }
            SuggestionStatus::Failed(message) => {
                self.screen.show_error(message);
                SuggestionOutcome::Failed(message.to_string())
            }
        }
    }
}
