pub mod dispatch;
pub mod notices;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

use crate::ui::dispatch::Dispatcher;
use crate::ui::notices::NoticeBoard;
use crate::views::catalog::CatalogPanel;
use crate::views::results::{ResultBody, ResultsPanel};

pub const QUERY_LABEL: &str = "Query";
pub const SUGGEST_LABEL: &str = "Generate Random Query";

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryInput {
    pub text: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
    pub busy: bool,
}

impl Button {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            disabled: false,
            busy: false,
        }
    }

    pub fn set_busy(&mut self) {
        self.disabled = true;
        self.busy = true;
    }

    pub fn restore(&mut self, label: &str) {
        self.disabled = false;
        self.busy = false;
        self.label = label.to_string();
    }
}

/// Drag-and-drop target. The highlight is set while a drag hovers and
/// cleared on leave or drop.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DropZone {
    pub highlighted: bool,
}

impl DropZone {
    pub fn highlight(&mut self) {
        self.highlighted = true;
    }

    /// Returns true only when a highlight was actually removed.
    pub fn clear(&mut self) -> bool {
        std::mem::replace(&mut self.highlighted, false)
    }
}

/// Everything the interface currently shows.
#[derive(Debug)]
pub struct Screen {
    pub input: QueryInput,
    pub query_button: Button,
    pub suggest_button: Button,
    pub results: ResultsPanel,
    pub catalog: CatalogPanel,
    pub notices: NoticeBoard,
    pub drop_zone: DropZone,
    pub dispatcher: Dispatcher,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            input: QueryInput::default(),
            query_button: Button::new(QUERY_LABEL),
            suggest_button: Button::new(SUGGEST_LABEL),
            results: ResultsPanel::default(),
            catalog: CatalogPanel::default(),
            notices: NoticeBoard::default(),
            drop_zone: DropZone::default(),
            dispatcher: Dispatcher::default(),
        }
    }
}

impl Screen {
    /// The one place failures are shown: the results panel body.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("Displaying error: {}", message);
        self.results.show_error(message, &mut self.dispatcher);
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.results.body {
            ResultBody::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn lock_query_input(&mut self) {
        self.input.disabled = true;
        self.query_button.set_busy();
    }

    pub fn release_query_input(&mut self) {
        self.input.disabled = false;
        self.query_button.restore(QUERY_LABEL);
    }
}

/// Cloneable handle to the screen. Closures passed to `update` and `read`
/// run under a short lock and must not await.
#[derive(Debug, Clone, Default)]
pub struct SharedScreen(Arc<Mutex<Screen>>);

impl SharedScreen {
    pub fn update<R>(&self, f: impl FnOnce(&mut Screen) -> R) -> R {
        let mut screen = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut screen)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Screen) -> R) -> R {
        let screen = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&screen)
    }

    pub fn show_error(&self, message: impl Into<String>) {
        self.update(|s| s.show_error(message));
    }
}

/// Asks the user to approve a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}
