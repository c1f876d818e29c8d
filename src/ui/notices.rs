use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::ui::SharedScreen;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub text: String,
}

/// Success confirmations stacked above the table list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoticeBoard {
    #[serde(skip)]
    next_id: u64,
    pub items: Vec<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, text: impl Into<String>) -> u64 {
        self.next_id += 1;
        // newest first
        self.items.insert(
            0,
            Notice {
                id: self.next_id,
                text: text.into(),
            },
        );
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|notice| notice.id != id);
        before != self.items.len()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|n| n.text.as_str()).collect()
    }
}

/// Shows `text` and removes it again once `ttl` has elapsed.
pub fn post_transient(screen: &SharedScreen, text: impl Into<String>, ttl: Duration) -> u64 {
    let id = screen.update(|s| s.notices.push(text));
    let screen = screen.clone();
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if screen.update(|s| s.notices.dismiss(id)) {
            debug!("Dismissed notice {}", id);
        }
    });
    id
}
