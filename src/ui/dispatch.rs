use serde::Serialize;
use std::collections::HashMap;

/// Identifier of one rendered, clickable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ControlId(u64);

impl ControlId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ControlId {
    fn from(value: u64) -> Self {
        ControlId(value)
    }
}

/// Screen region that owns a group of controls and re-renders them together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Results,
    Catalog,
}

/// What a control does when clicked. Table names are captured at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ToggleResults,
    ExportResults,
    DownloadTable(String),
    RemoveTable(String),
}

/// A rendered control: a label for display plus the id clicks are routed by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub id: ControlId,
    pub label: String,
    pub title: String,
}

/// Single delegated click router shared by every view.
///
/// Views never attach handlers to controls directly. Each render releases
/// the previous registrations of its region and registers fresh ones, so a
/// control id always resolves to exactly one command and stale ids resolve
/// to nothing.
#[derive(Debug, Default)]
pub struct Dispatcher {
    next_id: u64,
    handlers: HashMap<ControlId, (Region, Command)>,
}

impl Dispatcher {
    pub fn register(&mut self, region: Region, command: Command) -> ControlId {
        self.next_id += 1;
        let id = ControlId(self.next_id);
        self.handlers.insert(id, (region, command));
        id
    }

    pub fn control(
        &mut self,
        region: Region,
        command: Command,
        label: impl Into<String>,
        title: impl Into<String>,
    ) -> Control {
        Control {
            id: self.register(region, command),
            label: label.into(),
            title: title.into(),
        }
    }

    /// Drops every registration owned by `region`, returning how many were removed.
    pub fn release_region(&mut self, region: Region) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|_, (owner, _)| *owner != region);
        before - self.handlers.len()
    }

    pub fn release(&mut self, id: ControlId) -> bool {
        self.handlers.remove(&id).is_some()
    }

    pub fn command(&self, id: ControlId) -> Option<&Command> {
        self.handlers.get(&id).map(|(_, command)| command)
    }

    pub fn handler_count(&self, id: ControlId) -> usize {
        usize::from(self.handlers.contains_key(&id))
    }

    pub fn active_in(&self, region: Region) -> usize {
        self.handlers
            .values()
            .filter(|(owner, _)| *owner == region)
            .count()
    }
}
