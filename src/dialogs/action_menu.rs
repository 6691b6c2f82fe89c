//! Action menu builder
//!
//! Translates a case's current workflow status into the list of legal next
//! actions plus any view-specific edit operations, for menu rendering. Each
//! workflow entry's operation closes over the dispatch function and the
//! specific event, so invoking the entry is all a rendering layer has to do.
//!
//! No validation happens here beyond the table lookup; a terminal status
//! simply contributes no workflow entries.

use std::sync::Arc;
use tracing::debug;

use crate::models::status::{EventKind, StatusKind};

/// Callback invoked when a menu entry is selected
pub type MenuOperation = Box<dyn Fn() + Send + Sync>;

/// One row of the rendered menu
pub enum MenuEntry {
    Action {
        text: String,
        icon: String,
        operation: MenuOperation,
    },
    Divider,
}

impl MenuEntry {
    /// Display text, `None` for dividers
    pub fn text(&self) -> Option<&str> {
        match self {
            MenuEntry::Action { text, .. } => Some(text),
            MenuEntry::Divider => None,
        }
    }

    /// Icon name, `None` for dividers
    pub fn icon(&self) -> Option<&str> {
        match self {
            MenuEntry::Action { icon, .. } => Some(icon),
            MenuEntry::Divider => None,
        }
    }

    /// Invoke the entry's operation. No-op for dividers.
    pub fn activate(&self) {
        if let MenuEntry::Action { operation, .. } = self {
            operation();
        }
    }
}

/// Per-view action menu
pub struct ActionMenu {
    entries: Vec<MenuEntry>,
}

impl ActionMenu {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append one entry per legal workflow transition from `latest_status`,
    /// in table order. Each entry dispatches its event when activated.
    pub fn add_workflow_actions<F>(&mut self, latest_status: StatusKind, dispatch: F)
    where
        F: Fn(EventKind) + Send + Sync + 'static,
    {
        let dispatch = Arc::new(dispatch);
        for (label, event) in latest_status.transitions() {
            let dispatch = Arc::clone(&dispatch);
            let event = *event;
            self.entries.push(MenuEntry::Action {
                text: (*label).to_string(),
                icon: event.resulting_status().icon().to_string(),
                operation: Box::new(move || {
                    debug!("menu dispatching workflow event '{}'", event);
                    dispatch(event)
                }),
            });
        }
    }

    /// Append a view-specific entry
    pub fn add_action(
        &mut self,
        text: impl Into<String>,
        icon: impl Into<String>,
        operation: MenuOperation,
    ) {
        self.entries.push(MenuEntry::Action {
            text: text.into(),
            icon: icon.into(),
            operation,
        });
    }

    /// Append a divider row
    pub fn add_divider(&mut self) {
        self.entries.push(MenuEntry::Divider);
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActionMenu {
    fn default() -> Self {
        Self::new()
    }
}
