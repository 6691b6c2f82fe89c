//! Dialog and notification orchestration
//!
//! UI-agnostic state containers for the application's modal surfaces: the
//! alert/confirm dialog, the notification dialog, the multi-tab supporting
//! evidence input dialog, and the toast queue. Rendering layers observe the
//! state snapshots and report user interaction back through the resolution
//! methods; calling code awaits the tickets handed out when a prompt opens.
//!
//! One prompt is visible per orchestrator at a time. Overlapping opens queue
//! in FIFO order, each carrying its own resolver, so every caller's ticket
//! resolves with its own prompt's answer.

mod action_menu;
mod input;
mod modal;
mod toast;

pub use action_menu::{ActionMenu, MenuEntry, MenuOperation};
pub use input::{
    tab_names, InputBuilder, InputDialog, InputOutcome, InputState, InputTicket, TabSpec,
    DEFAULT_DELETE_TEXT,
};
pub use modal::{
    Modal, ModalKind, ModalState, PromptBuilder, PromptTicket, DEFAULT_CANCEL_TEXT,
    DEFAULT_CONFIRM_TEXT,
};
pub use toast::{ToastKind, ToastState, ToastTicket, Toaster};

/// The application's dialog orchestrators, constructed once at bootstrap and
/// shared for the lifetime of the process.
pub struct Dialogs {
    /// Blocking alert/confirm prompts
    pub modal: Modal,

    /// Notification dialog for messages that need acknowledgement
    pub notifications: Modal,

    /// Multi-tab supporting evidence input dialog
    pub input: InputDialog,

    /// Transient, non-blocking status messages
    pub toasts: Toaster,
}

impl Dialogs {
    pub fn new() -> Self {
        Self {
            modal: Modal::new("dialog"),
            notifications: Modal::new("notifications"),
            input: InputDialog::new(),
            toasts: Toaster::new(),
        }
    }
}

impl Default for Dialogs {
    fn default() -> Self {
        Self::new()
    }
}
