//! Multi-tab supporting evidence input dialog
//!
//! Calling code assembles the dialog declaratively through [`InputBuilder`]:
//! each builder call appends one input mechanism (upload a file, attach a
//! URL, choose an existing attachment) as a tab, and `prompt()` opens the
//! configured dialog and returns a ticket resolving to the user's outcome.
//!
//! While the dialog is open, the consuming form layer reads the tab strip
//! from [`InputDialog::state`], switches tabs with [`InputDialog::select_tab`]
//! and pushes edited field values back with
//! [`InputDialog::update_active_tab_input`] — the only mutation path into an
//! open dialog. `confirmation`, `cancel` and `delete` are the terminal
//! transitions; each clears the tab strip in place and restores the default
//! labels before the next queued prompt, if any, is published.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};
use std::task::{Context, Poll};
use serde_json::json;
use tokio::sync::oneshot;
use tracing::debug;

use crate::models::analyses::{Attachment, AttachmentInput, AttachmentKind};

use super::modal::{DEFAULT_CANCEL_TEXT, DEFAULT_CONFIRM_TEXT};

/// Default delete button label, restored on reset
pub const DEFAULT_DELETE_TEXT: &str = "Delete";

/// Well-known tab names
pub mod tab_names {
    pub const FILE: &str = "file";
    pub const URL: &str = "url";
    pub const EXISTING: &str = "existing";
}

/// One input mechanism offered by the dialog
#[derive(Debug, Clone, PartialEq)]
pub struct TabSpec {
    pub name: String,

    /// Icon name rendered on the tab strip
    pub icon: String,

    /// Field values being edited under this tab
    pub input: AttachmentInput,

    /// Presentation options for the tab's form component
    pub props: serde_json::Value,
}

/// Snapshot of the input dialog's visible state
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    /// Whether the dialog is currently visible
    pub active: bool,

    /// Configured tabs, in the order they were added
    pub tabs: Vec<TabSpec>,

    /// Name of the tab whose input is currently edited and submitted
    pub active_tab_name: String,

    pub confirm_text: String,
    pub cancel_text: String,
    pub delete_text: String,
    pub warning_text: String,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            active: false,
            tabs: Vec::new(),
            active_tab_name: String::new(),
            confirm_text: DEFAULT_CONFIRM_TEXT.to_string(),
            cancel_text: DEFAULT_CANCEL_TEXT.to_string(),
            delete_text: DEFAULT_DELETE_TEXT.to_string(),
            warning_text: String::new(),
        }
    }
}

/// How an open input dialog was resolved
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// Confirmed with the active tab's field values
    Confirmed(AttachmentInput),
    Canceled,
    Deleted,
}

struct InputRequest {
    state: InputState,
    responder: oneshot::Sender<InputOutcome>,
}

struct InputInner {
    state: InputState,
    current: Option<oneshot::Sender<InputOutcome>>,
    queue: VecDeque<InputRequest>,
}

impl InputInner {
    fn reset(&mut self) {
        // The strip is cleared in place; default labels come back on close.
        self.state.tabs.clear();
        self.state.active = false;
        self.state.active_tab_name.clear();
        self.state.confirm_text = DEFAULT_CONFIRM_TEXT.to_string();
        self.state.cancel_text = DEFAULT_CANCEL_TEXT.to_string();
        self.state.delete_text = DEFAULT_DELETE_TEXT.to_string();
        self.state.warning_text.clear();
    }

    fn advance(&mut self) {
        if let Some(next) = self.queue.pop_front() {
            self.state = next.state;
            self.state.active = true;
            self.current = Some(next.responder);
        } else {
            self.reset();
        }
    }

    fn active_tab(&self) -> Option<&TabSpec> {
        self.state
            .tabs
            .iter()
            .find(|tab| tab.name == self.state.active_tab_name)
    }
}

/// Input dialog orchestrator
pub struct InputDialog {
    inner: Mutex<InputInner>,
}

impl InputDialog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(InputInner {
                state: InputState::default(),
                current: None,
                queue: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InputInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current visible state
    pub fn state(&self) -> InputState {
        self.lock().state.clone()
    }

    /// Start assembling a dialog configuration
    pub fn builder(&self) -> InputBuilder<'_> {
        InputBuilder {
            dialog: self,
            state: InputState::default(),
        }
    }

    /// The tab matching `active_tab_name`, if any
    pub fn active_tab(&self) -> Option<TabSpec> {
        self.lock().active_tab().cloned()
    }

    /// Switch the active tab. Unknown names leave the selection unchanged.
    pub fn select_tab(&self, name: &str) {
        let mut inner = self.lock();
        if inner.state.tabs.iter().any(|tab| tab.name == name) {
            inner.state.active_tab_name = name.to_string();
        }
    }

    /// Replace the active tab's field values. This is the only mutation path
    /// form components use to push edits back into dialog state.
    pub fn update_active_tab_input(&self, new_input: AttachmentInput) {
        let mut inner = self.lock();
        let active_name = inner.state.active_tab_name.clone();
        if let Some(tab) = inner.state.tabs.iter_mut().find(|tab| tab.name == active_name) {
            tab.input = new_input;
        }
    }

    /// Resolve the open dialog with the active tab's input. No-op when idle.
    pub fn confirmation(&self) {
        let mut inner = self.lock();
        let Some(responder) = inner.current.take() else {
            return;
        };
        let input = inner
            .active_tab()
            .map(|tab| tab.input.clone())
            .unwrap_or_default();
        let _ = responder.send(InputOutcome::Confirmed(input));
        debug!("input dialog confirmed");
        inner.advance();
    }

    /// Resolve the open dialog as cancelled. No-op when idle.
    pub fn cancel(&self) {
        self.finish(InputOutcome::Canceled);
    }

    /// Resolve the open dialog as a delete request. No-op when idle.
    pub fn delete(&self) {
        self.finish(InputOutcome::Deleted);
    }

    fn finish(&self, outcome: InputOutcome) {
        let mut inner = self.lock();
        let Some(responder) = inner.current.take() else {
            return;
        };
        let _ = responder.send(outcome);
        inner.advance();
    }

    fn open(&self, state: InputState) -> InputTicket {
        let (responder, receiver) = oneshot::channel();
        let mut inner = self.lock();
        if inner.current.is_none() {
            inner.state = state;
            inner.state.active = true;
            inner.current = Some(responder);
            debug!("input dialog opened with {} tabs", inner.state.tabs.len());
        } else {
            inner.queue.push_back(InputRequest { state, responder });
            debug!("input dialog prompt queued ({} waiting)", inner.queue.len());
        }
        InputTicket { receiver }
    }
}

impl Default for InputDialog {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent tab-strip assembly for one prompt
#[must_use]
pub struct InputBuilder<'a> {
    dialog: &'a InputDialog,
    state: InputState,
}

impl<'a> InputBuilder<'a> {
    /// Add a file upload tab and make it active
    pub fn file(
        mut self,
        include_comments: bool,
        icon_name: impl Into<String>,
        accepted_file_types: impl Into<String>,
    ) -> Self {
        self.push_tab(TabSpec {
            name: tab_names::FILE.to_string(),
            icon: icon_name.into(),
            input: AttachmentInput::default(),
            props: json!({
                "include_comments": include_comments,
                "accepted_file_types": accepted_file_types.into(),
            }),
        });
        self
    }

    /// Add a URL tab and make it active
    pub fn url(mut self, include_comments: bool, include_name: bool) -> Self {
        self.push_tab(TabSpec {
            name: tab_names::URL.to_string(),
            icon: "link".to_string(),
            input: AttachmentInput {
                kind: AttachmentKind::Link,
                ..AttachmentInput::default()
            },
            props: json!({
                "include_comments": include_comments,
                "include_name": include_name,
            }),
        });
        self
    }

    /// Add a tab for choosing among existing attachments and make it active
    pub fn existing(mut self, attachments: Vec<Attachment>) -> Self {
        self.push_tab(TabSpec {
            name: tab_names::EXISTING.to_string(),
            icon: "paperclip".to_string(),
            input: AttachmentInput::default(),
            props: json!({ "attachments": attachments }),
        });
        self
    }

    /// Seed a single tab pre-populated from an existing attachment record,
    /// shaped as a file or URL tab depending on the attachment kind
    pub fn edit(self, input: AttachmentInput) -> Self {
        let mut builder = match input.kind {
            AttachmentKind::File => self.file(true, "pencil", ""),
            AttachmentKind::Link => self.url(true, true),
        };
        if let Some(tab) = builder.state.tabs.last_mut() {
            tab.input = input;
        }
        builder
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.state.confirm_text = text.into();
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.state.cancel_text = text.into();
        self
    }

    pub fn delete_text(mut self, text: impl Into<String>) -> Self {
        self.state.delete_text = text.into();
        self
    }

    pub fn warning_text(mut self, text: impl Into<String>) -> Self {
        self.state.warning_text = text.into();
        self
    }

    /// Open the configured dialog and return a ticket for its outcome.
    ///
    /// # Panics
    ///
    /// Panics if no tabs were configured. That is a programming error in the
    /// calling view, checked before any dialog state is touched.
    pub fn prompt(self) -> InputTicket {
        assert!(
            !self.state.tabs.is_empty(),
            "input dialog prompt requires at least one configured tab"
        );
        self.dialog.open(self.state)
    }

    fn push_tab(&mut self, tab: TabSpec) {
        self.state.active_tab_name = tab.name.clone();
        self.state.tabs.push(tab);
    }
}

/// Pending outcome for one input dialog prompt
pub struct InputTicket {
    receiver: oneshot::Receiver<InputOutcome>,
}

impl Future for InputTicket {
    type Output = InputOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(outcome) => Poll::Ready(outcome.unwrap_or(InputOutcome::Canceled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_input(name: &str, url: &str) -> AttachmentInput {
        AttachmentInput {
            name: name.to_string(),
            kind: AttachmentKind::Link,
            data: url.to_string(),
            comments: String::new(),
        }
    }

    #[test]
    #[should_panic(expected = "at least one configured tab")]
    fn test_prompt_with_no_tabs_panics() {
        let dialog = InputDialog::new();
        let _ = dialog.builder().prompt();
    }

    #[test]
    fn test_prompt_with_no_tabs_leaves_state_untouched() {
        let dialog = InputDialog::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = dialog.builder().prompt();
        }));
        assert!(result.is_err());
        assert_eq!(dialog.state(), InputState::default());
    }

    #[tokio::test]
    async fn test_file_then_url_builds_two_tabs_in_call_order() {
        let dialog = InputDialog::new();
        let ticket = dialog
            .builder()
            .file(true, "file", ".png, .jpg, .pdf")
            .url(true, true)
            .prompt();

        let state = dialog.state();
        assert!(state.active);
        assert_eq!(state.tabs.len(), 2);
        assert_eq!(state.tabs[0].name, tab_names::FILE);
        assert_eq!(state.tabs[1].name, tab_names::URL);
        assert_eq!(state.active_tab_name, tab_names::URL);

        dialog.cancel();
        assert_eq!(ticket.await, InputOutcome::Canceled);
    }

    #[tokio::test]
    async fn test_confirmation_resolves_with_active_tab_input() {
        let dialog = InputDialog::new();
        let ticket = dialog.builder().url(true, true).prompt();

        dialog.update_active_tab_input(link_input(
            "GeneReviews",
            "https://www.ncbi.nlm.nih.gov/books/NBK1116/",
        ));
        dialog.confirmation();

        match ticket.await {
            InputOutcome::Confirmed(input) => {
                assert_eq!(input.name, "GeneReviews");
                assert_eq!(input.data, "https://www.ncbi.nlm.nih.gov/books/NBK1116/");
                assert_eq!(input.kind, AttachmentKind::Link);
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_select_tab_switches_the_submitted_input() {
        let dialog = InputDialog::new();
        let ticket = dialog
            .builder()
            .file(true, "file", "")
            .url(true, true)
            .prompt();

        dialog.select_tab(tab_names::FILE);
        assert_eq!(dialog.state().active_tab_name, tab_names::FILE);

        // Unknown names leave the selection alone
        dialog.select_tab("attachments");
        assert_eq!(dialog.state().active_tab_name, tab_names::FILE);

        let mut input = dialog.active_tab().unwrap().input;
        input.name = "pedigree.png".to_string();
        input.data = "pedigree.png".to_string();
        dialog.update_active_tab_input(input);
        dialog.confirmation();

        match ticket.await {
            InputOutcome::Confirmed(input) => {
                assert_eq!(input.kind, AttachmentKind::File);
                assert_eq!(input.name, "pedigree.png");
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_edit_seeds_a_tab_from_the_attachment_kind() {
        let dialog = InputDialog::new();
        let ticket = dialog
            .builder()
            .edit(link_input("OMIM", "https://omim.org/entry/619968"))
            .delete_text("Remove")
            .prompt();

        let state = dialog.state();
        assert_eq!(state.tabs.len(), 1);
        assert_eq!(state.tabs[0].name, tab_names::URL);
        assert_eq!(state.tabs[0].input.data, "https://omim.org/entry/619968");
        assert_eq!(state.delete_text, "Remove");

        dialog.delete();
        assert_eq!(ticket.await, InputOutcome::Deleted);
        assert_eq!(dialog.state().delete_text, DEFAULT_DELETE_TEXT);
    }

    #[tokio::test]
    async fn test_reset_clears_tabs_and_restores_labels() {
        let dialog = InputDialog::new();
        let ticket = dialog
            .builder()
            .file(false, "file", "")
            .confirm_text("Add")
            .warning_text("This will replace the existing image")
            .prompt();

        dialog.cancel();
        ticket.await;

        let state = dialog.state();
        assert_eq!(state, InputState::default());
        assert_eq!(state.confirm_text, DEFAULT_CONFIRM_TEXT);
        assert_eq!(state.cancel_text, DEFAULT_CANCEL_TEXT);
    }

    #[tokio::test]
    async fn test_overlapping_prompts_queue_in_fifo_order() {
        let dialog = InputDialog::new();
        let first = dialog.builder().file(true, "file", "").prompt();
        let second = dialog.builder().url(true, true).prompt();

        assert_eq!(dialog.state().active_tab_name, tab_names::FILE);

        dialog.cancel();
        assert_eq!(dialog.state().active_tab_name, tab_names::URL);

        dialog.confirmation();
        assert_eq!(first.await, InputOutcome::Canceled);
        assert!(matches!(second.await, InputOutcome::Confirmed(_)));
        assert!(!dialog.state().active);
    }
}
