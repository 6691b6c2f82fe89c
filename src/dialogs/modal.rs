//! Promise-gated modal dialog state
//!
//! A `Modal` holds the state of one alert/confirm dialog. Opening a prompt
//! enqueues a request carrying its own resolver and returns a ticket that
//! resolves when the user answers. Requests are served one at a time in FIFO
//! order; the next request's state is only published after the current one
//! resolves.
//!
//! The modal itself is UI-agnostic: a rendering layer observes [`Modal::state`]
//! and reports the user's answer through [`Modal::confirmation`] or
//! [`Modal::cancel`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::debug;

/// Default confirm button label, restored on reset
pub const DEFAULT_CONFIRM_TEXT: &str = "Ok";

/// Default cancel button label, restored on reset
pub const DEFAULT_CANCEL_TEXT: &str = "Cancel";

/// Which action buttons the modal offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Message with a single confirm button
    Alert,
    /// Question with confirm and cancel buttons
    Confirm,
}

/// Snapshot of the modal's visible state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    /// Whether the modal is currently visible
    pub active: bool,

    /// Which action buttons are offered
    pub kind: ModalKind,

    /// Body text; arbitrary, may contain markup for the rendering layer
    pub message: String,

    /// Optional heading above the message
    pub title: String,

    /// Confirm button label
    pub confirm_text: String,

    /// Cancel button label
    pub cancel_text: String,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            active: false,
            kind: ModalKind::Alert,
            message: String::new(),
            title: String::new(),
            confirm_text: DEFAULT_CONFIRM_TEXT.to_string(),
            cancel_text: DEFAULT_CANCEL_TEXT.to_string(),
        }
    }
}

/// A queued prompt waiting for the current one to resolve
struct PromptRequest {
    state: ModalState,
    responder: oneshot::Sender<bool>,
}

struct ModalInner {
    state: ModalState,
    current: Option<oneshot::Sender<bool>>,
    queue: VecDeque<PromptRequest>,
}

impl ModalInner {
    /// Publish the next queued request, or fall back to idle defaults
    fn advance(&mut self) {
        if let Some(next) = self.queue.pop_front() {
            self.state = next.state;
            self.state.active = true;
            self.current = Some(next.responder);
        } else {
            self.state = ModalState::default();
        }
    }
}

/// Modal dialog orchestrator; one instance per dialog surface
pub struct Modal {
    /// Instance name used in logs ("dialog", "notifications")
    name: &'static str,
    inner: Mutex<ModalInner>,
}

impl Modal {
    /// Create an idle modal
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(ModalInner {
                state: ModalState::default(),
                current: None,
                queue: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ModalInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current visible state
    pub fn state(&self) -> ModalState {
        self.lock().state.clone()
    }

    /// Start configuring a prompt
    pub fn builder(&self) -> PromptBuilder<'_> {
        PromptBuilder {
            modal: self,
            title: String::new(),
            confirm_text: DEFAULT_CONFIRM_TEXT.to_string(),
            cancel_text: DEFAULT_CANCEL_TEXT.to_string(),
        }
    }

    /// Shorthand for `builder().title(text)`
    pub fn title(&self, text: impl Into<String>) -> PromptBuilder<'_> {
        self.builder().title(text)
    }

    /// Shorthand for `builder().confirm_text(text)`
    pub fn confirm_text(&self, text: impl Into<String>) -> PromptBuilder<'_> {
        self.builder().confirm_text(text)
    }

    /// Shorthand for `builder().cancel_text(text)`
    pub fn cancel_text(&self, text: impl Into<String>) -> PromptBuilder<'_> {
        self.builder().cancel_text(text)
    }

    /// Open an alert with default labels; resolves `true` on confirmation
    pub fn alert(&self, message: impl Into<String>) -> PromptTicket {
        self.builder().alert(message)
    }

    /// Open a confirm prompt with default labels
    pub fn confirm(&self, message: impl Into<String>) -> PromptTicket {
        self.builder().confirm(message)
    }

    /// Enqueue a fully configured prompt. The request becomes visible
    /// immediately when the modal is idle, otherwise it waits its turn.
    fn open(&self, state: ModalState, kind: ModalKind) -> PromptTicket {
        let (responder, receiver) = oneshot::channel();
        let mut inner = self.lock();
        if inner.current.is_none() {
            inner.state = state;
            inner.state.active = true;
            inner.current = Some(responder);
            debug!("{}: prompt opened", self.name);
        } else {
            inner.queue.push_back(PromptRequest { state, responder });
            debug!("{}: prompt queued ({} waiting)", self.name, inner.queue.len());
        }
        PromptTicket { kind, receiver }
    }

    /// Resolve the pending prompt with `true`. No-op when idle.
    pub fn confirmation(&self) {
        self.resolve(true);
    }

    /// Resolve the pending prompt with `false`. No-op when idle.
    pub fn cancel(&self) {
        self.resolve(false);
    }

    fn resolve(&self, answer: bool) {
        let mut inner = self.lock();
        let Some(responder) = inner.current.take() else {
            return;
        };
        // The ticket may have been dropped; a failed send is not an error.
        let _ = responder.send(answer);
        debug!("{}: prompt resolved ({})", self.name, answer);
        inner.advance();
    }

    /// Restore idle defaults: empty message/title, "Ok"/"Cancel" labels.
    /// Idempotent; a second call in a row changes nothing.
    pub fn reset(&self) {
        self.lock().state = ModalState::default();
    }
}

/// Fluent, immutable prompt configuration; terminal calls enqueue the prompt
#[must_use]
pub struct PromptBuilder<'a> {
    modal: &'a Modal,
    title: String,
    confirm_text: String,
    cancel_text: String,
}

impl<'a> PromptBuilder<'a> {
    /// Set the heading shown above the message
    pub fn title(mut self, text: impl Into<String>) -> Self {
        self.title = text.into();
        self
    }

    /// Set the confirm button label
    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    /// Set the cancel button label
    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    /// Enqueue an alert prompt
    pub fn alert(self, message: impl Into<String>) -> PromptTicket {
        self.open(message.into(), ModalKind::Alert)
    }

    /// Enqueue a confirm prompt
    pub fn confirm(self, message: impl Into<String>) -> PromptTicket {
        self.open(message.into(), ModalKind::Confirm)
    }

    fn open(self, message: String, kind: ModalKind) -> PromptTicket {
        let state = ModalState {
            active: false,
            kind,
            message,
            title: self.title,
            confirm_text: self.confirm_text,
            cancel_text: self.cancel_text,
        };
        self.modal.open(state, kind)
    }
}

/// Pending answer for one prompt; resolves `true` for a confirmed prompt,
/// `false` for a cancelled one. Alerts always resolve `true`.
pub struct PromptTicket {
    kind: ModalKind,
    receiver: oneshot::Receiver<bool>,
}

impl Future for PromptTicket {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(answer) => {
                let answer = answer.unwrap_or(false);
                Poll::Ready(match self.kind {
                    ModalKind::Alert => true,
                    ModalKind::Confirm => answer,
                })
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_alert_resolves_true_on_confirmation() {
        let modal = Modal::new("dialog");
        let ticket = modal.alert("Annotations have finished rendering");

        let state = modal.state();
        assert!(state.active);
        assert_eq!(state.kind, ModalKind::Alert);
        assert_eq!(state.message, "Annotations have finished rendering");

        modal.confirmation();
        assert!(ticket.await);
        assert!(!modal.state().active);
    }

    #[tokio::test]
    async fn test_confirm_cancel_resolves_false() {
        let modal = Modal::new("dialog");
        let ticket = modal.confirm("Remove this attachment?");
        modal.cancel();
        assert!(!ticket.await);
        assert!(!modal.state().active);
    }

    #[tokio::test]
    async fn test_confirm_confirmation_resolves_true() {
        let modal = Modal::new("dialog");
        let ticket = modal.confirm("Remove this attachment?");
        modal.confirmation();
        assert!(ticket.await);
    }

    #[tokio::test]
    async fn test_builder_labels_apply_and_revert() {
        let modal = Modal::new("dialog");
        let ticket = modal
            .title("Confirm")
            .confirm_text("Delete")
            .confirm("Remove item?");

        let state = modal.state();
        assert_eq!(state.title, "Confirm");
        assert_eq!(state.confirm_text, "Delete");
        assert_eq!(state.cancel_text, DEFAULT_CANCEL_TEXT);

        modal.confirmation();
        assert!(ticket.await);

        let state = modal.state();
        assert_eq!(state.title, "");
        assert_eq!(state.confirm_text, DEFAULT_CONFIRM_TEXT);
    }

    #[tokio::test]
    async fn test_overlapping_opens_queue_in_fifo_order() {
        let modal = Modal::new("dialog");
        let first = modal.confirm("first");
        let second = modal.confirm("second");

        // The first prompt stays visible until it resolves
        assert_eq!(modal.state().message, "first");

        modal.confirmation();
        assert_eq!(modal.state().message, "second");
        assert!(modal.state().active);

        modal.cancel();
        assert!(first.await);
        assert!(!second.await);
        assert!(!modal.state().active);
    }

    #[tokio::test]
    async fn test_resolution_while_idle_is_noop() {
        let modal = Modal::new("dialog");
        modal.confirmation();
        modal.cancel();
        assert_eq!(modal.state(), ModalState::default());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let modal = Modal::new("dialog");
        modal.reset();
        let once = modal.state();
        modal.reset();
        assert_eq!(modal.state(), once);
        assert_eq!(once.confirm_text, "Ok");
        assert_eq!(once.cancel_text, "Cancel");
    }

    #[tokio::test]
    async fn test_dropped_ticket_does_not_block_the_queue() {
        let modal = Modal::new("dialog");
        drop(modal.confirm("dropped"));
        let kept = modal.confirm("kept");

        modal.confirmation(); // resolves the dropped ticket's request
        assert_eq!(modal.state().message, "kept");
        modal.confirmation();
        assert!(kept.await);
    }
}
