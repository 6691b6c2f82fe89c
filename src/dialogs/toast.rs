//! Transient toast notifications
//!
//! Toasts are non-blocking status messages shown one at a time. Pushing a
//! toast while another is visible queues it; the queue drains as each toast
//! is dismissed with [`Toaster::cancel`]. Every push returns a ticket that
//! resolves on dismissal, for callers that want to await it. Dropping the
//! ticket is fine for fire-and-forget use.
//!
//! There are no timers here; dismissal is always explicit.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::debug;

/// Severity of a toast message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Snapshot of the visible toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastState {
    /// Whether a toast is currently visible
    pub active: bool,

    /// Severity of the visible toast
    pub kind: ToastKind,

    /// Message text
    pub message: String,
}

impl Default for ToastState {
    fn default() -> Self {
        Self {
            active: false,
            kind: ToastKind::Info,
            message: String::new(),
        }
    }
}

struct ToastRequest {
    kind: ToastKind,
    message: String,
    responder: oneshot::Sender<()>,
}

struct ToasterInner {
    state: ToastState,
    current: Option<oneshot::Sender<()>>,
    queue: VecDeque<ToastRequest>,
}

impl ToasterInner {
    fn advance(&mut self) {
        if let Some(next) = self.queue.pop_front() {
            self.state = ToastState {
                active: true,
                kind: next.kind,
                message: next.message,
            };
            self.current = Some(next.responder);
        } else {
            self.state = ToastState::default();
        }
    }
}

/// Toast orchestrator
pub struct Toaster {
    inner: Mutex<ToasterInner>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ToasterInner {
                state: ToastState::default(),
                current: None,
                queue: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ToasterInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the visible toast
    pub fn state(&self) -> ToastState {
        self.lock().state.clone()
    }

    /// Show an informational message
    pub fn info(&self, message: impl Into<String>) -> ToastTicket {
        self.push(ToastKind::Info, message.into())
    }

    /// Show a success message
    pub fn success(&self, message: impl Into<String>) -> ToastTicket {
        self.push(ToastKind::Success, message.into())
    }

    /// Show an error message
    pub fn error(&self, message: impl Into<String>) -> ToastTicket {
        self.push(ToastKind::Error, message.into())
    }

    fn push(&self, kind: ToastKind, message: String) -> ToastTicket {
        let (responder, receiver) = oneshot::channel();
        let mut inner = self.lock();
        if inner.current.is_none() {
            inner.state = ToastState {
                active: true,
                kind,
                message,
            };
            inner.current = Some(responder);
        } else {
            debug!("toast queued ({} waiting)", inner.queue.len() + 1);
            inner.queue.push_back(ToastRequest {
                kind,
                message,
                responder,
            });
        }
        ToastTicket { receiver }
    }

    /// Dismiss the visible toast and show the next queued one, if any.
    /// No-op when nothing is visible.
    pub fn cancel(&self) {
        let mut inner = self.lock();
        let Some(responder) = inner.current.take() else {
            return;
        };
        let _ = responder.send(());
        inner.advance();
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves when the associated toast is dismissed
pub struct ToastTicket {
    receiver: oneshot::Receiver<()>,
}

impl Future for ToastTicket {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}
