//! Terminal drivers for the dialog orchestrators
//!
//! The orchestrators are UI-agnostic; these helpers stand in for the
//! rendering layer when running from a terminal. They render the prompt from
//! the orchestrator's own state, so what the user sees is exactly what the
//! dialog holds, and report the user's answer back through the resolution
//! methods.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::dialogs::{Modal, ModalKind, ToastKind, Toaster};

/// Render the visible modal prompt and resolve it from stdin.
/// No-op when the modal is idle.
pub async fn resolve_modal_from_stdin(modal: &Modal) -> Result<()> {
    let state = modal.state();
    if !state.active {
        return Ok(());
    }

    if !state.title.is_empty() {
        println!("{}", state.title);
    }
    println!("{}", state.message);

    match state.kind {
        ModalKind::Alert => {
            print!("[Enter] {} ", state.confirm_text);
            std::io::stdout().flush()?;
            let _ = read_line().await?;
            modal.confirmation();
        }
        ModalKind::Confirm => {
            print!("{} / {} [y/N] ", state.confirm_text, state.cancel_text);
            std::io::stdout().flush()?;
            let answer = read_line().await?;
            if matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
                modal.confirmation();
            } else {
                modal.cancel();
            }
        }
    }

    Ok(())
}

/// Print and dismiss every queued toast, in order
pub fn drain_toasts(toasts: &Toaster) {
    loop {
        let state = toasts.state();
        if !state.active {
            break;
        }
        match state.kind {
            ToastKind::Info => eprintln!("- {}", state.message),
            ToastKind::Success => eprintln!("+ {}", state.message),
            ToastKind::Error => eprintln!("! {}", state.message),
        }
        toasts.cancel();
    }
}

async fn read_line() -> Result<String> {
    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    reader.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_is_noop_when_idle() {
        let modal = Modal::new("dialog");
        resolve_modal_from_stdin(&modal).await.unwrap();
        assert!(!modal.state().active);
    }

    #[tokio::test]
    async fn test_drain_empties_the_toast_queue() {
        let toasts = Toaster::new();
        let _ = toasts.info("one");
        let _ = toasts.success("two");

        drain_toasts(&toasts);
        assert!(!toasts.state().active);
    }
}
