//! Case review workflow statuses and events
//!
//! An analysis moves through the review workflow by way of events recorded on
//! its timeline. Each status carries the ordered list of legal next events;
//! the action menu renders one entry per transition. Terminal statuses have
//! no transitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status of an analysis, derived from its latest timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Preparation,
    Ready,
    Active,
    Approved,
    #[serde(rename = "On-Hold")]
    OnHold,
    Declined,
}

impl StatusKind {
    /// Human-readable status name as shown in listings
    pub fn display_name(&self) -> &'static str {
        match self {
            StatusKind::Preparation => "Preparation",
            StatusKind::Ready => "Ready",
            StatusKind::Active => "Active",
            StatusKind::Approved => "Approved",
            StatusKind::OnHold => "On-Hold",
            StatusKind::Declined => "Declined",
        }
    }

    /// Icon name rendered next to the status
    pub fn icon(&self) -> &'static str {
        match self {
            StatusKind::Preparation => "asterisk",
            StatusKind::Ready => "clipboard-check",
            StatusKind::Active => "book-open",
            StatusKind::Approved => "check",
            StatusKind::OnHold => "pause",
            StatusKind::Declined => "x",
        }
    }

    /// Color token used by rendering layers
    pub fn color(&self) -> &'static str {
        match self {
            StatusKind::Preparation => "--rosalution-purple-300",
            StatusKind::Ready => "--rosalution-red-200",
            StatusKind::Active => "--rosalution-blue-200",
            StatusKind::Approved => "--rosalution-green-200",
            StatusKind::OnHold => "--rosalution-yellow-200",
            StatusKind::Declined => "--rosalution-grey-200",
        }
    }

    /// The ordered list of legal next workflow actions from this status
    pub fn transitions(&self) -> &'static [(&'static str, EventKind)] {
        match self {
            StatusKind::Preparation => &[("Mark Ready", EventKind::Ready)],
            StatusKind::Ready => &[("Mark Active", EventKind::Open)],
            StatusKind::Active => &[
                ("Approve", EventKind::Approve),
                ("Hold", EventKind::Hold),
                ("Decline", EventKind::Decline),
            ],
            StatusKind::OnHold => &[
                ("Reopen", EventKind::Open),
                ("Decline", EventKind::Decline),
            ],
            StatusKind::Approved | StatusKind::Declined => &[],
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A workflow event pushed onto an analysis timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Create,
    Ready,
    Open,
    Approve,
    Hold,
    Decline,
}

/// Error parsing a workflow event name
#[derive(Debug, thiserror::Error)]
#[error("unknown workflow event '{0}'")]
pub struct UnknownEvent(String);

impl EventKind {
    /// Wire form of the event, used in endpoint paths and timelines
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Create => "create",
            EventKind::Ready => "ready",
            EventKind::Open => "open",
            EventKind::Approve => "approve",
            EventKind::Hold => "hold",
            EventKind::Decline => "decline",
        }
    }

    /// The status an analysis ends up in after this event
    pub fn resulting_status(&self) -> StatusKind {
        match self {
            EventKind::Create => StatusKind::Preparation,
            EventKind::Ready => StatusKind::Ready,
            EventKind::Open => StatusKind::Active,
            EventKind::Approve => StatusKind::Approved,
            EventKind::Hold => StatusKind::OnHold,
            EventKind::Decline => StatusKind::Declined,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(EventKind::Create),
            "ready" => Ok(EventKind::Ready),
            "open" => Ok(EventKind::Open),
            "approve" => Ok(EventKind::Approve),
            "hold" => Ok(EventKind::Hold),
            "decline" => Ok(EventKind::Decline),
            other => Err(UnknownEvent(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_maps_to_a_status() {
        assert_eq!(EventKind::Create.resulting_status(), StatusKind::Preparation);
        assert_eq!(EventKind::Ready.resulting_status(), StatusKind::Ready);
        assert_eq!(EventKind::Open.resulting_status(), StatusKind::Active);
        assert_eq!(EventKind::Approve.resulting_status(), StatusKind::Approved);
        assert_eq!(EventKind::Hold.resulting_status(), StatusKind::OnHold);
        assert_eq!(EventKind::Decline.resulting_status(), StatusKind::Declined);
    }

    #[test]
    fn test_terminal_statuses_have_no_transitions() {
        assert!(StatusKind::Approved.transitions().is_empty());
        assert!(StatusKind::Declined.transitions().is_empty());
    }

    #[test]
    fn test_active_transitions_in_order() {
        let labels: Vec<&str> = StatusKind::Active
            .transitions()
            .iter()
            .map(|(label, _)| *label)
            .collect();
        assert_eq!(labels, vec!["Approve", "Hold", "Decline"]);
    }

    #[test]
    fn test_event_parsing() {
        assert_eq!("approve".parse::<EventKind>().unwrap(), EventKind::Approve);
        assert_eq!("Ready".parse::<EventKind>().unwrap(), EventKind::Ready);
        assert!("annotate".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_status_serializes_with_display_names() {
        let json = serde_json::to_string(&StatusKind::OnHold).unwrap();
        assert_eq!(json, "\"On-Hold\"");
        let parsed: StatusKind = serde_json::from_str("\"Preparation\"").unwrap();
        assert_eq!(parsed, StatusKind::Preparation);
    }
}
