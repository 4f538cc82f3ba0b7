//! Notification layer on top of dispatch. Presentation only: nothing in the
//! connection lifecycle depends on it.

use crate::{DetectionStatus, StatusEvent, SyncStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub body: String,
}

impl Toast {
    fn new(level: ToastLevel, title: &str, body: String) -> Self {
        Self {
            level,
            title: title.to_string(),
            body,
        }
    }
}

/// Maps a status event to the toast the UI would show, if any.
///
/// Sync progress updates do not produce toasts.
pub fn toast_for(event: &StatusEvent) -> Option<Toast> {
    match event {
        StatusEvent::Detection { id, status } => Some(match status {
            DetectionStatus::InProgress => Toast::new(
                ToastLevel::Info,
                "Detection started",
                format!("Scanning for reimbursable claims ({id})"),
            ),
            DetectionStatus::Complete => Toast::new(
                ToastLevel::Success,
                "Detection completed",
                format!("Claim detection {id} finished"),
            ),
            DetectionStatus::Failed => Toast::new(
                ToastLevel::Error,
                "Detection failed",
                format!("Claim detection {id} did not complete"),
            ),
        }),
        StatusEvent::Sync { id, status, .. } => match status {
            SyncStatus::InProgress => None,
            SyncStatus::Complete => Some(Toast::new(
                ToastLevel::Success,
                "Sync completed",
                format!("Seller data sync {id} finished"),
            )),
            SyncStatus::Failed => Some(Toast::new(
                ToastLevel::Error,
                "Sync failed",
                format!("Seller data sync {id} failed"),
            )),
        },
        StatusEvent::Recovery { id, status } => Some(Toast::new(
            recovery_level(status),
            "Recovery updated",
            format!("Claim {id}: {status}"),
        )),
    }
}

fn recovery_level(label: &str) -> ToastLevel {
    let label = label.trim().to_ascii_lowercase();
    match label.as_str() {
        "paid out" | "approved" | "reimbursed" => ToastLevel::Success,
        "denied" | "rejected" => ToastLevel::Warning,
        _ => ToastLevel::Info,
    }
}
