use chrono::{DateTime, Utc};
use feed_core::{StatusEvent, Toast, ToastLevel};

/// One line per event, e.g. `12:00:01 sync       abc  InProgress (40%)`.
pub fn format_event(at: DateTime<Utc>, event: &StatusEvent) -> String {
    let detail = match event {
        StatusEvent::Detection { status, .. } => format!("{status:?}"),
        StatusEvent::Sync {
            status,
            progress: Some(progress),
            ..
        } => format!("{status:?} ({progress}%)"),
        StatusEvent::Sync { status, .. } => format!("{status:?}"),
        StatusEvent::Recovery { status, .. } => status.clone(),
    };
    format!(
        "{} {:<10} {}  {}",
        at.format("%H:%M:%S"),
        event.kind(),
        event.id(),
        detail
    )
}

pub fn format_toast(toast: &Toast) -> String {
    let marker = match toast.level {
        ToastLevel::Info => "[i]",
        ToastLevel::Success => "[ok]",
        ToastLevel::Warning => "[!]",
        ToastLevel::Error => "[x]",
    };
    format!("{marker} {}: {}", toast.title, toast.body)
}
