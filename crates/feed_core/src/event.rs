use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Lifecycle of a claim-detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    InProgress,
    Complete,
    Failed,
}

/// Lifecycle of a marketplace data sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    InProgress,
    Complete,
    Failed,
}

/// One status update pushed by the backend, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    Detection {
        id: String,
        status: DetectionStatus,
    },
    Sync {
        id: String,
        status: SyncStatus,
        /// Percentage in `0..=100`. Display only; never assumed monotonic.
        #[serde(
            default,
            deserialize_with = "deserialize_progress",
            skip_serializing_if = "Option::is_none"
        )]
        progress: Option<u8>,
    },
    Recovery {
        id: String,
        /// Free-form label such as "Submitted" or "Paid Out".
        status: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Detection,
    Sync,
    Recovery,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Detection => "detection",
            EventKind::Sync => "sync",
            EventKind::Recovery => "recovery",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "detection" => Some(EventKind::Detection),
            "sync" => Some(EventKind::Sync),
            "recovery" => Some(EventKind::Recovery),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl StatusEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StatusEvent::Detection { .. } => EventKind::Detection,
            StatusEvent::Sync { .. } => EventKind::Sync,
            StatusEvent::Recovery { .. } => EventKind::Recovery,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            StatusEvent::Detection { id, .. }
            | StatusEvent::Sync { id, .. }
            | StatusEvent::Recovery { id, .. } => id,
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Detection { id, status } => write!(f, "detection {id}: {status:?}"),
            StatusEvent::Sync {
                id,
                status,
                progress: Some(progress),
            } => write!(f, "sync {id}: {status:?} ({progress}%)"),
            StatusEvent::Sync { id, status, .. } => write!(f, "sync {id}: {status:?}"),
            StatusEvent::Recovery { id, status } => write!(f, "recovery {id}: {status}"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame is not valid json: {0}")]
    NotJson(String),
    #[error("frame is not a json object")]
    NotAnObject,
    #[error("frame has no string `type` field")]
    MissingType,
    #[error("unknown event type `{0}`")]
    UnknownType(String),
    #[error("invalid {kind} event: {message}")]
    InvalidFields { kind: EventKind, message: String },
}

/// Validates one wire frame and maps it to a `StatusEvent`.
///
/// Extra fields are ignored. Every failure is a typed `DecodeError` so callers
/// can log and drop the frame.
pub fn decode_frame(text: &str) -> Result<StatusEvent, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| DecodeError::NotJson(err.to_string()))?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    let tag = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;
    let kind = EventKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownType(tag.to_owned()))?;

    serde_json::from_value(value).map_err(|err| DecodeError::InvalidFields {
        kind,
        message: err.to_string(),
    })
}

fn deserialize_progress<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) if value <= 100 => Ok(Some(value as u8)),
        Some(value) => Err(D::Error::custom(format!(
            "progress {value} outside 0..=100"
        ))),
    }
}
