//! API response envelope.

use serde::{Deserialize, Serialize};

/// The uniform success/failure envelope returned by every backend endpoint.
///
/// Mobile clients branch on `success` and show `message`; `data` carries the
/// payload on success and is omitted from the wire when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Payload, present on success when the operation returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// A successful envelope with no payload.
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// A failed envelope. Never carries a payload.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
