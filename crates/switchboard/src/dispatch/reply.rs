//! Reply envelope returned by every dispatch.
//!
//! A reply is always `{"status": ..., "payload": ...}`. On success the
//! payload is the handler result in base64; on error it is a plain
//! diagnostic string. Callers branch on [`Reply::status`] before
//! interpreting the payload.

use serde::{Deserialize, Serialize};

use super::errors::DispatchError;

/// Outcome recorded in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// The handler ran and its result is encoded in the payload.
    Ok,
    /// Dispatch failed and the payload is a diagnostic.
    Error,
}

impl ReplyStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Uniform reply envelope.
///
/// # Example
///
/// ```
/// use switchboard::dispatch::{Reply, ReplyStatus};
///
/// let reply = Reply::error("File type not recognized");
/// assert_eq!(reply.status(), ReplyStatus::Error);
/// assert_eq!(
///     reply.to_json_line().expect("serialise"),
///     "{\"status\":\"error\",\"payload\":\"File type not recognized\"}\n",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    status: ReplyStatus,
    payload: String,
}

impl Reply {
    /// Creates a success reply carrying an already encoded payload.
    #[must_use]
    pub fn ok(encoded_payload: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Ok,
            payload: encoded_payload.into(),
        }
    }

    /// Creates an error reply carrying a diagnostic.
    #[must_use]
    pub fn error(diagnostic: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            payload: diagnostic.into(),
        }
    }

    /// Creates an error reply from a dispatch error's display text.
    #[must_use]
    pub fn from_error(error: &DispatchError) -> Self {
        Self::error(error.to_string())
    }

    /// Returns the reply status.
    #[must_use]
    pub const fn status(&self) -> ReplyStatus {
        self.status
    }

    /// Returns the payload: base64 text on success, a diagnostic on error.
    #[must_use]
    pub const fn payload(&self) -> &str {
        self.payload.as_str()
    }

    /// Returns `true` for success replies.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, ReplyStatus::Ok)
    }

    /// Serialises the reply as a newline-terminated JSON line.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if serialisation fails.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl From<DispatchError> for Reply {
    fn from(error: DispatchError) -> Self {
        Self::from_error(&error)
    }
}
