//! Error taxonomy for message dispatch.
//!
//! Every variant's display text is exactly the diagnostic placed in an error
//! [`Reply`](crate::dispatch::Reply), so turning a failure into a reply never
//! needs a second mapping table. Nothing here is fatal: the dispatcher
//! converts each kind into a reply at its boundary.

use std::error::Error as StdError;

use thiserror::Error;

use crate::transcode::TranscodeError;

/// Errors surfaced while validating, decoding, handling, or encoding a
/// message.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the message type.
    #[error("File type not recognized")]
    UnrecognizedType {
        /// The type that was looked up.
        message_type: String,
    },

    /// The message carries no payload.
    ///
    /// Reserved for callers that check payload presence themselves. The
    /// dispatcher reports an absent payload as [`Self::MissingField`].
    #[error("Message has no payload")]
    MissingPayload,

    /// The inbound payload is not valid base64.
    #[error("Message payload cannot be decoded from base64")]
    PayloadDecode {
        /// Decoder failure, when the payload was text.
        #[source]
        source: Option<TranscodeError>,
    },

    /// The handler result could not be encoded.
    #[error("Cannot encode payload into base64")]
    PayloadEncode {
        /// Encoder failure.
        #[source]
        source: TranscodeError,
    },

    /// A required key is absent from the message.
    #[error("JSON object missing required field'{field}'")]
    MissingField {
        /// Name of the absent key.
        field: String,
    },

    /// The inbound line is not a JSON object.
    #[error("Server error: malformed message: {message}")]
    MalformedMessage {
        /// Parser diagnostic.
        message: String,
        /// Underlying JSON error.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The inbound line exceeds the configured size limit.
    #[error("Server error: message of {size} bytes exceeds {max_size} byte limit")]
    MessageTooLarge {
        /// Size of the rejected line.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },

    /// Any other fault raised by a handler or the pipeline.
    #[error("Server error: {message}")]
    Unclassified {
        /// Diagnostic text of the fault.
        message: String,
    },
}

impl DispatchError {
    /// Creates an unrecognized type error.
    pub fn unrecognized_type(message_type: impl Into<String>) -> Self {
        Self::UnrecognizedType {
            message_type: message_type.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a payload decode error for a payload that is not a string.
    #[must_use]
    pub const fn payload_not_text() -> Self {
        Self::PayloadDecode { source: None }
    }

    /// Creates a malformed message error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedMessage {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed message error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a message too large error.
    #[must_use]
    pub const fn message_too_large(size: usize, max_size: usize) -> Self {
        Self::MessageTooLarge { size, max_size }
    }

    /// Creates an unclassified error with the given diagnostic.
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
        }
    }

    /// Classifies an error returned by a handler.
    ///
    /// A [`DispatchError`] raised inside a handler keeps its kind, so a
    /// handler calling
    /// [`HandlerContext::require_field`](crate::dispatch::HandlerContext::require_field)
    /// produces the same missing-field reply as the dispatcher would. Any
    /// other error becomes [`Self::Unclassified`] carrying its display text.
    #[must_use]
    pub fn from_handler_error(error: Box<dyn StdError + Send + Sync>) -> Self {
        match error.downcast::<Self>() {
            Ok(dispatch_error) => *dispatch_error,
            Err(other) => Self::unclassified(other.to_string()),
        }
    }

    /// Returns a short, stable label for the error kind, used in telemetry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnrecognizedType { .. } => "unrecognized_type",
            Self::MissingPayload => "missing_payload",
            Self::PayloadDecode { .. } => "payload_decode",
            Self::PayloadEncode { .. } => "payload_encode",
            Self::MissingField { .. } => "missing_field",
            Self::MalformedMessage { .. } => "malformed_message",
            Self::MessageTooLarge { .. } => "message_too_large",
            Self::Unclassified { .. } => "unclassified",
        }
    }
}

impl From<TranscodeError> for DispatchError {
    fn from(error: TranscodeError) -> Self {
        match error {
            TranscodeError::Decode { .. } => Self::PayloadDecode {
                source: Some(error),
            },
            TranscodeError::Encode { .. } => Self::PayloadEncode { source: error },
        }
    }
}
