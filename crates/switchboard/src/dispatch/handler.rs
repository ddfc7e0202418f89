//! Handler capability and the context handlers receive.
//!
//! A handler gets a single [`HandlerContext`] holding the message type, the
//! decoded payload, and every other field of the inbound message. Handlers
//! return the binary result or any error; the dispatcher classifies the
//! error when building the reply.

use std::error::Error as StdError;

use serde_json::{Map, Value};

use super::errors::DispatchError;
use super::message::TYPE_FIELD;

/// Error type handlers may return. Any `std::error::Error` converts into it
/// with `?`.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

/// Result returned by a handler: the binary reply payload or a fault.
pub type HandlerResult = Result<Vec<u8>, HandlerError>;

/// Capability to turn a decoded message into a binary result.
///
/// Closures with the matching signature implement this trait, so most
/// registrations need no named type.
///
/// # Example
///
/// ```
/// use switchboard::dispatch::{Handler, HandlerContext, HandlerResult};
///
/// struct Upper;
///
/// impl Handler for Upper {
///     fn handle(&self, context: &HandlerContext) -> HandlerResult {
///         Ok(context.payload().to_ascii_uppercase())
///     }
/// }
///
/// let context = HandlerContext::new("upper", b"abc".to_vec());
/// assert_eq!(Upper.handle(&context).expect("handle"), b"ABC");
/// ```
pub trait Handler: Send + Sync {
    /// Produces the reply payload for a message.
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller as an error reply. Returning a
    /// [`DispatchError`] selects that error's reply text; every other error
    /// becomes a `Server error:` reply.
    fn handle(&self, context: &HandlerContext) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&HandlerContext) -> HandlerResult + Send + Sync,
{
    fn handle(&self, context: &HandlerContext) -> HandlerResult {
        self(context)
    }
}

/// Decoded message handed to a [`Handler`].
///
/// `fields` holds every key of the inbound message except `payload`, whose
/// decoded bytes are available through [`HandlerContext::payload`]. The
/// `type` key is kept so handlers shared between several types can branch
/// on it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerContext {
    message_type: String,
    payload: Vec<u8>,
    fields: Map<String, Value>,
}

impl HandlerContext {
    /// Creates a context with no extra fields.
    #[must_use]
    pub fn new(message_type: impl Into<String>, payload: Vec<u8>) -> Self {
        let message_type = message_type.into();
        let mut fields = Map::new();
        fields.insert(TYPE_FIELD.to_owned(), Value::String(message_type.clone()));
        Self {
            message_type,
            payload,
            fields,
        }
    }

    /// Builds a context from parts already split out of a message.
    pub(crate) const fn from_parts(
        message_type: String,
        payload: Vec<u8>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            message_type,
            payload,
            fields,
        }
    }

    /// Adds or replaces an extra field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns the message type that selected the handler.
    #[must_use]
    pub const fn message_type(&self) -> &str {
        self.message_type.as_str()
    }

    /// Returns the decoded payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns a field of the inbound message.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns every field except the payload.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a field the handler cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingField`] naming `key` when the message
    /// lacks it, so the caller receives the standard missing-field reply.
    pub fn require_field(&self, key: &str) -> Result<&Value, DispatchError> {
        self.field(key)
            .ok_or_else(|| DispatchError::missing_field(key))
    }

    /// Returns a required string field.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingField`] when the key is absent and
    /// [`DispatchError::Unclassified`] when the value is not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, DispatchError> {
        self.require_field(key)?.as_str().ok_or_else(|| {
            DispatchError::unclassified(format!("field '{key}' must be a string"))
        })
    }
}
