//! Inbound message representation.
//!
//! A [`Message`] is the wire form of a request: a JSON object carrying a
//! `type` key that selects the handler and a base64 `payload`. Any further
//! keys are passed to the handler untouched. Parsing only checks that the
//! line is a JSON object; presence of the required keys is checked later by
//! the dispatcher so every missing key is reported the same way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Key holding the handler selector.
pub const TYPE_FIELD: &str = "type";

/// Key holding the base64 payload.
pub const PAYLOAD_FIELD: &str = "payload";

/// Inbound message as received from a transport.
///
/// # Example
///
/// ```
/// use switchboard::dispatch::Message;
///
/// let message = Message::new("echo", "aGk=").with_field("locale", "en-GB");
/// assert_eq!(message.message_type().expect("type"), "echo");
/// assert!(message.field("locale").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    fields: Map<String, Value>,
}

impl Message {
    /// Creates a message with the given type and encoded payload.
    #[must_use]
    pub fn new(message_type: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_FIELD.to_owned(), Value::String(message_type.into()));
        fields.insert(PAYLOAD_FIELD.to_owned(), Value::String(payload.into()));
        Self { fields }
    }

    /// Wraps an existing JSON object without checking its keys.
    #[must_use]
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Removes a field, returning its value.
    pub fn remove_field(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Parses a JSONL line into a message.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed
    /// before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedMessage`] if the line is empty, is
    /// not valid JSON, or is valid JSON but not an object.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty message line"));
        }

        serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)
    }

    /// Returns the message type.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingField`] when the `type` key is absent
    /// and [`DispatchError::UnrecognizedType`] when it is not a string, since
    /// no handler can be registered under a non-string type.
    pub fn message_type(&self) -> Result<&str, DispatchError> {
        match self.fields.get(TYPE_FIELD) {
            Some(Value::String(message_type)) => Ok(message_type.as_str()),
            Some(other) => Err(DispatchError::unrecognized_type(other.to_string())),
            None => Err(DispatchError::missing_field(TYPE_FIELD)),
        }
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns all fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the message, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Message {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_minimal_message() {
        let message = Message::parse(br#"{"type":"echo","payload":"aGk="}"#).expect("parse");
        assert_eq!(message.message_type().expect("type"), "echo");
        assert_eq!(message.field(PAYLOAD_FIELD), Some(&json!("aGk=")));
    }

    #[test]
    fn keeps_extra_fields() {
        let message = Message::parse(br#"{"type":"thumb","payload":"","width":64}"#)
            .expect("parse with extras");
        assert_eq!(message.field("width"), Some(&json!(64)));
        assert_eq!(message.fields().len(), 3);
    }

    #[test]
    fn trims_trailing_whitespace() {
        let message =
            Message::parse(b"{\"type\":\"echo\",\"payload\":\"\"}  \r\n").expect("parse");
        assert_eq!(message.message_type().expect("type"), "echo");
    }

    #[test]
    fn parses_object_without_required_keys() {
        let message = Message::parse(b"{}").expect("empty object is a message");
        assert!(matches!(
            message.message_type(),
            Err(DispatchError::MissingField { ref field }) if field == TYPE_FIELD
        ));
    }

    #[test]
    fn rejects_empty_input() {
        let result = Message::parse(b"");
        assert!(matches!(result, Err(DispatchError::MalformedMessage { .. })));
    }

    #[test]
    fn rejects_whitespace_only() {
        let result = Message::parse(b"   \n");
        assert!(matches!(result, Err(DispatchError::MalformedMessage { .. })));
    }

    #[test]
    fn rejects_invalid_json() {
        let result = Message::parse(b"not json");
        assert!(matches!(result, Err(DispatchError::MalformedMessage { .. })));
    }

    #[test]
    fn rejects_non_object_json() {
        let result = Message::parse(br#"["echo","aGk="]"#);
        assert!(matches!(result, Err(DispatchError::MalformedMessage { .. })));
    }

    #[test]
    fn non_string_type_is_unrecognized() {
        let message = Message::default().with_field(TYPE_FIELD, 7);
        assert!(matches!(
            message.message_type(),
            Err(DispatchError::UnrecognizedType { .. })
        ));
    }

    #[test]
    fn builder_round_trips_through_json() {
        let message = Message::new("echo", "aGk=").with_field("locale", "en-GB");
        let json = serde_json::to_value(&message).expect("serialise");
        assert_eq!(
            json,
            json!({"type": "echo", "payload": "aGk=", "locale": "en-GB"})
        );
    }
}
