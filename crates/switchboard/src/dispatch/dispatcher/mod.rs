//! Type-routed dispatch with total fault containment.
//!
//! [`Dispatcher::dispatch`] runs a fixed pipeline: look the type up in the
//! registry, decode the payload, invoke the handler, then encode its result.
//! The first failing stage short-circuits into an error [`Reply`]. Handler
//! errors and handler panics are both caught here, so `dispatch` always
//! returns a well-formed reply and never unwinds into the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use switchboard_config::{Config, DEFAULT_MAX_MESSAGE_BYTES};
use tracing::{debug, error, warn};

use super::errors::DispatchError;
use super::handler::{Handler, HandlerContext};
use super::message::{Message, PAYLOAD_FIELD};
use super::registry::HandlerRegistry;
use super::reply::Reply;
use crate::transcode::Transcoder;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes messages to registered handlers and wraps the outcome in a reply.
///
/// The dispatcher owns its registry. Registration needs `&mut self` while
/// dispatch needs only `&self`, so a dispatcher built during setup can be
/// shared across threads by reference; see
/// [`SharedDispatcher`](crate::dispatch::SharedDispatcher) when handlers must
/// be registered after dispatch has started.
///
/// # Example
///
/// ```
/// use switchboard::dispatch::{Dispatcher, HandlerContext, HandlerResult, Message};
/// use switchboard::transcode;
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.register("echo", |context: &HandlerContext| -> HandlerResult {
///     Ok(context.payload().to_vec())
/// });
///
/// let payload = transcode::encode(b"hi").expect("encode");
/// let reply = dispatcher.dispatch(Message::new("echo", payload.clone()));
/// assert!(reply.is_ok());
/// assert_eq!(reply.payload(), payload);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    transcoder: Transcoder,
    max_message_bytes: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_registry(HandlerRegistry::new())
    }
}

impl Dispatcher {
    /// Creates a dispatcher with an empty registry and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher around a prebuilt registry.
    #[must_use]
    pub fn with_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            transcoder: Transcoder::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Creates an empty dispatcher using the configured alphabet and message
    /// size limit.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            transcoder: Transcoder::new(config.payload_alphabet()),
            max_message_bytes: config.max_message_bytes(),
        }
    }

    /// Returns a reference to the handler registry.
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Returns a mutable reference to the handler registry.
    #[must_use]
    pub const fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Returns the transcoder used for payloads.
    #[must_use]
    pub const fn transcoder(&self) -> Transcoder {
        self.transcoder
    }

    /// Registers `handler` for `message_type`, replacing any previous one.
    ///
    /// Returns the displaced handler, if any.
    pub fn register<H>(
        &mut self,
        message_type: impl Into<String>,
        handler: H,
    ) -> Option<Arc<dyn Handler>>
    where
        H: Handler + 'static,
    {
        let message_type = message_type.into();
        debug!(
            target: DISPATCH_TARGET,
            message_type = message_type.as_str(),
            replaced = self.registry.contains(&message_type),
            "registering handler"
        );
        self.registry.register(message_type, handler)
    }

    /// Checks that the message type has a registered handler.
    ///
    /// Only the type is inspected; a missing payload is reported later by
    /// [`Dispatcher::dispatch`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnrecognizedType`] when no handler is
    /// registered for the type, or [`DispatchError::MissingField`] when the
    /// message has no `type` key.
    pub fn validate(&self, message: &Message) -> Result<(), DispatchError> {
        self.resolve(message).map(|_| ())
    }

    /// Dispatches a message and returns the reply envelope.
    ///
    /// Never fails and never panics: every fault, including a panicking
    /// handler, becomes an error reply.
    ///
    /// A handler panic is caught only after the process panic hook has run.
    /// The default hook prints the panic message to stderr, so hosts that
    /// report solely through `tracing` should install their own hook with
    /// [`std::panic::set_hook`]. The dispatcher logs the panic at `error`
    /// either way.
    ///
    /// # Example
    ///
    /// ```
    /// use switchboard::dispatch::{Dispatcher, HandlerContext, HandlerResult, Message};
    ///
    /// std::panic::set_hook(Box::new(|info| {
    ///     tracing::error!(target: "host", panic = %info, "panic observed");
    /// }));
    ///
    /// let mut dispatcher = Dispatcher::new();
    /// dispatcher.register("explode", |_: &HandlerContext| -> HandlerResult {
    ///     panic!("unsupported codec")
    /// });
    ///
    /// let reply = dispatcher.dispatch(Message::new("explode", ""));
    /// assert_eq!(reply.payload(), "Server error: handler panicked: unsupported codec");
    /// ```
    #[must_use]
    pub fn dispatch(&self, message: Message) -> Reply {
        match self.try_dispatch(message) {
            Ok(encoded) => Reply::ok(encoded),
            Err(error) => reply_for(&error),
        }
    }

    /// Parses a JSONL line and dispatches it.
    ///
    /// Lines over the configured size limit and lines that are not JSON
    /// objects produce error replies.
    #[must_use]
    pub fn dispatch_line(&self, line: &[u8]) -> Reply {
        match self.parse_line(line) {
            Ok(message) => self.dispatch(message),
            Err(error) => reply_for(&error),
        }
    }

    fn parse_line(&self, line: &[u8]) -> Result<Message, DispatchError> {
        if line.len() > self.max_message_bytes {
            return Err(DispatchError::message_too_large(
                line.len(),
                self.max_message_bytes,
            ));
        }
        Message::parse(line)
    }

    fn try_dispatch(&self, message: Message) -> Result<String, DispatchError> {
        let handler = self.resolve(&message)?;
        let context = self.decode(message)?;

        debug!(
            target: DISPATCH_TARGET,
            message_type = context.message_type(),
            payload_bytes = context.payload().len(),
            "dispatching message"
        );

        let result = invoke(handler.as_ref(), &context)?;
        Ok(self.transcoder.encode(&result)?)
    }

    fn resolve(&self, message: &Message) -> Result<&Arc<dyn Handler>, DispatchError> {
        let message_type = message.message_type()?;
        self.registry
            .get(message_type)
            .ok_or_else(|| DispatchError::unrecognized_type(message_type))
    }

    /// Splits the payload out of the message and decodes it.
    fn decode(&self, mut message: Message) -> Result<HandlerContext, DispatchError> {
        let message_type = message.message_type()?.to_owned();
        let encoded = match message.remove_field(PAYLOAD_FIELD) {
            Some(Value::String(text)) => text,
            Some(_) => return Err(DispatchError::payload_not_text()),
            None => return Err(DispatchError::missing_field(PAYLOAD_FIELD)),
        };
        let payload = self.transcoder.decode(&encoded)?;
        Ok(HandlerContext::from_parts(
            message_type,
            payload,
            message.into_fields(),
        ))
    }
}

/// Runs a handler, converting its errors and panics into dispatch errors.
fn invoke(handler: &dyn Handler, context: &HandlerContext) -> Result<Vec<u8>, DispatchError> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(context))) {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(handler_error)) => Err(DispatchError::from_handler_error(handler_error)),
        Err(panic_payload) => {
            let message = panic_message(&*panic_payload);
            error!(
                target: DISPATCH_TARGET,
                message_type = context.message_type(),
                panic = message.as_str(),
                "handler panicked"
            );
            Err(DispatchError::unclassified(format!(
                "handler panicked: {message}"
            )))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_owned()
    }
}

fn reply_for(error: &DispatchError) -> Reply {
    warn!(
        target: DISPATCH_TARGET,
        kind = error.kind(),
        %error,
        "dispatch failed"
    );
    Reply::from_error(error)
}
