//! Type-routed message dispatch with a uniform reply envelope.
//!
//! `switchboard` receives JSON messages that name a handler through their
//! `type` key and carry a base64 `payload`. The [`dispatch::Dispatcher`]
//! looks the handler up, decodes the payload with the [`transcode`] module,
//! runs the handler, encodes its binary result and wraps the outcome in a
//! `{"status", "payload"}` [`dispatch::Reply`].
//!
//! The dispatcher never lets a failure escape: unknown types, missing keys,
//! undecodable payloads, handler errors and handler panics all become error
//! replies with a readable diagnostic.
//!
//! Transports and the handlers themselves belong to the host. The crate only
//! emits `tracing` events; [`telemetry::initialise`] installs a subscriber for
//! hosts that have none.
//!
//! # Example
//!
//! ```
//! use switchboard::dispatch::{Dispatcher, HandlerContext, HandlerResult, ReplyStatus};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register("echo", |context: &HandlerContext| -> HandlerResult {
//!     Ok(context.payload().to_vec())
//! });
//!
//! let reply = dispatcher.dispatch_line(br#"{"type":"echo","payload":"aGk="}"#);
//! assert_eq!(reply.status(), ReplyStatus::Ok);
//! assert_eq!(reply.payload(), "aGk=");
//!
//! let reply = dispatcher.dispatch_line(br#"{"type":"pdf","payload":""}"#);
//! assert_eq!(reply.status(), ReplyStatus::Error);
//! assert_eq!(reply.payload(), "File type not recognized");
//! ```

pub mod dispatch;
pub mod telemetry;
pub mod transcode;

pub use self::dispatch::{
    DispatchError, Dispatcher, Handler, HandlerContext, HandlerResult, Message, Reply, ReplyStatus,
};
pub use self::transcode::{TranscodeError, Transcoder};

#[cfg(test)]
mod tests;
