//! Type-routed message dispatch.
//!
//! Inbound messages are JSON objects with a `type` key that selects a
//! registered [`Handler`] and a base64 `payload`:
//!
//! ```json
//! {"type":"echo","payload":"aGk=","locale":"en-GB"}
//! ```
//!
//! Every dispatch produces exactly one [`Reply`]:
//!
//! ```json
//! {"status":"ok","payload":"aGk="}
//! {"status":"error","payload":"File type not recognized"}
//! ```
//!
//! On success the reply payload is the handler result in base64. On error it
//! is the display text of a [`DispatchError`].

mod dispatcher;
mod errors;
mod handler;
mod message;
mod registry;
mod reply;
mod shared;

pub(crate) use self::dispatcher::DISPATCH_TARGET;
pub use self::dispatcher::Dispatcher;
pub use self::errors::DispatchError;
pub use self::handler::{Handler, HandlerContext, HandlerError, HandlerResult};
pub use self::message::{Message, PAYLOAD_FIELD, TYPE_FIELD};
pub use self::registry::HandlerRegistry;
pub use self::reply::{Reply, ReplyStatus};
pub use self::shared::SharedDispatcher;
