//! Dispatcher shared between threads with runtime registration.
//!
//! This module wraps the `Arc<RwLock<Dispatcher>>` locking pattern and its
//! poisoning handling. Dispatch takes the read lock, so concurrent dispatches
//! never block each other; registration takes the write lock and waits for
//! in-flight dispatches to finish.

use std::sync::{Arc, RwLock};

use super::dispatcher::Dispatcher;
use super::errors::DispatchError;
use super::handler::Handler;
use super::message::Message;
use super::reply::Reply;

const POISONED: &str = "handler registry lock poisoned";

/// Cloneable handle to a dispatcher guarded by a read/write lock.
///
/// Clones share the same registry.
///
/// # Example
///
/// ```
/// use switchboard::dispatch::{HandlerContext, HandlerResult, Message, SharedDispatcher};
///
/// let shared = SharedDispatcher::default();
/// let worker = shared.clone();
/// shared
///     .register("echo", |context: &HandlerContext| -> HandlerResult {
///         Ok(context.payload().to_vec())
///     })
///     .expect("register");
/// assert!(worker.dispatch(Message::new("echo", "aGk=")).is_ok());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedDispatcher {
    inner: Arc<RwLock<Dispatcher>>,
}

impl SharedDispatcher {
    /// Wraps a dispatcher for shared use.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dispatcher)),
        }
    }

    /// Registers `handler` for `message_type`, replacing any previous one.
    ///
    /// Returns the displaced handler, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unclassified`] if the lock is poisoned.
    pub fn register<H>(
        &self,
        message_type: impl Into<String>,
        handler: H,
    ) -> Result<Option<Arc<dyn Handler>>, DispatchError>
    where
        H: Handler + 'static,
    {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| DispatchError::unclassified(POISONED))?;
        Ok(guard.register(message_type, handler))
    }

    /// Dispatches a message under the read lock.
    #[must_use]
    pub fn dispatch(&self, message: Message) -> Reply {
        self.with_dispatcher(|dispatcher| dispatcher.dispatch(message))
    }

    /// Parses and dispatches a JSONL line under the read lock.
    #[must_use]
    pub fn dispatch_line(&self, line: &[u8]) -> Reply {
        self.with_dispatcher(|dispatcher| dispatcher.dispatch_line(line))
    }

    /// Executes a closure with shared access to the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Unclassified`] if the lock is poisoned.
    pub fn read<F, R>(&self, f: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&Dispatcher) -> R,
    {
        let guard = self
            .inner
            .read()
            .map_err(|_| DispatchError::unclassified(POISONED))?;
        Ok(f(&guard))
    }

    fn with_dispatcher<F>(&self, f: F) -> Reply
    where
        F: FnOnce(&Dispatcher) -> Reply,
    {
        self.read(f).unwrap_or_else(Reply::from)
    }
}

impl From<Dispatcher> for SharedDispatcher {
    fn from(dispatcher: Dispatcher) -> Self {
        Self::new(dispatcher)
    }
}
