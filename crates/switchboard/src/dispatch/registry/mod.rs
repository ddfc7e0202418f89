//! Handler registry keyed by message type.
//!
//! The [`HandlerRegistry`] maps each message type to exactly one handler.
//! Registering a type that already has a handler replaces it, and the
//! displaced handler is handed back to the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::handler::Handler;

/// Registry of handlers keyed by message type.
///
/// # Example
///
/// ```
/// use switchboard::dispatch::{HandlerContext, HandlerRegistry, HandlerResult};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("echo", |context: &HandlerContext| -> HandlerResult {
///     Ok(context.payload().to_vec())
/// });
/// assert!(registry.contains("echo"));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `message_type`.
    ///
    /// Returns the handler previously registered for the type, if any.
    pub fn register<H>(
        &mut self,
        message_type: impl Into<String>,
        handler: H,
    ) -> Option<Arc<dyn Handler>>
    where
        H: Handler + 'static,
    {
        self.register_shared(message_type, Arc::new(handler))
    }

    /// Registers an already shared handler for `message_type`.
    ///
    /// Returns the handler previously registered for the type, if any.
    pub fn register_shared(
        &mut self,
        message_type: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        self.handlers.insert(message_type.into(), handler)
    }

    /// Removes the handler for `message_type`.
    pub fn unregister(&mut self, message_type: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.remove(message_type)
    }

    /// Looks up the handler for a message type.
    #[must_use]
    pub fn get(&self, message_type: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(message_type)
    }

    /// Returns `true` when a handler is registered for `message_type`.
    #[must_use]
    pub fn contains(&self, message_type: &str) -> bool {
        self.handlers.contains_key(message_type)
    }

    /// Returns the registered message types in sorted order.
    #[must_use]
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

impl<K> FromIterator<(K, Arc<dyn Handler>)> for HandlerRegistry
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Arc<dyn Handler>)>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

impl<K> Extend<(K, Arc<dyn Handler>)> for HandlerRegistry
where
    K: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, Arc<dyn Handler>)>>(&mut self, iter: I) {
        for (message_type, handler) in iter {
            self.register_shared(message_type, handler);
        }
    }
}
