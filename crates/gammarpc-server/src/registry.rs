//! Handler registry
//!
//! A shared name → handler store. Lookups are O(1) expected and take a read
//! lock only, so concurrent workers dispatch without contending with each
//! other; registration takes the write lock, making replacement atomic from
//! the perspective of subsequent dispatches.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use gammarpc_common::{validate_name, Payload, Result};

/// A registered handler capability.
///
/// Takes the request payload and produces the reply payload, or `None` to
/// signal failure (answered with `REPLY_FAILURE`).
pub type Handler = Arc<dyn Fn(&Payload) -> Option<Payload> + Send + Sync>;

/// Name → handler associative store with replace-on-duplicate semantics.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any prior entry.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the name is empty, longer than 1000 bytes, or
    /// contains a NUL byte.
    pub fn register(&self, name: &str, handler: Handler) -> Result<()> {
        validate_name(name)?;
        let replaced = self
            .handlers
            .write()
            .expect("registry lock poisoned")
            .insert(name.to_owned(), handler)
            .is_some();
        if replaced {
            tracing::debug!(name, "replaced existing handler");
        } else {
            tracing::debug!(name, "registered handler");
        }
        Ok(())
    }

    /// Looks up the handler for `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<Handler> {
        self.handlers
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Removes the handler for `name`; returns whether one was present.
    pub fn unregister(&self, name: &str) -> bool {
        self.handlers
            .write()
            .expect("registry lock poisoned")
            .remove(name)
            .is_some()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(scalar: i64) -> Handler {
        Arc::new(move |_: &Payload| Some(Payload::scalar(scalar)))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = HandlerRegistry::new();
        registry.register("add2", constant(1)).unwrap();
        assert!(registry.lookup("add2").is_some());
        assert!(registry.lookup("sub2").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reregistration_replaces_handler() {
        let registry = HandlerRegistry::new();
        registry.register("op", constant(1)).unwrap();
        registry.register("op", constant(2)).unwrap();
        assert_eq!(registry.len(), 1);

        let handler = registry.lookup("op").unwrap();
        let out = handler(&Payload::scalar(0)).unwrap();
        assert_eq!(out.scalar, 2);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let registry = HandlerRegistry::new();
        assert!(registry.register("", constant(0)).is_err());
        assert!(registry.register(&"x".repeat(1001), constant(0)).is_err());
        assert!(registry.register("nul\0name", constant(0)).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister() {
        let registry = HandlerRegistry::new();
        registry.register("f", constant(0)).unwrap();
        assert!(registry.unregister("f"));
        assert!(!registry.unregister("f"));
        assert!(registry.lookup("f").is_none());
    }
}
