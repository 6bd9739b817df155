//! # Listener Registry
//!
//! `module.item` → handler table, filled once at startup by explicit
//! registration and read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{ConfigError, HandlerResult};
use super::invariants::address_key;

/// Handler for a `Plain` storage item: `(value)`.
pub type PlainHandler = Arc<dyn Fn(Option<&str>) -> HandlerResult + Send + Sync>;

/// Handler for a `Map` storage item: `(key, value)`.
pub type MapHandler = Arc<dyn Fn(&str, Option<&str>) -> HandlerResult + Send + Sync>;

/// Handler for a `DoubleMap` storage item: `(key1, key2, value)`.
pub type DoubleMapHandler = Arc<dyn Fn(&str, &str, Option<&str>) -> HandlerResult + Send + Sync>;

/// Application callback; the variant fixes the number of key parts.
#[derive(Clone)]
pub enum StorageHandler {
    /// Zero key parts.
    Plain(PlainHandler),
    /// One key part.
    Map(MapHandler),
    /// Two key parts.
    DoubleMap(DoubleMapHandler),
}

impl StorageHandler {
    /// Number of key parts this handler accepts.
    pub fn arity(&self) -> usize {
        match self {
            Self::Plain(_) => 0,
            Self::Map(_) => 1,
            Self::DoubleMap(_) => 2,
        }
    }

    /// Invoke with key parts left to right, then the value.
    pub fn invoke(&self, key_parts: &[String], value: Option<&str>) -> HandlerResult {
        match (self, key_parts) {
            (Self::Plain(f), []) => f(value),
            (Self::Map(f), [key]) => f(key, value),
            (Self::DoubleMap(f), [key1, key2]) => f(key1, key2, value),
            _ => Err(format!(
                "listener takes {} key part(s), got {}",
                self.arity(),
                key_parts.len()
            )
            .into()),
        }
    }
}

impl fmt::Debug for StorageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageHandler(arity={})", self.arity())
    }
}

/// A handler bound to one storage address.
#[derive(Clone, Debug)]
pub struct ListenerBinding {
    /// Module name.
    pub module: String,
    /// Storage item name.
    pub item: String,
    /// Callback.
    pub handler: StorageHandler,
}

impl ListenerBinding {
    /// Bind a handler to `module.item`.
    pub fn new(module: impl Into<String>, item: impl Into<String>, handler: StorageHandler) -> Self {
        Self {
            module: module.into(),
            item: item.into(),
            handler,
        }
    }

    /// Bind a `Plain` handler.
    pub fn plain<F>(module: impl Into<String>, item: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&str>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(module, item, StorageHandler::Plain(Arc::new(f)))
    }

    /// Bind a `Map` handler.
    pub fn map<F>(module: impl Into<String>, item: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(module, item, StorageHandler::Map(Arc::new(f)))
    }

    /// Bind a `DoubleMap` handler.
    pub fn double_map<F>(module: impl Into<String>, item: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str, &str, Option<&str>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(module, item, StorageHandler::DoubleMap(Arc::new(f)))
    }

    /// `module.item` address.
    pub fn address(&self) -> String {
        address_key(&self.module, &self.item)
    }

    /// Number of key parts the handler accepts.
    pub fn arity(&self) -> usize {
        self.handler.arity()
    }
}

/// Table of listener bindings.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, ListenerBinding>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding; a second binding for the same address is rejected.
    pub fn register(&mut self, binding: ListenerBinding) -> Result<(), ConfigError> {
        let address = binding.address();
        if self.listeners.contains_key(&address) {
            return Err(ConfigError::DuplicateListener { address });
        }
        self.listeners.insert(address, binding);
        Ok(())
    }

    /// Binding for `module.item`, if any.
    pub fn resolve(&self, module: &str, item: &str) -> Option<&ListenerBinding> {
        self.listeners.get(&address_key(module, item))
    }

    /// Registered addresses.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.listeners.keys().map(String::as_str)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ListenerRegistry::new();
        registry
            .register(ListenerBinding::map("Game", "Score", |_, _| Ok(())))
            .unwrap();

        let binding = registry.resolve("Game", "Score").unwrap();
        assert_eq!(binding.arity(), 1);
        assert!(registry.resolve("Game", "Round").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ListenerRegistry::new();
        registry
            .register(ListenerBinding::plain("Game", "Round", |_| Ok(())))
            .unwrap();

        let result = registry.register(ListenerBinding::plain("Game", "Round", |_| Ok(())));
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateListener { address }) if address == "Game.Round"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invoke_positional_arguments() {
        let handler = ListenerBinding::double_map("Game", "Board", |k1, k2, value| {
            assert_eq!(k1, "");
            assert_eq!(k2, "beef");
            assert_eq!(value, Some("0x01"));
            Ok(())
        })
        .handler;
        handler
            .invoke(&["".to_string(), "beef".to_string()], Some("0x01"))
            .unwrap();
    }

    #[test]
    fn test_invoke_wrong_part_count() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler = ListenerBinding::map("Game", "Score", move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .handler;

        assert!(handler.invoke(&[], None).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
