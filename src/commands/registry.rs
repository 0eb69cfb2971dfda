use super::catalog::CommandCatalog;
use super::handlers::builtin_handlers;
use super::traits::CommandHandler;
use crate::error::CommandError;
use crate::integrations::Capabilities;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps catalog command names to their handlers. Populated once at start-up.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in handler, bound to `capabilities`.
    pub fn with_capabilities(capabilities: &Capabilities) -> Self {
        let mut registry = Self::new();
        for handler in builtin_handlers(capabilities) {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler. Replaces any existing handler with the same name.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    /// Sorted handler names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every catalog entry needs a handler and every handler a catalog entry.
    pub fn validate_against(&self, catalog: &CommandCatalog) -> Result<(), CommandError> {
        let mut unhandled: Vec<&str> = catalog
            .iter()
            .map(|spec| spec.name)
            .filter(|name| !self.handlers.contains_key(*name))
            .collect();
        let mut uncatalogued: Vec<&str> = self
            .names()
            .into_iter()
            .filter(|name| catalog.get(name).is_none())
            .collect();

        if unhandled.is_empty() && uncatalogued.is_empty() {
            return Ok(());
        }

        unhandled.sort_unstable();
        uncatalogued.sort_unstable();
        Err(CommandError::Registry(format!(
            "catalog commands without handler: [{}]; handlers without catalog entry: [{}]",
            unhandled.join(", "),
            uncatalogued.join(", ")
        )))
    }
}
