//! The resource type registry.
//!
//! The set of resource types is closed: one enum variant per type, resolved
//! once at provider construction into a token-to-handler mapping. Adding a
//! resource type means adding a variant and registering its handler; no
//! dispatch code changes.

use std::collections::HashMap;

use crate::error::ProviderError;
use crate::handler::ResourceHandler;
use crate::resources::{CollectionHandler, DatabaseHandler, RecordHandler};

/// The resource types this provider implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// A FaunaDB database.
    Database,
    /// A collection within a database.
    Collection,
    /// A document within a collection.
    Record,
}

impl ResourceType {
    /// The type token used in URNs.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Database => "faunadb:database:Database",
            Self::Collection => "faunadb:database:Collection",
            Self::Record => "faunadb:database:Record",
        }
    }

    /// Resolve a type token, if it names a known resource type.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "faunadb:database:Database" => Some(Self::Database),
            "faunadb:database:Collection" => Some(Self::Collection),
            "faunadb:database:Record" => Some(Self::Record),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Maps resource type tokens to their lifecycle handlers.
pub struct Registry {
    handlers: HashMap<ResourceType, Box<dyn ResourceHandler>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with every built-in handler registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DatabaseHandler));
        registry.register(Box::new(CollectionHandler));
        registry.register(Box::new(RecordHandler));
        registry
    }

    /// Register a handler under its own resource type.
    pub fn register(&mut self, handler: Box<dyn ResourceHandler>) {
        self.handlers.insert(handler.resource_type(), handler);
    }

    /// Whether a type token names a registered resource type.
    pub fn is_known(&self, token: &str) -> bool {
        ResourceType::from_token(token)
            .map(|t| self.handlers.contains_key(&t))
            .unwrap_or(false)
    }

    /// Resolve a type token to its handler, failing with
    /// [`ProviderError::UnknownResourceType`] otherwise.
    pub fn get(&self, token: &str) -> Result<&dyn ResourceHandler, ProviderError> {
        ResourceType::from_token(token)
            .and_then(|t| self.handlers.get(&t))
            .map(|h| h.as_ref())
            .ok_or_else(|| ProviderError::UnknownResourceType(token.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
