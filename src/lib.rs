//! FaunaDB resource provider.
//!
//! This crate implements the orchestrator-facing resource lifecycle protocol
//! for three FaunaDB resource types: `Database`, `Collection`, and `Record`.
//! The orchestrator drives each resource through Check, Diff, Create, Read,
//! Update, and Delete; the provider answers deterministically and
//! idempotently.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Property codec** ([`property`]): typed property bags, with the
//!   unknown-value and null-skip markers used during plan/preview preserved
//!   across encode/decode
//! - **Resource type registry** ([`registry`]): the closed set of resource
//!   type tokens and their handlers
//! - **Lifecycle handlers** ([`resources`]): the per-type domain logic,
//!   behind the [`ResourceHandler`] trait
//! - **Backend seam** ([`backend`]): the client trait handlers call,
//!   injected per invocation so handlers stay stateless and testable
//! - **Provider façade** ([`provider`]): dispatch by URN type token,
//!   provider configuration, version reporting, and cancellation
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use faunadb_provider::{FaunaProvider, MemoryBackend};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), faunadb_provider::ProviderError> {
//! let provider = FaunaProvider::new("faunadb", "0.1.0", Arc::new(MemoryBackend::new()));
//! provider.configure(&json!({"secret": "fn_secret"}))?;
//!
//! let urn = "urn:pulumi:dev::shop::faunadb:database:Database::orders";
//! let news = json!({"name": "prod", "region": "us-east"});
//!
//! let checked = provider.check(urn, &json!({}), &news)?;
//! assert!(checked.failures.is_empty());
//!
//! let created = provider.create(urn, &news).await?;
//! assert_eq!(created.id, "prod-us-east");
//! # Ok(())
//! # }
//! ```
//!
//! # Lifecycle contract
//!
//! - Check and Diff are pure: no backend calls, no side effects.
//! - Create derives a deterministic ID from the identifying properties, so
//!   a retried Create converges on one backend resource.
//! - Diff classifies a change to an identifying property as replacement;
//!   Update refuses such changes with a distinguished error.
//! - Delete is convergent: deleting an absent resource succeeds.
//! - Calls for different URNs may run concurrently; handlers share no
//!   mutable state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod diff;
pub mod error;
pub mod handler;
pub mod logging;
pub mod property;
pub mod provider;
pub mod registry;
pub mod resources;
pub mod urn;

// Re-export main types at crate root
pub use backend::{Backend, MemoryBackend};
pub use diff::{DiffKind, ResourceDiff};
pub use error::ProviderError;
pub use handler::{CheckFailure, CheckResult, CreateResult, ResourceHandler};
pub use logging::{init_logging, try_init_logging};
pub use property::{
    decode_properties, encode_properties, MarshalOptions, PropertyMap, PropertyValue,
    UNKNOWN_VALUE,
};
pub use provider::{CheckedInputs, CreatedResource, FaunaProvider, PluginInfo, ProviderConfig};
pub use registry::{Registry, ResourceType};
pub use urn::Urn;

// Re-export async_trait for custom handler implementations
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tonic;
pub use tracing;
