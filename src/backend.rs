//! The backend client seam.
//!
//! Handlers never talk to FaunaDB directly; they receive a [`Backend`] handle
//! as an explicit argument on every call. That keeps handlers stateless and
//! testable against [`MemoryBackend`] without a live account.
//!
//! The contract is deliberately small and convergent:
//!
//! - `put` is an idempotent upsert keyed by resource ID, so a retried
//!   `Create` with identical inputs lands on the same row.
//! - `delete` of an absent ID is success.
//!
//! Transient failures surface as [`ProviderError::BackendUnavailable`]; no
//! retries happen at this layer. The orchestrator owns the retry policy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::ProviderError;
use crate::property::PropertyMap;
use crate::registry::ResourceType;

/// Client interface to the backing database service.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Upsert the document for `id`. Writing the same id twice replaces the
    /// stored properties; it never creates a second resource.
    async fn put(
        &self,
        kind: ResourceType,
        id: &str,
        props: PropertyMap,
    ) -> Result<(), ProviderError>;

    /// Fetch the stored properties for `id`, or `None` if absent.
    async fn get(
        &self,
        kind: ResourceType,
        id: &str,
    ) -> Result<Option<PropertyMap>, ProviderError>;

    /// Remove the document for `id`. Removing an absent id is a no-op.
    async fn delete(&self, kind: ResourceType, id: &str) -> Result<(), ProviderError>;
}

/// In-process backend used by tests and local development.
///
/// Supports two failure-injection knobs: `set_available(false)` makes every
/// call fail with `BackendUnavailable`, and `set_latency` delays every call
/// so cancellation paths can be exercised.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<HashMap<(ResourceType, String), PropertyMap>>,
    unavailable: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle availability. While unavailable, every call fails.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().expect("backend lock poisoned") = Some(latency);
    }

    /// Number of stored resources of the given kind.
    pub fn count(&self, kind: ResourceType) -> usize {
        self.state
            .lock()
            .expect("backend lock poisoned")
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Whether a resource with this id exists.
    pub fn contains(&self, kind: ResourceType, id: &str) -> bool {
        self.state
            .lock()
            .expect("backend lock poisoned")
            .contains_key(&(kind, id.to_string()))
    }

    async fn simulate_call(&self) -> Result<(), ProviderError> {
        let latency = *self.latency.lock().expect("backend lock poisoned");
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::BackendUnavailable(
                "backend is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn put(
        &self,
        kind: ResourceType,
        id: &str,
        props: PropertyMap,
    ) -> Result<(), ProviderError> {
        self.simulate_call().await?;
        self.state
            .lock()
            .expect("backend lock poisoned")
            .insert((kind, id.to_string()), props);
        Ok(())
    }

    async fn get(
        &self,
        kind: ResourceType,
        id: &str,
    ) -> Result<Option<PropertyMap>, ProviderError> {
        self.simulate_call().await?;
        Ok(self
            .state
            .lock()
            .expect("backend lock poisoned")
            .get(&(kind, id.to_string()))
            .cloned())
    }

    async fn delete(&self, kind: ResourceType, id: &str) -> Result<(), ProviderError> {
        self.simulate_call().await?;
        self.state
            .lock()
            .expect("backend lock poisoned")
            .remove(&(kind, id.to_string()));
        Ok(())
    }
}
