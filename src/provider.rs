//! The provider façade.
//!
//! [`FaunaProvider`] is the single entry point the RPC surface calls into.
//! It owns the type registry and provider-wide configuration, routes each
//! lifecycle call by the URN's type token, and centralizes the
//! unknown-resource-type guard so handlers never repeat it.
//!
//! Property bags cross this boundary in wire form (`serde_json::Value`) and
//! are decoded and re-encoded with [`MarshalOptions::STATE`]: unknowns
//! preserved, nulls skipped.
//!
//! The façade is `Send + Sync` and safe to share behind `Arc`: handlers are
//! stateless, the backend handle is passed into each call, and the only
//! provider-level state (accepted config, cancellation flag) sits behind
//! its own synchronization.

use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::backend::Backend;
use crate::diff::ResourceDiff;
use crate::error::ProviderError;
use crate::handler::CheckFailure;
use crate::property::{
    decode_properties, encode_properties, opt_string, MarshalOptions, PropertyMap,
};
use crate::registry::Registry;
use crate::urn::Urn;

/// Provider identification returned by `GetPluginInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    /// The provider package name.
    pub name: String,
    /// Semantic version.
    pub version: String,
}

/// Provider-wide configuration accepted by `Configure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The account secret used to authenticate against the backend.
    pub secret: Option<String>,
    /// Override for the backend endpoint.
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    fn from_properties(props: &PropertyMap) -> Result<Self, ProviderError> {
        Ok(Self {
            secret: opt_string(props, "secret")?.map(str::to_string),
            endpoint: opt_string(props, "endpoint")?.map(str::to_string),
        })
    }
}

/// The result of `Check`: accepted inputs plus validation failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedInputs {
    /// The wire-encoded inputs to feed into Diff/Create/Update.
    pub inputs: serde_json::Value,
    /// Validation failures; empty means valid.
    pub failures: Vec<CheckFailure>,
}

/// The result of `Create`: the assigned ID and initial output properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedResource {
    /// Backend-stable resource ID.
    pub id: String,
    /// Wire-encoded output properties.
    pub properties: serde_json::Value,
}

/// The FaunaDB resource provider.
pub struct FaunaProvider {
    name: String,
    version: String,
    registry: Registry,
    backend: Arc<dyn Backend>,
    config: Mutex<ProviderConfig>,
    cancel: watch::Sender<bool>,
}

impl FaunaProvider {
    /// Create a provider with the default resource registry and the given
    /// backend client.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        backend: Arc<dyn Backend>,
    ) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            name: name.into(),
            version: version.into(),
            registry: Registry::with_defaults(),
            backend,
            config: Mutex::new(ProviderConfig::default()),
            cancel,
        }
    }

    /// Validate the provider configuration bag and echo it back.
    #[instrument(skip_all)]
    pub fn check_config(
        &self,
        news: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let props = decode_properties(news, MarshalOptions::STATE)?;
        ProviderConfig::from_properties(&props)?;
        debug!("provider config checked");
        Ok(encode_properties(&props, MarshalOptions::STATE))
    }

    /// Accept the provider configuration.
    #[instrument(skip_all)]
    pub fn configure(&self, config: &serde_json::Value) -> Result<(), ProviderError> {
        let props = decode_properties(config, MarshalOptions::STATE)?;
        let parsed = ProviderConfig::from_properties(&props)?;
        info!(
            endpoint = parsed.endpoint.as_deref().unwrap_or("default"),
            has_secret = parsed.secret.is_some(),
            "provider configured"
        );
        *self.config.lock().expect("config lock poisoned") = parsed;
        Ok(())
    }

    /// The accepted provider configuration.
    pub fn config(&self) -> ProviderConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Validate desired inputs for the resource named by `urn`.
    #[instrument(skip(self, _olds, news), fields(urn = %urn))]
    pub fn check(
        &self,
        urn: &str,
        _olds: &serde_json::Value,
        news: &serde_json::Value,
    ) -> Result<CheckedInputs, ProviderError> {
        let urn = Urn::parse(urn)?;
        let handler = self.registry.get(urn.type_token())?;

        let news = decode_properties(news, MarshalOptions::STATE)?;
        let result = handler.check(&news);
        if !result.is_valid() {
            warn!(failures = result.failures.len(), "check found problems");
        }
        Ok(CheckedInputs {
            inputs: encode_properties(&result.inputs, MarshalOptions::STATE),
            failures: result.failures,
        })
    }

    /// Classify the change between recorded and desired state.
    #[instrument(skip(self, olds, news), fields(urn = %urn))]
    pub fn diff(
        &self,
        urn: &str,
        olds: &serde_json::Value,
        news: &serde_json::Value,
    ) -> Result<ResourceDiff, ProviderError> {
        let urn = Urn::parse(urn)?;
        let handler = self.registry.get(urn.type_token())?;

        let olds = decode_properties(olds, MarshalOptions::STATE)?;
        let news = decode_properties(news, MarshalOptions::STATE)?;
        let diff = handler.diff(&olds, &news);
        debug!(kind = ?diff.kind, changed = diff.changed.len(), "diff computed");
        Ok(diff)
    }

    /// Create the resource and return its ID and output properties.
    #[instrument(skip(self, news), fields(urn = %urn))]
    pub async fn create(
        &self,
        urn: &str,
        news: &serde_json::Value,
    ) -> Result<CreatedResource, ProviderError> {
        let urn = Urn::parse(urn)?;
        let handler = self.registry.get(urn.type_token())?;
        let news = decode_properties(news, MarshalOptions::STATE)?;

        let created = self
            .with_cancel("create", handler.create(self.backend.as_ref(), &news))
            .await?;
        info!(id = %created.id, "resource created");
        Ok(CreatedResource {
            id: created.id,
            properties: encode_properties(&created.outputs, MarshalOptions::STATE),
        })
    }

    /// Read current backend state for the resource.
    #[instrument(skip(self, props), fields(urn = %urn, id = %id))]
    pub async fn read(
        &self,
        urn: &str,
        id: &str,
        props: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let urn = Urn::parse(urn)?;
        let handler = self.registry.get(urn.type_token())?;
        let props = decode_properties(props, MarshalOptions::STATE)?;

        let state = handler.read(self.backend.as_ref(), id, &props).await?;
        debug!("resource read");
        Ok(encode_properties(&state, MarshalOptions::STATE))
    }

    /// Apply an in-place update and return the refreshed properties.
    #[instrument(skip(self, olds, news), fields(urn = %urn, id = %id))]
    pub async fn update(
        &self,
        urn: &str,
        id: &str,
        olds: &serde_json::Value,
        news: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let urn = Urn::parse(urn)?;
        let handler = self.registry.get(urn.type_token())?;
        let olds = decode_properties(olds, MarshalOptions::STATE)?;
        let news = decode_properties(news, MarshalOptions::STATE)?;

        let state = self
            .with_cancel(
                "update",
                handler.update(self.backend.as_ref(), id, &olds, &news),
            )
            .await?;
        info!("resource updated");
        Ok(encode_properties(&state, MarshalOptions::STATE))
    }

    /// Delete the resource. Convergent: deleting an absent resource succeeds.
    #[instrument(skip(self, props), fields(urn = %urn, id = %id))]
    pub async fn delete(
        &self,
        urn: &str,
        id: &str,
        props: &serde_json::Value,
    ) -> Result<(), ProviderError> {
        let urn = Urn::parse(urn)?;
        let handler = self.registry.get(urn.type_token())?;
        let props = decode_properties(props, MarshalOptions::STATE)?;

        self.with_cancel("delete", handler.delete(self.backend.as_ref(), id, &props))
            .await?;
        info!("resource deleted");
        Ok(())
    }

    /// Provider name and semantic version.
    pub fn plugin_info(&self) -> PluginInfo {
        PluginInfo {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }

    /// Signal cancellation. In-flight Create/Update/Delete calls abort with
    /// [`ProviderError::Cancelled`]; the signal is sticky, so mutating calls
    /// made afterwards fail immediately. Check and Diff are pure and keep
    /// working.
    pub fn cancel(&self) {
        info!("cancellation signalled");
        // send_replace stores the flag even when no call is currently
        // subscribed, keeping the signal sticky.
        self.cancel.send_replace(true);
    }

    /// Race an in-flight backend operation against the cancellation signal.
    async fn with_cancel<T>(
        &self,
        op: &str,
        fut: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        let rx = self.cancel.subscribe();
        if *rx.borrow() {
            return Err(ProviderError::Cancelled(format!(
                "{} aborted by cancellation signal",
                op
            )));
        }
        tokio::select! {
            result = fut => result,
            _ = cancelled(rx) => Err(ProviderError::Cancelled(format!(
                "{} aborted by cancellation signal",
                op
            ))),
        }
    }
}

/// Resolves once the cancellation flag is set; pends forever otherwise.
async fn cancelled(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped without cancelling; never resolve.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::property::UNKNOWN_VALUE;
    use serde_json::json;
    use std::time::Duration;

    fn provider() -> (FaunaProvider, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let provider = FaunaProvider::new("faunadb", "0.1.0", backend.clone());
        (provider, backend)
    }

    const DB_URN: &str = "urn:pulumi:dev::shop::faunadb:database:Database::orders";
    const BAD_URN: &str = "urn:pulumi:dev::shop::faunadb:database:Index::orders";

    #[test]
    fn test_plugin_info() {
        let (provider, _) = provider();
        let info = provider.plugin_info();
        assert_eq!(info.name, "faunadb");
        assert_eq!(info.version, "0.1.0");
    }

    #[test]
    fn test_check_config_echoes_and_validates() {
        let (provider, _) = provider();

        let config = json!({"secret": "fn_abc", "unrecognized": true});
        let echoed = provider.check_config(&config).unwrap();
        assert_eq!(echoed, config);

        let err = provider.check_config(&json!({"secret": 42})).unwrap_err();
        assert!(err.to_string().contains("'secret'"));
    }

    #[test]
    fn test_configure_stores_accepted_config() {
        let (provider, _) = provider();
        provider
            .configure(&json!({"secret": "fn_abc", "endpoint": "https://db.fauna.com"}))
            .unwrap();
        let config = provider.config();
        assert_eq!(config.secret.as_deref(), Some("fn_abc"));
        assert_eq!(config.endpoint.as_deref(), Some("https://db.fauna.com"));
    }

    #[test]
    fn test_unknown_resource_type_guard() {
        let (provider, _) = provider();
        let err = provider
            .check(BAD_URN, &json!({}), &json!({"name": "x"}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(_)));

        let err = provider.diff(BAD_URN, &json!({}), &json!({})).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(_)));
    }

    #[tokio::test]
    async fn test_unknown_resource_type_guards_mutations() {
        let (provider, backend) = provider();
        let err = provider.create(BAD_URN, &json!({"name": "x"})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(_)));
        assert_eq!(backend.count(crate::registry::ResourceType::Database), 0);

        let err = provider.read(BAD_URN, "x", &json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(_)));

        let err = provider.delete(BAD_URN, "x", &json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(_)));
    }

    #[test]
    fn test_check_preserves_unknown_markers() {
        let (provider, _) = provider();
        let news = json!({"name": UNKNOWN_VALUE, "region": "us-east"});
        let checked = provider.check(DB_URN, &json!({}), &news).unwrap();
        assert!(checked.failures.is_empty());
        assert_eq!(checked.inputs, news);
    }

    #[tokio::test]
    async fn test_cancel_aborts_inflight_mutation() {
        let (provider, backend) = provider();
        backend.set_latency(Duration::from_secs(30));

        let provider = Arc::new(provider);
        let worker = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move {
                provider
                    .create(DB_URN, &json!({"name": "prod", "region": "us-east"}))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        provider.cancel();

        let err = worker.await.unwrap().unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_cancel_is_sticky_for_later_mutations() {
        let (provider, _) = provider();
        provider.cancel();

        let err = provider
            .create(DB_URN, &json!({"name": "prod", "region": "us-east"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled(_)));

        // Pure operations keep working after cancellation.
        let checked = provider
            .check(DB_URN, &json!({}), &json!({"name": "prod", "region": "us-east"}))
            .unwrap();
        assert!(checked.failures.is_empty());
    }
}
