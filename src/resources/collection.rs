//! Lifecycle handler for `faunadb:database:Collection`.
//!
//! Inputs: `database` and `name` are required strings and identifying
//! (changing either replaces the collection); `history_days` and `ttl_days`
//! are optional numbers updatable in place. The resource ID is
//! `{database}/{name}`.

use crate::backend::Backend;
use crate::error::ProviderError;
use crate::handler::{
    check_optional_number, check_required_string, ensure_in_place, CheckResult, CreateResult,
    ResourceHandler,
};
use crate::property::{expect_string, PropertyMap};
use crate::registry::ResourceType;
use crate::resources::reject_invalid;

/// Handler for the Collection resource type.
pub struct CollectionHandler;

const REPLACE_TRIGGERS: &[&str] = &["database", "name"];

impl CollectionHandler {
    fn derive_id(news: &PropertyMap) -> Result<String, ProviderError> {
        let database = expect_string(news, "database")?;
        let name = expect_string(news, "name")?;
        Ok(format!("{}/{}", database, name))
    }
}

#[async_trait::async_trait]
impl ResourceHandler for CollectionHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Collection
    }

    fn replace_triggers(&self) -> &'static [&'static str] {
        REPLACE_TRIGGERS
    }

    fn check(&self, news: &PropertyMap) -> CheckResult {
        let mut failures = Vec::new();
        check_required_string(news, "database", &mut failures);
        check_required_string(news, "name", &mut failures);
        check_optional_number(news, "history_days", &mut failures);
        check_optional_number(news, "ttl_days", &mut failures);
        CheckResult {
            inputs: news.clone(),
            failures,
        }
    }

    async fn create(
        &self,
        backend: &dyn Backend,
        news: &PropertyMap,
    ) -> Result<CreateResult, ProviderError> {
        reject_invalid(&self.check(news))?;
        let id = Self::derive_id(news)?;
        backend
            .put(ResourceType::Collection, &id, news.clone())
            .await?;
        Ok(CreateResult {
            id,
            outputs: news.clone(),
        })
    }

    async fn read(
        &self,
        backend: &dyn Backend,
        id: &str,
        _props: &PropertyMap,
    ) -> Result<PropertyMap, ProviderError> {
        backend
            .get(ResourceType::Collection, id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("collection '{}' not found", id)))
    }

    async fn update(
        &self,
        backend: &dyn Backend,
        id: &str,
        olds: &PropertyMap,
        news: &PropertyMap,
    ) -> Result<PropertyMap, ProviderError> {
        ensure_in_place(self, olds, news)?;
        reject_invalid(&self.check(news))?;
        if backend.get(ResourceType::Collection, id).await?.is_none() {
            return Err(ProviderError::NotFound(format!(
                "collection '{}' not found",
                id
            )));
        }
        backend
            .put(ResourceType::Collection, id, news.clone())
            .await?;
        Ok(news.clone())
    }

    async fn delete(
        &self,
        backend: &dyn Backend,
        id: &str,
        _props: &PropertyMap,
    ) -> Result<(), ProviderError> {
        backend.delete(ResourceType::Collection, id).await
    }
}
