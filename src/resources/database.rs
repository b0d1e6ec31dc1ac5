//! Lifecycle handler for `faunadb:database:Database`.
//!
//! Inputs:
//!
//! | property   | type    | notes                                  |
//! |------------|---------|----------------------------------------|
//! | `name`     | string  | required, identifying (replace)        |
//! | `region`   | string  | required, identifying (replace)        |
//! | `ttl_days` | number  | optional, updatable in place           |
//! | `tags`     | mapping | optional, updatable in place           |
//!
//! The resource ID is derived deterministically from the identifying
//! properties as `{name}-{region}`, which makes a retried `Create` with
//! identical inputs converge on the same backend document.

use crate::backend::Backend;
use crate::error::ProviderError;
use crate::handler::{
    check_optional_mapping, check_optional_number, check_required_string, ensure_in_place,
    CheckResult, CreateResult, ResourceHandler,
};
use crate::property::{expect_string, PropertyMap};
use crate::registry::ResourceType;
use crate::resources::reject_invalid;

/// Handler for the Database resource type.
pub struct DatabaseHandler;

const REPLACE_TRIGGERS: &[&str] = &["name", "region"];

impl DatabaseHandler {
    fn derive_id(news: &PropertyMap) -> Result<String, ProviderError> {
        let name = expect_string(news, "name")?;
        let region = expect_string(news, "region")?;
        Ok(format!("{}-{}", name, region))
    }
}

#[async_trait::async_trait]
impl ResourceHandler for DatabaseHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Database
    }

    fn replace_triggers(&self) -> &'static [&'static str] {
        REPLACE_TRIGGERS
    }

    fn check(&self, news: &PropertyMap) -> CheckResult {
        let mut failures = Vec::new();
        check_required_string(news, "name", &mut failures);
        check_required_string(news, "region", &mut failures);
        check_optional_number(news, "ttl_days", &mut failures);
        check_optional_mapping(news, "tags", &mut failures);
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
            .put(ResourceType::Database, &id, news.clone())
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
            .get(ResourceType::Database, id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("database '{}' not found", id)))
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
        if backend.get(ResourceType::Database, id).await?.is_none() {
            return Err(ProviderError::NotFound(format!(
                "database '{}' not found",
                id
            )));
        }
        backend
            .put(ResourceType::Database, id, news.clone())
            .await?;
        Ok(news.clone())
    }

    async fn delete(
        &self,
        backend: &dyn Backend,
        id: &str,
        _props: &PropertyMap,
    ) -> Result<(), ProviderError> {
        backend.delete(ResourceType::Database, id).await
    }
}
