//! Lifecycle handler for `faunadb:database:Record`.
//!
//! Inputs: `collection` and `key` are required strings and identifying
//! (replace on change); `data` is a required mapping holding the document
//! body and is updatable in place. The resource ID is `{collection}/{key}`.

use crate::backend::Backend;
use crate::error::ProviderError;
use crate::handler::{
    check_required_mapping, check_required_string, ensure_in_place, CheckResult, CreateResult,
    ResourceHandler,
};
use crate::property::{expect_string, PropertyMap};
use crate::registry::ResourceType;
use crate::resources::reject_invalid;

/// Handler for the Record resource type.
pub struct RecordHandler;

const REPLACE_TRIGGERS: &[&str] = &["collection", "key"];

impl RecordHandler {
    fn derive_id(news: &PropertyMap) -> Result<String, ProviderError> {
        let collection = expect_string(news, "collection")?;
        let key = expect_string(news, "key")?;
        Ok(format!("{}/{}", collection, key))
    }
}

#[async_trait::async_trait]
impl ResourceHandler for RecordHandler {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Record
    }

    fn replace_triggers(&self) -> &'static [&'static str] {
        REPLACE_TRIGGERS
    }

    fn check(&self, news: &PropertyMap) -> CheckResult {
        let mut failures = Vec::new();
        check_required_string(news, "collection", &mut failures);
        check_required_string(news, "key", &mut failures);
        check_required_mapping(news, "data", &mut failures);
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
        backend.put(ResourceType::Record, &id, news.clone()).await?;
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
            .get(ResourceType::Record, id)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("record '{}' not found", id)))
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
        if backend.get(ResourceType::Record, id).await?.is_none() {
            return Err(ProviderError::NotFound(format!(
                "record '{}' not found",
                id
            )));
        }
        backend.put(ResourceType::Record, id, news.clone()).await?;
        Ok(news.clone())
    }

    async fn delete(
        &self,
        backend: &dyn Backend,
        id: &str,
        _props: &PropertyMap,
    ) -> Result<(), ProviderError> {
        backend.delete(ResourceType::Record, id).await
    }
}
