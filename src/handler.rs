//! The per-resource-type lifecycle handler contract.
//!
//! One handler exists per resource type and owns all domain logic for it:
//! validation, diff classification, and the backend calls behind
//! Create/Read/Update/Delete. Handlers hold no mutable state; everything a
//! call needs arrives as an argument, so calls for different URNs can run
//! concurrently without coordination.

use serde::Serialize;

use crate::backend::Backend;
use crate::diff::{diff_properties, ResourceDiff};
use crate::error::ProviderError;
use crate::property::{PropertyMap, PropertyValue};
use crate::registry::ResourceType;

/// A single validation problem found by `Check`, surfaced as data so the
/// orchestrator can present every problem at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    /// The property the failure concerns.
    pub property: String,
    /// Human-readable reason.
    pub reason: String,
}

impl CheckFailure {
    /// A missing required property.
    pub fn missing(property: &str) -> Self {
        Self {
            property: property.to_string(),
            reason: format!("missing required property '{}'", property),
        }
    }

    /// A property present with the wrong type tag.
    pub fn mistyped(property: &str, expected: &str, actual: &str) -> Self {
        Self {
            property: property.to_string(),
            reason: format!(
                "expected input property '{}' of type '{}' but got '{}'",
                property, expected, actual
            ),
        }
    }
}

/// The outcome of `Check`: the accepted inputs plus any validation failures.
/// An empty failure list means the inputs are valid.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// The inputs to pass to Diff/Create/Update. Echoes the news bag
    /// verbatim, unknown markers and unrecognized properties included.
    pub inputs: PropertyMap,
    /// Validation failures, empty when valid.
    pub failures: Vec<CheckFailure>,
}

impl CheckResult {
    /// True when validation found no problems.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The outcome of `Create`: the assigned resource ID and initial outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateResult {
    /// Backend identifier for the new resource. Stable for its lifetime.
    pub id: String,
    /// The resource's output properties as stored.
    pub outputs: PropertyMap,
}

/// Lifecycle operations for exactly one resource type.
#[async_trait::async_trait]
pub trait ResourceHandler: Send + Sync {
    /// The resource type this handler implements.
    fn resource_type(&self) -> ResourceType;

    /// Properties whose change forces delete-then-create. These are the
    /// identifying properties the resource ID is derived from.
    fn replace_triggers(&self) -> &'static [&'static str];

    /// Validate the desired inputs. Never touches the backend.
    fn check(&self, news: &PropertyMap) -> CheckResult;

    /// Classify the change between recorded and desired state. Never
    /// touches the backend.
    fn diff(&self, olds: &PropertyMap, news: &PropertyMap) -> ResourceDiff {
        diff_properties(olds, news, self.replace_triggers())
    }

    /// Create the resource and return its ID and initial outputs.
    ///
    /// Must re-validate inputs even though `Check` ran earlier, and must be
    /// idempotent for a retried call with identical inputs.
    async fn create(
        &self,
        backend: &dyn Backend,
        news: &PropertyMap,
    ) -> Result<CreateResult, ProviderError>;

    /// Fetch current backend state for `id`. Fails with
    /// [`ProviderError::NotFound`] when the resource is gone.
    async fn read(
        &self,
        backend: &dyn Backend,
        id: &str,
        props: &PropertyMap,
    ) -> Result<PropertyMap, ProviderError>;

    /// Apply an in-place change. Fails with
    /// [`ProviderError::InvalidStateTransition`] when the olds/news pair
    /// includes a change that `diff` classifies as replacement.
    async fn update(
        &self,
        backend: &dyn Backend,
        id: &str,
        olds: &PropertyMap,
        news: &PropertyMap,
    ) -> Result<PropertyMap, ProviderError>;

    /// Remove the resource. Succeeds when the resource is already absent.
    async fn delete(
        &self,
        backend: &dyn Backend,
        id: &str,
        props: &PropertyMap,
    ) -> Result<(), ProviderError>;
}

impl std::fmt::Debug for dyn ResourceHandler + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResourceHandler")
            .field(&self.resource_type())
            .finish()
    }
}

/// Shared guard for update: reject replace-classified changes loudly
/// instead of attempting a partial update.
pub(crate) fn ensure_in_place(
    handler: &dyn ResourceHandler,
    olds: &PropertyMap,
    news: &PropertyMap,
) -> Result<(), ProviderError> {
    let diff = handler.diff(olds, news);
    if diff.requires_replace() {
        return Err(ProviderError::InvalidStateTransition(format!(
            "update called for a change to '{}' which requires replacement",
            diff.replaces.join("', '")
        )));
    }
    Ok(())
}

// Check helpers shared by the handlers. An unknown marker satisfies any
// type: during preview the concrete value simply does not exist yet.

pub(crate) fn check_required_string(
    news: &PropertyMap,
    name: &str,
    failures: &mut Vec<CheckFailure>,
) {
    match news.get(name) {
        None | Some(PropertyValue::Null) => failures.push(CheckFailure::missing(name)),
        Some(PropertyValue::String(_)) | Some(PropertyValue::Unknown) => {},
        Some(other) => failures.push(CheckFailure::mistyped(name, "string", other.type_name())),
    }
}

pub(crate) fn check_required_mapping(
    news: &PropertyMap,
    name: &str,
    failures: &mut Vec<CheckFailure>,
) {
    match news.get(name) {
        None | Some(PropertyValue::Null) => failures.push(CheckFailure::missing(name)),
        Some(PropertyValue::Mapping(_)) | Some(PropertyValue::Unknown) => {},
        Some(other) => failures.push(CheckFailure::mistyped(name, "mapping", other.type_name())),
    }
}

pub(crate) fn check_optional_number(
    news: &PropertyMap,
    name: &str,
    failures: &mut Vec<CheckFailure>,
) {
    match news.get(name) {
        None | Some(PropertyValue::Null) => {},
        Some(PropertyValue::Number(_)) | Some(PropertyValue::Unknown) => {},
        Some(other) => failures.push(CheckFailure::mistyped(name, "number", other.type_name())),
    }
}

pub(crate) fn check_optional_mapping(
    news: &PropertyMap,
    name: &str,
    failures: &mut Vec<CheckFailure>,
) {
    match news.get(name) {
        None | Some(PropertyValue::Null) => {},
        Some(PropertyValue::Mapping(_)) | Some(PropertyValue::Unknown) => {},
        Some(other) => failures.push(CheckFailure::mistyped(name, "mapping", other.type_name())),
    }
}
