//! Lifecycle handlers for the provider's resource types.

mod collection;
mod database;
mod record;

pub use collection::CollectionHandler;
pub use database::DatabaseHandler;
pub use record::RecordHandler;

use crate::error::ProviderError;
use crate::handler::CheckResult;

/// Re-validation used by every `create` and `update`; the orchestrator is
/// not required to have run `Check` first.
pub(crate) fn reject_invalid(result: &CheckResult) -> Result<(), ProviderError> {
    if result.is_valid() {
        return Ok(());
    }
    let reasons: Vec<&str> = result
        .failures
        .iter()
        .map(|f| f.reason.as_str())
        .collect();
    Err(ProviderError::Validation(reasons.join("; ")))
}
