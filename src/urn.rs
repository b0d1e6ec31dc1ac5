//! Resource URNs.
//!
//! The orchestrator routes every lifecycle call by URN:
//!
//! ```text
//! urn:pulumi:<stack>::<project>::<package:module:Type>::<name>
//! ```
//!
//! The provider only cares about the type token (for dispatch) and the
//! resource name; the URN itself is otherwise opaque and immutable.

use crate::error::ProviderError;

const URN_PREFIX: &str = "urn:pulumi:";

/// A parsed resource URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urn {
    raw: String,
    type_token: String,
    name: String,
}

impl Urn {
    /// Parse a raw URN string.
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        if !raw.starts_with(URN_PREFIX) {
            return Err(ProviderError::InvalidUrn(format!(
                "'{}' does not start with '{}'",
                raw, URN_PREFIX
            )));
        }

        let segments: Vec<&str> = raw[URN_PREFIX.len()..].split("::").collect();
        if segments.len() != 4 {
            return Err(ProviderError::InvalidUrn(format!(
                "'{}' has {} segments, expected 4 (stack, project, type, name)",
                raw,
                segments.len()
            )));
        }

        // Parented resources carry the full ancestry in the type segment,
        // '$'-separated; the concrete type is the last element.
        let type_token = segments[2]
            .rsplit('$')
            .next()
            .unwrap_or(segments[2])
            .to_string();
        let name = segments[3].to_string();

        if type_token.is_empty() || name.is_empty() {
            return Err(ProviderError::InvalidUrn(format!(
                "'{}' has an empty type or name segment",
                raw
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            type_token,
            name,
        })
    }

    /// The resource type token, e.g. `faunadb:database:Database`.
    pub fn type_token(&self) -> &str {
        &self.type_token
    }

    /// The resource name assigned in the program.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full URN string as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for Urn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
