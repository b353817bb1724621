//! Identifier selector for customer mutations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which customer identifier routes a mutation request.
///
/// The CRM addresses customers either by the caller-supplied external ID or
/// by its own internal ID. The value is sent as the `by` parameter and picks
/// which field of the customer becomes the path key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ByIdentifier {
    /// Route by `Customer::external_id`.
    #[default]
    ExternalId,
    /// Route by the CRM-assigned `Customer::id`.
    Id,
}

impl ByIdentifier {
    /// Wire value for the `by` request parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExternalId => "externalId",
            Self::Id => "id",
        }
    }
}

impl std::fmt::Display for ByIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown identifier kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid identifier kind: {0} (expected externalId or id)")]
pub struct ParseByIdentifierError(String);

impl std::str::FromStr for ByIdentifier {
    type Err = ParseByIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "externalId" | "external-id" | "external_id" => Ok(Self::ExternalId),
            "id" | "internal-id" => Ok(Self::Id),
            _ => Err(ParseByIdentifierError(s.to_owned())),
        }
    }
}
