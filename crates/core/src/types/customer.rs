//! Customer records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::CustomerId;

/// Customers grouped by site key, then keyed by internal ID.
///
/// Both levels keep insertion order, so iterating a freshly fetched map
/// replays the order the list endpoint paged them in.
pub type GroupedCustomers = IndexMap<String, IndexMap<CustomerId, Customer>>;

/// A customer record as exchanged with the CRM.
///
/// Only the fields the gateway routes or groups on are typed; everything
/// else is kept in [`Customer::extra`] and written back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// CRM-assigned internal ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,
    /// Caller-supplied external ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Site (storefront) code the customer belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// Phone numbers. `Some(vec![])` clears them remotely, `None` leaves them alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<Phone>>,
    /// All other fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    /// Create a customer addressed by internal ID.
    #[must_use]
    pub fn with_id(id: CustomerId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Create a customer addressed by external ID.
    #[must_use]
    pub fn with_external_id(external_id: impl Into<String>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            ..Self::default()
        }
    }

    /// Set the site code.
    #[must_use]
    pub fn on_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Phone numbers, empty if none were sent.
    #[must_use]
    pub fn phones(&self) -> &[Phone] {
        self.phones.as_deref().unwrap_or_default()
    }

    /// Mark every phone number for removal on the next edit.
    pub fn clear_phones(&mut self) {
        self.phones = Some(Vec::new());
    }
}

/// A customer phone number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Phone {
    /// The number as entered in the CRM.
    #[serde(default)]
    pub number: String,
}

/// Reference to a customer by internal ID, as used by the combine endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReference {
    pub id: CustomerId,
}

impl From<CustomerId> for CustomerReference {
    fn from(id: CustomerId) -> Self {
        Self { id }
    }
}
