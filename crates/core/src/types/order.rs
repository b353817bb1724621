//! Order records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{CustomerId, OrderId};

/// Orders grouped by site key, then by owning customer ID.
///
/// Each customer's orders are kept in the order they were paged in.
pub type GroupedOrders = IndexMap<String, IndexMap<CustomerId, Vec<Order>>>;

/// An order record as exchanged with the CRM.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    /// The customer that placed the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<OrderCustomer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Internal ID of the owning customer, if the order carries one.
    #[must_use]
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer.as_ref().and_then(|c| c.id)
    }
}

/// The customer embedded in an order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
