//! Simla API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use simla_core::{ByIdentifier, Customer, CustomerId, CustomerReference, Order};

use super::SimlaError;

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub current_page: u32,
    pub total_page_count: u32,
}

/// One page of `GET /customers`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomersPage {
    #[serde(default)]
    pub customers: Vec<Customer>,
    pub pagination: Pagination,
}

/// One page of `GET /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

/// Response of the credentials check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub success: bool,
    /// API methods the key may call.
    #[serde(default)]
    pub credentials: Vec<String>,
    /// `access_full` or `access_selective`.
    #[serde(default)]
    pub site_access: Option<String>,
    /// Site codes the key may access.
    #[serde(default)]
    pub sites_available: Vec<String>,
}

/// Generic mutation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    /// ID of the affected customer, when the endpoint reports one.
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /customers/{key}/edit`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerEditRequest {
    pub by: ByIdentifier,
    pub site: Option<String>,
    pub customer: Customer,
}

impl CustomerEditRequest {
    /// Build an edit request scoped to the customer's own site.
    #[must_use]
    pub fn new(customer: Customer, by: ByIdentifier) -> Self {
        Self {
            by,
            site: customer.site.clone(),
            customer,
        }
    }

    pub(super) fn form_fields(&self) -> Result<Vec<(&'static str, String)>, SimlaError> {
        let mut form = vec![
            ("by", self.by.as_str().to_string()),
            ("customer", encode_json(&self.customer)?),
        ];
        if let Some(site) = &self.site {
            form.push(("site", site.clone()));
        }
        Ok(form)
    }
}

/// `POST /customers/{key}/subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionsRequest {
    pub by: ByIdentifier,
    pub site: Option<String>,
    /// Forwarded verbatim.
    pub subscriptions: Value,
}

impl SubscriptionsRequest {
    pub(super) fn form_fields(&self) -> Result<Vec<(&'static str, String)>, SimlaError> {
        let mut form = vec![
            ("by", self.by.as_str().to_string()),
            ("subscriptions", encode_json(&self.subscriptions)?),
        ];
        if let Some(site) = &self.site {
            form.push(("site", site.clone()));
        }
        Ok(form)
    }
}

/// `POST /customers/combine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineRequest {
    /// Customer that survives the merge.
    pub result_customer: CustomerReference,
    /// Customers merged into it.
    pub customers: Vec<CustomerReference>,
}

impl CombineRequest {
    /// Build a combine request from plain IDs.
    #[must_use]
    pub fn new(result_customer_id: CustomerId, customer_ids: &[CustomerId]) -> Self {
        Self {
            result_customer: result_customer_id.into(),
            customers: customer_ids.iter().copied().map(Into::into).collect(),
        }
    }

    pub(super) fn form_fields(&self) -> Result<Vec<(&'static str, String)>, SimlaError> {
        Ok(vec![
            ("resultCustomer", encode_json(&self.result_customer)?),
            ("customers", encode_json(&self.customers)?),
        ])
    }
}

/// Error body of a failed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub error_msg: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, SimlaError> {
    serde_json::to_string(value)
        .map_err(|e| SimlaError::Handler(format!("Failed to encode request: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_customers_page_parses() {
        let page: CustomersPage = serde_json::from_value(json!({
            "success": true,
            "pagination": {"limit": 100, "totalCount": 2, "currentPage": 1, "totalPageCount": 1},
            "customers": [{"id": 1, "site": "A"}, {"id": 2}]
        }))
        .unwrap();

        assert_eq!(page.customers.len(), 2);
        assert_eq!(page.pagination.total_page_count, 1);
        assert_eq!(page.pagination.total_count, 2);
    }

    #[test]
    fn test_edit_request_form() {
        let customer = Customer::with_external_id("ext-1").on_site("shop-a");
        let request = CustomerEditRequest::new(customer, ByIdentifier::ExternalId);

        let form = request.form_fields().unwrap();
        assert_eq!(form.first(), Some(&("by", "externalId".to_string())));
        assert!(form.contains(&("site", "shop-a".to_string())));

        let (_, encoded) = form.iter().find(|(k, _)| *k == "customer").unwrap();
        let decoded: Value = serde_json::from_str(encoded).unwrap();
        assert_eq!(decoded, json!({"externalId": "ext-1", "site": "shop-a"}));
    }

    #[test]
    fn test_edit_request_without_site_omits_field() {
        let request =
            CustomerEditRequest::new(Customer::with_id(CustomerId::new(4)), ByIdentifier::Id);
        let form = request.form_fields().unwrap();
        assert!(form.iter().all(|(k, _)| *k != "site"));
    }

    #[test]
    fn test_combine_request_form() {
        let request = CombineRequest::new(
            CustomerId::new(1),
            &[CustomerId::new(2), CustomerId::new(3)],
        );
        let form = request.form_fields().unwrap();

        assert_eq!(
            form,
            vec![
                ("resultCustomer", r#"{"id":1}"#.to_string()),
                ("customers", r#"[{"id":2},{"id":3}]"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_subscriptions_forwarded_verbatim() {
        let payload = json!([{"channel": "email", "subscribed": false}]);
        let request = SubscriptionsRequest {
            by: ByIdentifier::Id,
            site: None,
            subscriptions: payload.clone(),
        };
        let form = request.form_fields().unwrap();
        let (_, encoded) = form.iter().find(|(k, _)| *k == "subscriptions").unwrap();
        assert_eq!(serde_json::from_str::<Value>(encoded).unwrap(), payload);
    }
}
