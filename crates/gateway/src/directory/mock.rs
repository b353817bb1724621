//! Recording CRM double for gateway unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use simla_core::{Customer, Order};

use crate::api::CrmApi;
use crate::simla::{
    ApiResponse, CombineRequest, Credentials, CustomerEditRequest, CustomersPage, OrdersPage,
    Pagination, SimlaError, SubscriptionsRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Credentials,
    ListCustomers { page: u32, limit: u32 },
    ListOrders { page: u32, limit: u32 },
    Edit {
        key: String,
        request: CustomerEditRequest,
    },
    Combine(CombineRequest),
    Subscriptions {
        key: String,
        request: SubscriptionsRequest,
    },
}

/// Serves canned pages and records every call in order.
#[derive(Debug, Default)]
pub struct MockCrm {
    pub customer_pages: Vec<Vec<Customer>>,
    pub order_pages: Vec<Vec<Order>>,
    /// Reported total page count; defaults to the number of canned pages.
    pub total_pages_override: Option<u32>,
    /// List page (1-based) that fails with a 500.
    pub fail_list_page: Option<u32>,
    pub fail_credentials: bool,
    /// Edit call (1-based) that fails with a validation error.
    pub fail_edit_on_call: Option<usize>,
    pub fail_combine: bool,
    pub fail_subscriptions: bool,
    /// Every call received, in order.
    pub calls: Mutex<Vec<Call>>,
}

impl MockCrm {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn page<T: Clone>(
        &self,
        pages: &[Vec<T>],
        page: u32,
        limit: u32,
    ) -> Result<(Vec<T>, Pagination), SimlaError> {
        if self.fail_list_page == Some(page) {
            return Err(SimlaError::Api {
                status: 500,
                message: "Internal error".to_string(),
            });
        }

        let items = usize::try_from(page - 1)
            .ok()
            .and_then(|index| pages.get(index))
            .cloned()
            .unwrap_or_default();
        let total_page_count = self
            .total_pages_override
            .unwrap_or_else(|| u32::try_from(pages.len()).unwrap());

        Ok((
            items,
            Pagination {
                limit,
                total_count: u64::try_from(pages.iter().map(Vec::len).sum::<usize>()).unwrap(),
                current_page: page,
                total_page_count,
            },
        ))
    }

    fn validation_error(message: &str) -> SimlaError {
        SimlaError::Validation {
            status: 400,
            message: message.to_string(),
            errors: vec!["customer: Invalid".to_string()],
        }
    }

    fn ok_response() -> ApiResponse {
        ApiResponse {
            success: true,
            ..ApiResponse::default()
        }
    }
}

impl CrmApi for MockCrm {
    async fn credentials(&self) -> Result<Credentials, SimlaError> {
        self.record(Call::Credentials);
        if self.fail_credentials {
            return Err(SimlaError::MissingCredentials {
                status: 403,
                message: "Wrong \"apiKey\" value.".to_string(),
            });
        }

        Ok(Credentials {
            success: true,
            credentials: vec!["/api/customers".to_string()],
            site_access: Some("access_full".to_string()),
            sites_available: vec!["shop-a".to_string()],
        })
    }

    async fn list_customers(&self, page: u32, limit: u32) -> Result<CustomersPage, SimlaError> {
        self.record(Call::ListCustomers { page, limit });
        let (customers, pagination) = self.page(&self.customer_pages, page, limit)?;
        Ok(CustomersPage {
            customers,
            pagination,
        })
    }

    async fn list_orders(&self, page: u32, limit: u32) -> Result<OrdersPage, SimlaError> {
        self.record(Call::ListOrders { page, limit });
        let (orders, pagination) = self.page(&self.order_pages, page, limit)?;
        Ok(OrdersPage { orders, pagination })
    }

    async fn edit_customer(
        &self,
        key: &str,
        request: &CustomerEditRequest,
    ) -> Result<ApiResponse, SimlaError> {
        self.record(Call::Edit {
            key: key.to_string(),
            request: request.clone(),
        });

        let edits = self
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Edit { .. }))
            .count();
        if self.fail_edit_on_call == Some(edits) {
            return Err(Self::validation_error("Customer is not loaded"));
        }
        Ok(Self::ok_response())
    }

    async fn combine_customers(&self, request: &CombineRequest) -> Result<ApiResponse, SimlaError> {
        self.record(Call::Combine(request.clone()));
        if self.fail_combine {
            return Err(Self::validation_error("Errors in the input parameters"));
        }
        Ok(Self::ok_response())
    }

    async fn update_subscriptions(
        &self,
        key: &str,
        request: &SubscriptionsRequest,
    ) -> Result<ApiResponse, SimlaError> {
        self.record(Call::Subscriptions {
            key: key.to_string(),
            request: request.clone(),
        });
        if self.fail_subscriptions {
            return Err(Self::validation_error("Errors in the input parameters"));
        }
        Ok(Self::ok_response())
    }
}
