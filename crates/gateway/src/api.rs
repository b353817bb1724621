//! Remote CRM capability set consumed by the gateway.
//!
//! [`SimlaClient`] is the production implementation. Anything else that can
//! answer these calls (a recording double in tests, a proxy) can stand in.

use std::future::Future;

use crate::simla::{
    ApiResponse, CombineRequest, Credentials, CustomerEditRequest, CustomersPage, OrdersPage,
    SimlaClient, SimlaError, SubscriptionsRequest,
};

/// Operations the directory gateway needs from the remote CRM.
pub trait CrmApi: Send + Sync {
    /// Verify the configured credentials.
    fn credentials(&self) -> impl Future<Output = Result<Credentials, SimlaError>> + Send;

    /// Fetch one page of customers (1-based).
    fn list_customers(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<CustomersPage, SimlaError>> + Send;

    /// Fetch one page of orders (1-based).
    fn list_orders(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<OrdersPage, SimlaError>> + Send;

    /// Edit the customer addressed by `key`.
    fn edit_customer(
        &self,
        key: &str,
        request: &CustomerEditRequest,
    ) -> impl Future<Output = Result<ApiResponse, SimlaError>> + Send;

    /// Merge customers into one.
    fn combine_customers(
        &self,
        request: &CombineRequest,
    ) -> impl Future<Output = Result<ApiResponse, SimlaError>> + Send;

    /// Update subscription preferences of the customer addressed by `key`.
    fn update_subscriptions(
        &self,
        key: &str,
        request: &SubscriptionsRequest,
    ) -> impl Future<Output = Result<ApiResponse, SimlaError>> + Send;
}

impl CrmApi for SimlaClient {
    async fn credentials(&self) -> Result<Credentials, SimlaError> {
        Self::credentials(self).await
    }

    async fn list_customers(&self, page: u32, limit: u32) -> Result<CustomersPage, SimlaError> {
        Self::list_customers(self, page, limit).await
    }

    async fn list_orders(&self, page: u32, limit: u32) -> Result<OrdersPage, SimlaError> {
        Self::list_orders(self, page, limit).await
    }

    async fn edit_customer(
        &self,
        key: &str,
        request: &CustomerEditRequest,
    ) -> Result<ApiResponse, SimlaError> {
        Self::edit_customer(self, key, request).await
    }

    async fn combine_customers(&self, request: &CombineRequest) -> Result<ApiResponse, SimlaError> {
        Self::combine_customers(self, request).await
    }

    async fn update_subscriptions(
        &self,
        key: &str,
        request: &SubscriptionsRequest,
    ) -> Result<ApiResponse, SimlaError> {
        self.update_customer_subscriptions(key, request).await
    }
}
