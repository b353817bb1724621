//! Customer and credential operations for the Simla API.

use tracing::instrument;

use super::{
    ApiResponse, CombineRequest, Credentials, CustomerEditRequest, CustomersPage, SimlaClient,
    SimlaError, SubscriptionsRequest,
};

impl SimlaClient {
    /// Verify the API key and list what it may access.
    ///
    /// # Errors
    ///
    /// Returns error if the key is rejected or the API request fails.
    #[instrument(skip(self))]
    pub async fn credentials(&self) -> Result<Credentials, SimlaError> {
        self.get_raw("/api/credentials").await
    }

    /// Fetch one page of customers.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_customers(&self, page: u32, limit: u32) -> Result<CustomersPage, SimlaError> {
        self.get(&format!("/customers?page={page}&limit={limit}"))
            .await
    }

    /// Edit a customer addressed by `key`.
    ///
    /// `key` is interpreted according to `request.by`.
    ///
    /// # Errors
    ///
    /// Returns error if validation fails or the API request fails.
    #[instrument(skip(self, request), fields(by = %request.by))]
    pub async fn edit_customer(
        &self,
        key: &str,
        request: &CustomerEditRequest,
    ) -> Result<ApiResponse, SimlaError> {
        let path = format!("/customers/{}/edit", urlencoding::encode(key));
        self.post_form(&path, &request.form_fields()?).await
    }

    /// Merge customers into a surviving record.
    ///
    /// # Errors
    ///
    /// Returns error if any referenced customer is unknown or the API request fails.
    #[instrument(skip(self, request), fields(result_customer = %request.result_customer.id))]
    pub async fn combine_customers(
        &self,
        request: &CombineRequest,
    ) -> Result<ApiResponse, SimlaError> {
        self.post_form("/customers/combine", &request.form_fields()?)
            .await
    }

    /// Replace a customer's subscription preferences.
    ///
    /// # Errors
    ///
    /// Returns error if validation fails or the API request fails.
    #[instrument(skip(self, request), fields(by = %request.by))]
    pub async fn update_customer_subscriptions(
        &self,
        key: &str,
        request: &SubscriptionsRequest,
    ) -> Result<ApiResponse, SimlaError> {
        let path = format!("/customers/{}/subscriptions", urlencoding::encode(key));
        self.post_form(&path, &request.form_fields()?).await
    }
}
