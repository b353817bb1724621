//! Order operations for the Simla API.

use tracing::instrument;

use super::{OrdersPage, SimlaClient, SimlaError};

impl SimlaClient {
    /// Fetch one page of orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: u32, limit: u32) -> Result<OrdersPage, SimlaError> {
        self.get(&format!("/orders?page={page}&limit={limit}")).await
    }
}
