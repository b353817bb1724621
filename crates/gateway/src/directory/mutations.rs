//! Customer mutations: edit, phone clearing, combine, subscriptions.

use std::fmt::Debug;

use serde_json::Value;
use simla_core::{ByIdentifier, Customer, CustomerId};
use tracing::{debug, info, instrument, warn};

use super::DirectoryGateway;
use crate::api::CrmApi;
use crate::cache::DirectoryCache;
use crate::error::{GatewayError, log_failure};
use crate::simla::{
    ApiResponse, CombineRequest, CustomerEditRequest, SimlaError, SubscriptionsRequest,
};

/// How a batch reacts to a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Stop at the first failure; later items are not attempted.
    #[default]
    StopOnFirstFailure,
    /// Attempt every item regardless of earlier failures.
    ContinueOnError,
}

/// Result of clearing one customer's phones.
#[derive(Debug)]
pub struct PhoneClearOutcome {
    /// Internal ID of the customer, if it had one.
    pub customer_id: Option<CustomerId>,
    pub result: Result<ApiResponse, GatewayError>,
}

impl PhoneClearOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Path key for a customer routed by `by`.
fn routing_key(customer: &Customer, by: ByIdentifier) -> Result<String, GatewayError> {
    match by {
        ByIdentifier::ExternalId => customer.external_id.clone(),
        ByIdentifier::Id => customer.id.map(|id| id.to_string()),
    }
    .ok_or(GatewayError::MissingIdentifier(by))
}

impl<C: CrmApi, K: DirectoryCache> DirectoryGateway<C, K> {
    /// Edit a customer, scoped to its own site and routed by `by`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingIdentifier`] if the customer lacks the
    /// routing identifier, or the remote fault if the CRM rejects the edit.
    #[instrument(skip(self, customer))]
    pub async fn try_customer_edit(
        &self,
        customer: &Customer,
        by: ByIdentifier,
    ) -> Result<ApiResponse, GatewayError> {
        let key = routing_key(customer, by)?;
        if self.log_payloads {
            debug!(?customer, "Customer edit payload");
        }

        let request = CustomerEditRequest::new(customer.clone(), by);
        let response = self.client.edit_customer(&key, &request).await?;

        info!("Customer edited: {by}#{key}");
        Ok(response)
    }

    /// Edit a customer, logging any failure.
    pub async fn customer_edit(
        &self,
        customer: &Customer,
        by: ByIdentifier,
    ) -> Option<ApiResponse> {
        match self.try_customer_edit(customer, by).await {
            Ok(response) => Some(response),
            Err(e) => {
                log_failure("customer edit", &e);
                None
            }
        }
    }

    /// Remove every phone number from each customer, one edit per customer.
    ///
    /// `ids` only labels the batch in logs. Edits are routed by internal ID.
    /// Returns one outcome per attempted customer, in input order; under
    /// [`BatchPolicy::StopOnFirstFailure`] the failing customer's outcome is
    /// the last one and the rest are not attempted.
    #[instrument(skip(self, customers, ids), fields(count = customers.len()))]
    pub async fn null_duplicate_phones<I: Debug + Sync>(
        &self,
        customers: Vec<Customer>,
        ids: &[I],
        policy: BatchPolicy,
    ) -> Vec<PhoneClearOutcome> {
        debug!("Clear duplicates ({ids:?}) phones");

        let mut outcomes = Vec::with_capacity(customers.len());
        for mut customer in customers {
            customer.clear_phones();
            let customer_id = customer.id;

            let result = self.try_customer_edit(&customer, ByIdentifier::Id).await;
            let failed = result.is_err();
            if let Err(e) = &result {
                log_failure("clear duplicate phones", e);
            }
            outcomes.push(PhoneClearOutcome {
                customer_id,
                result,
            });

            if failed && policy == BatchPolicy::StopOnFirstFailure {
                warn!(attempted = outcomes.len(), "Stopping phone clearing after failure");
                return outcomes;
            }
        }

        if outcomes.iter().all(PhoneClearOutcome::is_success) {
            info!("Phones of ({ids:?}) cleared");
        } else {
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            warn!(failed, "Phones of ({ids:?}) partially cleared");
        }
        outcomes
    }

    /// Merge `customer_ids` into `result_customer_id`.
    ///
    /// # Errors
    ///
    /// Returns the classified remote fault unchanged; nothing is logged here.
    #[instrument(skip(self))]
    pub async fn customers_combine(
        &self,
        result_customer_id: CustomerId,
        customer_ids: &[CustomerId],
    ) -> Result<ApiResponse, SimlaError> {
        let request = CombineRequest::new(result_customer_id, customer_ids);
        self.client.combine_customers(&request).await
    }

    /// Replace a customer's subscription preferences, routed by `by`.
    ///
    /// `subscriptions` is forwarded verbatim.
    ///
    /// # Errors
    ///
    /// Same as [`DirectoryGateway::try_customer_edit`].
    #[instrument(skip(self, customer, subscriptions))]
    pub async fn try_customer_subscribe(
        &self,
        customer: &Customer,
        subscriptions: &Value,
        by: ByIdentifier,
    ) -> Result<ApiResponse, GatewayError> {
        let key = routing_key(customer, by)?;
        if self.log_payloads {
            debug!(?customer, %subscriptions, "Customer subscriptions payload");
        }

        let request = SubscriptionsRequest {
            by,
            site: customer.site.clone(),
            subscriptions: subscriptions.clone(),
        };
        let response = self.client.update_subscriptions(&key, &request).await?;

        info!("Customer subscribed: {by}#{key}");
        Ok(response)
    }

    /// Replace a customer's subscription preferences, logging any failure.
    pub async fn customer_subscribe(
        &self,
        customer: &Customer,
        subscriptions: &Value,
        by: ByIdentifier,
    ) {
        if let Err(e) = self.try_customer_subscribe(customer, subscriptions, by).await {
            log_failure("customer subscribe", &e);
        }
    }
}
