//! Customer mutation commands.
//!
//! # Usage
//!
//! ```bash
//! simla combine --into 10 11 12
//! simla clear-phones [--continue-on-error] 11 12 13
//! simla subscribe --channel email --subscribed false [--by id] [--site shop-a] KEY
//! ```

use serde_json::{Value, json};
use simla_core::{ByIdentifier, Customer, CustomerId, GroupedCustomers};
use simla_gateway::{BatchPolicy, PhoneClearOutcome};

use super::{CommandError, Gateway};

/// Merge `ids` into `into`.
pub async fn combine(
    gateway: &Gateway,
    into: CustomerId,
    ids: &[CustomerId],
) -> Result<(), CommandError> {
    gateway.customers_combine(into, ids).await?;
    tracing::info!("Combined {ids:?} into customer {into}");
    Ok(())
}

/// Clear the phones of the customers with the given internal IDs.
///
/// Customers are looked up in the cached directory so the edit carries
/// their site. Only the ID and site are taken from the cache; the edit never
/// writes other cached fields back.
pub async fn clear_phones(
    gateway: &Gateway,
    ids: &[CustomerId],
    continue_on_error: bool,
) -> Result<(), CommandError> {
    let directory = gateway.try_cached_customers_by_site(false).await?;
    let customers = find_customers(&directory, ids)?;

    let policy = if continue_on_error {
        BatchPolicy::ContinueOnError
    } else {
        BatchPolicy::StopOnFirstFailure
    };
    let outcomes = gateway.null_duplicate_phones(customers, ids, policy).await;

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    let unattempted = ids.len().saturating_sub(outcomes.len());
    if failed + unattempted > 0 {
        for outcome in outcomes.iter().filter(|o| !o.is_success()) {
            report_failure(outcome);
        }
        return Err(CommandError::PartialFailure {
            failed: failed + unattempted,
            total: ids.len(),
        });
    }
    Ok(())
}

fn report_failure(outcome: &PhoneClearOutcome) {
    if let Err(e) = &outcome.result {
        tracing::warn!(customer_id = ?outcome.customer_id, "Not cleared: {e}");
    }
}

/// Edit records for `ids`, in that order, holding only ID and site.
fn find_customers(
    directory: &GroupedCustomers,
    ids: &[CustomerId],
) -> Result<Vec<Customer>, CommandError> {
    let mut found = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();

    for id in ids {
        match directory.values().find_map(|site| site.get(id)) {
            Some(customer) => found.push(Customer {
                id: Some(*id),
                site: customer.site.clone(),
                ..Customer::default()
            }),
            None => missing.push(*id),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(CommandError::UnknownCustomers(missing))
    }
}

/// Customer addressed on the command line.
#[derive(Debug, Clone)]
pub struct SubscribeTarget {
    pub key: String,
    pub by: ByIdentifier,
    pub site: Option<String>,
}

impl SubscribeTarget {
    fn customer(&self) -> Result<Customer, CommandError> {
        let customer = match self.by {
            ByIdentifier::ExternalId => Customer::with_external_id(self.key.clone()),
            ByIdentifier::Id => {
                let id = self
                    .key
                    .parse()
                    .map_err(|_| CommandError::InvalidCustomerId(self.key.clone()))?;
                Customer::with_id(id)
            }
        };

        Ok(match &self.site {
            Some(site) => customer.on_site(site.clone()),
            None => customer,
        })
    }
}

/// Subscribe or unsubscribe a customer from one channel.
pub async fn subscribe(
    gateway: &Gateway,
    target: &SubscribeTarget,
    channel: &str,
    subscribed: bool,
) -> Result<(), CommandError> {
    let customer = target.customer()?;
    let subscriptions = subscription_payload(channel, subscribed);
    gateway
        .try_customer_subscribe(&customer, &subscriptions, target.by)
        .await?;
    Ok(())
}

fn subscription_payload(channel: &str, subscribed: bool) -> Value {
    json!([{"channel": channel, "subscribed": subscribed}])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn directory() -> GroupedCustomers {
        serde_json::from_value(json!({
            "A": {"1": {"id": 1, "site": "A"}, "2": {"id": 2, "site": "A"}},
            "B": {"3": {
                "id": 3,
                "externalId": "ext-3",
                "site": "B",
                "firstName": "Stale",
                "email": "old@example.com",
                "phones": [{"number": "+15550100"}]
            }}
        }))
        .unwrap()
    }

    #[test]
    fn test_find_customers_keeps_requested_order() {
        let ids = [CustomerId::new(3), CustomerId::new(1)];
        let found = find_customers(&directory(), &ids).unwrap();

        let sites: Vec<Option<&str>> = found.iter().map(|c| c.site.as_deref()).collect();
        assert_eq!(sites, vec![Some("B"), Some("A")]);
    }

    #[test]
    fn test_find_customers_reports_unknown_ids() {
        let ids = [CustomerId::new(1), CustomerId::new(9)];
        let err = find_customers(&directory(), &ids).unwrap_err();

        assert!(matches!(
            err,
            CommandError::UnknownCustomers(ref missing) if missing == &[CustomerId::new(9)]
        ));
    }

    #[test]
    fn test_phone_clear_record_drops_cached_fields() {
        let mut found = find_customers(&directory(), &[CustomerId::new(3)]).unwrap();
        let mut customer = found.pop().unwrap();
        customer.clear_phones();

        assert_eq!(
            serde_json::to_value(&customer).unwrap(),
            json!({"id": 3, "site": "B", "phones": []})
        );
    }

    #[test]
    fn test_subscribe_target_by_id() {
        let target = SubscribeTarget {
            key: "42".to_string(),
            by: ByIdentifier::Id,
            site: Some("shop-a".to_string()),
        };

        let customer = target.customer().unwrap();
        assert_eq!(customer.id, Some(CustomerId::new(42)));
        assert_eq!(customer.site.as_deref(), Some("shop-a"));
    }

    #[test]
    fn test_subscribe_target_rejects_non_numeric_id() {
        let target = SubscribeTarget {
            key: "ext-42".to_string(),
            by: ByIdentifier::Id,
            site: None,
        };

        assert!(target.customer().is_err());
    }

    #[test]
    fn test_subscription_payload_shape() {
        assert_eq!(
            subscription_payload("email", false),
            json!([{"channel": "email", "subscribed": false}])
        );
    }
}
