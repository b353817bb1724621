//! Folding paged records into grouped maps.

use simla_core::{Customer, GroupedCustomers, GroupedOrders, Order, site_key};
use tracing::warn;

/// Add customers to `grouped`, keyed by site then internal ID.
///
/// A customer already present under the same site is overwritten in place.
/// Customers without an internal ID cannot be keyed and are skipped.
pub fn group_customers(
    grouped: &mut GroupedCustomers,
    customers: impl IntoIterator<Item = Customer>,
) {
    for customer in customers {
        let Some(id) = customer.id else {
            warn!(external_id = ?customer.external_id, "Skipping customer without id");
            continue;
        };

        let site = site_key(customer.site.as_deref()).to_owned();
        grouped.entry(site).or_default().insert(id, customer);
    }
}

/// Append orders to `grouped`, keyed by site then owning customer ID.
///
/// Orders that do not reference a customer are skipped.
pub fn group_orders(grouped: &mut GroupedOrders, orders: impl IntoIterator<Item = Order>) {
    for order in orders {
        let Some(customer_id) = order.customer_id() else {
            warn!(order_id = ?order.id, "Skipping order without customer id");
            continue;
        };

        let site = site_key(order.site.as_deref()).to_owned();
        grouped
            .entry(site)
            .or_default()
            .entry(customer_id)
            .or_default()
            .push(order);
    }
}
