//! Core types for the Simla directory.
//!
//! This module provides type-safe wrappers for the CRM's domain concepts.

pub mod customer;
pub mod id;
pub mod identifier;
pub mod order;
pub mod site;

pub use customer::{Customer, CustomerReference, GroupedCustomers, Phone};
pub use id::*;
pub use identifier::{ByIdentifier, ParseByIdentifierError};
pub use order::{GroupedOrders, Order, OrderCustomer};
pub use site::{UNKNOWN_SITE, site_key};
