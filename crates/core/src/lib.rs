//! Simla Core - Shared domain types.
//!
//! This crate provides the record types exchanged with the Simla (`RetailCRM`)
//! API and the grouped maps assembled from its list endpoints:
//! - `gateway` - HTTP client, cache and the directory gateway
//! - `cli` - Command-line host for the gateway
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no
//! HTTP clients. Records keep every field the API sends, even the ones this
//! workspace never reads, so an edited customer round-trips unchanged.
//!
//! # Modules
//!
//! - [`types`] - Id newtypes, customers, orders, identifier selectors and site keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
