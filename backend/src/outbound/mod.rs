//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: in-memory and JSON-file user stores and feedback sinks
//! - **static_catalog**: the catalog generated from the `catalog-data` document
//! - **payment**: simulated payment confirmation with cancellation
//! - **cloudflare**: Cloudflare Stream direct-upload URLs
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cloudflare;
pub mod payment;
pub mod persistence;
pub mod static_catalog;
