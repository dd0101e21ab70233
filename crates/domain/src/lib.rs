//! # Purchases Domain
//!
//! Business domain types and models for the subscription backend client.
//!
//! This crate contains:
//! - Typed backend payloads (CustomerInfo, Offerings, SignedOffer, etc.)
//! - Request parameter types (receipt posts, offer signing, attributes)
//! - Classified error types and Result definitions
//! - Configuration structures
//! - Status-code boundaries and envelope keys
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
