//! # Purchases Infrastructure
//!
//! Infrastructure implementations of the `purchases-core` ports.
//!
//! This crate contains:
//! - The reqwest-backed [`HttpTransport`](purchases_core::HttpTransport)
//! - Configuration loading from the environment or JSON/TOML files
//! - Tracing subscriber initialisation
//! - Wiring that turns a [`BackendConfig`](purchases_domain::BackendConfig)
//!   into a ready [`Backend`](purchases_core::Backend)
//!
//! ## Architecture
//! - Implements traits defined in `purchases-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;

// Re-export commonly used items
pub use client::{build_backend, build_transport, ClientError};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use logging::init_tracing;
