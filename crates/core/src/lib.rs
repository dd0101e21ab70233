//! # Purchases Core
//!
//! Backend communication logic - no HTTP client dependencies.
//!
//! This crate contains:
//! - The transport port the HTTP adapter implements
//! - Request coalescing keyed by logical operation
//! - The serial operation queue every request goes through
//! - Per-endpoint response handlers and error classification
//! - The `Backend` facade tying them together
//!
//! ## Architecture Principles
//! - Only depends on `purchases-domain`
//! - Transport injected through [`ports::HttpTransport`]
//! - Results delivered through completion callbacks, once per caller

pub mod backend;
pub mod cache_key;
pub mod coalescer;
pub mod handlers;
pub mod operation;
pub mod ports;
pub mod queue;

// Re-export specific items to avoid ambiguity
pub use backend::{Backend, CoalescingStats};
pub use cache_key::CacheKey;
pub use coalescer::{CacheStatus, CallbackCache, CoalescerStats, Completion};
pub use operation::{CompletionTarget, NetworkOperation, Request};
pub use ports::{Headers, HttpResponse, HttpTransport, TransportResult};
pub use queue::{Operation, OperationQueue, QueueError};
