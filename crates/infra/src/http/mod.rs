//! HTTP transport backed by reqwest.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
