//! Wiring from configuration to a ready [`Backend`].

use std::sync::Arc;

use purchases_core::{Backend, HttpTransport, QueueError};
use purchases_domain::{BackendConfig, ConfigError, TransportError};
use thiserror::Error;
use tracing::info;

use crate::http::HttpClient;

/// Failures while assembling a backend client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Build the reqwest transport described by `config`.
pub fn build_transport(config: &BackendConfig) -> Result<HttpClient, ClientError> {
    config.validate()?;

    let client = HttpClient::builder()
        .base_url(config.base_url.as_str())
        .timeout(config.timeout())
        .max_attempts(config.max_attempts)
        .base_backoff(config.base_backoff())
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Build a [`Backend`] on the current tokio runtime.
///
/// # Errors
/// Fails when the configuration is invalid, the HTTP client cannot be built,
/// or no tokio runtime is running.
pub fn build_backend(config: &BackendConfig) -> Result<Backend, ClientError> {
    let transport: Arc<dyn HttpTransport> = Arc::new(build_transport(config)?);
    let backend = Backend::new(transport, &config.api_key)?;

    info!(base_url = %config.base_url, max_attempts = config.max_attempts, "Backend ready");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configs_are_rejected_before_building() {
        let mut config = BackendConfig::new("appl_test");
        config.base_url = "ftp://example.com".into();

        assert!(matches!(build_transport(&config), Err(ClientError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn backend_requires_a_runtime() {
        let config = BackendConfig::new("appl_test");

        assert!(matches!(build_backend(&config), Err(ClientError::Queue(QueueError::NoRuntime))));
    }

    #[tokio::test]
    async fn backend_builds_inside_a_runtime() {
        let config = BackendConfig::new("appl_test");
        let backend = build_backend(&config).expect("backend");

        backend.shutdown().await.expect("clean shutdown");
    }
}
