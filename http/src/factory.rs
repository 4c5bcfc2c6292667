//! Client factory and preflight check

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::redirect::Policy;

use gb_core::{ClientConfig, ClientError, ClientFactory, HttpClient, PreflightError, RequestSpec};

use crate::client::{builder, classify, error_chain, ReqwestClient, MAX_REDIRECTS};

/// Builds one [`ReqwestClient`] per worker from a shared [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestClientFactory {
    config: ClientConfig,
}

impl ReqwestClientFactory {
    /// Create a factory for the given settings
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Settings every client is built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Client that records every redirect target into `chain`
    fn recording_client(&self, chain: Arc<Mutex<Vec<String>>>) -> Result<reqwest::Client, ClientError> {
        let policy = if self.config.follow_redirects {
            Policy::custom(move |attempt| {
                if let Ok(mut chain) = chain.lock() {
                    chain.push(attempt.url().to_string());
                }
                if attempt.previous().len() >= MAX_REDIRECTS {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            })
        } else {
            Policy::none()
        };

        builder(&self.config)
            .redirect(policy)
            .build()
            .map_err(|e| ClientError::Build(error_chain(&e)))
    }
}

#[async_trait]
impl ClientFactory for ReqwestClientFactory {
    fn create(&self) -> Result<Box<dyn HttpClient>, ClientError> {
        Ok(Box::new(ReqwestClient::new(&self.config)?))
    }

    async fn preflight(&self, request: &RequestSpec) -> Result<Vec<String>, PreflightError> {
        let chain = Arc::new(Mutex::new(Vec::new()));
        let client = self
            .recording_client(Arc::clone(&chain))
            .map_err(PreflightError::Transport)?;

        let response = client
            .request(request.method().clone(), request.url().clone())
            .send()
            .await
            .map_err(|e| PreflightError::Transport(classify(&e)))?;

        let status = response.status();
        tracing::debug!(url = %request.url(), status = status.as_u16(), "Preflight response");
        if status.as_u16() >= 400 {
            return Err(PreflightError::Status(status.to_string()));
        }

        let redirects = chain.lock().map(|chain| chain.clone()).unwrap_or_default();
        Ok(redirects)
    }
}
