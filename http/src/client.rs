//! Per-worker reqwest client

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use reqwest::Client;

use gb_core::{ClientConfig, ClientError, HttpClient, HttpResponse, RequestSpec};

/// Maximum redirect hops followed before the last response is returned
pub const MAX_REDIRECTS: usize = 10;

/// HTTP client owned by one worker
///
/// Wraps its own `reqwest::Client`, so connection pools are never shared
/// across workers.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Build a client from the shared settings
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let policy = if config.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        let client = builder(config)
            .redirect(policy)
            .build()
            .map_err(|e| ClientError::Build(error_chain(&e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, ClientError> {
        let response = self
            .client
            .request(request.method().clone(), request.url().clone())
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.len()).map_err(|e| classify(&e)));

        Ok(HttpResponse::new(status, Box::pin(body)))
    }
}

/// Client builder with everything but the redirect policy applied
pub(crate) fn builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .gzip(config.compression)
        .brotli(config.compression)
        .deflate(config.compression)
        .connect_timeout(config.timeout)
        .timeout(config.timeout)
}

/// Map a reqwest error onto the transport error kinds
pub(crate) fn classify(err: &reqwest::Error) -> ClientError {
    let message = error_chain(err);
    if err.is_timeout() {
        ClientError::Timeout(message)
    } else if err.is_connect() {
        ClientError::Connect(message)
    } else if err.is_body() || err.is_decode() {
        ClientError::Body(message)
    } else if err.is_builder() {
        ClientError::Build(message)
    } else {
        ClientError::Other(message)
    }
}

/// Error message including every source, e.g.
/// `error sending request: client error (Connect): Connection refused`
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
