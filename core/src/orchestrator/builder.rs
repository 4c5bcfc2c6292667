//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::request::RequestSpec;
use crate::traits::ClientFactory;

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .parallelism(10)
///     .duration(Duration::from_secs(30))
///     .rate_limit(Some(100.0))
///     .request(RequestSpec::get("http://localhost:8080/")?)
///     .factory(factory)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    request: Option<RequestSpec>,
    factory: Option<Arc<dyn ClientFactory>>,
    channel_config: ChannelConfig,
    quiet: bool,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            request: None,
            factory: None,
            channel_config: ChannelConfig::default(),
            quiet: false,
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of workers
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Set the run duration
    pub fn duration(mut self, duration: std::time::Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Set the rate limit (requests per second across all workers)
    pub fn rate_limit(mut self, rps: Option<f64>) -> Self {
        self.config.rate_limit = rps;
        self
    }

    /// Set the target request
    pub fn request(mut self, request: RequestSpec) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the client factory
    pub fn factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Discard error and live output
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if the request or factory are not set, or if
    /// configuration validation fails.
    pub fn build(self) -> BenchResult<Orchestrator> {
        let request = self
            .request
            .ok_or_else(|| BenchError::missing_config("request"))?;

        let factory = self
            .factory
            .ok_or_else(|| BenchError::missing_config("client factory"))?;

        self.config.validate()?;

        let mut orchestrator = Orchestrator::new(self.config, request, factory);
        orchestrator.channel_config = self.channel_config;
        orchestrator.quiet = self.quiet;

        Ok(orchestrator)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
