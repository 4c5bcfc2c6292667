//! CLI argument parsing

use std::time::Duration;

use clap::{ArgAction, Parser};

use gb_core::{ClientConfig, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "gb")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "gb [options] <url>")]
pub struct Cli {
    /// Target URL
    pub url: Option<String>,

    /// Use HTTP compression
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = true,
        value_name = "BOOL"
    )]
    pub compression: bool,

    /// Test duration
    #[arg(long, default_value = "15s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Number of parallel client connections
    #[arg(long, default_value_t = 20)]
    pub parallel: usize,

    /// Startup interval for client connections
    #[arg(long, default_value = "0s", value_parser = humantime::parse_duration)]
    pub rampup: Duration,

    /// Limit rate (requests per second, 0 = unlimited)
    #[arg(long, default_value_t = 0.0)]
    pub rate: f64,

    /// Follow HTTP redirects
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        require_equals = true,
        value_name = "BOOL"
    )]
    pub redirects: bool,

    /// Request timeout
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Display response time histogram
    #[arg(long)]
    pub histogram: bool,

    /// Show periodic progress updates
    #[arg(long)]
    pub live: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings shared by every per-worker client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_compression(self.compression)
            .with_redirects(self.redirects)
            .with_timeout(self.timeout)
    }

    /// Run settings; a zero rate means unlimited
    pub fn run_config(&self) -> RunConfig {
        let config = RunConfig::new(self.parallel)
            .with_duration(self.duration)
            .with_ramp_up(self.rampup)
            .with_client(self.client_config())
            .with_histogram(self.histogram)
            .with_live(self.live);

        if self.rate == 0.0 {
            config
        } else {
            config.with_rate_limit(self.rate)
        }
    }
}
