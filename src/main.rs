//! gb - HTTP load generator

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use gb_core::{OrchestratorBuilder, RequestSpec};
use gb_http::ReqwestClientFactory;
use gb_report::{JsonExporter, TextReport};

mod cli;
mod rlimit;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let Some(url) = cli.url.as_deref() else {
        println!("Error: No url given\n");
        let _ = cli::Cli::command().print_help();
        std::process::exit(1);
    };

    let request = RequestSpec::get(url).with_context(|| format!("Invalid url {}", url))?;
    let config = cli.run_config();
    let factory = Arc::new(ReqwestClientFactory::new(config.client.clone()));

    let orchestrator = OrchestratorBuilder::new()
        .config(config.clone())
        .request(request)
        .factory(factory)
        .quiet(cli.json)
        .build()
        .context("Invalid configuration")?;

    if let Err(e) = rlimit::raise_nofile(config.parallelism) {
        tracing::warn!(error = %e, "Failed to update rlimit");
    }

    if !cli.json {
        println!(
            "Running {} parallel clients for {}...",
            config.parallelism,
            humantime::format_duration(config.duration)
        );
    }

    let outcome = orchestrator.run_with_signal_handling().await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        JsonExporter::write(&outcome.total, &mut out).context("Failed to write JSON summary")?;
    } else {
        TextReport::new(&outcome.total)
            .with_histogram(config.histogram)
            .write(&mut out)
            .context("Failed to write report")?;
    }
    out.flush()?;

    Ok(())
}
