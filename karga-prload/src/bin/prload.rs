use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use karga_prload::{LoadConfig, LoadTest, DEFAULT_HOST};
use tracing_subscriber::EnvFilter;

/// Drive a weighted user mix against the PR / team management service.
#[derive(Debug, Parser)]
#[command(name = "prload", version)]
struct Args {
    /// Base address of the service under test
    #[arg(long, env = "PRLOAD_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Concurrent simulated users
    #[arg(short, long, env = "PRLOAD_USERS", default_value_t = 100)]
    users: usize,

    /// Run length in seconds
    #[arg(short, long, env = "PRLOAD_DURATION", default_value_t = 60)]
    duration: u64,

    #[arg(long, default_value_t = 20)]
    pool_size: usize,

    #[arg(long, default_value_t = 10)]
    member_count: usize,

    /// Minimum think time between steps, in milliseconds
    #[arg(long, default_value_t = 50)]
    wait_min_ms: u64,

    /// Maximum think time between steps, in milliseconds
    #[arg(long, default_value_t = 300)]
    wait_max_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    report: Option<PathBuf>,
}

impl From<Args> for LoadConfig {
    fn from(args: Args) -> Self {
        LoadConfig::builder()
            .host(args.host)
            .workers(args.users)
            .duration(Duration::from_secs(args.duration))
            .pool_size(args.pool_size)
            .member_count(args.member_count)
            .wait_min(Duration::from_millis(args.wait_min_ms))
            .wait_max(Duration::from_millis(args.wait_max_ms))
            .request_timeout(Duration::from_secs(args.timeout))
            .build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let report_path = args.report.clone();

    let test = LoadTest::new(args.into()).context("invalid load configuration")?;
    let report = test.run().await.context("load run aborted")?;

    let json = serde_json::to_string_pretty(&report)?;
    match report_path {
        Some(path) => tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("unable to write report to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
