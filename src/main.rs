//! gaia-bench CLI entry point.
//!
//! Sets up the tracing stack, then hands the parsed command to the CLI
//! module.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = gaia_bench::cli::parse_cli();

    // RUST_LOG takes precedence over --log-level.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level.clone());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)))
        .init();

    gaia_bench::cli::run_with_cli(cli).await
}
