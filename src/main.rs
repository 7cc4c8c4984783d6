//! Plotforge - LLM-assisted chart builder dashboard
//!
//! Main entry point: parses CLI arguments, loads configuration, builds
//! the configured provider with its credential, and serves the dashboard.

use plotforge::cli::Cli;
use plotforge::config::Config;
use plotforge::error::Result;
use plotforge::providers::create_provider;
use plotforge::server;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "plotforge=debug" } else { "plotforge=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config_path(), &cli)?;
    config.validate()?;

    // The hosted-provider credential is read once here and handed to the
    // provider constructor; nothing else sees the environment.
    let groq_api_key = std::env::var("GROQ_API_KEY").ok();
    let provider = create_provider(&config.provider, groq_api_key)?;

    tracing::info!(
        provider = provider.name(),
        addr = %config.server.bind_addr(),
        "Starting Plotforge dashboard"
    );

    server::serve(&config, provider).await
}
