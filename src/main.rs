//! authgate - session client and authorization gate CLI
//!
//! Main entry point for the authgate application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authgate::cli::{Cli, Commands};
use authgate::commands;
use authgate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(base_url = %config.service.base_url, "Configuration loaded");

    match cli.command {
        Commands::Demo => {
            tracing::info!("Starting integration showcase");
            commands::demo::run_demo(&config).await
        }
        Commands::Suite => {
            tracing::info!("Starting API test suite");
            commands::suite::run_suite(&config).await
        }
        Commands::Login {
            username,
            password,
            json,
        } => commands::login::run_login(&config, &username, &password, json).await,
        Commands::Check {
            username,
            password,
            permissions,
        } => commands::check::run_check(&config, &username, &password, &permissions).await,
        Commands::Health => commands::health::run_health(&config).await,
        Commands::RateLimit { attempts, delay_ms } => {
            commands::rate_limit::run_rate_limit(&config, attempts, delay_ms).await
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with JSON written to stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "authgate=debug"
    } else {
        "authgate=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
