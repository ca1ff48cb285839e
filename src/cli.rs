//! Command-line interface definition for authgate
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the integration showcase, the API test suite,
//! ad-hoc logins and permission checks, and the health and rate-limit
//! probes.

use clap::{Parser, Subcommand};

/// authgate - session client and authorization gate for an HTTP auth service
///
/// Logs in against the auth service, validates tokens before privileged
/// operations and reports health and rate-limit behavior.
#[derive(Parser, Debug, Clone)]
#[command(name = "authgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the auth service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the request timeout (seconds)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for authgate
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the legacy ERP integration showcase
    Demo,

    /// Run the auth API security test suite
    Suite,

    /// Log in and show the authenticated user
    Login {
        /// Username to authenticate as
        #[arg(short, long)]
        username: String,

        /// Password for the account
        #[arg(short, long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Print the session as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Log in and check one or more permissions
    Check {
        /// Username to authenticate as
        #[arg(short, long)]
        username: String,

        /// Password for the account
        #[arg(short, long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Permissions to check (POS, SALES, PAYMENT, REPORTS, CONFIG, SYSTEM)
        #[arg(required = true, num_args = 1..)]
        permissions: Vec<String>,
    },

    /// Probe the health endpoints
    Health,

    /// Probe the login rate limiter
    RateLimit {
        /// Override the number of attempts
        #[arg(short, long)]
        attempts: Option<u32>,

        /// Override the pause between attempts (milliseconds)
        #[arg(short, long)]
        delay_ms: Option<u64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            base_url: None,
            timeout: None,
            verbose: false,
            command: Commands::Health,
        }
    }
}
