use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::client::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
use crate::template::{ResolverOptions, DEFAULT_MAX_PASSES};
use crate::utils::parse_duration_string;

/// How the binary should drive the prepared requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Send each request once, sequentially (collection run).
    Send,

    /// Drive the requests as a load test.
    LoadTest,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "send" => Ok(RunMode::Send),
            "loadtest" => Ok(RunMode::LoadTest),
            other => Err(format!(
                "Invalid RUN_MODE '{}'. Expected 'send' or 'loadtest'",
                other
            )),
        }
    }
}

/// Main configuration for the binary, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: RunMode,
    pub environments_file: String,
    pub environment: String,
    pub requests_file: String,
    pub concurrency: usize,
    pub iterations: usize,
    pub request_timeout: Duration,
    pub max_resolve_passes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mode: RunMode = env::var("RUN_MODE")
            .unwrap_or_else(|_| "send".to_string())
            .parse()?;

        let environments_file = env::var("ENVIRONMENTS_FILE")
            .map_err(|_| "ENVIRONMENTS_FILE environment variable must be set")?;

        let environment = env::var("ENVIRONMENT")
            .map_err(|_| "ENVIRONMENT environment variable must be set")?;

        let requests_file = env::var("REQUESTS_FILE")
            .map_err(|_| "REQUESTS_FILE environment variable must be set")?;

        let concurrency: usize = env::var("CONCURRENCY")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|e| format!("CONCURRENCY must be a valid number: {}", e))?;

        let iterations: usize = env::var("ITERATIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|e| format!("ITERATIONS must be a valid number: {}", e))?;

        let request_timeout = match env::var("REQUEST_TIMEOUT") {
            Ok(s) => parse_duration_string(&s)
                .map_err(|e| format!("Invalid REQUEST_TIMEOUT format: '{}'. {}", s, e))?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        let max_resolve_passes: usize = env::var("MAX_RESOLVE_PASSES")
            .unwrap_or_else(|_| DEFAULT_MAX_PASSES.to_string())
            .parse()
            .map_err(|e| format!("MAX_RESOLVE_PASSES must be a valid number: {}", e))?;

        Ok(Config {
            mode,
            environments_file,
            environment,
            requests_file,
            concurrency,
            iterations,
            request_timeout,
            max_resolve_passes,
        })
    }

    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: self.request_timeout,
            ..ClientConfig::default()
        }
    }

    pub fn to_resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            max_passes: self.max_resolve_passes,
        }
    }
}

/// Prints helpful configuration documentation.
pub fn print_config_help() {
    eprintln!("Required environment variables:");
    eprintln!("  ENVIRONMENTS_FILE   - Path to a JSON file with an array of environments");
    eprintln!("  ENVIRONMENT         - Name of the environment to resolve variables from");
    eprintln!("  REQUESTS_FILE       - Path to a JSON file with an array of request templates");
    eprintln!();
    eprintln!("Optional environment variables:");
    eprintln!("  RUN_MODE            - 'send' (each request once) or 'loadtest' (default: send)");
    eprintln!("  CONCURRENCY         - Concurrent attempts per request, 1-100 (default: 10)");
    eprintln!("  ITERATIONS          - Sequential load-test rounds, 1-50 (default: 1)");
    eprintln!("  REQUEST_TIMEOUT     - Per-attempt timeout: 500ms, 10s, 1m (default: 10s)");
    eprintln!("  MAX_RESOLVE_PASSES  - Substitution pass cap before a circular reference is assumed (default: 10)");
}
