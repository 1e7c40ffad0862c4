use std::fs;

use tracing::info;
use tracing_subscriber::EnvFilter;

use apirequester_core::client::build_client;
use apirequester_core::config::{print_config_help, Config, RunMode};
use apirequester_core::dispatch;
use apirequester_core::environment::EnvironmentStore;
use apirequester_core::request::RequestTemplate;
use apirequester_core::runner::{self, LoadTestSpec};
use apirequester_core::template::resolve;
use apirequester_core::validation::ValidationError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load configuration from environment variables
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}\n", e);
            print_config_help();
            std::process::exit(1);
        }
    };

    let store = EnvironmentStore::from_json_file(&config.environments_file)?;
    let environment = store
        .lookup(&config.environment)
        .ok_or_else(|| ValidationError::EnvironmentNotFound(config.environment.clone()))?;

    let templates: Vec<RequestTemplate> =
        serde_json::from_str(&fs::read_to_string(&config.requests_file)?)?;
    if templates.is_empty() {
        return Err(ValidationError::EmptyRequestList.into());
    }

    // Resolve every template up front; a resolution failure aborts the whole
    // run before any network activity.
    let resolver_options = config.to_resolver_options();
    let resolved = templates
        .iter()
        .map(|template| resolve(template, &environment.variables, &resolver_options))
        .collect::<Result<Vec<_>, _>>()?;

    let client = build_client(&config.to_client_config())?;

    match config.mode {
        RunMode::Send => {
            info!(requests = resolved.len(), "Sending requests once each");
            for (index, request) in resolved.iter().enumerate() {
                match dispatch::send_once(&client, request).await {
                    Ok(summary) => {
                        println!(
                            "[{}] {} {} -> {} in {}ms",
                            index, request.method, request.url, summary.status, summary.elapsed_ms
                        );
                        if !summary.body.is_empty() {
                            println!("{}", summary.body);
                        }
                    }
                    Err(e) => {
                        eprintln!("[{}] {} {} failed: {}", index, request.method, request.url, e);
                    }
                }
            }
        }
        RunMode::LoadTest => {
            let spec = LoadTestSpec {
                requests: resolved,
                concurrency: config.concurrency,
                iterations: config.iterations,
            };

            let report = runner::run(&client, spec).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
