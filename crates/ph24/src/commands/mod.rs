pub mod api;
pub mod service;

use colored::Colorize;
use ph24_api::{ApiResponse, Ph24Client};
use ph24_config::Ph24Config;

/// API client for the configured account
pub fn client(config: &Ph24Config) -> anyhow::Result<Ph24Client> {
    let key = config.api_key()?;
    Ok(Ph24Client::new(key, Some(&config.api_url))?)
}

/// Fail with the status and remote detail unless the call succeeded
pub fn ensure_success(response: &ApiResponse, headline: &str) -> anyhow::Result<()> {
    if response.is_success() {
        return Ok(());
    }
    if response.is_transport_error() {
        anyhow::bail!("{}{}", headline, response.failure_detail());
    }
    anyhow::bail!(
        "{} (HTTP {}){}",
        headline,
        response.code,
        response.failure_detail()
    );
}

/// Pretty-print the response body
pub fn print_json(response: &ApiResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.data_value())?);
    Ok(())
}

pub fn print_done(message: &str) {
    println!("{} {}", "✓".green(), message);
}
