//! CLI command definitions.

pub mod generate;
pub mod render;

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_ENDPOINT};

/// CLI client for the shaper generation API.
#[derive(Debug, Parser)]
#[command(name = "shaper-client")]
#[command(about = "Generate UI components and print their state", long_about = None)]
pub struct Cli {
    /// Server base URL.
    #[arg(long, env = "SHAPER_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Generation endpoint, relative to the base URL or absolute.
    #[arg(long, env = "SHAPER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// API key sent as `x-api-key`.
    #[arg(long, env = "SHAPER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Default model for requests that do not name one.
    #[arg(long, env = "SHAPER_MODEL")]
    pub model: Option<String>,

    /// Delay between status refreshes, in milliseconds.
    #[arg(long, env = "SHAPER_POLLING_INTERVAL_MS", default_value_t = 3000)]
    pub polling_interval_ms: u64,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Client configuration from flags, which already fall back to the environment.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::default()
            .with_base_url(&self.base_url)
            .with_endpoint(&self.endpoint)
            .with_polling_interval(Duration::from_millis(self.polling_interval_ms));
        config.api_key = self.api_key.clone().filter(|k| !k.trim().is_empty());
        config.model = self.model.clone();
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one generation cycle and print the final state.
    Generate(generate::GenerateCommand),
    /// Run one generation cycle and print the embedding HTML.
    Render(render::RenderCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_with_globals() {
        let cli = Cli::try_parse_from([
            "shaper-client",
            "--base-url",
            "https://app.example.com",
            "--api-key",
            "secret",
            "--polling-interval-ms",
            "500",
            "--format",
            "json",
            "generate",
            "Build a login form",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.endpoint_url(), "https://app.example.com/api/generate");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.polling_interval(), Duration::from_millis(500));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Generate(_)));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let cli =
            Cli::try_parse_from(["shaper-client", "--api-key", " ", "generate", "Form"]).unwrap();
        assert_eq!(cli.config().api_key, None);
    }
}
