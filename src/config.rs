//! Command-line and environment configuration.
//!
//! Every flag can also be set through the environment, so the server runs the
//! same way from a shell, a container, or a process manager.

use std::time::Duration;

use clap::Parser;

use crate::github::GitHubSettings;
use crate::llm::GeminiSettings;

/// Napkin relay - forwards canvas and repository analysis requests to Gemini
#[derive(Debug, Parser)]
#[command(name = "napkin-relay", version)]
#[command(about = "Diagram and repository analysis relay for the Napkin canvas", long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "NAPKIN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to run the server on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model used for every request
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-3-flash")]
    pub model: String,

    /// Base URL of the Gemini REST API
    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com")]
    pub gemini_base_url: String,

    /// Optional timeout for model calls, in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS")]
    pub llm_timeout_secs: Option<u64>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Token for GitHub requests (raises rate limits, allows private repos)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Timeout for each GitHub request, in seconds
    #[arg(long, env = "GITHUB_TIMEOUT_SECS", default_value = "30")]
    pub github_timeout_secs: u64,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    /// Maximum request body size in megabytes (images are sent inline)
    #[arg(long, env = "MAX_BODY_MB", default_value = "20")]
    pub max_body_mb: usize,
}

impl Cli {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn github_settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_url: self.github_api_url.clone(),
            token: self.github_token.clone(),
            timeout: Duration::from_secs(self.github_timeout_secs),
        }
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            api_key: self.gemini_api_key.clone(),
            model: self.model.clone(),
            base_url: self.gemini_base_url.clone(),
            timeout: self.llm_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_build_client_settings() {
        let cli = Cli::try_parse_from([
            "napkin-relay",
            "--gemini-api-key",
            "k",
            "--github-token",
            "t",
            "--github-timeout-secs",
            "5",
            "--llm-timeout-secs",
            "60",
            "--port",
            "9000",
        ])
        .expect("cli");

        assert_eq!(cli.address(), "127.0.0.1:9000");
        let github = cli.github_settings();
        assert_eq!(github.timeout, Duration::from_secs(5));
        assert_eq!(github.token.as_deref(), Some("t"));
        assert_eq!(cli.gemini_settings().timeout, Some(Duration::from_secs(60)));
        assert_eq!(cli.max_body_bytes(), 20 * 1024 * 1024);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
