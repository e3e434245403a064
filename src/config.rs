use std::net::SocketAddr;

use serde::Deserialize;
use url::Url;

/// Top-level application configuration, merged from the configuration file
/// and `KOMOREBI_*` environment variables.
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// The socket address to listen on. Defaults to `127.0.0.1:8000`.
    pub listen_address: Option<SocketAddr>,
    /// The snapshot database connection string, e.g. `sqlite://data/komorebi.db`.
    pub db: String,
    /// Behavior the platform leaves configurable.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Curatorial-commentary generation. Disabled when absent.
    pub curator: Option<CuratorConfig>,
    /// Metrics reporting. Disabled when absent.
    pub metrics: Option<MetricConfig>,
}

/// Store policy toggles.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PolicyConfig {
    /// Count each transition into PUBLISHED toward the author's
    /// verification progress.
    pub verification_promotion: bool,
    /// Approvals needed before a USER author is promoted to VERIFIED.
    pub verification_threshold: u32,
    /// Allow at most one chat thread per work.
    pub unique_work_threads: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            verification_promotion: false,
            verification_threshold: 3,
            unique_work_threads: false,
        }
    }
}

/// Connection details for the commentary-generation service.
#[derive(Deserialize, Debug, Clone)]
pub struct CuratorConfig {
    /// Base URL of the generation API. Must end with a trailing slash.
    pub endpoint: Url,
    /// Model identifier, e.g. `gemini-3-flash-preview`.
    pub model: String,
    /// API key sent with each request.
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_curator_timeout")]
    pub timeout: u64,
}

fn default_curator_timeout() -> u64 {
    10
}

/// Metric reporting configuration.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub enum MetricConfig {
    /// Push metrics to a Prometheus push gateway.
    PrometheusPush(PrometheusPushConfig),
}

/// Prometheus push gateway settings.
#[derive(Deserialize, Debug, Clone)]
pub struct PrometheusPushConfig {
    /// The gateway URL.
    pub url: String,
}
