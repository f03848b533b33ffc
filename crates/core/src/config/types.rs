use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use url::Url;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Ingress HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Message bus (NATS) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusConfig {
    /// Server URL (e.g., "nats://127.0.0.1:4222")
    #[serde(default = "default_bus_url")]
    pub url: String,
    /// Subject carrying raw complaints
    #[serde(default = "default_raw_subject")]
    pub raw_subject: String,
    /// Subject carrying enriched tickets
    #[serde(default = "default_enriched_subject")]
    pub enriched_subject: String,
    /// Name reported to the NATS server for this connection
    #[serde(default = "default_connection_name")]
    pub connection_name: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: default_bus_url(),
            raw_subject: default_raw_subject(),
            enriched_subject: default_enriched_subject(),
            connection_name: default_connection_name(),
        }
    }
}

fn default_bus_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_raw_subject() -> String {
    "support.raw".to_string()
}

fn default_enriched_subject() -> String {
    "support.enriched".to_string()
}

fn default_connection_name() -> String {
    "supportai".to_string()
}

/// Generation service (Ollama) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Base URL of the generation service
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on a single generation call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// How much of an error body is kept for diagnostics
    #[serde(default = "default_max_error_body")]
    pub max_error_body_bytes: usize,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_error_body_bytes: default_max_error_body(),
        }
    }
}

fn default_api_base() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma3".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_error_body() -> usize {
    512
}

/// Enrichment pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Maximum number of enrichment calls in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_max_concurrent() -> usize {
    8
}

/// Sanitized config for API responses (credentials redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub bus: SanitizedBusConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
}

/// Bus config with any URL credentials stripped
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBusConfig {
    pub url: String,
    pub credentials_configured: bool,
    pub raw_subject: String,
    pub enriched_subject: String,
    pub connection_name: String,
}

/// Strip credentials from a NATS server URL list, returning the redacted
/// list and whether any server carried credentials.
///
/// Accepts the comma-separated, optionally scheme-less form the NATS client
/// takes. A server that does not parse is replaced by a placeholder.
fn redact_userinfo(urls: &str) -> (String, bool) {
    let mut had_credentials = false;
    let redacted: Vec<String> = urls
        .split(',')
        .map(str::trim)
        .filter(|server| !server.is_empty())
        .map(|server| {
            let (redacted, found) = redact_server(server);
            had_credentials |= found;
            redacted
        })
        .collect();
    (redacted.join(","), had_credentials)
}

fn redact_server(server: &str) -> (String, bool) {
    let parsed = if server.contains("://") {
        Url::parse(server)
    } else {
        Url::parse(&format!("nats://{server}"))
    };

    let Ok(mut url) = parsed else {
        return ("<invalid url>".to_string(), server.contains('@'));
    };

    let found = !url.username().is_empty() || url.password().is_some();
    if found && (url.set_username("").is_err() || url.set_password(None).is_err()) {
        return ("<invalid url>".to_string(), true);
    }
    (url.to_string(), found)
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let (url, credentials_configured) = redact_userinfo(&config.bus.url);
        Self {
            server: config.server.clone(),
            bus: SanitizedBusConfig {
                url,
                credentials_configured,
                raw_subject: config.bus.raw_subject.clone(),
                enriched_subject: config.bus.enriched_subject.clone(),
                connection_name: config.bus.connection_name.clone(),
            },
            llm: config.llm.clone(),
            pipeline: config.pipeline.clone(),
        }
    }
}
