use anyhow::Context;
use std::env;

/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. For formatting info, see [EnvFilter's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// Socket address the HTTP server binds to
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
/// When "true" or "1", every to-do route requires HTTP basic authentication against stored users
pub const REQUIRE_AUTH: &str = "REQUIRE_AUTH";
/// Username of a user to create on startup if nobody with that name exists yet
pub const BOOTSTRAP_USERNAME: &str = "BOOTSTRAP_USERNAME";
/// Password for the user described by [BOOTSTRAP_USERNAME]
pub const BOOTSTRAP_PASSWORD: &str = "BOOTSTRAP_PASSWORD";
/// URL for accessing the PostgreSQL database during integration tests (should not contain a database name in the path)
pub const TEST_DB_URL: &str = "TEST_DB_URL";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Export endpoints for OpenTelemetry data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtelEndpoints {
    pub spans: String,
    pub metrics: String,
}

/// Credentials for the user seeded at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapUser {
    pub username: String,
    pub password: String,
}

/// Service configuration read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub require_auth: bool,
    pub otel: Option<OtelEndpoints>,
    pub bootstrap_user: Option<BootstrapUser>,
}

impl AppConfig {
    /// Reads configuration from process environment variables
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup so parsing doesn't depend on global state
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let database_url = lookup(DB_URL)
            .with_context(|| format!("the {DB_URL} environment variable must be set"))?;
        let listen_addr = lookup(LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let require_auth = match lookup(REQUIRE_AUTH) {
            None => false,
            Some(flag) => parse_flag(&flag)
                .with_context(|| format!("{REQUIRE_AUTH} must be true/false, got \"{flag}\""))?,
        };

        let otel = match (lookup(OTEL_SPAN_EXPORT_URL), lookup(OTEL_METRIC_EXPORT_URL)) {
            (Some(spans), Some(metrics)) => Some(OtelEndpoints { spans, metrics }),
            _ => None,
        };

        let bootstrap_user = match (lookup(BOOTSTRAP_USERNAME), lookup(BOOTSTRAP_PASSWORD)) {
            (Some(username), Some(password)) => Some(BootstrapUser { username, password }),
            (None, None) => None,
            _ => anyhow::bail!(
                "{BOOTSTRAP_USERNAME} and {BOOTSTRAP_PASSWORD} must be provided together"
            ),
        };

        Ok(AppConfig {
            database_url,
            listen_addr,
            require_auth,
            otel,
            bootstrap_user,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
