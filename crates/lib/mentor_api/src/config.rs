//! API server configuration.

use std::env;

use mentor_core::RelayConfig;
use mentor_core::model::Provider;
use tracing::warn;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,https://localhost:5173";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8000").
    pub bind_addr: String,
    /// Origins allowed to make cross-origin requests.
    pub allowed_origins: Vec<String>,
    /// Include internal error details in error responses.
    pub expose_error_details: bool,
    /// Upstream model provider.
    pub provider: Provider,
    /// Relay tunables (timeouts, generation params, idle TTL).
    pub relay: RelayConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable          | Default                                          |
    /// |-------------------|--------------------------------------------------|
    /// | `BIND_ADDR`       | `0.0.0.0:8000`                                   |
    /// | `ALLOWED_ORIGINS` | `http://localhost:5173,https://localhost:5173`   |
    /// | `APP_ENV`         | `development` (`production` hides error details) |
    /// | `CHAT_PROVIDER`   | `gemini`                                         |
    ///
    /// Relay settings come from [`RelayConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.into()),
            ),
            expose_error_details: !is_production(env::var("APP_ENV").ok().as_deref()),
            provider: resolve_provider(env::var("CHAT_PROVIDER").ok().as_deref()),
            relay: RelayConfig::from_env(),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn is_production(app_env: Option<&str>) -> bool {
    app_env.is_some_and(|v| v.trim().eq_ignore_ascii_case("production"))
}

fn resolve_provider(raw: Option<&str>) -> Provider {
    match raw {
        None => Provider::Gemini,
        Some(name) => Provider::parse(name).unwrap_or_else(|| {
            warn!(provider = name, "unknown CHAT_PROVIDER, using gemini");
            Provider::Gemini
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" http://a.test , https://b.test,,"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert_eq!(parse_origins(DEFAULT_ALLOWED_ORIGINS).len(), 2);
    }

    #[test]
    fn only_production_hides_details() {
        assert!(is_production(Some("production")));
        assert!(is_production(Some(" Production ")));
        assert!(!is_production(Some("development")));
        assert!(!is_production(None));
    }

    #[test]
    fn provider_defaults_to_gemini() {
        assert_eq!(resolve_provider(None), Provider::Gemini);
        assert_eq!(resolve_provider(Some("local")), Provider::Local);
        assert_eq!(resolve_provider(Some("bogus")), Provider::Gemini);
    }
}
