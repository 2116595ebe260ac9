// @awa-component: RELAY-RelayConfig
//
//! Relay configuration resolved from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.8;
pub const DEFAULT_TOP_K: u32 = 40;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Generation parameters fixed on a conversation when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Tunables for [`crate::relay::ChatRelay`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Deadline for one upstream exchange.
    pub request_timeout: Duration,
    /// Parameters applied to newly created conversations.
    pub generation: GenerationParams,
    /// Sessions idle for longer than this are evicted. `None` disables eviction.
    pub session_idle_ttl: Option<Duration>,
    /// How often the idle sweeper runs.
    pub sweep_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            generation: GenerationParams::default(),
            session_idle_ttl: Some(Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS)),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl RelayConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                | Default |
    /// |-------------------------|---------|
    /// | `REQUEST_TIMEOUT_SECS`  | `30`    |
    /// | `MAX_OUTPUT_TOKENS`     | `1500`  |
    /// | `TEMPERATURE`           | `0.7`   |
    /// | `TOP_P`                 | `0.8`   |
    /// | `TOP_K`                 | `40`    |
    /// | `SESSION_IDLE_TTL_SECS` | `3600` (`0` disables eviction) |
    pub fn from_env() -> Self {
        let idle_ttl_secs = env_or("SESSION_IDLE_TTL_SECS", DEFAULT_SESSION_IDLE_TTL_SECS);
        Self {
            request_timeout: Duration::from_secs(env_or(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            generation: GenerationParams {
                max_output_tokens: env_or("MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS),
                temperature: env_or("TEMPERATURE", DEFAULT_TEMPERATURE),
                top_p: env_or("TOP_P", DEFAULT_TOP_P),
                top_k: env_or("TOP_K", DEFAULT_TOP_K),
            },
            session_idle_ttl: (idle_ttl_secs > 0).then(|| Duration::from_secs(idle_ttl_secs)),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Read and parse an environment variable, falling back to `default` when it
/// is unset or malformed.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(name: &str, raw: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(variable = name, value = raw, %default, "ignoring unparsable value");
            default
        }
    }
}
