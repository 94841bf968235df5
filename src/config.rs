//! Client configuration resolved from build-time environment variables.
//!
//! The browser has no process environment, so values are captured with
//! `option_env!` when the WASM bundle is built and parsed once at start-up.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_DOMAIN: &str = "http://localhost:3000";
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "auth_token";
pub const DEFAULT_PROFILE_STALE_TIME_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_QUERY_RETRY: u32 = 1;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin the `/auth/*` endpoints are resolved against, without trailing slash.
    pub api_base_domain: String,
    /// `localStorage` key holding the bearer token.
    pub token_storage_key: String,
    /// How long a fetched profile is served from cache before it is stale.
    pub profile_stale_time_ms: u64,
    /// Retries allowed for queries that do not override the policy.
    pub query_retry: u32,
    pub log_level: log::Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_domain: DEFAULT_API_BASE_DOMAIN.to_owned(),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_owned(),
            profile_stale_time_ms: DEFAULT_PROFILE_STALE_TIME_MS,
            query_retry: DEFAULT_QUERY_RETRY,
            log_level: log::Level::Info,
        }
    }
}

impl ClientConfig {
    /// Build config from variables captured at compile time.
    ///
    /// Optional:
    /// - `API_BASE_DOMAIN`: default `http://localhost:3000`
    /// - `AUTH_TOKEN_KEY`: default `auth_token`
    /// - `PROFILE_STALE_TIME_MS`: default 300000
    /// - `QUERY_RETRY`: default 1
    /// - `CLIENT_LOG_LEVEL`: default `info`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric value or the log
    /// level does not parse.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match key {
            "API_BASE_DOMAIN" => option_env!("API_BASE_DOMAIN"),
            "AUTH_TOKEN_KEY" => option_env!("AUTH_TOKEN_KEY"),
            "PROFILE_STALE_TIME_MS" => option_env!("PROFILE_STALE_TIME_MS"),
            "QUERY_RETRY" => option_env!("QUERY_RETRY"),
            "CLIENT_LOG_LEVEL" => option_env!("CLIENT_LOG_LEVEL"),
            _ => None,
        })
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_build_env`].
    pub fn from_lookup<'a, F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let defaults = Self::default();

        let api_base_domain = lookup("API_BASE_DOMAIN")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_BASE_DOMAIN)
            .trim_end_matches('/')
            .to_owned();
        let token_storage_key = lookup("AUTH_TOKEN_KEY")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or(defaults.token_storage_key, str::to_owned);
        let profile_stale_time_ms =
            parse_or("PROFILE_STALE_TIME_MS", lookup("PROFILE_STALE_TIME_MS"), defaults.profile_stale_time_ms)?;
        let query_retry = parse_or("QUERY_RETRY", lookup("QUERY_RETRY"), defaults.query_retry)?;
        let log_level = parse_or("CLIENT_LOG_LEVEL", lookup("CLIENT_LOG_LEVEL"), defaults.log_level)?;

        Ok(Self { api_base_domain, token_storage_key, profile_stale_time_ms, query_retry, log_level })
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<&str>, default: T) -> Result<T, ConfigError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var, value: value.to_owned() }),
    }
}
