//! Server configuration.
//!
//! Each setting is taken from the command-line flag if given, else from its
//! `REPAIRDESK_*` environment variable, else from the built-in default.

use std::net::IpAddr;
use std::path::PathBuf;

/// Default listen port.
pub(crate) const DEFAULT_PORT: u16 = 8080;

/// Default rate limit: 60 requests per minute per IP.
pub(crate) const DEFAULT_RATE_LIMIT: u64 = 60;

const ENV_PORT: &str = "REPAIRDESK_PORT";
const ENV_BIND: &str = "REPAIRDESK_BIND";
const ENV_DATA_FILE: &str = "REPAIRDESK_DATA_FILE";
const ENV_RATE_LIMIT: &str = "REPAIRDESK_RATE_LIMIT";
const ENV_API_KEY: &str = "REPAIRDESK_API_KEY";

/// Flags given to `repairdesk serve`. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub(crate) struct ServeArgs {
    pub(crate) port: Option<u16>,
    pub(crate) bind: Option<IpAddr>,
    pub(crate) data_file: Option<PathBuf>,
    pub(crate) rate_limit: Option<u64>,
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ServeConfig {
    pub(crate) bind: IpAddr,
    pub(crate) port: u16,
    /// JSON file backing the store. `None` = in-memory store.
    pub(crate) data_file: Option<PathBuf>,
    /// Maximum requests per IP per minute.
    pub(crate) rate_limit: u64,
    /// Required API key. `None` = no auth.
    pub(crate) api_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ServeConfig {
    /// Resolve against the process environment.
    pub(crate) fn resolve(args: ServeArgs) -> Result<Self, ConfigError> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub(crate) fn resolve_with(
        args: ServeArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let port = match args.port {
            Some(p) => p,
            None => parse_env(&env, ENV_PORT)?.unwrap_or(DEFAULT_PORT),
        };
        let bind = match args.bind {
            Some(b) => b,
            None => parse_env(&env, ENV_BIND)?.unwrap_or(IpAddr::from([0, 0, 0, 0])),
        };
        let rate_limit = match args.rate_limit {
            Some(r) => r,
            None => parse_env(&env, ENV_RATE_LIMIT)?.unwrap_or(DEFAULT_RATE_LIMIT),
        };
        let data_file = args
            .data_file
            .or_else(|| non_empty(&env, ENV_DATA_FILE).map(PathBuf::from));
        let api_key = non_empty(&env, ENV_API_KEY);

        Ok(ServeConfig {
            bind,
            port,
            data_file,
            rate_limit,
            api_key,
        })
    }
}

fn non_empty(env: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    env(var).filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(
    env: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(env, var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnv {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
