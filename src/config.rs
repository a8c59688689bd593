use crate::days::CATALOGUE;
use crate::errors::ConfigError;
use crate::unlock::{UnlockMode, UnlockPolicy};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Warsaw;
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_TOTAL_DAYS: u32 = 14;

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: String,
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    GitHub(GitHubConfig),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: StoreBackend,
    pub store_timeout: Duration,
    pub timezone: Tz,
    pub unlock_mode: UnlockMode,
    pub start_date: NaiveDate,
    pub total_days: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            get("STORE_TIMEOUT_SECS"),
            "STORE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(invalid("STORE_TIMEOUT_SECS", "must be at least 1"));
        }

        let timezone = match get("APP_TZ") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|err| invalid("APP_TZ", err.to_string()))?,
            None => DEFAULT_TIMEZONE,
        };

        let unlock_mode = match get("UNLOCK_MODE") {
            Some(value) => value
                .parse::<UnlockMode>()
                .map_err(|reason| invalid("UNLOCK_MODE", reason))?,
            None => UnlockMode::Global,
        };

        let start_date = match get("START_DATE") {
            Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .map_err(|err| invalid("START_DATE", err.to_string()))?,
            None => default_start_date(),
        };

        let total_days = parse_or(get("TOTAL_DAYS"), "TOTAL_DAYS", DEFAULT_TOTAL_DAYS)?;
        if total_days == 0 || total_days as usize > CATALOGUE.len() {
            return Err(invalid(
                "TOTAL_DAYS",
                format!("must be between 1 and {}", CATALOGUE.len()),
            ));
        }

        let backend = resolve_backend(&get)?;

        Ok(Self {
            port,
            backend,
            store_timeout: Duration::from_secs(timeout_secs),
            timezone,
            unlock_mode,
            start_date,
            total_days,
        })
    }

    pub fn unlock_policy(&self) -> UnlockPolicy {
        UnlockPolicy::new(self.unlock_mode, self.start_date, self.total_days)
    }
}

fn resolve_backend<G>(get: &G) -> Result<StoreBackend, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let token = get("GITHUB_TOKEN");
    let repo = get("GITHUB_REPO");
    let requested = get("STORE_BACKEND").map(|value| value.to_ascii_lowercase());

    let github = |token: String, repo: String| {
        StoreBackend::GitHub(GitHubConfig {
            api_base: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            token,
            repo,
            branch: get("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        })
    };

    match requested.as_deref() {
        Some("memory") => Ok(StoreBackend::Memory),
        Some("github") => {
            let token = token.ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;
            let repo = repo.ok_or(ConfigError::Missing("GITHUB_REPO"))?;
            Ok(github(token, repo))
        }
        Some(other) => Err(invalid(
            "STORE_BACKEND",
            format!("unknown backend '{other}'"),
        )),
        None => match (token, repo) {
            (Some(token), Some(repo)) => Ok(github(token, repo)),
            _ => Ok(StoreBackend::Memory),
        },
    }
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|err: T::Err| invalid(key, err.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}
