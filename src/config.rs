//! # Application Configuration
//!
//! All environment-dependent settings are read once at startup into an
//! [`AppConfig`] and handed to the components that need them.
//!
//! ## Environment Variables
//!
//! - `APP_ENV` - `production` selects the HTTP mailer; anything else logs emails
//! - `BASE_URL` - Prefix of verification links (required in production)
//! - `PORT` - Listening port, defaults to 5000
//! - `DATABASE_URL` - PostgreSQL URL; without it an in-memory store is used
//! - `MAIL_API_URL`, `MAIL_API_KEY` (or `MAIL_API_KEY_FILE`), `SENDER_EMAIL` - Required in production
//! - `HASH_COST` - bcrypt cost between 4 and 31, defaults to 10

use std::env;

use reqwest::Url;
use thiserror::Error;

use crate::utils::{constant::*, secret::read_secret};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env variable `{0}` should be set")]
    Missing(&'static str),

    #[error("env variable `{name}` has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Credentials for the external mail API.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    /// Links are built as `<base_url>/user/verify/<id>/<token>`.
    pub base_url: Url,
    pub port: u16,
    pub database_url: Option<String>,
    /// Always `Some` in production.
    pub mail: Option<MailConfig>,
    pub hash_cost: u32,
}

impl AppConfig {
    /// Resolves the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a production-only variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Resolves the configuration through `var`, which returns the value of
    /// a variable or `None` when it is unset.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match var("APP_ENV") {
            Some(value) if value.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        };

        let base_url = match (var("BASE_URL"), environment) {
            (Some(raw), _) => parse_url("BASE_URL", &raw)?,
            (None, Environment::Development) => parse_url("BASE_URL", DEVELOPMENT_BASE_URL)?,
            (None, Environment::Production) => return Err(ConfigError::Missing("BASE_URL")),
        };

        let port = parse_or(&var, "PORT", DEFAULT_PORT)?;
        let hash_cost = parse_or(&var, "HASH_COST", DEFAULT_HASH_COST)?;
        if !HASH_COST_RANGE.contains(&hash_cost) {
            return Err(ConfigError::Invalid {
                name: "HASH_COST",
                value: hash_cost.to_string(),
            });
        }
        let database_url = var("DATABASE_URL").filter(|url| !url.is_empty());

        let mail = match environment {
            Environment::Production => Some(MailConfig {
                api_url: required(&var, "MAIL_API_URL")?,
                api_key: read_secret("MAIL_API_KEY", &var)
                    .ok_or(ConfigError::Missing("MAIL_API_KEY"))?,
                sender: required(&var, "SENDER_EMAIL")?,
            }),
            Environment::Development => None,
        };

        Ok(Self {
            environment,
            base_url,
            port,
            database_url,
            mail,
            hash_cost,
        })
    }
}

fn required<F>(var: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
