use std::str::FromStr;

use anyhow::{Context, Result, bail};
use payroll_core::domain::value_objects::shift_times::ShiftPolicy;

use super::config_model::{BackendServer, Cors, Database, DotEnvyConfig};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT_MIB: u64 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Upper bound for `DELIVERY_MAX_HOURS`; one leap year.
const MAX_SHIFT_HOURS: i64 = 24 * 366;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    from_lookup(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup. `load` passes the process environment.
pub fn from_lookup<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let backend_server = BackendServer {
        port: parse_or(&lookup, "SERVER_PORT", DEFAULT_PORT)?,
        body_limit: parse_or(&lookup, "SERVER_BODY_LIMIT", DEFAULT_BODY_LIMIT_MIB)?,
        timeout: parse_or(&lookup, "SERVER_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
    };

    let database = Database {
        url: non_empty(&lookup, "DATABASE_URL").context("DATABASE_URL is not set")?,
        max_connections: parse_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DB_MAX_CONNECTIONS,
        )?,
        connect_timeout: parse_or(
            &lookup,
            "DATABASE_CONNECT_TIMEOUT",
            DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        )?,
    };

    if database.max_connections == 0 {
        bail!("DATABASE_MAX_CONNECTIONS must be positive");
    }

    let cors = Cors {
        allowed_origins: non_empty(&lookup, "CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect(),
    };

    let defaults = ShiftPolicy::default();
    let shift_policy = ShiftPolicy {
        allow_cross_day: match non_empty(&lookup, "DELIVERY_ALLOW_CROSS_DAY") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("DELIVERY_ALLOW_CROSS_DAY is invalid: {raw}"))?,
            None => defaults.allow_cross_day,
        },
        min_minutes: parse_or(&lookup, "DELIVERY_MIN_MINUTES", defaults.min_minutes)?,
        max_hours: parse_or(&lookup, "DELIVERY_MAX_HOURS", defaults.max_hours)?,
    };

    if shift_policy.min_minutes < 0 {
        bail!("DELIVERY_MIN_MINUTES must not be negative");
    }
    if shift_policy.max_hours <= 0 || shift_policy.max_hours > MAX_SHIFT_HOURS {
        bail!("DELIVERY_MAX_HOURS must be between 1 and {MAX_SHIFT_HOURS}");
    }
    let max_minutes = shift_policy
        .max_hours
        .checked_mul(60)
        .context("DELIVERY_MAX_HOURS is too large")?;
    if shift_policy.min_minutes > max_minutes {
        bail!("DELIVERY_MIN_MINUTES must not exceed DELIVERY_MAX_HOURS");
    }

    Ok(DotEnvyConfig {
        backend_server,
        database,
        cors,
        shift_policy,
    })
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} is invalid: {raw}")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
