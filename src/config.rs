use std::path::PathBuf;

use anyhow::Context;

/// Ten years; keeps token expiry arithmetic far from overflow.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 366 * 10;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub schedule_path: PathBuf,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://quran_platform.db".into());
        let schedule_path = std::env::var("SCHEDULE_PATH")
            .unwrap_or_else(|_| "data/schedule.csv".into())
            .into();

        let secret = std::env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        anyhow::ensure!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "five-shields".into()),
            ttl_minutes: check_ttl_minutes(parse_var("SESSION_TTL_MINUTES", 60 * 24 * 7)?)?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
        };

        Ok(Self {
            database_url,
            schedule_path,
            session,
        })
    }
}

fn check_ttl_minutes(minutes: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        (1..=MAX_SESSION_TTL_MINUTES).contains(&minutes),
        "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
