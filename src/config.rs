use std::ops::RangeInclusive;

use anyhow::Context;
use serde::Deserialize;

const TTL_DAYS: RangeInclusive<i64> = 1..=365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Base URL under which stored objects are publicly reachable.
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fishnotes".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fishnotes-users".into()),
            ttl_days: parse_ttl_days(std::env::var("SESSION_TTL_DAYS").ok())?,
        };

        let endpoint =
            std::env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".into());
        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "fishnotes".into());
        let public_url = std::env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));
        let storage = StorageConfig {
            access_key: std::env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("STORAGE_SECRET_KEY").unwrap_or_default(),
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint,
            bucket,
            public_url,
        };

        Ok(Self {
            database_url,
            jwt,
            storage,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "./public".into()),
        })
    }
}

fn parse_ttl_days(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(7);
    };
    let days: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("SESSION_TTL_DAYS is not a number: {raw:?}"))?;
    if !TTL_DAYS.contains(&days) {
        anyhow::bail!(
            "SESSION_TTL_DAYS must be between {} and {}, got {days}",
            TTL_DAYS.start(),
            TTL_DAYS.end()
        );
    }
    Ok(days)
}
