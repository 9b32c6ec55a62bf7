// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb database file | `./data/menu.redb` |
//! | `AUTH_JWKS_URL` | Identity provider JWKS endpoint | Required |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | Optional |
//! | `AUTH_AUDIENCE` | Expected JWT audience claim | Optional |
//! | `JWKS_CACHE_TTL_SECS` | Signing key cache lifetime | `300` |
//! | `DB_MIGRATE` | `none`, `create` or `reset` | `none` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::auth::{AuthConfig, AuthError, JwksManager};
use crate::storage::MigrationMode;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const JWKS_URL_ENV: &str = "AUTH_JWKS_URL";
pub const ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUDIENCE_ENV: &str = "AUTH_AUDIENCE";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const MIGRATE_ENV: &str = "DB_MIGRATE";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "./data/menu.redb";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub jwks_url: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub jwks_cache_ttl: Duration,
    pub migration: MigrationMode,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_or(get(HOST_ENV), HOST_ENV, DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, Some(DEFAULT_PORT))?;
        let jwks_cache_ttl: u64 = parse_or(
            get(JWKS_CACHE_TTL_ENV),
            JWKS_CACHE_TTL_ENV,
            Some(crate::auth::jwks::DEFAULT_CACHE_TTL.as_secs()),
        )?;
        let migration: MigrationMode = parse_or(
            get(MIGRATE_ENV),
            MIGRATE_ENV,
            Some(MigrationMode::None),
        )?;

        let jwks_url = get(JWKS_URL_ENV).ok_or(ConfigError::Missing(JWKS_URL_ENV))?;
        validate_jwks_url(&jwks_url)?;

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            database_path: get(DATABASE_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            jwks_url,
            issuer: get(ISSUER_ENV),
            audience: get(AUDIENCE_ENV),
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl),
            migration,
        })
    }

    /// Build the token verifier described by this configuration.
    pub fn auth_config(&self) -> Result<AuthConfig, AuthError> {
        let jwks = JwksManager::new(&self.jwks_url)?.with_cache_ttl(self.jwks_cache_ttl);
        let mut auth = AuthConfig::new(jwks);
        if let Some(issuer) = &self.issuer {
            auth = auth.with_issuer(issuer);
        }
        if let Some(audience) = &self.audience {
            auth = auth.with_audience(audience);
        }
        Ok(auth)
    }
}

fn parse_or<T>(
    value: Option<String>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}

/// JWKS must come over HTTPS; plain HTTP is tolerated for loopback only.
fn validate_jwks_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: JWKS_URL_ENV,
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
    match url.scheme() {
        "https" => Ok(()),
        "http" if loopback => Ok(()),
        scheme => Err(invalid(format!("scheme `{scheme}` is not allowed, use https"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const JWKS: (&str, &str) = (JWKS_URL_ENV, "https://tenant.auth0.com/.well-known/jwks.json");

    #[test]
    fn defaults_apply() {
        let config = load(&[JWKS]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.jwks_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.migration, MigrationMode::None);
        assert!(config.issuer.is_none());
        assert!(config.audience.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            JWKS,
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "5000"),
            (DATABASE_PATH_ENV, "/tmp/menu.redb"),
            (ISSUER_ENV, "https://tenant.auth0.com/"),
            (AUDIENCE_ENV, "menu"),
            (JWKS_CACHE_TTL_ENV, "60"),
            (MIGRATE_ENV, "create"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from("/tmp/menu.redb"));
        assert_eq!(config.issuer.as_deref(), Some("https://tenant.auth0.com/"));
        assert_eq!(config.audience.as_deref(), Some("menu"));
        assert_eq!(config.jwks_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.migration, MigrationMode::Create);
    }

    #[test]
    fn jwks_url_is_required() {
        assert_eq!(load(&[]), Err(ConfigError::Missing(JWKS_URL_ENV)));
        assert_eq!(load(&[(JWKS_URL_ENV, "  ")]), Err(ConfigError::Missing(JWKS_URL_ENV)));
    }

    #[test]
    fn jwks_url_must_be_https_unless_loopback() {
        assert!(load(&[(JWKS_URL_ENV, "http://idp.example/jwks.json")]).is_err());
        assert!(load(&[(JWKS_URL_ENV, "http://localhost:8081/jwks.json")]).is_ok());
        assert!(load(&[(JWKS_URL_ENV, "not a url")]).is_err());
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = load(&[JWKS, (PORT_ENV, "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: PORT_ENV, .. }));

        let err = load(&[JWKS, (MIGRATE_ENV, "drop")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: MIGRATE_ENV, .. }));
    }

    #[test]
    fn log_format_parses() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[tokio::test]
    async fn builds_auth_config() {
        let config = load(&[JWKS, (ISSUER_ENV, "https://tenant.auth0.com/")]).unwrap();
        let auth = config.auth_config().unwrap();
        assert_eq!(auth.issuer.as_deref(), Some("https://tenant.auth0.com/"));
        assert_eq!(auth.jwks.jwks_url(), Some(JWKS.1));
    }
}
