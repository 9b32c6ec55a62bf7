// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - Keys are cached with a configurable TTL
//! - Stale cache is used on fetch failure (fail-open for availability)
//! - A token signed with an unknown `kid` forces one early refresh, at most
//!   once per [`MIN_REFRESH_INTERVAL`], to pick up rotated keys
//! - Failed fetches count towards that interval too, so an unreachable
//!   provider is not hit once per request
//! - A static key set can be installed instead of a URL; it never expires

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Lower bound between forced refreshes triggered by unknown key ids.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// HTTP timeout for the JWKS endpoint.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS cache entry.
struct CacheEntry {
    jwks: Arc<JwkSet>,
    fetched_at: Instant,
}

enum KeySource {
    Remote { url: String, client: reqwest::Client },
    Static,
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    source: Arc<KeySource>,
    /// Cache TTL
    cache_ttl: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Start of the most recent fetch, successful or not
    last_attempt: Arc<RwLock<Option<Instant>>>,
}

impl std::fmt::Debug for JwksManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksManager")
            .field("jwks_url", &self.jwks_url())
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl JwksManager {
    /// Create a manager that fetches keys from `jwks_url`
    /// (e.g. `https://tenant.auth0.com/.well-known/jwks.json`).
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            source: Arc::new(KeySource::Remote {
                url: jwks_url.into(),
                client,
            }),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            last_attempt: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a manager over a fixed key set. No network access is made.
    pub fn from_key_set(jwks: JwkSet) -> Self {
        Self {
            source: Arc::new(KeySource::Static),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(Some(CacheEntry {
                jwks: Arc::new(jwks),
                fetched_at: Instant::now(),
            }))),
            last_attempt: Arc::new(RwLock::new(None)),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// The JWKS URL, or `None` for a static key set.
    pub fn jwks_url(&self) -> Option<&str> {
        match self.source.as_ref() {
            KeySource::Remote { url, .. } => Some(url),
            KeySource::Static => None,
        }
    }

    fn is_static(&self) -> bool {
        matches!(self.source.as_ref(), KeySource::Static)
    }

    /// Fetch JWKS (with caching).
    async fn get_jwks(&self) -> Result<Arc<JwkSet>, AuthError> {
        let stale = {
            let cache = self.cache.read().await;
            match &*cache {
                Some(entry) if self.is_static() || entry.fetched_at.elapsed() < self.cache_ttl => {
                    return Ok(Arc::clone(&entry.jwks));
                }
                Some(entry) => Some(Arc::clone(&entry.jwks)),
                None => None,
            }
        };

        if let Some(jwks) = &stale {
            if !self.may_attempt_fetch().await {
                return Ok(Arc::clone(jwks));
            }
        }

        match self.fetch_and_store().await {
            Ok(jwks) => Ok(jwks),
            Err(e) => match stale {
                Some(jwks) => {
                    tracing::warn!(error = %e, "JWKS refresh failed, using stale keys");
                    Ok(jwks)
                }
                None => Err(e),
            },
        }
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let KeySource::Remote { url, client } = self.source.as_ref() else {
            return Err(AuthError::KeySetUnavailable(
                "static key set cannot be refreshed".to_string(),
            ));
        };

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        tracing::debug!(keys = jwks.keys.len(), "Fetched JWKS");
        Ok(jwks)
    }

    async fn fetch_and_store(&self) -> Result<Arc<JwkSet>, AuthError> {
        *self.last_attempt.write().await = Some(Instant::now());
        let jwks = Arc::new(self.fetch_jwks().await?);
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: Arc::clone(&jwks),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    /// Get the decoding key for a token.
    ///
    /// With a `kid`, the matching key is required; without one, the first
    /// usable key in the set is returned. A missing key is reported as an
    /// invalid signature: the token was not signed by any known key.
    pub async fn decoding_key(
        &self,
        kid: Option<&str>,
    ) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.get_jwks().await?;

        let Some(kid) = kid else {
            return jwks
                .keys
                .iter()
                .find_map(|jwk| jwk_to_decoding_key(jwk).ok())
                .ok_or(AuthError::InvalidSignature);
        };

        if let Some(jwk) = jwks.find(kid) {
            return jwk_to_decoding_key(jwk);
        }

        if self.may_attempt_fetch().await {
            tracing::info!(kid, "Unknown key id, refreshing JWKS");
            match self.fetch_and_store().await {
                Ok(jwks) => {
                    if let Some(jwk) = jwks.find(kid) {
                        return jwk_to_decoding_key(jwk);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, kid, "JWKS refresh for unknown key id failed");
                }
            }
        }

        Err(AuthError::InvalidSignature)
    }

    async fn may_attempt_fetch(&self) -> bool {
        if self.is_static() {
            return false;
        }
        match *self.last_attempt.read().await {
            Some(at) => at.elapsed() >= MIN_REFRESH_INTERVAL,
            None => true,
        }
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        if self.is_static() {
            return Ok(());
        }
        self.fetch_and_store().await.map(|_| ())
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        match &*cache {
            Some(entry) => self.is_static() || entry.fetched_at.elapsed() < self.cache_ttl,
            None => false,
        }
    }
}

/// Convert a JWK to a DecodingKey.
///
/// `from_jwk` handles the base64url (unpadded) encoding of every key type.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    let alg = match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => match jwk.common.key_algorithm {
            Some(KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(KeyAlgorithm::RS512) => Algorithm::RS512,
            _ => Algorithm::RS256,
        },
        AlgorithmParameters::EllipticCurve(_) => match jwk.common.key_algorithm {
            Some(KeyAlgorithm::ES384) => Algorithm::ES384,
            _ => Algorithm::ES256,
        },
        AlgorithmParameters::OctetKey(_) => match jwk.common.key_algorithm {
            Some(KeyAlgorithm::HS384) => Algorithm::HS384,
            Some(KeyAlgorithm::HS512) => Algorithm::HS512,
            _ => Algorithm::HS256,
        },
        _ => {
            return Err(AuthError::Internal(
                "Unsupported key type in JWKS".to_string(),
            ))
        }
    };

    let key = DecodingKey::from_jwk(jwk)
        .map_err(|e| AuthError::Internal(format!("Failed to create decoding key: {e}")))?;
    Ok((key, alg))
}
