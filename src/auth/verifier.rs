// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification.
//!
//! [`AuthConfig::verify`] decodes a bearer token, verifies its signature
//! against the identity provider's key set, checks expiry, issuer and
//! audience, and finally checks that the required permission was granted.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};

use super::claims::{AuthContext, TokenClaims};
use super::error::AuthError;
use super::jwks::JwksManager;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Authentication configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// JWKS manager for key fetching
    pub jwks: JwksManager,
    /// Expected issuer; unchecked when `None`
    pub issuer: Option<String>,
    /// Expected audience; unchecked when `None`
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn new(jwks: JwksManager) -> Self {
        Self {
            jwks,
            issuer: None,
            audience: None,
        }
    }

    /// Set the expected issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the expected audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Verify `token` and require `permission` in its permission set.
    pub async fn verify(&self, token: &str, permission: &str) -> Result<AuthContext, AuthError> {
        let ctx = self.authenticate(token).await?;
        if !ctx.has_permission(permission) {
            return Err(AuthError::InsufficientPermission(permission.to_string()));
        }
        Ok(ctx)
    }

    /// Verify `token` without any permission requirement.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        // Decode header to get kid (key ID)
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        let (decoding_key, algorithm) = self.jwks.decoding_key(header.kid.as_deref()).await?;

        // Only the key's own algorithm is accepted; a mismatched `alg` header
        // fails decoding with `InvalidAlgorithm`.
        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }

        if let Some(ref audience) = self.audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        let token_data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::InvalidSubject
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(AuthContext::from_claims(token_data.claims))
    }
}
