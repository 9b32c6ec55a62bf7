// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the per-request authorization context.

use std::collections::BTreeSet;

use serde::Deserialize;

/// Claims read from a verified access token.
///
/// `exp`, `iss`, `aud` and `nbf` are checked by `jsonwebtoken` during
/// decoding and are not needed afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject (caller identity)
    #[serde(default)]
    pub sub: Option<String>,

    /// RBAC permissions granted to the caller
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Authorization context of a single request.
///
/// Built from a verified token and dropped when the request completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Token subject, if the provider set one
    pub subject: Option<String>,
    /// Every permission the token grants
    pub permissions: BTreeSet<String>,
}

impl AuthContext {
    /// Create from verified claims. Only the `permissions` array grants
    /// access; OAuth2 `scope` strings are ignored.
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            permissions: claims.permissions.into_iter().collect(),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}
