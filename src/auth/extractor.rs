// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor gating a handler on a permission.
//!
//! Put [`Require`] first in a handler's argument list so the token is checked
//! before the path or body is parsed:
//!
//! ```rust,ignore
//! async fn delete_item(
//!     Require(ctx, ..): Require<DeleteItems>,
//!     State(state): State<AppState>,
//!     ApiPath(id): ApiPath<u64>,
//! ) -> Result<Json<DeletedResponse>, ApiError> {
//!     // ctx.permissions contains "delete:items"
//! }
//! ```

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthContext, AuthError, Permission};
use crate::state::AppState;

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    let mut parts = auth_header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedToken),
    }
}

/// Extractor that requires permission `P`.
///
/// Rejects with the [`AuthError`] produced by verification: 401 when the
/// caller could not be authenticated, 403 when `P::SCOPE` was not granted.
pub struct Require<P: Permission>(pub AuthContext, pub PhantomData<P>);

impl<P: Permission> std::fmt::Debug for Require<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Require").field(&P::SCOPE).field(&self.0).finish()
    }
}

impl<P: Permission> FromRequestParts<AppState> for Require<P> {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let result = match bearer_token(&parts.headers) {
            Ok(token) => state.auth.verify(token, P::SCOPE).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(ctx) => Ok(Require(ctx, PhantomData)),
            Err(e) => {
                tracing::debug!(
                    permission = P::SCOPE,
                    error_code = e.error_code(),
                    "Rejected request"
                );
                Err(e)
            }
        }
    }
}
