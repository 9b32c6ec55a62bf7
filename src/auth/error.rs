// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Why a request was refused by the token verifier.
///
/// Every variant carries its own HTTP status: a caller that could not be
/// identified gets 401, an identified caller lacking the permission gets 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingToken,
    /// Header is not `Bearer <token>`, or the token cannot be decoded
    MalformedToken,
    /// Signature does not verify against the key set
    InvalidSignature,
    /// Token has expired
    Expired,
    /// Issuer, audience or not-before check failed
    InvalidClaims,
    /// Token is valid but does not grant the required permission
    InsufficientPermission(String),
    /// Key set could not be fetched and nothing is cached
    KeySetUnavailable(String),
    /// Key material in the key set is unusable
    Internal(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authorization_header_missing",
            AuthError::MalformedToken => "invalid_header",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::InsufficientPermission(_) => "unauthorized",
            AuthError::KeySetUnavailable(_) => "jwks_unavailable",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermission(_) => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Authorization header is expected"),
            AuthError::MalformedToken => {
                write!(f, "Authorization header must be a well-formed 'Bearer <token>'")
            }
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token expired"),
            AuthError::InvalidClaims => {
                write!(f, "Incorrect claims. Please check the audience and issuer")
            }
            AuthError::InsufficientPermission(permission) => {
                write!(f, "Permission `{permission}` not found")
            }
            AuthError::KeySetUnavailable(msg) => write!(f, "Signing keys unavailable: {msg}"),
            AuthError::Internal(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
