// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token verification and permission gating for the menu API.
//!
//! ## Auth Flow
//!
//! 1. The client authenticates with the identity provider
//! 2. The client sends `Authorization: Bearer <JWT>`
//! 3. The server:
//!    - Fetches the provider's JWKS via HTTPS (cached)
//!    - Verifies JWT signature, expiry, issuer, audience
//!    - Extracts the `permissions` claim
//!    - Requires the permission named by the route
//!
//! ## Status Codes
//!
//! - 401: no token, malformed token, bad signature, expired, wrong claims
//! - 403: valid token without the required permission
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use claims::{AuthContext, TokenClaims};
pub use error::AuthError;
pub use extractor::{bearer_token, Require};
pub use jwks::JwksManager;
pub use permissions::{CreateItems, DeleteItems, Permission, ReadItemDetails, UpdateItems};
pub use verifier::AuthConfig;
