// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests: an HMAC key set, token minting and a
//! migrated store in a temporary directory.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{encode, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::{AuthConfig, JwksManager};
use crate::state::AppState;
use crate::storage::ItemStore;

pub const KEY_ID: &str = "test-key";
pub const SECRET: &[u8] = b"menu-server-test-signing-secret";
pub const ISSUER: &str = "https://issuer.test/";
pub const AUDIENCE: &str = "menu";
pub const SUBJECT: &str = "auth0|barista";

/// Key set holding a single octet (HS256) key.
pub fn key_set() -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{
            "kty": "oct",
            "kid": KEY_ID,
            "alg": "HS256",
            "k": URL_SAFE_NO_PAD.encode(SECRET)
        }]
    }))
    .expect("valid JWKS")
}

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(JwksManager::from_key_set(key_set()))
        .with_issuer(ISSUER)
        .with_audience(AUDIENCE)
}

/// Claims valid for one hour, granting `permissions`.
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": SUBJECT,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": jsonwebtoken::get_current_timestamp(),
        "exp": jsonwebtoken::get_current_timestamp() + 3600,
        "permissions": permissions,
    })
}

pub fn sign_with(secret: &[u8], claims: &Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KEY_ID.to_string());
    encode(&header, claims, &EncodingKey::from_secret(secret)).expect("token encodes")
}

pub fn sign(claims: &Value) -> String {
    sign_with(SECRET, claims)
}

pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions))
}

pub fn token_signed_with(secret: &[u8], permissions: &[&str]) -> String {
    sign_with(secret, &claims(permissions))
}

/// App state over a freshly migrated store. Keep the `TempDir` alive for
/// the duration of the test.
pub fn test_state() -> (AppState, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ItemStore::open(&dir.path().join("menu.redb")).expect("store opens");
    store.migrate().expect("store migrates");
    (AppState::new(store, auth_config()), dir)
}
