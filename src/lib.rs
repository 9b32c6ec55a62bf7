// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Menu Server - Drinks Catalog API
//!
//! This crate provides a small HTTP/JSON API over a menu of drinks. Reads of
//! the public menu are open; detailed recipes and every mutation require a
//! bearer JWT carrying the matching permission.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification and permission gating (JWKS-backed JWT)
//! - `config` - Environment-driven runtime configuration
//! - `storage` - Embedded item store (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
