// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Item Storage Module
//!
//! Persistent storage for menu items, backed by an embedded **redb**
//! database (pure Rust, ACID, single writer).
//!
//! ## Table Layout
//!
//! ```text
//! items:      id (u64) → (title, recipe JSON text)
//! sequences:  name     → last assigned id (u64)
//! ```
//!
//! ## Migrations
//!
//! Opening a database never creates or drops tables. Schema creation is an
//! explicit step ([`ItemStore::migrate`]); [`ItemStore::reset`] wipes and
//! reseeds the menu and is meant for development only.

pub mod items;

pub use items::{ItemStore, MigrationMode};

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("item {0} not found")]
    NotFound(u64),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        match e {
            redb::TableError::TableDoesNotExist(name) => {
                StoreError::Unavailable(format!("table `{name}` does not exist (run migration)"))
            }
            other => StoreError::Table(other),
        }
    }
}

impl StoreError {
    /// Whether this error comes from the storage engine rather than the caller.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, StoreError::ValidationFailed(_) | StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
