// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::storage::ItemStore;

/// Everything a request handler needs, built once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<ItemStore>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(store: ItemStore, auth: AuthConfig) -> Self {
        Self {
            store: Arc::new(store),
            auth,
        }
    }
}
