// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permissions required by the gated menu routes.
//!
//! Each permission is a zero-sized marker type so that the requirement is
//! part of a handler's signature:
//!
//! ```rust,ignore
//! async fn create_item(_: Require<CreateItems>, ...) { ... }
//! ```

/// A permission string that must appear in the caller's token.
pub trait Permission: Send + Sync + 'static {
    const SCOPE: &'static str;
}

macro_rules! permission {
    ($(#[$meta:meta])* $name:ident => $scope:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Permission for $name {
            const SCOPE: &'static str = $scope;
        }
    };
}

permission!(
    /// View full recipes, including ingredient quantities.
    ReadItemDetails => "get:items-detail"
);
permission!(
    /// Add items to the menu.
    CreateItems => "post:items"
);
permission!(
    /// Edit existing items.
    UpdateItems => "patch:items"
);
permission!(
    /// Remove items from the menu.
    DeleteItems => "delete:items"
);
