// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Item store: CRUD over the `items` table.
//!
//! Every mutating operation runs inside a single redb write transaction, so
//! a row is either fully written or not at all. Ids come from a persisted
//! sequence rather than the current maximum key, so deleting the newest item
//! never frees its id for reuse.

use std::path::Path;
use std::str::FromStr;

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};

use super::{StoreError, StoreResult};
use crate::models::{Ingredient, Item, ItemPatch, NewItem, Recipe};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: id → (title, recipe as JSON text).
const ITEMS: TableDefinition<u64, (&str, &str)> = TableDefinition::new("items");

/// Sequence counters: name → last assigned value.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const ITEM_ID_SEQUENCE: &str = "items";

// =============================================================================
// Migration Mode
// =============================================================================

/// What to do with the schema at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MigrationMode {
    /// Leave the database untouched.
    #[default]
    None,
    /// Create missing tables; existing rows are kept.
    Create,
    /// Drop all tables, recreate them and seed the sample menu.
    Reset,
}

impl FromStr for MigrationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(MigrationMode::None),
            "create" => Ok(MigrationMode::Create),
            "reset" => Ok(MigrationMode::Reset),
            other => Err(format!(
                "unknown migration mode `{other}` (expected none, create or reset)"
            )),
        }
    }
}

// =============================================================================
// ItemStore
// =============================================================================

/// Embedded ACID store for menu items.
pub struct ItemStore {
    db: Database,
}

impl std::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStore").finish_non_exhaustive()
    }
}

impl ItemStore {
    /// Open (or create) the database file. Tables are not touched.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let db = Database::create(path)?;
        Ok(Self { db })
    }

    /// Apply the requested migration.
    pub fn apply_migration(&self, mode: MigrationMode) -> StoreResult<()> {
        match mode {
            MigrationMode::None => Ok(()),
            MigrationMode::Create => self.migrate(),
            MigrationMode::Reset => self.reset(),
        }
    }

    /// Create any missing tables. Idempotent and non-destructive.
    pub fn migrate(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ITEMS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;
        tracing::info!("Item tables ready");
        Ok(())
    }

    /// Drop every table, recreate the schema and seed the sample menu.
    pub fn reset(&self) -> StoreResult<()> {
        let seed = seed_item();
        let recipe_json = seed.recipe.to_json()?;

        let write_txn = self.db.begin_write()?;
        {
            write_txn.delete_table(ITEMS)?;
            write_txn.delete_table(SEQUENCES)?;

            let mut items = write_txn.open_table(ITEMS)?;
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = next_item_id(&mut sequences)?;
            items.insert(id, (seed.title.as_str(), recipe_json.as_str()))?;
        }
        write_txn.commit()?;
        tracing::warn!("Item tables dropped and reseeded");
        Ok(())
    }

    /// Whether the schema has been created.
    pub fn is_ready(&self) -> bool {
        self.ensure_migrated().is_ok()
    }

    fn ensure_migrated(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(ITEMS)?;
        read_txn.open_table(SEQUENCES)?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All items, ordered by id ascending.
    pub fn list_all(&self) -> StoreResult<Vec<Item>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS)?;

        let mut items = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            items.push(decode_row(key.value(), value.value())?);
        }
        Ok(items)
    }

    pub fn get(&self, id: u64) -> StoreResult<Item> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS)?;
        match table.get(id)? {
            Some(value) => decode_row(id, value.value()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Assign an id to `item` and persist it.
    pub fn create(&self, item: &NewItem) -> StoreResult<Item> {
        if item.title.trim().is_empty() {
            return Err(StoreError::ValidationFailed("title must not be empty".into()));
        }
        if item.recipe.is_empty() {
            return Err(StoreError::ValidationFailed(
                "recipe must contain at least one ingredient".into(),
            ));
        }
        let recipe_json = item.recipe.to_json()?;
        self.ensure_migrated()?;

        let write_txn = self.db.begin_write()?;
        let id = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let mut items = write_txn.open_table(ITEMS)?;
            let id = next_item_id(&mut sequences)?;
            items.insert(id, (item.title.as_str(), recipe_json.as_str()))?;
            id
        };
        write_txn.commit()?;

        tracing::debug!(item_id = id, "Created item");
        Ok(Item {
            id,
            title: item.title.clone(),
            recipe: item.recipe.clone(),
        })
    }

    /// Apply the fields present in `patch`; the rest of the row is kept as
    /// stored, byte for byte.
    pub fn update(&self, id: u64, patch: &ItemPatch) -> StoreResult<Item> {
        if matches!(&patch.title, Some(title) if title.trim().is_empty()) {
            return Err(StoreError::ValidationFailed("title must not be empty".into()));
        }
        let new_recipe = patch.recipe.as_ref().map(Recipe::to_json).transpose()?;
        self.ensure_migrated()?;

        let write_txn = self.db.begin_write()?;
        let item = {
            let mut table = write_txn.open_table(ITEMS)?;
            let (stored_title, stored_recipe) = match table.get(id)? {
                Some(value) => {
                    let (title, recipe) = value.value();
                    (title.to_string(), recipe.to_string())
                }
                None => return Err(StoreError::NotFound(id)),
            };

            let title = patch.title.clone().unwrap_or(stored_title);
            let recipe = new_recipe.unwrap_or(stored_recipe);
            table.insert(id, (title.as_str(), recipe.as_str()))?;
            decode_row(id, (title.as_str(), recipe.as_str()))?
        };
        write_txn.commit()?;

        tracing::debug!(item_id = id, "Updated item");
        Ok(item)
    }

    /// Remove an item, returning its id.
    pub fn delete(&self, id: u64) -> StoreResult<u64> {
        self.ensure_migrated()?;

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ITEMS)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        if !removed {
            return Err(StoreError::NotFound(id));
        }
        write_txn.commit()?;

        tracing::debug!(item_id = id, "Deleted item");
        Ok(id)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn next_item_id(sequences: &mut Table<'_, &'static str, u64>) -> StoreResult<u64> {
    let last = sequences
        .get(ITEM_ID_SEQUENCE)?
        .map(|value| value.value())
        .unwrap_or(0);
    let next = last + 1;
    sequences.insert(ITEM_ID_SEQUENCE, next)?;
    Ok(next)
}

fn decode_row(id: u64, (title, recipe): (&str, &str)) -> StoreResult<Item> {
    Ok(Item {
        id,
        title: title.to_string(),
        recipe: Recipe::from_json(recipe)?,
    })
}

fn seed_item() -> NewItem {
    NewItem {
        title: "Water".to_string(),
        recipe: Recipe(vec![Ingredient {
            name: "Water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (ItemStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = ItemStore::open(&dir.path().join("menu.redb")).unwrap();
        store.migrate().unwrap();
        (store, dir)
    }

    fn new_item(title: &str, parts: u32) -> NewItem {
        NewItem {
            title: title.to_string(),
            recipe: Recipe(vec![
                Ingredient {
                    name: "Espresso".into(),
                    color: "brown".into(),
                    parts,
                },
                Ingredient {
                    name: "Milk".into(),
                    color: "white".into(),
                    parts: 1,
                },
            ]),
        }
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let (store, _dir) = temp_store();
        let first = store.create(&new_item("Latte", 1)).unwrap();
        let second = store.create(&new_item("Flat White", 2)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let fetched = store.get(second.id).unwrap();
        assert_eq!(fetched, second);
    }

    #[test]
    fn list_all_orders_by_id() {
        let (store, _dir) = temp_store();
        for title in ["Latte", "Mocha", "Cortado"] {
            store.create(&new_item(title, 1)).unwrap();
        }

        let titles: Vec<_> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|i| (i.id, i.title))
            .collect();
        assert_eq!(
            titles,
            vec![
                (1, "Latte".to_string()),
                (2, "Mocha".to_string()),
                (3, "Cortado".to_string())
            ]
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (store, _dir) = temp_store();
        let first = store.create(&new_item("Latte", 1)).unwrap();
        assert_eq!(store.delete(first.id).unwrap(), first.id);

        let second = store.create(&new_item("Mocha", 1)).unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[test]
    fn update_title_only_keeps_recipe() {
        let (store, _dir) = temp_store();
        let created = store.create(&new_item("Latte", 3)).unwrap();

        let patch = ItemPatch {
            title: Some("Big Latte".into()),
            recipe: None,
        };
        let updated = store.update(created.id, &patch).unwrap();
        assert_eq!(updated.title, "Big Latte");
        assert_eq!(updated.recipe, created.recipe);
        assert_eq!(store.get(created.id).unwrap(), updated);
    }

    fn raw_row(store: &ItemStore, id: u64) -> (String, String) {
        let read_txn = store.db.begin_read().unwrap();
        let table = read_txn.open_table(ITEMS).unwrap();
        let row = table.get(id).unwrap().unwrap();
        let (title, recipe) = row.value();
        (title.to_string(), recipe.to_string())
    }

    #[test]
    fn title_only_update_keeps_stored_recipe_text() {
        let (store, _dir) = temp_store();
        // Formatting that `Recipe::to_json` would never produce.
        let stored = r#"[ {"color": "blue", "name": "Water", "parts": 1} ]"#;
        let write_txn = store.db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(ITEMS).unwrap();
            table.insert(5, ("Water", stored)).unwrap();
        }
        write_txn.commit().unwrap();

        let patch = ItemPatch {
            title: Some("Still Water".into()),
            recipe: None,
        };
        store.update(5, &patch).unwrap();

        let (title, recipe) = raw_row(&store, 5);
        assert_eq!(title, "Still Water");
        assert_eq!(recipe, stored);
    }

    #[test]
    fn open_reports_uncreatable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let err = ItemStore::open(&blocker.join("menu.redb")).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn update_recipe_only_keeps_title() {
        let (store, _dir) = temp_store();
        let created = store.create(&new_item("Latte", 3)).unwrap();
        let recipe = new_item("unused", 9).recipe;

        let patch = ItemPatch {
            title: None,
            recipe: Some(recipe.clone()),
        };
        let updated = store.update(created.id, &patch).unwrap();
        assert_eq!(updated.title, "Latte");
        assert_eq!(updated.recipe, recipe);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let (store, _dir) = temp_store();
        assert!(matches!(store.get(42), Err(StoreError::NotFound(42))));
        assert!(matches!(store.delete(42), Err(StoreError::NotFound(42))));
        assert!(matches!(
            store.update(42, &ItemPatch::default()),
            Err(StoreError::NotFound(42))
        ));
    }

    #[test]
    fn create_rejects_blank_title() {
        let (store, _dir) = temp_store();
        let result = store.create(&new_item(" ", 1));
        assert!(matches!(result, Err(StoreError::ValidationFailed(_))));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn unmigrated_store_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ItemStore::open(&dir.path().join("menu.redb")).unwrap();

        assert!(!store.is_ready());
        assert!(matches!(store.list_all(), Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.create(&new_item("Latte", 1)),
            Err(StoreError::Unavailable(_))
        ));
        // Writes must not create the schema implicitly.
        assert!(!store.is_ready());
    }

    #[test]
    fn migrate_is_idempotent_and_keeps_rows() {
        let (store, _dir) = temp_store();
        store.create(&new_item("Latte", 1)).unwrap();
        store.migrate().unwrap();
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn reset_wipes_and_seeds() {
        let (store, _dir) = temp_store();
        store.create(&new_item("Latte", 1)).unwrap();
        store.create(&new_item("Mocha", 1)).unwrap();

        store.apply_migration(MigrationMode::Reset).unwrap();

        let items = store.list_all().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].title, "Water");
    }

    #[test]
    fn migration_mode_parses() {
        assert_eq!("".parse::<MigrationMode>().unwrap(), MigrationMode::None);
        assert_eq!("Create".parse::<MigrationMode>().unwrap(), MigrationMode::Create);
        assert_eq!("reset".parse::<MigrationMode>().unwrap(), MigrationMode::Reset);
        assert!("drop".parse::<MigrationMode>().is_err());
    }
}
