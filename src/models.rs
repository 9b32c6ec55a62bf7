// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the menu item ("drink") and the request and response
//! structures used by the REST API. All wire types derive `Serialize` and/or
//! `Deserialize` and `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! ## Projections
//!
//! An [`Item`] serializes as its long form (full recipe, including the
//! `parts` of every ingredient). [`Item::short`] produces the public
//! [`ItemSummary`], which omits quantities.
//!
//! ## Request Validation
//!
//! Request bodies deserialize into permissive structs whose fields are all
//! optional, then `validate()` turns them into typed values
//! ([`NewItem`], [`ItemPatch`]) or a [`ValidationError`] listing every
//! missing or invalid field.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Recipe
// =============================================================================

/// A single ingredient of a drink recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Ingredient {
    /// Ingredient name (e.g. "Espresso").
    pub name: String,
    /// Display color used when rendering the drink.
    pub color: String,
    /// Quantity, in parts relative to the other ingredients.
    pub parts: u32,
}

/// Ingredient with its quantity redacted, shown to unauthenticated viewers.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct IngredientSummary {
    pub name: String,
    pub color: String,
}

/// An ordered list of ingredients.
///
/// Persisted as JSON text; [`Recipe::to_json`] and [`Recipe::from_json`] are
/// the only conversions between the stored and in-memory forms.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Recipe(pub Vec<Ingredient>);

impl Recipe {
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Deserialize stored recipe text.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Recipe)
    }

    fn summary(&self) -> Vec<IngredientSummary> {
        self.0
            .iter()
            .map(|i| IngredientSummary {
                name: i.name.clone(),
                color: i.color.clone(),
            })
            .collect()
    }
}

impl From<Vec<Ingredient>> for Recipe {
    fn from(value: Vec<Ingredient>) -> Self {
        Recipe(value)
    }
}

/// Recipe as accepted on the wire: either a list of ingredients or a single
/// ingredient object, which is treated as a one-element list.
#[derive(Debug, Clone, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Recipe {
    fn from(value: RecipeInput) -> Self {
        match value {
            RecipeInput::Many(list) => Recipe(list),
            RecipeInput::One(single) => Recipe(vec![single]),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A drink on the menu (long form).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Item {
    /// Store-assigned identifier; never reused.
    pub id: u64,
    pub title: String,
    pub recipe: Recipe,
}

/// Public projection of an [`Item`]: ingredient quantities are omitted.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ItemSummary {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

impl Item {
    /// Short form, safe for unauthenticated viewers.
    pub fn short(&self) -> ItemSummary {
        ItemSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.summary(),
        }
    }
}

/// A validated item that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub recipe: Recipe,
}

/// Validated partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /items`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

/// Body of `PATCH /items/{id}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

/// One rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

/// All problems found while validating a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    fn push(&mut self, field: &'static str, reason: &'static str) {
        self.fields.push(FieldError { field, reason });
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.fields.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{} {}", e.field, e.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

fn check_title(title: &str, errors: &mut ValidationError) {
    if title.trim().is_empty() {
        errors.push("title", "must not be empty");
    }
}

fn check_recipe(recipe: &Recipe, errors: &mut ValidationError) {
    if recipe.is_empty() {
        errors.push("recipe", "must contain at least one ingredient");
    } else if recipe.ingredients().iter().any(|i| i.name.trim().is_empty()) {
        errors.push("recipe", "ingredient names must not be empty");
    }
}

impl CreateItemRequest {
    /// Both `title` and `recipe` are required, independently.
    pub fn validate(self) -> Result<NewItem, ValidationError> {
        let mut errors = ValidationError::default();

        match &self.title {
            Some(title) => check_title(title, &mut errors),
            None => errors.push("title", "is required"),
        }

        let recipe = self.recipe.map(Recipe::from);
        match &recipe {
            Some(recipe) => check_recipe(recipe, &mut errors),
            None => errors.push("recipe", "is required"),
        }

        errors.into_result(|| NewItem {
            title: self.title.unwrap_or_default(),
            recipe: recipe.unwrap_or_default(),
        })
    }
}

impl UpdateItemRequest {
    pub fn validate(self) -> Result<ItemPatch, ValidationError> {
        let mut errors = ValidationError::default();

        if let Some(title) = &self.title {
            check_title(title, &mut errors);
        }
        let recipe = self.recipe.map(Recipe::from);
        if let Some(recipe) = &recipe {
            check_recipe(recipe, &mut errors);
        }

        errors.into_result(|| ItemPatch {
            title: self.title,
            recipe,
        })
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Envelope for `GET /items`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemSummaryListResponse {
    pub success: bool,
    pub items: Vec<ItemSummary>,
}

/// Envelope for every route returning long-form items.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemListResponse {
    pub success: bool,
    pub items: Vec<Item>,
}

/// Envelope for `DELETE /items/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    /// Id of the removed item.
    pub deleted: u64,
}
