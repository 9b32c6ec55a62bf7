// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Menu item endpoints.
//!
//! `GET /items` is public and returns the short projection. Every other
//! route requires a permission and returns items in long form.

use axum::{extract::State, Json};

use super::extract::{ApiJson, ApiPath};
use crate::{
    auth::{CreateItems, DeleteItems, ReadItemDetails, Require, UpdateItems},
    error::{ApiError, ErrorBody},
    models::{
        CreateItemRequest, DeletedResponse, Item, ItemListResponse, ItemSummaryListResponse,
        UpdateItemRequest,
    },
    state::AppState,
    storage::StoreError,
};

/// Listing failures are reported as 404 rather than 500.
fn listing_failure(e: StoreError) -> ApiError {
    tracing::error!(error = %e, "Failed to list items");
    ApiError::not_found("Not Found")
}

#[utoipa::path(
    get,
    path = "/items",
    tag = "Items",
    responses(
        (status = 200, description = "Menu with quantities redacted",
            body = ItemSummaryListResponse),
        (status = 404, description = "Menu unavailable", body = ErrorBody)
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<ItemSummaryListResponse>, ApiError> {
    let items = state.store.list_all().map_err(listing_failure)?;
    Ok(Json(ItemSummaryListResponse {
        success: true,
        items: items.iter().map(Item::short).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/items-detail",
    tag = "Items",
    security(("bearer_auth" = ["get:items-detail"])),
    responses(
        (status = 200, description = "Menu with full recipes", body = ItemListResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Missing get:items-detail", body = ErrorBody),
        (status = 404, description = "Menu unavailable", body = ErrorBody)
    )
)]
pub async fn list_item_details(
    _auth: Require<ReadItemDetails>,
    State(state): State<AppState>,
) -> Result<Json<ItemListResponse>, ApiError> {
    let items = state.store.list_all().map_err(listing_failure)?;
    Ok(Json(ItemListResponse {
        success: true,
        items,
    }))
}

#[utoipa::path(
    post,
    path = "/items",
    tag = "Items",
    request_body = CreateItemRequest,
    security(("bearer_auth" = ["post:items"])),
    responses(
        (status = 200, description = "Created item", body = ItemListResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Missing post:items", body = ErrorBody),
        (status = 422, description = "Title or recipe missing or invalid", body = ErrorBody)
    )
)]
pub async fn create_item(
    Require(ctx, _): Require<CreateItems>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateItemRequest>,
) -> Result<Json<ItemListResponse>, ApiError> {
    let new_item = request.validate()?;
    let item = state.store.create(&new_item)?;

    tracing::info!(
        item_id = item.id,
        subject = ctx.subject.as_deref().unwrap_or("-"),
        "Item created"
    );
    Ok(Json(ItemListResponse {
        success: true,
        items: vec![item],
    }))
}

#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "Items",
    params(("id" = u64, Path, description = "Identifier of the item to edit")),
    request_body = UpdateItemRequest,
    security(("bearer_auth" = ["patch:items"])),
    responses(
        (status = 200, description = "Updated item", body = ItemListResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Missing patch:items", body = ErrorBody),
        (status = 404, description = "Unknown item", body = ErrorBody),
        (status = 422, description = "Invalid field", body = ErrorBody)
    )
)]
pub async fn update_item(
    Require(ctx, _): Require<UpdateItems>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> Result<Json<ItemListResponse>, ApiError> {
    // An unknown id is 404 whatever the body holds.
    state.store.get(id)?;
    let patch = request.validate()?;
    let item = state.store.update(id, &patch)?;

    tracing::info!(
        item_id = id,
        subject = ctx.subject.as_deref().unwrap_or("-"),
        "Item updated"
    );
    Ok(Json(ItemListResponse {
        success: true,
        items: vec![item],
    }))
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "Items",
    params(("id" = u64, Path, description = "Identifier of the item to delete")),
    security(("bearer_auth" = ["delete:items"])),
    responses(
        (status = 200, description = "Id of the deleted item", body = DeletedResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Missing delete:items", body = ErrorBody),
        (status = 404, description = "Unknown item", body = ErrorBody)
    )
)]
pub async fn delete_item(
    Require(ctx, _): Require<DeleteItems>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = state.store.delete(id)?;

    tracing::info!(
        item_id = deleted,
        subject = ctx.subject.as_deref().unwrap_or("-"),
        "Item deleted"
    );
    Ok(Json(DeletedResponse {
        success: true,
        deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::models::{Ingredient, Recipe};
    use crate::testing;
    use axum::http::StatusCode;
    use std::marker::PhantomData;

    fn granted<P: crate::auth::Permission>() -> Require<P> {
        let mut ctx = AuthContext::default();
        ctx.permissions.insert(P::SCOPE.to_string());
        Require(ctx, PhantomData)
    }

    fn request(value: serde_json::Value) -> CreateItemRequest {
        serde_json::from_value(value).unwrap()
    }

    fn latte() -> CreateItemRequest {
        request(serde_json::json!({
            "title": "Latte",
            "recipe": [
                {"name": "Espresso", "color": "brown", "parts": 1},
                {"name": "Milk", "color": "white", "parts": 3}
            ]
        }))
    }

    #[tokio::test]
    async fn create_then_list_details() {
        let (state, _dir) = testing::test_state();

        let Json(created) = create_item(granted(), State(state.clone()), ApiJson(latte()))
            .await
            .expect("item creation succeeds");
        assert!(created.success);
        let item = &created.items[0];
        assert_eq!(item.title, "Latte");

        let Json(details) = list_item_details(granted(), State(state.clone()))
            .await
            .expect("detail listing succeeds");
        assert_eq!(details.items, created.items);
        assert_eq!(details.items[0].recipe.ingredients()[1].parts, 3);
    }

    #[tokio::test]
    async fn public_listing_is_short_form() {
        let (state, _dir) = testing::test_state();
        create_item(granted(), State(state.clone()), ApiJson(latte()))
            .await
            .unwrap();

        let Json(listing) = list_items(State(state)).await.unwrap();
        let body = serde_json::to_value(&listing).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["items"][0]["recipe"][0]["name"], "Espresso");
        assert!(body["items"][0]["recipe"][0].get("parts").is_none());
    }

    #[tokio::test]
    async fn create_without_recipe_is_unprocessable() {
        let (state, _dir) = testing::test_state();
        let err = create_item(
            granted(),
            State(state.clone()),
            ApiJson(request(serde_json::json!({"title": "Latte"}))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "recipe is required");
        assert!(state.store.list_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn patch_title_keeps_recipe() {
        let (state, _dir) = testing::test_state();
        let Json(created) = create_item(granted(), State(state.clone()), ApiJson(latte()))
            .await
            .unwrap();
        let id = created.items[0].id;

        let patch: UpdateItemRequest =
            serde_json::from_value(serde_json::json!({"title": "Large Latte"})).unwrap();
        let Json(updated) =
            update_item(granted(), State(state.clone()), ApiPath(id), ApiJson(patch))
                .await
                .unwrap();

        assert_eq!(updated.items[0].title, "Large Latte");
        assert_eq!(updated.items[0].recipe, created.items[0].recipe);
    }

    #[tokio::test]
    async fn patch_recipe_accepts_single_ingredient() {
        let (state, _dir) = testing::test_state();
        let Json(created) = create_item(granted(), State(state.clone()), ApiJson(latte()))
            .await
            .unwrap();
        let id = created.items[0].id;

        let patch: UpdateItemRequest = serde_json::from_value(serde_json::json!({
            "recipe": {"name": "Espresso", "color": "brown", "parts": 2}
        }))
        .unwrap();
        let Json(updated) =
            update_item(granted(), State(state.clone()), ApiPath(id), ApiJson(patch))
                .await
                .unwrap();

        assert_eq!(updated.items[0].title, "Latte");
        assert_eq!(
            updated.items[0].recipe,
            Recipe(vec![Ingredient {
                name: "Espresso".into(),
                color: "brown".into(),
                parts: 2,
            }])
        );
    }

    #[tokio::test]
    async fn patch_unknown_item_is_not_found() {
        let (state, _dir) = testing::test_state();
        let err = update_item(
            granted(),
            State(state),
            ApiPath(99),
            ApiJson(UpdateItemRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_unknown_item_with_invalid_body_is_not_found() {
        let (state, _dir) = testing::test_state();
        for body in [serde_json::json!({"title": ""}), serde_json::json!({"recipe": []})] {
            let request: UpdateItemRequest = serde_json::from_value(body).unwrap();
            let err = update_item(granted(), State(state.clone()), ApiPath(999), ApiJson(request))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn delete_returns_id_and_removes_item() {
        let (state, _dir) = testing::test_state();
        let Json(created) = create_item(granted(), State(state.clone()), ApiJson(latte()))
            .await
            .unwrap();
        let id = created.items[0].id;

        let Json(deleted) = delete_item(granted(), State(state.clone()), ApiPath(id))
            .await
            .expect("item deletion succeeds");
        assert!(deleted.success);
        assert_eq!(deleted.deleted, id);

        let err = delete_item(granted(), State(state), ApiPath(id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
