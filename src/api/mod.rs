// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::{ApiError, ErrorBody},
    models::{
        CreateItemRequest, DeletedResponse, Ingredient, IngredientSummary, Item, ItemListResponse,
        ItemSummary, ItemSummaryListResponse, Recipe, RecipeInput, UpdateItemRequest,
    },
    state::AppState,
};

pub mod extract;
pub mod health;
pub mod items;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items-detail", get(items::list_item_details))
        .route(
            "/items/{id}",
            patch(items::update_item).delete(items::delete_item),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        items::list_items,
        items::list_item_details,
        items::create_item,
        items::update_item,
        items::delete_item,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Item,
            ItemSummary,
            Ingredient,
            IngredientSummary,
            Recipe,
            RecipeInput,
            CreateItemRequest,
            UpdateItemRequest,
            ItemListResponse,
            ItemSummaryListResponse,
            DeletedResponse,
            ErrorBody
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Items", description = "Menu items and recipes"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
