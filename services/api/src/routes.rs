//! API service routes

use std::collections::HashMap;

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Query, State},
    middleware,
    response::IntoResponse,
    routing::get,
};
use feed::{FeedRequest, PageRequest};
use tracing::error;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, rate_limit_middleware, session_middleware},
    models::{HealthResponse, IngredientOptionsResponse},
};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    // Layers run bottom-up: the session is resolved before the rate limit.
    let protected_routes = Router::new()
        .route("/home", get(get_home_feed))
        .route("/ingredients", get(get_ingredient_options))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let database = common::database::health_check(&state.db_pool).await?;

    Ok(Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        service: "feed-api",
        database,
    }))
}

/// Home feed, manual or automatic depending on the query string
pub async fn get_home_feed(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let request = FeedRequest::from_query_map(&params);
    let page = PageRequest::new(request.page, state.config.feed.page_size).map_err(|e| {
        error!("Invalid feed page: {}", e);
        ApiError::InternalServerError
    })?;

    let feed = state
        .feed
        .resolve_feed(&request.mode, user.id, page)
        .await
        .map_err(|e| {
            error!("Failed to resolve feed: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(feed))
}

/// Distinct ingredient names for the filter form
pub async fn get_ingredient_options(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let ingredients = state.feed.ingredient_options().await.map_err(|e| {
        error!("Failed to load ingredient options: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(IngredientOptionsResponse { ingredients }))
}
