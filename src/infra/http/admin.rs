//! Admin listener: content writes and cache maintenance.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    application::admin::{AdminContentService, ArticleCommand, BookCommand, EventCommand},
    cache::{CacheStats, ContentMethod},
    domain::entities::{ArticleRecord, BookRecord, EventRecord},
    infra::db::PostgresRepositories,
};

use super::{
    ApiError, db_health_response,
    middleware::{log_responses, set_request_context},
    parse_locale,
};

#[derive(Clone)]
pub struct AdminState {
    pub admin: Arc<AdminContentService>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/books", post(create_book))
        .route("/admin/books/{id}", put(update_book).delete(delete_book))
        .route("/admin/articles", post(create_article))
        .route(
            "/admin/articles/{id}",
            put(update_article).delete(delete_article),
        )
        .route("/admin/events", post(create_event))
        .route("/admin/events/{id}", put(update_event).delete(delete_event))
        .route("/admin/cache/invalidate", post(invalidate_cache))
        .route("/admin/cache/clear", post(clear_cache))
        .route("/admin/cache/cleanup", post(cleanup_cache))
        .route("/admin/cache/stats", get(cache_stats))
        .route("/admin/health", get(admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn create_book(
    State(state): State<AdminState>,
    Json(command): Json<BookCommand>,
) -> Result<(StatusCode, Json<BookRecord>), ApiError> {
    let record = state.admin.create_book(command).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_book(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
    Json(command): Json<BookCommand>,
) -> Result<Json<BookRecord>, ApiError> {
    Ok(Json(state.admin.update_book(id, command).await?))
}

async fn delete_book(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Result<Json<BookRecord>, ApiError> {
    Ok(Json(state.admin.delete_book(id).await?))
}

async fn create_article(
    State(state): State<AdminState>,
    Json(command): Json<ArticleCommand>,
) -> Result<(StatusCode, Json<ArticleRecord>), ApiError> {
    let record = state.admin.create_article(command).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_article(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
    Json(command): Json<ArticleCommand>,
) -> Result<Json<ArticleRecord>, ApiError> {
    Ok(Json(state.admin.update_article(id, command).await?))
}

async fn delete_article(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ArticleRecord>>, ApiError> {
    Ok(Json(state.admin.delete_article(id).await?))
}

async fn create_event(
    State(state): State<AdminState>,
    Json(command): Json<EventCommand>,
) -> Result<(StatusCode, Json<EventRecord>), ApiError> {
    let record = state.admin.create_event(command).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_event(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
    Json(command): Json<EventCommand>,
) -> Result<Json<EventRecord>, ApiError> {
    Ok(Json(state.admin.update_event(id, command).await?))
}

async fn delete_event(
    State(state): State<AdminState>,
    Path(id): Path<i64>,
) -> Result<Json<EventRecord>, ApiError> {
    Ok(Json(state.admin.delete_event(id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvalidateQuery {
    method: Option<String>,
    locale: Option<String>,
}

async fn invalidate_cache(
    State(state): State<AdminState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<StatusCode, ApiError> {
    let method = query
        .method
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(str::parse::<ContentMethod>)
        .transpose()?;
    let locale = query
        .locale
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            parse_locale(value)
                .map_err(|_| ApiError::bad_request("Unknown locale", Some(value.to_string())))
        })
        .transpose()?;

    state.admin.content().invalidate(method, locale).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cache(State(state): State<AdminState>) -> StatusCode {
    state.admin.content().clear().await;
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize)]
struct CleanupResponse {
    removed: usize,
}

async fn cleanup_cache(State(state): State<AdminState>) -> Json<CleanupResponse> {
    let removed = state.admin.content().cache().cleanup_expired();
    info!(
        target = "quire::admin",
        removed,
        "Swept expired cache entries"
    );
    Json(CleanupResponse { removed })
}

async fn cache_stats(State(state): State<AdminState>) -> Json<CacheStats> {
    Json(state.admin.content().cache().stats().await)
}

async fn admin_health(State(state): State<AdminState>) -> Response {
    db_health_response(state.db.health_check().await)
}
