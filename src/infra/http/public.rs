use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    response::Response,
    routing::get,
};

use crate::{
    application::{bilingual::BilingualResolver, content::ContentService},
    cache::CacheStats,
    domain::entities::{ArticleRecord, BookRecord, EventRecord, SiblingRef},
    infra::db::PostgresRepositories,
};

use super::{
    ApiError, db_health_response,
    middleware::{log_responses, set_request_context},
    parse_locale,
};

#[derive(Clone)]
pub struct HttpState {
    pub content: ContentService,
    pub bilingual: BilingualResolver,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/{locale}/books", get(list_books))
        .route("/api/{locale}/books/{slug}", get(book_detail))
        .route("/api/{locale}/articles", get(list_articles))
        .route("/api/{locale}/articles/{slug}", get(article_detail))
        .route(
            "/api/{locale}/articles/{slug}/sibling",
            get(article_sibling),
        )
        .route("/api/{locale}/events", get(list_events))
        .route("/api/{locale}/events/{id}", get(event_detail))
        .route("/_health/db", get(public_health))
        .route("/_health/cache", get(cache_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn list_books(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<BookRecord>>, ApiError> {
    let locale = parse_locale(&locale)?;
    Ok(Json(state.content.books(locale).await?))
}

async fn book_detail(
    State(state): State<HttpState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<BookRecord>, ApiError> {
    let locale = parse_locale(&locale)?;
    state
        .content
        .book_by_slug(&slug, locale)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("book not found"))
}

async fn list_articles(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<ArticleRecord>>, ApiError> {
    let locale = parse_locale(&locale)?;
    Ok(Json(state.content.articles(locale).await?))
}

async fn article_detail(
    State(state): State<HttpState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<ArticleRecord>, ApiError> {
    let locale = parse_locale(&locale)?;
    state
        .content
        .article_by_slug(&slug, locale)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("article not found"))
}

async fn article_sibling(
    State(state): State<HttpState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<Json<SiblingRef>, ApiError> {
    let locale = parse_locale(&locale)?;
    state
        .bilingual
        .resolve_sibling(&slug, locale)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("translation not found"))
}

async fn list_events(
    State(state): State<HttpState>,
    Path(locale): Path<String>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let locale = parse_locale(&locale)?;
    Ok(Json(state.content.events(locale).await?))
}

async fn event_detail(
    State(state): State<HttpState>,
    Path((locale, id)): Path<(String, i64)>,
) -> Result<Json<EventRecord>, ApiError> {
    let locale = parse_locale(&locale)?;
    state
        .content
        .event_by_id(id, locale)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("event not found"))
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn cache_health(State(state): State<HttpState>) -> Json<CacheStats> {
    Json(state.content.cache().stats().await)
}
