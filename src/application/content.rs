//! Locale-partitioned content accessors with a cache-aside read path.
//!
//! Every accessor computes a cache key from its name and arguments, returns a
//! cached value when present and otherwise runs the repository query through
//! [`retry`], caching the result for the configured TTL. Failures are never
//! cached; absent records are (as `null`).

use std::{future::Future, sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{ArticlesRepo, BooksRepo, EventsRepo, RepoError};
use crate::application::retry::{RetryPolicy, retry};
use crate::cache::{CacheKey, CacheStore, ContentMethod};
use crate::domain::entities::{ArticleRecord, BookRecord, EventRecord};
use crate::domain::types::Locale;

pub const DEFAULT_CONTENT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("`{method}` failed after retries: {source}")]
    Repo {
        method: ContentMethod,
        #[source]
        source: RepoError,
    },
}

impl ContentError {
    pub fn method(&self) -> ContentMethod {
        match self {
            ContentError::Repo { method, .. } => *method,
        }
    }
}

#[derive(Clone)]
pub struct ContentService {
    books: Arc<dyn BooksRepo>,
    articles: Arc<dyn ArticlesRepo>,
    events: Arc<dyn EventsRepo>,
    cache: Arc<CacheStore>,
    retry: RetryPolicy,
    ttl: Duration,
}

impl ContentService {
    pub fn new(
        books: Arc<dyn BooksRepo>,
        articles: Arc<dyn ArticlesRepo>,
        events: Arc<dyn EventsRepo>,
        cache: Arc<CacheStore>,
    ) -> Self {
        Self {
            books,
            articles,
            events,
            cache,
            retry: RetryPolicy::default(),
            ttl: DEFAULT_CONTENT_TTL,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub async fn books(&self, locale: Locale) -> Result<Vec<BookRecord>, ContentError> {
        self.cached(CacheKey::list(ContentMethod::Books, locale), || {
            self.books.list_books(locale)
        })
        .await
    }

    pub async fn book_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<BookRecord>, ContentError> {
        self.cached(
            CacheKey::by_slug(ContentMethod::BookBySlug, slug, locale),
            || self.books.find_book_by_slug(slug, locale),
        )
        .await
    }

    pub async fn articles(&self, locale: Locale) -> Result<Vec<ArticleRecord>, ContentError> {
        self.cached(CacheKey::list(ContentMethod::Articles, locale), || {
            self.articles.list_published_articles(locale)
        })
        .await
    }

    pub async fn article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, ContentError> {
        self.cached(
            CacheKey::by_slug(ContentMethod::ArticleBySlug, slug, locale),
            || self.articles.find_published_article_by_slug(slug, locale),
        )
        .await
    }

    pub async fn article_by_id(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, ContentError> {
        self.cached(
            CacheKey::by_id(ContentMethod::ArticleById, id, locale),
            || self.articles.find_published_article_by_id(id, locale),
        )
        .await
    }

    /// Published translation in `locale` of the original article `original`.
    pub async fn article_translation(
        &self,
        original: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, ContentError> {
        self.cached(
            CacheKey::by_id(ContentMethod::ArticleTranslation, original, locale),
            || self.articles.find_published_translation(original, locale),
        )
        .await
    }

    pub async fn events(&self, locale: Locale) -> Result<Vec<EventRecord>, ContentError> {
        self.cached(CacheKey::list(ContentMethod::Events, locale), || {
            self.events.list_published_events(locale)
        })
        .await
    }

    pub async fn event_by_id(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<EventRecord>, ContentError> {
        self.cached(
            CacheKey::by_id(ContentMethod::EventById, id, locale),
            || self.events.find_published_event(id, locale),
        )
        .await
    }

    /// Drop cached results.
    ///
    /// With both a method and a locale exactly one listing key is removed.
    /// Any other combination clears the whole cache.
    pub async fn invalidate(&self, method: Option<ContentMethod>, locale: Option<Locale>) {
        match (method, locale) {
            (Some(method), Some(locale)) => {
                let key = CacheKey::list(method, locale);
                self.cache.delete(key.as_str()).await;
                info!(target = "quire::content", key = %key, "Invalidated cache key");
            }
            (method, locale) => {
                self.cache.clear().await;
                info!(
                    target = "quire::content",
                    method = method.map(ContentMethod::as_str).unwrap_or(""),
                    locale = locale.map(Locale::as_str).unwrap_or(""),
                    "Cleared content cache"
                );
            }
        }
    }

    pub async fn clear(&self) {
        self.invalidate(None, None).await;
    }

    async fn cached<T, F, Fut>(&self, key: CacheKey, load: F) -> Result<T, ContentError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RepoError>>,
    {
        if let Some(hit) = self.cache.get_json::<T>(key.as_str()).await {
            debug!(target = "quire::content", key = %key, "cache hit");
            return Ok(hit);
        }

        let method = key.method();
        let value = retry(&self.retry, method.as_str(), load)
            .await
            .map_err(|source| ContentError::Repo { method, source })?;

        self.cache.set_json(key.as_str(), &value, self.ttl).await;
        Ok(value)
    }
}
