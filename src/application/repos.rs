//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entities::{ArticleRecord, BookRecord, EventRecord};
use crate::domain::text_list::TextList;
use crate::domain::types::Locale;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookParams {
    pub slug: String,
    pub locale: Locale,
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: Option<String>,
    pub summary: String,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub purchase_url: Option<String>,
    pub quotes: TextList,
    pub reviews: TextList,
}

#[derive(Debug, Clone)]
pub struct ArticleParams {
    pub slug: String,
    pub locale: Locale,
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: String,
    pub content: String,
    pub meta_description: Option<String>,
    pub image: Option<String>,
    pub external_url: Option<String>,
    pub category: Option<String>,
    pub read_time: Option<i32>,
    pub publish_date: OffsetDateTime,
    pub published: bool,
    pub original_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct EventParams {
    pub locale: Locale,
    pub title: String,
    pub subtitle: Option<String>,
    pub location: String,
    pub date: OffsetDateTime,
    pub link: Option<String>,
    pub featured_image: Option<String>,
    pub published: bool,
}

#[async_trait]
pub trait BooksRepo: Send + Sync {
    /// Books of one locale in insertion order.
    async fn list_books(&self, locale: Locale) -> Result<Vec<BookRecord>, RepoError>;

    async fn find_book_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<BookRecord>, RepoError>;

    async fn find_book_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError>;
}

#[async_trait]
pub trait BooksWriteRepo: Send + Sync {
    async fn create_book(&self, params: BookParams) -> Result<BookRecord, RepoError>;

    async fn update_book(&self, id: i64, params: BookParams) -> Result<BookRecord, RepoError>;

    async fn delete_book(&self, id: i64) -> Result<BookRecord, RepoError>;
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    /// Published articles of one locale, newest publish date first.
    async fn list_published_articles(
        &self,
        locale: Locale,
    ) -> Result<Vec<ArticleRecord>, RepoError>;

    async fn find_published_article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError>;

    async fn find_published_article_by_id(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError>;

    /// Published row in `locale` whose `original_id` is `original_id`.
    async fn find_published_translation(
        &self,
        original_id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError>;

    /// Lookup regardless of publication state, for admin writes.
    async fn find_article_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError>;

    /// Translation of `original_id` in any locale or publication state.
    async fn find_translation_of(
        &self,
        original_id: i64,
    ) -> Result<Option<ArticleRecord>, RepoError>;

    async fn find_article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError>;
}

#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    async fn create_article(&self, params: ArticleParams) -> Result<ArticleRecord, RepoError>;

    async fn update_article(
        &self,
        id: i64,
        params: ArticleParams,
    ) -> Result<ArticleRecord, RepoError>;

    /// Delete an article together with its paired translation, returning every removed row.
    async fn delete_article(&self, id: i64) -> Result<Vec<ArticleRecord>, RepoError>;
}

#[async_trait]
pub trait EventsRepo: Send + Sync {
    /// Published events of one locale, soonest first.
    async fn list_published_events(&self, locale: Locale) -> Result<Vec<EventRecord>, RepoError>;

    async fn find_published_event(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<EventRecord>, RepoError>;

    async fn find_event_by_id(&self, id: i64) -> Result<Option<EventRecord>, RepoError>;
}

#[async_trait]
pub trait EventsWriteRepo: Send + Sync {
    async fn create_event(&self, params: EventParams) -> Result<EventRecord, RepoError>;

    async fn update_event(&self, id: i64, params: EventParams) -> Result<EventRecord, RepoError>;

    async fn delete_event(&self, id: i64) -> Result<EventRecord, RepoError>;
}
