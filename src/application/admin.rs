//! Admin write paths for books, articles and events.
//!
//! Every successful write invalidates the content cache so the next public
//! read reflects it without waiting out the TTL.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::content::ContentService;
use crate::application::repos::{
    ArticleParams, ArticlesRepo, ArticlesWriteRepo, BookParams, BooksRepo, BooksWriteRepo,
    EventParams, EventsRepo, EventsWriteRepo, RepoError,
};
use crate::cache::ContentMethod;
use crate::domain::entities::{ArticleRecord, BookRecord, EventRecord};
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async, is_canonical};
use crate::domain::text_list::TextList;
use crate::domain::types::Locale;

#[derive(Debug, Error)]
pub enum AdminContentError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("resource not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookCommand {
    #[serde(default)]
    pub slug: Option<String>,
    pub locale: Locale,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub purchase_url: Option<String>,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleCommand {
    #[serde(default)]
    pub slug: Option<String>,
    pub locale: Locale,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub read_time: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub publish_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub published: bool,
    /// Set when this article translates an existing original.
    #[serde(default)]
    pub original_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventCommand {
    pub locale: Locale,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Clone)]
pub struct AdminContentService {
    books: Arc<dyn BooksRepo>,
    books_writer: Arc<dyn BooksWriteRepo>,
    articles: Arc<dyn ArticlesRepo>,
    articles_writer: Arc<dyn ArticlesWriteRepo>,
    events: Arc<dyn EventsRepo>,
    events_writer: Arc<dyn EventsWriteRepo>,
    content: ContentService,
}

impl AdminContentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        books: Arc<dyn BooksRepo>,
        books_writer: Arc<dyn BooksWriteRepo>,
        articles: Arc<dyn ArticlesRepo>,
        articles_writer: Arc<dyn ArticlesWriteRepo>,
        events: Arc<dyn EventsRepo>,
        events_writer: Arc<dyn EventsWriteRepo>,
        content: ContentService,
    ) -> Self {
        Self {
            books,
            books_writer,
            articles,
            articles_writer,
            events,
            events_writer,
            content,
        }
    }

    pub fn content(&self) -> &ContentService {
        &self.content
    }

    pub async fn create_book(&self, command: BookCommand) -> Result<BookRecord, AdminContentError> {
        ensure_non_empty(&command.title, "title")?;
        let slug = match command.slug.as_deref() {
            Some(slug) => canonical_slug(slug)?,
            None => {
                self.unique_book_slug(&command.title, command.locale)
                    .await?
            }
        };

        let record = self
            .books_writer
            .create_book(book_params(slug, command))
            .await?;
        self.written(ContentMethod::Books, "create_book", record.id)
            .await;
        Ok(record)
    }

    pub async fn update_book(
        &self,
        id: i64,
        command: BookCommand,
    ) -> Result<BookRecord, AdminContentError> {
        ensure_non_empty(&command.title, "title")?;
        let existing = self
            .books
            .find_book_by_id(id)
            .await?
            .ok_or(AdminContentError::NotFound)?;
        let slug = match command.slug.as_deref() {
            Some(slug) => canonical_slug(slug)?,
            None => existing.slug,
        };

        let record = self
            .books_writer
            .update_book(id, book_params(slug, command))
            .await
            .map_err(not_found_or_repo)?;
        self.written(ContentMethod::Books, "update_book", record.id)
            .await;
        Ok(record)
    }

    pub async fn delete_book(&self, id: i64) -> Result<BookRecord, AdminContentError> {
        let record = self
            .books_writer
            .delete_book(id)
            .await
            .map_err(not_found_or_repo)?;
        self.written(ContentMethod::Books, "delete_book", record.id)
            .await;
        Ok(record)
    }

    pub async fn create_article(
        &self,
        command: ArticleCommand,
    ) -> Result<ArticleRecord, AdminContentError> {
        ensure_non_empty(&command.title, "title")?;
        self.ensure_valid_original(None, command.original_id, command.locale)
            .await?;
        let slug = match command.slug.as_deref() {
            Some(slug) => canonical_slug(slug)?,
            None => {
                self.unique_article_slug(&command.title, command.locale)
                    .await?
            }
        };
        let publish_date = command.publish_date.unwrap_or_else(OffsetDateTime::now_utc);

        let record = self
            .articles_writer
            .create_article(article_params(slug, publish_date, command))
            .await?;
        self.written(ContentMethod::Articles, "create_article", record.id)
            .await;
        Ok(record)
    }

    pub async fn update_article(
        &self,
        id: i64,
        command: ArticleCommand,
    ) -> Result<ArticleRecord, AdminContentError> {
        ensure_non_empty(&command.title, "title")?;
        let existing = self
            .articles
            .find_article_by_id(id)
            .await?
            .ok_or(AdminContentError::NotFound)?;
        self.ensure_pair_kept(&existing, &command).await?;
        self.ensure_valid_original(Some(id), command.original_id, command.locale)
            .await?;
        let slug = match command.slug.as_deref() {
            Some(slug) => canonical_slug(slug)?,
            None => existing.slug,
        };

        let publish_date = command.publish_date.unwrap_or(existing.publish_date);

        let record = self
            .articles_writer
            .update_article(id, article_params(slug, publish_date, command))
            .await
            .map_err(not_found_or_repo)?;
        self.written(ContentMethod::Articles, "update_article", record.id)
            .await;
        Ok(record)
    }

    /// Delete an article and its paired translation.
    pub async fn delete_article(&self, id: i64) -> Result<Vec<ArticleRecord>, AdminContentError> {
        let removed = self
            .articles_writer
            .delete_article(id)
            .await
            .map_err(not_found_or_repo)?;
        if removed.is_empty() {
            return Err(AdminContentError::NotFound);
        }
        self.written(ContentMethod::Articles, "delete_article", id)
            .await;
        Ok(removed)
    }

    pub async fn create_event(
        &self,
        command: EventCommand,
    ) -> Result<EventRecord, AdminContentError> {
        ensure_non_empty(&command.title, "title")?;
        let record = self
            .events_writer
            .create_event(event_params(command))
            .await?;
        self.written(ContentMethod::Events, "create_event", record.id)
            .await;
        Ok(record)
    }

    pub async fn update_event(
        &self,
        id: i64,
        command: EventCommand,
    ) -> Result<EventRecord, AdminContentError> {
        ensure_non_empty(&command.title, "title")?;
        self.events
            .find_event_by_id(id)
            .await?
            .ok_or(AdminContentError::NotFound)?;

        let record = self
            .events_writer
            .update_event(id, event_params(command))
            .await
            .map_err(not_found_or_repo)?;
        self.written(ContentMethod::Events, "update_event", record.id)
            .await;
        Ok(record)
    }

    pub async fn delete_event(&self, id: i64) -> Result<EventRecord, AdminContentError> {
        let record = self
            .events_writer
            .delete_event(id)
            .await
            .map_err(not_found_or_repo)?;
        self.written(ContentMethod::Events, "delete_event", record.id)
            .await;
        Ok(record)
    }

    /// A translation must point at an existing original in the other locale.
    async fn ensure_valid_original(
        &self,
        id: Option<i64>,
        original_id: Option<i64>,
        locale: Locale,
    ) -> Result<(), AdminContentError> {
        let Some(original_id) = original_id else {
            return Ok(());
        };

        if id == Some(original_id) {
            return Err(AdminContentError::ConstraintViolation("original_id"));
        }

        let original = self
            .articles
            .find_article_by_id(original_id)
            .await?
            .ok_or(AdminContentError::ConstraintViolation("original_id"))?;

        if original.is_translation() {
            return Err(AdminContentError::ConstraintViolation("original_id"));
        }
        if original.locale == locale {
            return Err(AdminContentError::ConstraintViolation("locale"));
        }
        if let Some(translation) = self.articles.find_translation_of(original_id).await?
            && Some(translation.id) != id
        {
            return Err(AdminContentError::ConstraintViolation("original_id"));
        }

        Ok(())
    }

    /// An original with a translation stays an original, in the other locale.
    async fn ensure_pair_kept(
        &self,
        existing: &ArticleRecord,
        command: &ArticleCommand,
    ) -> Result<(), AdminContentError> {
        let Some(translation) = self.articles.find_translation_of(existing.id).await? else {
            return Ok(());
        };

        if command.original_id.is_some() {
            return Err(AdminContentError::ConstraintViolation("original_id"));
        }
        if command.locale == translation.locale {
            return Err(AdminContentError::ConstraintViolation("locale"));
        }

        Ok(())
    }

    async fn unique_book_slug(
        &self,
        title: &str,
        locale: Locale,
    ) -> Result<String, AdminContentError> {
        let reader = self.books.clone();
        let result = generate_unique_slug_async(title, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .find_book_by_slug(&candidate, locale)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await;
        slug_result(result)
    }

    async fn unique_article_slug(
        &self,
        title: &str,
        locale: Locale,
    ) -> Result<String, AdminContentError> {
        let reader = self.articles.clone();
        let result = generate_unique_slug_async(title, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .find_article_by_slug(&candidate, locale)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await;
        slug_result(result)
    }

    async fn written(&self, method: ContentMethod, action: &'static str, id: i64) {
        self.content.invalidate(Some(method), None).await;
        info!(target = "quire::admin", action, id, "Content written");
    }
}

fn ensure_non_empty(value: &str, field: &'static str) -> Result<(), AdminContentError> {
    if value.trim().is_empty() {
        return Err(AdminContentError::ConstraintViolation(field));
    }
    Ok(())
}

fn canonical_slug(slug: &str) -> Result<String, AdminContentError> {
    let slug = slug.trim();
    if !is_canonical(slug) {
        return Err(AdminContentError::ConstraintViolation("slug"));
    }
    Ok(slug.to_string())
}

fn slug_result(
    result: Result<String, SlugAsyncError<RepoError>>,
) -> Result<String, AdminContentError> {
    match result {
        Ok(slug) => Ok(slug),
        Err(SlugAsyncError::Slug(SlugError::EmptyInput | SlugError::Unrepresentable { .. })) => {
            Err(AdminContentError::ConstraintViolation("title"))
        }
        Err(SlugAsyncError::Slug(SlugError::Exhausted { .. })) => {
            Err(AdminContentError::ConstraintViolation("slug"))
        }
        Err(SlugAsyncError::Predicate(err)) => Err(AdminContentError::Repo(err)),
    }
}

fn not_found_or_repo(err: RepoError) -> AdminContentError {
    match err {
        RepoError::NotFound => AdminContentError::NotFound,
        other => AdminContentError::Repo(other),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn book_params(slug: String, command: BookCommand) -> BookParams {
    BookParams {
        slug,
        locale: command.locale,
        title: command.title.trim().to_string(),
        subtitle: trimmed(command.subtitle),
        excerpt: trimmed(command.excerpt),
        summary: command.summary,
        publisher: trimmed(command.publisher),
        page_count: command.page_count,
        year: command.year,
        isbn: trimmed(command.isbn),
        cover_image: trimmed(command.cover_image),
        category: trimmed(command.category),
        purchase_url: trimmed(command.purchase_url),
        quotes: TextList::new(command.quotes),
        reviews: TextList::new(command.reviews),
    }
}

fn article_params(
    slug: String,
    publish_date: OffsetDateTime,
    command: ArticleCommand,
) -> ArticleParams {
    ArticleParams {
        slug,
        locale: command.locale,
        title: command.title.trim().to_string(),
        subtitle: trimmed(command.subtitle),
        excerpt: command.excerpt,
        content: command.content,
        meta_description: trimmed(command.meta_description),
        image: trimmed(command.image),
        external_url: trimmed(command.external_url),
        category: trimmed(command.category),
        read_time: command.read_time,
        publish_date,
        published: command.published,
        original_id: command.original_id,
    }
}

fn event_params(command: EventCommand) -> EventParams {
    EventParams {
        locale: command.locale,
        title: command.title.trim().to_string(),
        subtitle: trimmed(command.subtitle),
        location: command.location,
        date: command.date,
        link: trimmed(command.link),
        featured_image: trimmed(command.featured_image),
        published: command.published,
    }
}
