//! In-memory repositories shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Mutex;

use quire::application::content::ContentService;
use quire::application::repos::{
    ArticleParams, ArticlesRepo, ArticlesWriteRepo, BookParams, BooksRepo, BooksWriteRepo,
    EventParams, EventsRepo, EventsWriteRepo, RepoError,
};
use quire::application::retry::RetryPolicy;
use quire::cache::CacheStore;
use quire::domain::entities::{ArticleRecord, BookRecord, EventRecord};
use quire::domain::text_list::TextList;
use quire::domain::types::Locale;

pub const CREATED: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);

#[derive(Default)]
struct Tables {
    next_id: i64,
    books: Vec<BookRecord>,
    articles: Vec<ArticleRecord>,
    events: Vec<EventRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Every repository trait backed by vectors, with a read counter and failure injection.
#[derive(Default)]
pub struct MemoryRepos {
    tables: Mutex<Tables>,
    reads: AtomicUsize,
    failures_left: AtomicU32,
}

impl MemoryRepos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of read queries that reached the repository.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make the next `count` reads fail with a timeout.
    pub fn fail_next_reads(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    fn begin_read(&self) -> Result<(), RepoError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(RepoError::Timeout);
        }
        Ok(())
    }

    pub async fn insert_book(&self, slug: &str, locale: Locale, title: &str) -> BookRecord {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = BookRecord {
            id,
            slug: slug.to_string(),
            locale,
            title: title.to_string(),
            subtitle: None,
            excerpt: None,
            summary: String::new(),
            publisher: None,
            page_count: None,
            year: None,
            isbn: None,
            cover_image: None,
            category: None,
            purchase_url: None,
            quotes: TextList::new(vec!["A quote".to_string()]),
            reviews: TextList::default(),
            created_at: CREATED,
            updated_at: CREATED,
        };
        tables.books.push(record.clone());
        record
    }

    pub async fn insert_article(
        &self,
        slug: &str,
        locale: Locale,
        published: bool,
        original_id: Option<i64>,
        publish_date: OffsetDateTime,
    ) -> ArticleRecord {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = ArticleRecord {
            id,
            slug: slug.to_string(),
            locale,
            title: slug.to_string(),
            subtitle: None,
            excerpt: String::new(),
            content: String::new(),
            meta_description: None,
            image: None,
            external_url: None,
            category: None,
            read_time: None,
            publish_date,
            published,
            original_id,
            created_at: CREATED,
            updated_at: CREATED,
        };
        tables.articles.push(record.clone());
        record
    }

    pub async fn insert_event(
        &self,
        title: &str,
        locale: Locale,
        published: bool,
        date: OffsetDateTime,
    ) -> EventRecord {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = EventRecord {
            id,
            locale,
            title: title.to_string(),
            subtitle: None,
            location: "Montréal".to_string(),
            date,
            link: None,
            featured_image: None,
            published,
            created_at: CREATED,
            updated_at: CREATED,
        };
        tables.events.push(record.clone());
        record
    }

    /// Change a book title behind the cache's back.
    pub async fn rename_book(&self, id: i64, title: &str) {
        let mut tables = self.tables.lock().await;
        if let Some(book) = tables.books.iter_mut().find(|book| book.id == id) {
            book.title = title.to_string();
        }
    }
}

/// Content service over `repos` with fast retries and a local-only cache.
pub fn content_service(repos: &Arc<MemoryRepos>) -> ContentService {
    ContentService::new(
        repos.clone(),
        repos.clone(),
        repos.clone(),
        Arc::new(CacheStore::local()),
    )
    .with_retry_policy(RetryPolicy::new(4, Duration::from_millis(10)))
}

#[async_trait]
impl BooksRepo for MemoryRepos {
    async fn list_books(&self, locale: Locale) -> Result<Vec<BookRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .books
            .iter()
            .filter(|book| book.locale == locale)
            .cloned()
            .collect())
    }

    async fn find_book_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<BookRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .books
            .iter()
            .find(|book| book.slug == slug && book.locale == locale)
            .cloned())
    }

    async fn find_book_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables.books.iter().find(|book| book.id == id).cloned())
    }
}

#[async_trait]
impl BooksWriteRepo for MemoryRepos {
    async fn create_book(&self, params: BookParams) -> Result<BookRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables
            .books
            .iter()
            .any(|book| book.slug == params.slug && book.locale == params.locale)
        {
            return Err(RepoError::Duplicate {
                constraint: "books_slug_locale_key".to_string(),
            });
        }
        let id = tables.next_id();
        let record = book_from_params(id, params);
        tables.books.push(record.clone());
        Ok(record)
    }

    async fn update_book(&self, id: i64, params: BookParams) -> Result<BookRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let book = tables
            .books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(RepoError::NotFound)?;
        *book = book_from_params(id, params);
        Ok(book.clone())
    }

    async fn delete_book(&self, id: i64) -> Result<BookRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let index = tables
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or(RepoError::NotFound)?;
        Ok(tables.books.remove(index))
    }
}

fn book_from_params(id: i64, params: BookParams) -> BookRecord {
    BookRecord {
        id,
        slug: params.slug,
        locale: params.locale,
        title: params.title,
        subtitle: params.subtitle,
        excerpt: params.excerpt,
        summary: params.summary,
        publisher: params.publisher,
        page_count: params.page_count,
        year: params.year,
        isbn: params.isbn,
        cover_image: params.cover_image,
        category: params.category,
        purchase_url: params.purchase_url,
        quotes: params.quotes,
        reviews: params.reviews,
        created_at: CREATED,
        updated_at: CREATED,
    }
}

#[async_trait]
impl ArticlesRepo for MemoryRepos {
    async fn list_published_articles(
        &self,
        locale: Locale,
    ) -> Result<Vec<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        let mut articles: Vec<ArticleRecord> = tables
            .articles
            .iter()
            .filter(|article| article.locale == locale && article.published)
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Ok(articles)
    }

    async fn find_published_article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.slug == slug && a.locale == locale && a.published)
            .cloned())
    }

    async fn find_published_article_by_id(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.id == id && a.locale == locale && a.published)
            .cloned())
    }

    async fn find_published_translation(
        &self,
        original_id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.original_id == Some(original_id) && a.locale == locale && a.published)
            .cloned())
    }

    async fn find_article_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn find_translation_of(
        &self,
        original_id: i64,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.original_id == Some(original_id))
            .cloned())
    }

    async fn find_article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.slug == slug && a.locale == locale)
            .cloned())
    }
}

#[async_trait]
impl ArticlesWriteRepo for MemoryRepos {
    async fn create_article(&self, params: ArticleParams) -> Result<ArticleRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables
            .articles
            .iter()
            .any(|a| a.slug == params.slug && a.locale == params.locale)
        {
            return Err(RepoError::Duplicate {
                constraint: "articles_slug_locale_key".to_string(),
            });
        }
        let id = tables.next_id();
        let record = article_from_params(id, params);
        tables.articles.push(record.clone());
        Ok(record)
    }

    async fn update_article(
        &self,
        id: i64,
        params: ArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let article = tables
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepoError::NotFound)?;
        *article = article_from_params(id, params);
        Ok(article.clone())
    }

    async fn delete_article(&self, id: i64) -> Result<Vec<ArticleRecord>, RepoError> {
        let mut tables = self.tables.lock().await;
        let original_of_target = tables
            .articles
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.original_id);
        let (removed, kept): (Vec<_>, Vec<_>) = tables.articles.drain(..).partition(|a| {
            a.id == id || a.original_id == Some(id) || Some(a.id) == original_of_target
        });
        tables.articles = kept;
        Ok(removed)
    }
}

fn article_from_params(id: i64, params: ArticleParams) -> ArticleRecord {
    ArticleRecord {
        id,
        slug: params.slug,
        locale: params.locale,
        title: params.title,
        subtitle: params.subtitle,
        excerpt: params.excerpt,
        content: params.content,
        meta_description: params.meta_description,
        image: params.image,
        external_url: params.external_url,
        category: params.category,
        read_time: params.read_time,
        publish_date: params.publish_date,
        published: params.published,
        original_id: params.original_id,
        created_at: CREATED,
        updated_at: CREATED,
    }
}

#[async_trait]
impl EventsRepo for MemoryRepos {
    async fn list_published_events(&self, locale: Locale) -> Result<Vec<EventRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        let mut events: Vec<EventRecord> = tables
            .events
            .iter()
            .filter(|event| event.locale == locale && event.published)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(events)
    }

    async fn find_published_event(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<EventRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id && e.locale == locale && e.published)
            .cloned())
    }

    async fn find_event_by_id(&self, id: i64) -> Result<Option<EventRecord>, RepoError> {
        self.begin_read()?;
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }
}

#[async_trait]
impl EventsWriteRepo for MemoryRepos {
    async fn create_event(&self, params: EventParams) -> Result<EventRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = event_from_params(id, params);
        tables.events.push(record.clone());
        Ok(record)
    }

    async fn update_event(&self, id: i64, params: EventParams) -> Result<EventRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let event = tables
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepoError::NotFound)?;
        *event = event_from_params(id, params);
        Ok(event.clone())
    }

    async fn delete_event(&self, id: i64) -> Result<EventRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let index = tables
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or(RepoError::NotFound)?;
        Ok(tables.events.remove(index))
    }
}

fn event_from_params(id: i64, params: EventParams) -> EventRecord {
    EventRecord {
        id,
        locale: params.locale,
        title: params.title,
        subtitle: params.subtitle,
        location: params.location,
        date: params.date,
        link: params.link,
        featured_image: params.featured_image,
        published: params.published,
        created_at: CREATED,
        updated_at: CREATED,
    }
}
