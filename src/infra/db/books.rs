use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{BookParams, BooksRepo, BooksWriteRepo, RepoError},
    domain::{entities::BookRecord, text_list::TextList, types::Locale},
};

use super::{PostgresRepositories, map_sqlx_error, parse_locale};

const BOOK_COLUMNS: &str = "id, slug, locale, title, subtitle, excerpt, summary, publisher, \
    page_count, year, isbn, cover_image, category, purchase_url, quotes, reviews, \
    created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    slug: String,
    locale: String,
    title: String,
    subtitle: Option<String>,
    excerpt: Option<String>,
    summary: String,
    publisher: Option<String>,
    page_count: Option<i32>,
    year: Option<i32>,
    isbn: Option<String>,
    cover_image: Option<String>,
    category: Option<String>,
    purchase_url: Option<String>,
    quotes: String,
    reviews: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<BookRow> for BookRecord {
    type Error = RepoError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let quotes = TextList::decode(&row.quotes)
            .map_err(|err| RepoError::integrity(format!("book {} quotes: {err}", row.id)))?;
        let reviews = TextList::decode(&row.reviews)
            .map_err(|err| RepoError::integrity(format!("book {} reviews: {err}", row.id)))?;

        Ok(Self {
            id: row.id,
            slug: row.slug,
            locale: parse_locale(&row.locale)?,
            title: row.title,
            subtitle: row.subtitle,
            excerpt: row.excerpt,
            summary: row.summary,
            publisher: row.publisher,
            page_count: row.page_count,
            year: row.year,
            isbn: row.isbn,
            cover_image: row.cover_image,
            category: row.category,
            purchase_url: row.purchase_url,
            quotes,
            reviews,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl BooksRepo for PostgresRepositories {
    async fn list_books(&self, locale: Locale) -> Result<Vec<BookRecord>, RepoError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE locale = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(locale.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(BookRecord::try_from).collect()
    }

    async fn find_book_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<BookRecord>, RepoError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE slug = $1 AND locale = $2");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(slug)
            .bind(locale.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(BookRecord::try_from).transpose()
    }

    async fn find_book_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(BookRecord::try_from).transpose()
    }
}

#[async_trait]
impl BooksWriteRepo for PostgresRepositories {
    async fn create_book(&self, params: BookParams) -> Result<BookRecord, RepoError> {
        let sql = format!(
            "INSERT INTO books (slug, locale, title, subtitle, excerpt, summary, publisher, \
                page_count, year, isbn, cover_image, category, purchase_url, quotes, reviews) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {BOOK_COLUMNS}"
        );
        let row = bind_book(sqlx::query_as::<_, BookRow>(&sql), &params)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        BookRecord::try_from(row)
    }

    async fn update_book(&self, id: i64, params: BookParams) -> Result<BookRecord, RepoError> {
        let sql = format!(
            "UPDATE books SET slug = $1, locale = $2, title = $3, subtitle = $4, excerpt = $5, \
                summary = $6, publisher = $7, page_count = $8, year = $9, isbn = $10, \
                cover_image = $11, category = $12, purchase_url = $13, quotes = $14, \
                reviews = $15, updated_at = now() \
             WHERE id = $16 \
             RETURNING {BOOK_COLUMNS}"
        );
        let row = bind_book(sqlx::query_as::<_, BookRow>(&sql), &params)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        BookRecord::try_from(row)
    }

    async fn delete_book(&self, id: i64) -> Result<BookRecord, RepoError> {
        let sql = format!("DELETE FROM books WHERE id = $1 RETURNING {BOOK_COLUMNS}");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        BookRecord::try_from(row)
    }
}

type BookQuery<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, BookRow, sqlx::postgres::PgArguments>;

fn bind_book<'q>(query: BookQuery<'q>, params: &BookParams) -> BookQuery<'q> {
    query
        .bind(params.slug.clone())
        .bind(params.locale.as_str())
        .bind(params.title.clone())
        .bind(params.subtitle.clone())
        .bind(params.excerpt.clone())
        .bind(params.summary.clone())
        .bind(params.publisher.clone())
        .bind(params.page_count)
        .bind(params.year)
        .bind(params.isbn.clone())
        .bind(params.cover_image.clone())
        .bind(params.category.clone())
        .bind(params.purchase_url.clone())
        .bind(params.quotes.encode())
        .bind(params.reviews.encode())
}
