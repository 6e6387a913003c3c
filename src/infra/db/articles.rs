use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{ArticleParams, ArticlesRepo, ArticlesWriteRepo, RepoError},
    domain::{entities::ArticleRecord, types::Locale},
};

use super::{PostgresRepositories, map_sqlx_error, parse_locale};

const ARTICLE_COLUMNS: &str = "id, slug, locale, title, subtitle, excerpt, content, \
    meta_description, image, external_url, category, read_time, publish_date, published, \
    original_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    slug: String,
    locale: String,
    title: String,
    subtitle: Option<String>,
    excerpt: String,
    content: String,
    meta_description: Option<String>,
    image: Option<String>,
    external_url: Option<String>,
    category: Option<String>,
    read_time: Option<i32>,
    publish_date: OffsetDateTime,
    published: bool,
    original_id: Option<i64>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<ArticleRow> for ArticleRecord {
    type Error = RepoError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            slug: row.slug,
            locale: parse_locale(&row.locale)?,
            title: row.title,
            subtitle: row.subtitle,
            excerpt: row.excerpt,
            content: row.content,
            meta_description: row.meta_description,
            image: row.image,
            external_url: row.external_url,
            category: row.category,
            read_time: row.read_time,
            publish_date: row.publish_date,
            published: row.published,
            original_id: row.original_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresRepositories {
    async fn fetch_article(
        &self,
        condition: &str,
        bind_text: Option<&str>,
        bind_id: Option<i64>,
        locale: Option<Locale>,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE {condition}");
        let mut query = sqlx::query_as::<_, ArticleRow>(&sql);
        if let Some(text) = bind_text {
            query = query.bind(text.to_string());
        }
        if let Some(id) = bind_id {
            query = query.bind(id);
        }
        if let Some(locale) = locale {
            query = query.bind(locale.as_str());
        }

        let row = query
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ArticleRecord::try_from).transpose()
    }
}

#[async_trait]
impl ArticlesRepo for PostgresRepositories {
    async fn list_published_articles(
        &self,
        locale: Locale,
    ) -> Result<Vec<ArticleRecord>, RepoError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE locale = $1 AND published \
             ORDER BY publish_date DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(locale.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(ArticleRecord::try_from).collect()
    }

    async fn find_published_article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.fetch_article(
            "slug = $1 AND locale = $2 AND published",
            Some(slug),
            None,
            Some(locale),
        )
        .await
    }

    async fn find_published_article_by_id(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.fetch_article(
            "id = $1 AND locale = $2 AND published",
            None,
            Some(id),
            Some(locale),
        )
        .await
    }

    async fn find_published_translation(
        &self,
        original_id: i64,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.fetch_article(
            "original_id = $1 AND locale = $2 AND published",
            None,
            Some(original_id),
            Some(locale),
        )
        .await
    }

    async fn find_article_by_id(&self, id: i64) -> Result<Option<ArticleRecord>, RepoError> {
        self.fetch_article("id = $1", None, Some(id), None).await
    }

    async fn find_translation_of(
        &self,
        original_id: i64,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.fetch_article("original_id = $1", None, Some(original_id), None)
            .await
    }

    async fn find_article_by_slug(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<ArticleRecord>, RepoError> {
        self.fetch_article("slug = $1 AND locale = $2", Some(slug), None, Some(locale))
            .await
    }
}

#[async_trait]
impl ArticlesWriteRepo for PostgresRepositories {
    async fn create_article(&self, params: ArticleParams) -> Result<ArticleRecord, RepoError> {
        let sql = format!(
            "INSERT INTO articles (slug, locale, title, subtitle, excerpt, content, \
                meta_description, image, external_url, category, read_time, publish_date, \
                published, original_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {ARTICLE_COLUMNS}"
        );
        let row = bind_article(sqlx::query_as::<_, ArticleRow>(&sql), &params)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        ArticleRecord::try_from(row)
    }

    async fn update_article(
        &self,
        id: i64,
        params: ArticleParams,
    ) -> Result<ArticleRecord, RepoError> {
        let sql = format!(
            "UPDATE articles SET slug = $1, locale = $2, title = $3, subtitle = $4, \
                excerpt = $5, content = $6, meta_description = $7, image = $8, \
                external_url = $9, category = $10, read_time = $11, publish_date = $12, \
                published = $13, original_id = $14, updated_at = now() \
             WHERE id = $15 \
             RETURNING {ARTICLE_COLUMNS}"
        );
        let row = bind_article(sqlx::query_as::<_, ArticleRow>(&sql), &params)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        ArticleRecord::try_from(row)
    }

    async fn delete_article(&self, id: i64) -> Result<Vec<ArticleRecord>, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        // The pair: the row itself, its translation, and its original.
        let sql = format!(
            "DELETE FROM articles \
             WHERE id = $1 \
                OR original_id = $1 \
                OR id = (SELECT original_id FROM articles WHERE id = $1) \
             RETURNING {ARTICLE_COLUMNS}"
        );
        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        rows.into_iter().map(ArticleRecord::try_from).collect()
    }
}

type ArticleQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, ArticleRow, sqlx::postgres::PgArguments>;

fn bind_article<'q>(query: ArticleQuery<'q>, params: &ArticleParams) -> ArticleQuery<'q> {
    query
        .bind(params.slug.clone())
        .bind(params.locale.as_str())
        .bind(params.title.clone())
        .bind(params.subtitle.clone())
        .bind(params.excerpt.clone())
        .bind(params.content.clone())
        .bind(params.meta_description.clone())
        .bind(params.image.clone())
        .bind(params.external_url.clone())
        .bind(params.category.clone())
        .bind(params.read_time)
        .bind(params.publish_date)
        .bind(params.published)
        .bind(params.original_id)
}
