use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{EventParams, EventsRepo, EventsWriteRepo, RepoError},
    domain::{entities::EventRecord, types::Locale},
};

use super::{PostgresRepositories, map_sqlx_error, parse_locale};

const EVENT_COLUMNS: &str = "id, locale, title, subtitle, location, date, link, featured_image, \
    published, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    locale: String,
    title: String,
    subtitle: Option<String>,
    location: String,
    date: OffsetDateTime,
    link: Option<String>,
    featured_image: Option<String>,
    published: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = RepoError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            locale: parse_locale(&row.locale)?,
            title: row.title,
            subtitle: row.subtitle,
            location: row.location,
            date: row.date,
            link: row.link,
            featured_image: row.featured_image,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EventsRepo for PostgresRepositories {
    async fn list_published_events(&self, locale: Locale) -> Result<Vec<EventRecord>, RepoError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE locale = $1 AND published \
             ORDER BY date ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(locale.as_str())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(EventRecord::try_from).collect()
    }

    async fn find_published_event(
        &self,
        id: i64,
        locale: Locale,
    ) -> Result<Option<EventRecord>, RepoError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND locale = $2 AND published"
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(locale.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(EventRecord::try_from).transpose()
    }

    async fn find_event_by_id(&self, id: i64) -> Result<Option<EventRecord>, RepoError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(EventRecord::try_from).transpose()
    }
}

#[async_trait]
impl EventsWriteRepo for PostgresRepositories {
    async fn create_event(&self, params: EventParams) -> Result<EventRecord, RepoError> {
        let sql = format!(
            "INSERT INTO events (locale, title, subtitle, location, date, link, \
                featured_image, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {EVENT_COLUMNS}"
        );
        let row = bind_event(sqlx::query_as::<_, EventRow>(&sql), &params)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        EventRecord::try_from(row)
    }

    async fn update_event(&self, id: i64, params: EventParams) -> Result<EventRecord, RepoError> {
        let sql = format!(
            "UPDATE events SET locale = $1, title = $2, subtitle = $3, location = $4, \
                date = $5, link = $6, featured_image = $7, published = $8, updated_at = now() \
             WHERE id = $9 \
             RETURNING {EVENT_COLUMNS}"
        );
        let row = bind_event(sqlx::query_as::<_, EventRow>(&sql), &params)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        EventRecord::try_from(row)
    }

    async fn delete_event(&self, id: i64) -> Result<EventRecord, RepoError> {
        let sql = format!("DELETE FROM events WHERE id = $1 RETURNING {EVENT_COLUMNS}");
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        EventRecord::try_from(row)
    }
}

type EventQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, EventRow, sqlx::postgres::PgArguments>;

fn bind_event<'q>(query: EventQuery<'q>, params: &EventParams) -> EventQuery<'q> {
    query
        .bind(params.locale.as_str())
        .bind(params.title.clone())
        .bind(params.subtitle.clone())
        .bind(params.location.clone())
        .bind(params.date)
        .bind(params.link.clone())
        .bind(params.featured_image.clone())
        .bind(params.published)
}
