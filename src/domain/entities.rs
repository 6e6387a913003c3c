//! Domain entities mirrored from persistent storage.
//!
//! Records are serialized both for HTTP responses and as cache payloads, so
//! every field round-trips through JSON.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::{text_list::TextList, types::Locale};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: i64,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: i64,
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
    #[serde(with = "time::serde::rfc3339")]
    pub publish_date: OffsetDateTime,
    pub published: bool,
    /// Id of the original-language row when this row is a translation.
    pub original_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ArticleRecord {
    pub fn is_translation(&self) -> bool {
        self.original_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub locale: Locale,
    pub title: String,
    pub subtitle: Option<String>,
    /// Free-form venue text; may carry inline markup.
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub link: Option<String>,
    pub featured_image: Option<String>,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Reference to the same article in the other language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingRef {
    pub slug: String,
    pub locale: Locale,
}
