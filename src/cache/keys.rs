//! Cache key definitions.
//!
//! A key is the accessor name followed by its arguments, joined with `:`
//! (`getBookBySlug:le-silence:fr`). Keys are deterministic so invalidation can
//! recompute them from the same inputs.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::Locale;

/// Content accessors whose results are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentMethod {
    Books,
    BookBySlug,
    Articles,
    ArticleBySlug,
    ArticleById,
    ArticleTranslation,
    Events,
    EventById,
}

impl ContentMethod {
    pub const ALL: [ContentMethod; 8] = [
        ContentMethod::Books,
        ContentMethod::BookBySlug,
        ContentMethod::Articles,
        ContentMethod::ArticleBySlug,
        ContentMethod::ArticleById,
        ContentMethod::ArticleTranslation,
        ContentMethod::Events,
        ContentMethod::EventById,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentMethod::Books => "getBooks",
            ContentMethod::BookBySlug => "getBookBySlug",
            ContentMethod::Articles => "getArticles",
            ContentMethod::ArticleBySlug => "getArticleBySlug",
            ContentMethod::ArticleById => "getArticleById",
            ContentMethod::ArticleTranslation => "getArticleTranslation",
            ContentMethod::Events => "getEvents",
            ContentMethod::EventById => "getEventById",
        }
    }
}

impl fmt::Display for ContentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown cache method `{0}`")]
pub struct UnknownMethod(pub String);

impl FromStr for ContentMethod {
    type Err = UnknownMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ContentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == value)
            .ok_or_else(|| UnknownMethod(value.to_string()))
    }
}

/// A computed cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: ContentMethod,
    key: String,
}

impl CacheKey {
    /// Build a key from an accessor and its arguments, in call order.
    pub fn new(method: ContentMethod, args: &[&dyn fmt::Display]) -> Self {
        let mut key = method.as_str().to_string();
        for arg in args {
            key.push(':');
            key.push_str(&arg.to_string());
        }
        Self { method, key }
    }

    /// Key of a per-locale listing such as `getBooks:en`.
    pub fn list(method: ContentMethod, locale: Locale) -> Self {
        Self::new(method, &[&locale])
    }

    pub fn by_slug(method: ContentMethod, slug: &str, locale: Locale) -> Self {
        Self::new(method, &[&slug, &locale])
    }

    pub fn by_id(method: ContentMethod, id: i64, locale: Locale) -> Self {
        Self::new(method, &[&id, &locale])
    }

    pub fn method(&self) -> ContentMethod {
        self.method
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_key_is_method_then_locale() {
        let key = CacheKey::list(ContentMethod::Books, Locale::En);
        assert_eq!(key.as_str(), "getBooks:en");
        assert_eq!(key.method(), ContentMethod::Books);
    }

    #[test]
    fn keys_are_deterministic() {
        let first = CacheKey::by_slug(ContentMethod::ArticleBySlug, "bonjour", Locale::Fr);
        let second = CacheKey::by_slug(ContentMethod::ArticleBySlug, "bonjour", Locale::Fr);
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "getArticleBySlug:bonjour:fr");
    }

    #[test]
    fn different_arguments_produce_different_keys() {
        let en = CacheKey::by_id(ContentMethod::EventById, 7, Locale::En);
        let fr = CacheKey::by_id(ContentMethod::EventById, 7, Locale::Fr);
        assert_ne!(en, fr);
    }

    #[test]
    fn method_names_round_trip() {
        for method in ContentMethod::ALL {
            assert_eq!(method.as_str().parse::<ContentMethod>(), Ok(method));
        }
        assert_eq!(
            "getAuthors".parse::<ContentMethod>(),
            Err(UnknownMethod("getAuthors".to_string()))
        );
    }
}
