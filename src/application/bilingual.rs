//! "Read this in the other language" resolution for article pairs.
//!
//! A pair is one original row (`original_id` is null) plus at most one
//! translation in the other locale whose `original_id` points at the
//! original. Resolution works from either side of the pair.

use tracing::debug;

use crate::application::content::{ContentError, ContentService};
use crate::domain::entities::SiblingRef;
use crate::domain::types::Locale;

#[derive(Clone)]
pub struct BilingualResolver {
    content: ContentService,
}

impl BilingualResolver {
    pub fn new(content: ContentService) -> Self {
        Self { content }
    }

    /// Find the paired article of `slug` in the other locale.
    ///
    /// Returns `None` when the article is unknown or unpublished, or when its
    /// pair has not been written (or published) yet.
    pub async fn resolve_sibling(
        &self,
        slug: &str,
        locale: Locale,
    ) -> Result<Option<SiblingRef>, ContentError> {
        let Some(article) = self.content.article_by_slug(slug, locale).await? else {
            return Ok(None);
        };

        let target = locale.other();
        let sibling = match article.original_id {
            Some(original_id) => self.content.article_by_id(original_id, target).await?,
            None => self.content.article_translation(article.id, target).await?,
        };

        debug!(
            target = "quire::bilingual",
            slug,
            locale = locale.as_str(),
            found = sibling.is_some(),
            "Resolved article sibling"
        );

        Ok(sibling.map(|sibling| SiblingRef {
            slug: sibling.slug,
            locale: sibling.locale,
        }))
    }
}
