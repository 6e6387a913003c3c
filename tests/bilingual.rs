//! Sibling resolution across the en/fr article pair.

mod support;

use time::macros::datetime;

use quire::application::bilingual::BilingualResolver;
use quire::domain::entities::SiblingRef;
use quire::domain::types::Locale;

use support::{MemoryRepos, content_service};

async fn seeded_pair() -> (std::sync::Arc<MemoryRepos>, BilingualResolver) {
    let repos = MemoryRepos::new();
    let hello = repos
        .insert_article(
            "hello",
            Locale::En,
            true,
            None,
            datetime!(2024-04-01 00:00 UTC),
        )
        .await;
    repos
        .insert_article(
            "bonjour",
            Locale::Fr,
            true,
            Some(hello.id),
            datetime!(2024-04-02 00:00 UTC),
        )
        .await;
    let resolver = BilingualResolver::new(content_service(&repos));
    (repos, resolver)
}

#[tokio::test]
async fn original_resolves_to_translation() {
    let (_repos, resolver) = seeded_pair().await;

    let sibling = resolver
        .resolve_sibling("hello", Locale::En)
        .await
        .expect("resolve");

    assert_eq!(
        sibling,
        Some(SiblingRef {
            slug: "bonjour".to_string(),
            locale: Locale::Fr,
        })
    );
}

#[tokio::test]
async fn translation_resolves_to_original() {
    let (_repos, resolver) = seeded_pair().await;

    let sibling = resolver
        .resolve_sibling("bonjour", Locale::Fr)
        .await
        .expect("resolve");

    assert_eq!(
        sibling,
        Some(SiblingRef {
            slug: "hello".to_string(),
            locale: Locale::En,
        })
    );
}

#[tokio::test]
async fn wrong_locale_for_slug_is_absent() {
    let (_repos, resolver) = seeded_pair().await;

    let sibling = resolver
        .resolve_sibling("hello", Locale::Fr)
        .await
        .expect("resolve");

    assert!(sibling.is_none());
}

#[tokio::test]
async fn missing_translation_is_absent() {
    let repos = MemoryRepos::new();
    repos
        .insert_article(
            "solo",
            Locale::En,
            true,
            None,
            datetime!(2024-04-01 00:00 UTC),
        )
        .await;
    let resolver = BilingualResolver::new(content_service(&repos));

    let sibling = resolver
        .resolve_sibling("solo", Locale::En)
        .await
        .expect("resolve");

    assert!(sibling.is_none());
}

#[tokio::test]
async fn unpublished_translation_is_absent() {
    let repos = MemoryRepos::new();
    let original = repos
        .insert_article(
            "hello",
            Locale::En,
            true,
            None,
            datetime!(2024-04-01 00:00 UTC),
        )
        .await;
    repos
        .insert_article(
            "bonjour",
            Locale::Fr,
            false,
            Some(original.id),
            datetime!(2024-04-02 00:00 UTC),
        )
        .await;
    let resolver = BilingualResolver::new(content_service(&repos));

    let sibling = resolver
        .resolve_sibling("hello", Locale::En)
        .await
        .expect("resolve");

    assert!(sibling.is_none());
}

#[tokio::test]
async fn repeated_resolution_hits_the_cache() {
    let (repos, resolver) = seeded_pair().await;

    resolver
        .resolve_sibling("bonjour", Locale::Fr)
        .await
        .expect("resolve");
    let reads = repos.reads();
    resolver
        .resolve_sibling("bonjour", Locale::Fr)
        .await
        .expect("resolve");

    assert_eq!(repos.reads(), reads);
}
