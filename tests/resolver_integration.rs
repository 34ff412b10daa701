//! Integration tests for the resolver workflow.
//!
//! Providers are scripted in memory and the tokio clock is paused, so TTLs
//! and deadlines are exercised without real waiting or network access.

mod common;

use std::time::Duration;

use common::{
    ANSWER_TTL, LINK, NO_RESULTS_TTL, ScriptedDocuments, ScriptedSearch, resolver_config,
};
use guru::{GuruError, NO_RESULTS, Resolver};

const DEADLINE: Duration = Duration::from_secs(3);

#[tokio::test(start_paused = true)]
async fn fetched_answer_is_cached_under_both_keys() {
    let search = ScriptedSearch::returning(&[LINK]);
    let documents = ScriptedDocuments::answering(&[(LINK, "func BinarySearch() {...}")]);
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let answer = resolver.resolve("binary search go", DEADLINE).await.expect("answer");

    assert_eq!(answer, "func BinarySearch() {...}");
    assert_eq!(doc_probe.calls(), 1);
    assert_eq!(
        resolver.question_cache().get("binary search go").as_deref(),
        Some("func BinarySearch() {...}")
    );
    assert_eq!(
        resolver.link_cache().get(LINK).as_deref(),
        Some("func BinarySearch() {...}")
    );

    // Longer TTL: still present after the no-results TTL, gone after the answer TTL.
    tokio::time::advance(NO_RESULTS_TTL + Duration::from_secs(1)).await;
    assert!(resolver.question_cache().get("binary search go").is_some());
    tokio::time::advance(ANSWER_TTL - NO_RESULTS_TTL).await;
    assert!(resolver.question_cache().get("binary search go").is_none());
    assert!(resolver.link_cache().get(LINK).is_none());
}

#[tokio::test(start_paused = true)]
async fn question_cache_hit_skips_network() {
    let search = ScriptedSearch::returning(&[LINK]);
    let search_probe = search.probe.clone();
    let documents = ScriptedDocuments::answering(&[(LINK, "answer")]);
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    resolver.resolve("q", DEADLINE).await.expect("first");
    let second = resolver.resolve("q", DEADLINE).await.expect("second");

    assert_eq!(second, "answer");
    assert_eq!(search_probe.calls(), 1);
    assert_eq!(doc_probe.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_links_caches_sentinel_with_short_ttl() {
    let search = ScriptedSearch::returning(&[]);
    let search_probe = search.probe.clone();
    let documents = ScriptedDocuments::answering(&[]);
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let answer = resolver.resolve("some question", DEADLINE).await.expect("answer");

    assert_eq!(answer, NO_RESULTS);
    assert_eq!(doc_probe.calls(), 0);
    assert!(resolver.link_cache().is_empty());
    assert_eq!(
        resolver.question_cache().get("some question").as_deref(),
        Some(NO_RESULTS)
    );

    tokio::time::advance(NO_RESULTS_TTL).await;
    assert!(resolver.question_cache().get("some question").is_none());

    // Expired sentinel means the next request searches again.
    resolver.resolve("some question", DEADLINE).await.expect("retry");
    assert_eq!(search_probe.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn link_cache_hit_skips_fetch_and_backfills_question() {
    let search = ScriptedSearch::returning(&[LINK]);
    let documents = ScriptedDocuments::answering(&[(LINK, "fresh answer")]);
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");
    resolver
        .link_cache()
        .put(LINK, "cached answer", ANSWER_TTL)
        .expect("seed link cache");

    let answer = resolver.resolve("go binary search", DEADLINE).await.expect("answer");

    assert_eq!(answer, "cached answer");
    assert_eq!(doc_probe.calls(), 0);
    assert_eq!(
        resolver.question_cache().get("go binary search").as_deref(),
        Some("cached answer")
    );
}

#[tokio::test(start_paused = true)]
async fn empty_extraction_caches_sentinel_under_both_keys() {
    let search = ScriptedSearch::returning(&[LINK]);
    let documents = ScriptedDocuments::answering(&[(LINK, "  \n ")]);
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let answer = resolver.resolve("unanswerable", DEADLINE).await.expect("answer");

    assert_eq!(answer, NO_RESULTS);
    assert_eq!(resolver.question_cache().get("unanswerable").as_deref(), Some(NO_RESULTS));
    assert_eq!(resolver.link_cache().get(LINK).as_deref(), Some(NO_RESULTS));

    tokio::time::advance(NO_RESULTS_TTL).await;
    assert!(resolver.question_cache().get("unanswerable").is_none());
    assert!(resolver.link_cache().get(LINK).is_none());
}

#[tokio::test(start_paused = true)]
async fn provider_failure_surfaces_and_caches_nothing() {
    let search = ScriptedSearch::failing("connection reset");
    let documents = ScriptedDocuments::answering(&[]);
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let err = resolver.resolve("q", DEADLINE).await.unwrap_err();

    assert!(matches!(err, GuruError::Search(_)), "got {err:?}");
    assert!(err.to_string().contains("connection reset"));
    assert!(resolver.question_cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn document_failure_surfaces() {
    let search = ScriptedSearch::returning(&[LINK]);
    let documents = ScriptedDocuments::answering(&[]);
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let err = resolver.resolve("q", DEADLINE).await.unwrap_err();

    assert!(matches!(err, GuruError::Search(_)), "got {err:?}");
    assert!(resolver.link_cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_during_search_cancels_background_work() {
    let search = ScriptedSearch::returning(&[LINK]).with_latency(Duration::from_secs(10));
    let search_probe = search.probe.clone();
    let documents = ScriptedDocuments::answering(&[(LINK, "late answer")]);
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let err = resolver
        .resolve("slow question", Duration::from_millis(500))
        .await
        .unwrap_err();
    assert!(matches!(err, GuruError::DeadlineExceeded(_)), "got {err:?}");

    // Give the background task every chance to finish if it were not cancelled.
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(search_probe.calls(), 1);
    assert_eq!(search_probe.completed(), 0);
    assert_eq!(doc_probe.calls(), 0);
    assert!(resolver.question_cache().is_empty());
    assert!(resolver.link_cache().is_empty());
}

#[tokio::test(start_paused = true)]
async fn deadline_during_fetch_aborts_fetch() {
    let search = ScriptedSearch::returning(&[LINK]);
    let documents =
        ScriptedDocuments::answering(&[(LINK, "late answer")]).with_latency(Duration::from_secs(10));
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let err = resolver
        .resolve("slow page", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, GuruError::DeadlineExceeded(_)), "got {err:?}");

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(doc_probe.calls(), 1);
    assert_eq!(doc_probe.completed(), 0);
    assert!(resolver.link_cache().get(LINK).is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_in_flight_resolution() {
    let search = ScriptedSearch::returning(&[LINK]).with_latency(Duration::from_secs(10));
    let search_probe = search.probe.clone();
    let documents = ScriptedDocuments::answering(&[(LINK, "answer")]);
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let (outcome, ()) = tokio::join!(resolver.resolve("q", Duration::from_secs(60)), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        resolver.shutdown();
    });

    assert!(matches!(outcome, Err(GuruError::Cancelled)), "got {outcome:?}");
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(search_probe.completed(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_distinct_questions_resolve_independently() {
    let other = "https://stackoverflow.com/questions/1/other";
    let search = ScriptedSearch::returning(&[LINK]);
    let documents = ScriptedDocuments::answering(&[(LINK, "shared answer"), (other, "unused")]);
    let doc_probe = documents.probe.clone();
    let resolver = Resolver::new(search, documents, &resolver_config()).expect("resolver");

    let (a, b) = tokio::join!(
        resolver.resolve("first", DEADLINE),
        resolver.resolve("second", DEADLINE)
    );

    assert_eq!(a.expect("first"), "shared answer");
    assert_eq!(b.expect("second"), "shared answer");
    assert!(doc_probe.calls() >= 1);
    assert_eq!(resolver.question_cache().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn oversized_ttl_still_returns_and_caches_answer() {
    let search = ScriptedSearch::returning(&[LINK]);
    let documents = ScriptedDocuments::answering(&[(LINK, "answer")]);
    let mut config = resolver_config();
    config.answer_ttl_secs = u64::MAX;
    config.no_results_ttl_secs = u64::MAX;
    let resolver = Resolver::new(search, documents, &config).expect("resolver");

    let answer = resolver.resolve("q", DEADLINE).await.expect("answer");

    assert_eq!(answer, "answer");
    assert_eq!(resolver.question_cache().get("q").as_deref(), Some("answer"));
}
