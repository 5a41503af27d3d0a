//! Integration tests for the generation pipeline.
//!
//! These tests run the whole flow against mocks:
//! 1. Quota check
//! 2. Enrichment (or not)
//! 3. Per-platform generation
//! 4. Normalization and scoring
//! 5. Quota commit

use std::sync::Arc;
use std::time::Duration;

use creative_engine::{
    record_generation,
    testing::{MockFailure, MockFetcher, MockProvider},
    AdRequest, CreativeFilter, CreativeStore, Customization, FailureKind, MemoryCreativeStore,
    MemoryQuotaStore, Pipeline, PipelineConfig, PipelineError, ScrapedProduct, Tone,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

type TestPipeline = Pipeline<MockProvider, MemoryQuotaStore, MockFetcher>;

/// Helper to build a pipeline with one funded account.
fn setup(provider: MockProvider, fetcher: MockFetcher, credits: u32) -> TestPipeline {
    let quota = Arc::new(MemoryQuotaStore::new().with_account("user-1", credits));
    Pipeline::new(provider, quota, fetcher).unwrap()
}

fn organic_tea() -> AdRequest {
    AdRequest::text(
        "Organic Tea",
        "Premium organic green tea that boosts energy",
        "busy professionals",
    )
    .with_platform("instagram_feed")
    .with_tone(Tone::Professional)
}

#[tokio::test]
async fn test_single_platform_generation_end_to_end() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 5);

    let result = pipeline
        .generate("user-1", &organic_tea(), &CancellationToken::new())
        .await
        .unwrap();

    let feed = result.creatives_for("instagram_feed");
    assert_eq!(feed.len(), 3);
    assert!(feed.iter().all(|c| c.platform == "instagram_feed"));
    assert!(feed.iter().all(|c| (50..=100).contains(&c.performance_score)));
    assert_eq!(result.credits_remaining, 4);
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 4);

    assert_eq!(result.analysis.features, vec!["organic", "premium"]);
    assert_eq!(result.analysis.benefits, vec!["energy", "boost"]);
    assert_eq!(result.product.features, vec!["organic", "premium"]);

    assert_eq!(result.metadata.platforms_generated, vec!["instagram_feed"]);
    assert_eq!(result.metadata.requested, 3);
    assert_eq!(result.metadata.produced, 3);
    assert!(result.failures.is_empty());
    assert_eq!(result.summary(), "Generated 3 creatives across 1 platform(s)");
}

#[tokio::test]
async fn test_last_credit_then_insufficient() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 1);
    let cancel = CancellationToken::new();

    let result = pipeline.generate("user-1", &organic_tea(), &cancel).await.unwrap();
    assert_eq!(result.credits_remaining, 0);

    let calls_before = pipeline.client().provider().completion_calls();
    let err = pipeline.generate("user-1", &organic_tea(), &cancel).await.unwrap_err();

    assert!(matches!(err, PipelineError::InsufficientCredits { .. }));
    assert!(err.to_string().contains("upgrade"));
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 0);
    // rejected before any provider call
    assert_eq!(pipeline.client().provider().completion_calls(), calls_before);
}

#[tokio::test]
async fn test_unknown_account_is_rejected() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 1);

    let err = pipeline
        .generate("nobody", &organic_tea(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::AccountNotFound { .. }));
}

#[tokio::test]
async fn test_scrape_failure_falls_back_to_manual_fields() {
    let fetcher = MockFetcher::failing();
    let pipeline = setup(MockProvider::new(), fetcher.clone(), 2);

    let request = AdRequest::from_url("https://shop.example.com/tea", "busy professionals")
        .with_product_name("Organic Tea")
        .with_description("Premium organic green tea that boosts energy")
        .with_platform("instagram_feed");

    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(fetcher.fetched(), vec!["https://shop.example.com/tea"]);
    assert_eq!(result.len(), 3);
    assert_eq!(result.product.product_name, "Organic Tea");
    assert!(result.product.images.is_empty());
    assert_eq!(result.credits_remaining, 1);
}

#[tokio::test]
async fn test_scraped_fields_fill_gaps() {
    let page = ScrapedProduct {
        title: Some("Sencha Green Tea".into()),
        description: Some("Natural handmade tea to improve focus".into()),
        price: Some(12.5),
        images: vec!["https://shop.example.com/sencha.jpg".into()],
        brand: Some("shop".into()),
        category: "beverage".into(),
        url: "https://shop.example.com/sencha".into(),
    };
    let fetcher = MockFetcher::new().with_page("https://shop.example.com/sencha", page);
    let pipeline = setup(MockProvider::new(), fetcher, 1);

    let request = AdRequest::from_url("https://shop.example.com/sencha", "tea lovers");
    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    let product = &result.product;
    assert_eq!(product.product_name, "Sencha Green Tea");
    assert_eq!(product.price, Some(12.5));
    assert_eq!(product.brand.as_deref(), Some("shop"));
    assert_eq!(product.features, vec!["natural", "handmade"]);
    assert_eq!(product.benefits, vec!["focus", "improve"]);
    assert!(!product.colors.is_empty());

    let prompt = &pipeline.client().provider().completions()[0].user;
    assert!(prompt.contains("Sencha Green Tea"));
    assert!(prompt.contains("$12.5"));
}

#[tokio::test]
async fn test_url_request_without_any_product_data_is_invalid() {
    let pipeline = setup(MockProvider::new(), MockFetcher::failing(), 1);

    let request = AdRequest::from_url("https://shop.example.com/missing", "everyone");
    let err = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidRequest { .. }));
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_unsupported_platform_is_isolated() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 3);

    let request = organic_tea().with_platform("myspace_banner");
    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.creatives_for("instagram_feed").len(), 3);
    assert!(result.creatives_for("myspace_banner").is_empty());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].platform, "myspace_banner");
    assert_eq!(result.failures[0].kind, FailureKind::Generation);
    assert_eq!(result.metadata.requested, 6);
    assert_eq!(result.metadata.produced, 3);
    assert_eq!(result.credits_remaining, 2);
}

#[tokio::test]
async fn test_platform_order_follows_request() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 1);

    let request = AdRequest::text("Organic Tea", "Premium organic green tea", "everyone")
        .with_platform("linkedin")
        .with_platform("instagram_story")
        .with_platform("google_display");

    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    let order: Vec<&str> = result.creatives.keys().map(String::as_str).collect();
    assert_eq!(order, vec!["linkedin", "instagram_story", "google_display"]);
    assert_eq!(result.metadata.platforms_generated, order);
}

#[tokio::test]
async fn test_sparse_response_is_filled_with_defaults() {
    let provider = MockProvider::new().with_response("instagram_feed", json!({"title": "X"}));
    let pipeline = setup(provider, MockFetcher::new(), 1);

    let result = pipeline
        .generate("user-1", &organic_tea(), &CancellationToken::new())
        .await
        .unwrap();

    let feed = result.creatives_for("instagram_feed");
    assert_eq!(feed.len(), 1);

    let creative = &feed[0];
    assert_eq!(creative.headline, "X");
    assert_eq!(creative.body_copy, "Generated ad copy");
    assert_eq!(creative.call_to_action, "Learn More");
    assert_eq!(creative.visual.color_scheme, vec!["#667eea", "#764ba2"]);
    assert_eq!(creative.target_emotions, vec!["engagement"]);
    assert_eq!(creative.performance_score, 75);
}

#[tokio::test]
async fn test_non_object_variation_is_recorded() {
    let provider = MockProvider::new().with_response(
        "instagram_feed",
        json!({"variations": [{"headline": "Good one"}, "just a string"]}),
    );
    let pipeline = setup(provider, MockFetcher::new(), 1);

    let result = pipeline
        .generate("user-1", &organic_tea(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind, FailureKind::Normalization);
}

#[tokio::test]
async fn test_config_error_aborts_without_debit() {
    let provider = MockProvider::new().with_failure("instagram_feed", MockFailure::Config);
    let pipeline = setup(provider, MockFetcher::new(), 3);

    let err = pipeline
        .generate("user-1", &organic_tea(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Configuration(_)));
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 3);
}

#[tokio::test]
async fn test_missing_credentials_rejected_at_construction() {
    let quota = Arc::new(MemoryQuotaStore::new().with_account("user-1", 3));
    let result = Pipeline::new(MockProvider::new().without_credentials(), quota, MockFetcher::new());

    assert!(matches!(result, Err(PipelineError::Configuration(_))));
}

#[tokio::test]
async fn test_all_units_failed_costs_nothing() {
    let provider = MockProvider::new()
        .with_failure("instagram_feed", MockFailure::Network)
        .with_failure("linkedin", MockFailure::Api);
    let pipeline = setup(provider, MockFetcher::new(), 2);

    let request = organic_tea().with_platform("linkedin");
    let err = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        PipelineError::AllUnitsFailed { failures } => {
            let platforms: Vec<&str> = failures.iter().map(|f| f.platform.as_str()).collect();
            assert_eq!(platforms, vec!["instagram_feed", "linkedin"]);
        }
        other => panic!("expected AllUnitsFailed, got {other}"),
    }
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_cancellation_costs_nothing() {
    let provider = MockProvider::new().with_delay(Duration::from_secs(30));
    let pipeline = setup(provider, MockFetcher::new(), 2);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = pipeline.generate("user-1", &organic_tea(), &cancel).await.unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_runs_each_cost_one_credit() {
    let pipeline = Arc::new(setup(MockProvider::new(), MockFetcher::new(), 10));

    let runs = (0..4).map(|_| {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            pipeline
                .generate("user-1", &organic_tea(), &CancellationToken::new())
                .await
        })
    });

    for run in futures::future::join_all(runs).await {
        assert!(run.unwrap().is_ok());
    }
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 6);
}

#[tokio::test]
async fn test_image_failures_keep_creatives() {
    let provider = MockProvider::new().with_image_failures();
    let pipeline = setup(provider, MockFetcher::new(), 1);

    let request = organic_tea().with_customization(Customization {
        generate_images: Some(true),
        ..Default::default()
    });
    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.iter().all(|c| c.visual.image_url.is_none()));
    assert_eq!(result.failures.len(), 3);
    assert!(result.failures.iter().all(|f| f.kind == FailureKind::Image));
    assert_eq!(result.credits_remaining, 0);
}

#[tokio::test]
async fn test_config_defaults_apply() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 1).with_config(
        PipelineConfig::default()
            .with_default_platform("linkedin")
            .with_variation_count(2),
    );

    let request = AdRequest::text("Organic Tea", "Premium organic green tea", "everyone");
    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.creatives_for("linkedin").len(), 2);
    assert_eq!(result.metadata.variations_per_platform, 2);
}

#[tokio::test]
async fn test_preview_touches_no_quota() {
    let page = ScrapedProduct {
        title: Some("Sencha".into()),
        description: Some("Premium sustainable tea for wellness".into()),
        price: None,
        images: vec![],
        brand: None,
        category: "beverage".into(),
        url: "https://shop.example.com/sencha".into(),
    };
    let fetcher = MockFetcher::new().with_page("https://shop.example.com/sencha", page);
    let pipeline = setup(MockProvider::new(), fetcher, 1);

    let preview = pipeline.preview_url("https://shop.example.com/sencha").await.unwrap();

    assert_eq!(preview.product.title.as_deref(), Some("Sencha"));
    assert_eq!(preview.analysis.features, vec!["premium", "sustainable"]);
    assert_eq!(preview.analysis.benefits, vec!["wellness"]);
    assert!(preview.colors.is_empty());
    assert_eq!(pipeline.ledger().balance("user-1").await.unwrap(), 1);
    assert_eq!(pipeline.client().provider().completion_calls(), 0);

    assert!(pipeline.preview_url("https://shop.example.com/other").await.is_err());
}

#[tokio::test]
async fn test_generated_creatives_are_recorded() {
    let pipeline = setup(MockProvider::new(), MockFetcher::new(), 1);
    let store = MemoryCreativeStore::new();

    let request = organic_tea().with_platform("linkedin");
    let result = pipeline
        .generate("user-1", &request, &CancellationToken::new())
        .await
        .unwrap();

    let ids = record_generation(&store, "user-1", &result).await.unwrap();
    assert_eq!(ids.len(), 6);

    let first = store.get("user-1", ids[0]).await.unwrap();
    assert_eq!(first.title, "Organic Tea - instagram_feed - Variation 1");

    let stats = store.stats("user-1").await.unwrap();
    assert_eq!(stats.total, 6);
    assert_eq!(stats.by_platform.len(), 2);
    assert_eq!(stats.average_performance_score, 100.0);

    let linkedin = CreativeFilter::default().with_platform("linkedin");
    assert_eq!(store.count("user-1", &linkedin).await.unwrap(), 3);
}
