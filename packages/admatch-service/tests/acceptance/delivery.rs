use std::sync::Arc;

use admatch_service::{AdService, Error, Providers};
use admatch_testkit::{FailingExtractor, StubExtractor, config, init_tracing, service};

fn shoe_service() -> AdService {
	let mut stub = StubExtractor::transactional(&["running shoes", "marathon"]);

	stub.extraction.categories = vec!["footwear".to_string()];

	let service = service(stub);

	init_tracing(&service.cfg);

	service
}

#[tokio::test]
async fn running_shoes_query_serves_the_shoe_ad() {
	let service = shoe_service();
	let ads = service
		.get_relevant_ads(&super::request("I'm looking for new running shoes", None))
		.await
		.expect("delivery failed");

	assert_eq!(ads.len(), 1);

	let ad = &ads[0];

	assert_eq!(ad.id, "ad_nike");
	assert_eq!(ad.cta, "Shop Now");
	assert!(ad.relevance_score > 0.3);
	assert!(ad.relevance_score <= 1.0);
	assert!(ad.match_factors.matched_keywords.contains(&"running shoes".to_string()));
	assert!(ad.match_factors.sub_scores.keyword >= 0.9);
	assert!(ad.match_factors.sub_scores.category > 0.0);
	assert!(ad.match_factors.final_score > 0.0);
	assert!(!ad.match_factors.annotation_degraded);
}

#[tokio::test]
async fn bargain_query_never_surfaces_the_vetoed_tv() {
	let service = service(StubExtractor::empty());
	let ads = service
		.get_relevant_ads(&super::request("what's the cheapest tv I can get", None))
		.await
		.expect("delivery failed");

	assert!(ads.iter().all(|ad| ad.id != "ad_oled_tv"));
}

#[tokio::test]
async fn veto_holds_even_with_the_threshold_at_zero() {
	let mut cfg = config();

	cfg.matcher.relevance_threshold = 0.0;

	let providers = Providers::new(Arc::new(StubExtractor::empty()));
	let (service, _) = AdService::with_providers(cfg, admatch_testkit::inventory(), providers);
	let ads = service
		.get_relevant_ads(&super::request("what's the cheapest tv I can get", None))
		.await
		.expect("delivery failed");

	assert!(ads.iter().all(|ad| ad.id != "ad_oled_tv"));
}

#[tokio::test]
async fn unrelated_query_returns_nothing() {
	let service = service(StubExtractor::empty());
	let ads = service
		.get_relevant_ads(&super::request("how do I water my succulents", None))
		.await
		.expect("delivery failed");

	assert!(ads.is_empty());
}

#[tokio::test]
async fn empty_query_is_rejected() {
	let service = service(StubExtractor::empty());
	let err = service
		.get_relevant_ads(&super::request("   ", None))
		.await
		.expect_err("expected invalid request");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn empty_inventory_returns_empty_list() {
	let service = admatch_testkit::service_with_inventory(StubExtractor::empty(), Vec::new());
	let ads = service
		.get_relevant_ads(&super::request("running shoes", None))
		.await
		.expect("delivery failed");

	assert!(ads.is_empty());
}

#[tokio::test]
async fn dead_extractor_degrades_but_still_serves() {
	let service = admatch_testkit::service_with_inventory(
		FailingExtractor,
		admatch_testkit::inventory(),
	);
	let ads = service
		.get_relevant_ads(&super::request("I want to buy nike running shoes", None))
		.await
		.expect("delivery failed");

	assert_eq!(ads.len(), 1);
	assert_eq!(ads[0].id, "ad_nike");
	assert!(ads[0].match_factors.annotation_degraded);
}

#[tokio::test]
async fn scores_are_reproducible_without_jitter() {
	let cfg = config();

	assert!(!cfg.ranking.tie_breaker);

	let service = shoe_service();
	let request = super::request("best running shoes for a marathon", None);
	let first = service.get_relevant_ads(&request).await.expect("delivery failed");
	let second = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert_eq!(first[0].match_factors.final_score, second[0].match_factors.final_score);
}
