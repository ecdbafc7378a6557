use std::sync::Arc;

use admatch_service::{AdService, Providers};
use admatch_testkit::{StubExtractor, config, inventory};

fn service_without_consecutive_block() -> AdService {
	let mut cfg = config();

	cfg.frequency.block_consecutive = false;

	let providers = Providers::new(Arc::new(StubExtractor::empty()));
	let (service, _) = AdService::with_providers(cfg, inventory(), providers);

	service
}

fn two_laptop_ads() -> Vec<admatch_domain::Ad> {
	serde_json::from_value(serde_json::json!([
		{
			"id": "ad_laptop_pro",
			"title": "Laptop Pro",
			"keywords": ["laptop"],
			"bid_amount": 4.0,
			"daily_budget": 100.0,
		},
		{
			"id": "ad_laptop_lite",
			"title": "Laptop Lite",
			"keywords": ["laptop"],
			"bid_amount": 1.0,
			"daily_budget": 100.0,
		},
	]))
	.expect("inventory parse failed")
}

#[tokio::test]
async fn ad_is_suppressed_after_three_impressions() {
	let service = service_without_consecutive_block();
	let request = super::request("macbook laptop", Some("conv_cap"));

	for _ in 0..3 {
		let ads = service.get_relevant_ads(&request).await.expect("delivery failed");

		assert_eq!(ads.len(), 1);
		assert_eq!(ads[0].id, "ad_macbook");
	}

	let suppressed = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert!(suppressed.is_empty());
}

#[tokio::test]
async fn consecutive_repeats_alternate_between_qualifying_ads() {
	let service =
		admatch_testkit::service_with_inventory(StubExtractor::empty(), two_laptop_ads());
	let request = super::request("laptop", Some("conv_alt"));

	let first = service.get_relevant_ads(&request).await.expect("delivery failed");
	let second = service.get_relevant_ads(&request).await.expect("delivery failed");
	let third = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert_eq!(first[0].id, "ad_laptop_pro");
	assert_eq!(second[0].id, "ad_laptop_lite");
	assert_eq!(third[0].id, "ad_laptop_pro");
}

#[tokio::test]
async fn context_free_requests_are_never_frequency_capped() {
	let service = service_without_consecutive_block();
	let request = super::request("macbook laptop", None);

	for _ in 0..5 {
		let ads = service.get_relevant_ads(&request).await.expect("delivery failed");

		assert_eq!(ads.len(), 1);
	}
}
