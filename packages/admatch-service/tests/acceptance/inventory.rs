use admatch_service::Error;
use admatch_testkit::{StubExtractor, service};

#[tokio::test]
async fn reload_swaps_the_inventory_atomically() {
	let service = service(StubExtractor::empty());

	let before = service
		.get_relevant_ads(&super::request("nike running shoes", None))
		.await
		.expect("delivery failed");

	assert_eq!(before.len(), 1);

	let replacement = serde_json::from_value(serde_json::json!([
		{
			"id": "ad_tablet",
			"title": "Volta Tablet",
			"keywords": ["tablet", "e-reader"],
			"bid_amount": 2.0,
			"daily_budget": 50.0,
		},
	]))
	.expect("inventory parse failed");
	let report = service.reload(replacement);

	assert_eq!(report.indexed, 1);

	let gone = service
		.get_relevant_ads(&super::request("nike running shoes", None))
		.await
		.expect("delivery failed");
	let fresh = service
		.get_relevant_ads(&super::request("a tablet for reading", None))
		.await
		.expect("delivery failed");

	assert!(gone.is_empty());
	assert_eq!(fresh.len(), 1);
	assert_eq!(fresh[0].id, "ad_tablet");
}

#[tokio::test]
async fn reload_reports_malformed_and_excluded_records() {
	let service = service(StubExtractor::empty());
	let mixed = serde_json::from_value(serde_json::json!([
		{ "id": "ad_ok", "title": "t", "keywords": ["k"] },
		{ "id": "", "title": "no id", "keywords": ["k"] },
		{ "id": "ad_bare", "title": "no keywords" },
		{ "id": "ad_paused", "title": "t", "keywords": ["k"], "active": false },
	]))
	.expect("inventory parse failed");
	let report = service.reload(mixed);

	assert_eq!(report.indexed, 1);
	assert_eq!(report.excluded, 1);
	assert_eq!(report.skipped.len(), 2);
}

#[tokio::test]
async fn rebuilding_with_unchanged_inventory_is_idempotent() {
	let service = service(StubExtractor::empty());
	let request = super::request("best nike running shoes", None);

	let before = service.get_relevant_ads(&request).await.expect("delivery failed");

	service.reload(admatch_testkit::inventory());
	service.reload(admatch_testkit::inventory());

	let after = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert_eq!(before.len(), after.len());
	assert_eq!(before[0].id, after[0].id);
	assert_eq!(before[0].match_factors.final_score, after[0].match_factors.final_score);
}

#[tokio::test]
async fn clicks_are_accepted_only_for_indexed_ads() {
	let service = service(StubExtractor::empty());

	service.record_click("ad_nike").expect("click failed");

	let err = service.record_click("ad_unknown").expect_err("expected unknown ad");

	assert!(matches!(err, Error::UnknownAd { .. }));
}
