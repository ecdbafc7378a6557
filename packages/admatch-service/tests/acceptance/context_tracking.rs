use admatch_testkit::{FailingExtractor, service};

#[tokio::test]
async fn accumulated_intent_feeds_context_aware_scoring() {
	let service = service(FailingExtractor);

	// First turn plants a purchase intent in the conversation.
	service
		.get_relevant_ads(&super::request("I'm looking to buy something nice", Some("conv_1")))
		.await
		.expect("delivery failed");

	let tracked = service
		.get_relevant_ads(&super::request("macbook laptop", Some("conv_1")))
		.await
		.expect("delivery failed");
	let context_free = service
		.get_relevant_ads(&super::request("macbook laptop", None))
		.await
		.expect("delivery failed");

	assert_eq!(tracked[0].id, "ad_macbook");
	assert_eq!(context_free[0].id, "ad_macbook");
	assert!(
		tracked[0].match_factors.sub_scores.intent > context_free[0].match_factors.sub_scores.intent
	);
}

#[tokio::test]
async fn conversations_do_not_leak_into_each_other() {
	let service = service(FailingExtractor);

	service
		.get_relevant_ads(&super::request("I'm looking to buy something nice", Some("conv_a")))
		.await
		.expect("delivery failed");

	let fresh = service
		.get_relevant_ads(&super::request("macbook laptop", Some("conv_b")))
		.await
		.expect("delivery failed");
	let primed = service
		.get_relevant_ads(&super::request("macbook laptop", Some("conv_a")))
		.await
		.expect("delivery failed");

	assert!(
		primed[0].match_factors.sub_scores.intent > fresh[0].match_factors.sub_scores.intent
	);
}

#[tokio::test]
async fn reset_clears_all_conversation_state() {
	let service = service(FailingExtractor);
	let request = super::request("macbook laptop", Some("conv_reset"));

	let first = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert_eq!(first.len(), 1);

	// Same ad is blocked as an immediate repeat until the state is dropped.
	let blocked = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert!(blocked.is_empty());
	assert!(service.reset_conversation("conv_reset"));
	assert!(!service.reset_conversation("conv_reset"));

	let after_reset = service.get_relevant_ads(&request).await.expect("delivery failed");

	assert_eq!(after_reset.len(), 1);
	assert_eq!(after_reset[0].id, first[0].id);
}
