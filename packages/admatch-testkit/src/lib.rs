//! Canned configuration, a small ad inventory, and stub extractor providers
//! for exercising the matching pipeline without network access.

use std::sync::Arc;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use admatch_config::{Config, ExtractorProviderConfig, Providers as ProvidersConfig, Service};
use admatch_domain::Ad;
use admatch_providers::extractor::Extraction;
use admatch_service::{AdService, BoxFuture, ExtractorProvider, Providers};

/// Installs a fmt subscriber honoring the configured log level. Safe to call
/// from every test; only the first call wins.
pub fn init_tracing(cfg: &Config) {
	let filter =
		EnvFilter::try_new(&cfg.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Deterministic test configuration: defaults everywhere, jitter disabled so
/// score assertions are exact.
pub fn config() -> Config {
	let mut cfg = Config {
		service: Service { log_level: "info".to_string() },
		matcher: Default::default(),
		context: Default::default(),
		ranking: Default::default(),
		frequency: Default::default(),
		providers: ProvidersConfig {
			extractor: ExtractorProviderConfig {
				provider_id: "stub".to_string(),
				api_base: "http://localhost:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "stub-model".to_string(),
				temperature: 0.0,
				timeout_ms: 250,
				default_headers: serde_json::Map::new(),
			},
		},
	};

	cfg.ranking.tie_breaker = false;

	cfg
}

/// Four-ad inventory covering the main scoring paths: a branded shoe, a
/// laptop, a premium TV that vetoes bargain queries, and an audiobook
/// subscription.
pub fn inventory() -> Vec<Ad> {
	let raw = serde_json::json!([
		{
			"id": "ad_nike",
			"title": "Nike ZoomX Invincible Running Shoes",
			"description": "Responsive cushioning for long-distance running",
			"cta": "Shop Now",
			"url": "https://example.com/nike-zoomx",
			"brand": "Nike",
			"keywords": ["running shoes", "nike", "marathon training"],
			"categories": ["footwear", "sports"],
			"bid_amount": 2.5,
			"daily_budget": 100.0,
			"performance": { "ctr": 2.4 },
			"target_audience": {
				"interests": ["running", "fitness"],
				"demographics": { "age_min": 18, "age_max": 55, "location": "US" },
			},
		},
		{
			"id": "ad_macbook",
			"title": "MacBook Air M3",
			"description": "A fast, quiet laptop for work and study",
			"cta": "Learn More",
			"url": "https://example.com/macbook-air",
			"brand": "Apple",
			"keywords": ["laptop", "macbook", "notebook computer"],
			"categories": ["electronics", "computers"],
			"bid_amount": 3.5,
			"daily_budget": 200.0,
			"performance": { "ctr": 1.8 },
		},
		{
			"id": "ad_oled_tv",
			"title": "Lumina Premium OLED TV",
			"description": "Cinema-grade picture for a premium living room",
			"url": "https://example.com/lumina-oled",
			"keywords": ["tv", "television", "oled"],
			"categories": ["electronics", "home"],
			"negative_keywords": ["cheap", "cheapest", "budget"],
			"bid_amount": 4.0,
			"daily_budget": 150.0,
			"performance": { "ctr": 1.2 },
		},
		{
			"id": "ad_audiobooks",
			"title": "Storyline Audiobook Subscription",
			"description": "Listen to bestsellers on any device",
			"url": "https://example.com/storyline",
			"keywords": ["audiobook", "audiobooks", "listening"],
			"categories": ["entertainment", "education"],
			"bid_amount": 1.5,
			"daily_budget": 50.0,
			"performance": { "ctr": 2.0 },
		},
	]);

	serde_json::from_value(raw).expect("inventory parse failed")
}

/// Extractor stub that always returns the same canned extraction.
pub struct StubExtractor {
	pub extraction: Extraction,
}
impl StubExtractor {
	pub fn empty() -> Self {
		Self { extraction: Extraction::default() }
	}

	pub fn transactional(keywords: &[&str]) -> Self {
		Self {
			extraction: Extraction {
				keywords: keywords.iter().map(|keyword| (*keyword).to_string()).collect(),
				intent: "transactional".to_string(),
				commercial_intent: true,
				sentiment: "neutral".to_string(),
				..Extraction::default()
			},
		}
	}
}
impl ExtractorProvider for StubExtractor {
	fn extract<'a>(
		&'a self,
		_cfg: &'a ExtractorProviderConfig,
		_query: &'a str,
		_history: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Extraction>> {
		let extraction = self.extraction.clone();

		Box::pin(async move { Ok(extraction) })
	}
}

/// Extractor stub that always fails, forcing the local fallback path.
pub struct FailingExtractor;
impl ExtractorProvider for FailingExtractor {
	fn extract<'a>(
		&'a self,
		_cfg: &'a ExtractorProviderConfig,
		_query: &'a str,
		_history: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Extraction>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!("extractor unavailable")) })
	}
}

pub fn service(extractor: impl ExtractorProvider + 'static) -> AdService {
	service_with_inventory(extractor, inventory())
}

pub fn service_with_inventory(
	extractor: impl ExtractorProvider + 'static,
	inventory: Vec<Ad>,
) -> AdService {
	let providers = Providers::new(Arc::new(extractor));
	let (service, _) = AdService::with_providers(config(), inventory, providers);

	service
}
