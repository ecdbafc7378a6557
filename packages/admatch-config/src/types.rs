use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub matcher: Matcher,
	#[serde(default)]
	pub context: ContextTracking,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub frequency: Frequency,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Matcher {
	/// Minimum relevance score an ad must reach to be considered at all.
	pub relevance_threshold: f32,
	pub max_ads_per_request: u32,
	/// How many trailing conversation messages the annotator may look at.
	pub context_window: u32,
}
impl Default for Matcher {
	fn default() -> Self {
		Self { relevance_threshold: 0.3, max_ads_per_request: 1, context_window: 10 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContextTracking {
	pub topic_decay: f32,
	pub intent_decay: f32,
	/// Preferences decay slower than topics; users rarely flip them turn to turn.
	pub preference_decay: f32,
	pub history_weight: f32,
	pub max_recent_queries: u32,
	pub max_topic_history: u32,
}
impl Default for ContextTracking {
	fn default() -> Self {
		Self {
			topic_decay: 0.8,
			intent_decay: 0.8,
			preference_decay: 0.9,
			history_weight: 0.1,
			max_recent_queries: 5,
			max_topic_history: 10,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub weights: RankingWeights,
	pub max_bid: f32,
	pub baseline_ctr: f32,
	pub multi_keyword_boost: f32,
	/// Deterministic sub-1% jitter on final scores. Disable for exact-score tests.
	pub tie_breaker: bool,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			weights: RankingWeights::default(),
			max_bid: 5.0,
			baseline_ctr: 2.0,
			multi_keyword_boost: 1.2,
			tie_breaker: true,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
	pub relevance: f32,
	pub bid: f32,
	pub ctr: f32,
	pub budget: f32,
	pub targeting: f32,
}
impl Default for RankingWeights {
	fn default() -> Self {
		Self { relevance: 0.40, bid: 0.35, ctr: 0.15, budget: 0.05, targeting: 0.05 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Frequency {
	pub max_impressions: u32,
	pub block_consecutive: bool,
}
impl Default for Frequency {
	fn default() -> Self {
		Self { max_impressions: 3, block_consecutive: true }
	}
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub extractor: ExtractorProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ExtractorProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
