mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, ContextTracking, ExtractorProviderConfig, Frequency, Matcher, Providers, Ranking,
	RankingWeights, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if !cfg.matcher.relevance_threshold.is_finite()
		|| !(0.0..=1.0).contains(&cfg.matcher.relevance_threshold)
	{
		return Err(Error::Validation {
			message: "matcher.relevance_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.matcher.max_ads_per_request == 0 {
		return Err(Error::Validation {
			message: "matcher.max_ads_per_request must be greater than zero.".to_string(),
		});
	}

	for (path, value) in [
		("context.topic_decay", cfg.context.topic_decay),
		("context.intent_decay", cfg.context.intent_decay),
		("context.preference_decay", cfg.context.preference_decay),
	] {
		if !value.is_finite() || !(0.0..=1.0).contains(&value) || value == 0.0 {
			return Err(Error::Validation {
				message: format!("{path} must be greater than zero and at most 1.0."),
			});
		}
	}

	if !cfg.context.history_weight.is_finite() || !(0.0..=1.0).contains(&cfg.context.history_weight)
	{
		return Err(Error::Validation {
			message: "context.history_weight must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.context.max_recent_queries == 0 {
		return Err(Error::Validation {
			message: "context.max_recent_queries must be greater than zero.".to_string(),
		});
	}

	for (path, value) in [
		("ranking.weights.relevance", cfg.ranking.weights.relevance),
		("ranking.weights.bid", cfg.ranking.weights.bid),
		("ranking.weights.ctr", cfg.ranking.weights.ctr),
		("ranking.weights.budget", cfg.ranking.weights.budget),
		("ranking.weights.targeting", cfg.ranking.weights.targeting),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{path} must be a finite number.") });
		}
		if value < 0.0 {
			return Err(Error::Validation { message: format!("{path} must be zero or greater.") });
		}
	}

	if !cfg.ranking.max_bid.is_finite() || cfg.ranking.max_bid <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.max_bid must be greater than zero.".to_string(),
		});
	}
	if !cfg.ranking.baseline_ctr.is_finite() || cfg.ranking.baseline_ctr <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.baseline_ctr must be greater than zero.".to_string(),
		});
	}
	if !cfg.ranking.multi_keyword_boost.is_finite() || cfg.ranking.multi_keyword_boost < 1.0 {
		return Err(Error::Validation {
			message: "ranking.multi_keyword_boost must be 1.0 or greater.".to_string(),
		});
	}
	if cfg.frequency.max_impressions == 0 {
		return Err(Error::Validation {
			message: "frequency.max_impressions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.extractor.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.extractor.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.extractor.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.extractor.api_key must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::Map;

	fn config() -> Config {
		Config {
			service: Service { log_level: "info".to_string() },
			matcher: Matcher::default(),
			context: ContextTracking::default(),
			ranking: Ranking::default(),
			frequency: Frequency::default(),
			providers: Providers {
				extractor: ExtractorProviderConfig {
					provider_id: "p".to_string(),
					api_base: "http://localhost".to_string(),
					api_key: "key".to_string(),
					path: "/v1/chat/completions".to_string(),
					model: "m".to_string(),
					temperature: 0.3,
					timeout_ms: 1_000,
					default_headers: Map::new(),
				},
			},
		}
	}

	#[test]
	fn default_config_validates() {
		assert!(validate(&config()).is_ok());
	}

	#[test]
	fn rejects_zero_max_ads() {
		let mut cfg = config();

		cfg.matcher.max_ads_per_request = 0;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_out_of_range_threshold() {
		let mut cfg = config();

		cfg.matcher.relevance_threshold = 1.5;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_zero_decay() {
		let mut cfg = config();

		cfg.context.topic_decay = 0.0;

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_empty_api_key() {
		let mut cfg = config();

		cfg.providers.extractor.api_key = " ".to_string();

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn parses_minimal_toml_with_defaults() {
		let raw = r#"
[service]
log_level = "info"

[providers.extractor]
provider_id = "openai"
api_base = "http://localhost"
api_key = "key"
path = "/v1/chat/completions"
model = "gpt-4o-mini"
temperature = 0.3
timeout_ms = 2000
"#;
		let cfg: Config = toml::from_str(raw).expect("parse failed");

		assert_eq!(cfg.matcher.relevance_threshold, 0.3);
		assert_eq!(cfg.matcher.max_ads_per_request, 1);
		assert_eq!(cfg.context.preference_decay, 0.9);
		assert_eq!(cfg.ranking.weights.bid, 0.35);
		assert_eq!(cfg.frequency.max_impressions, 3);
		assert!(cfg.ranking.tie_breaker);
	}
}
