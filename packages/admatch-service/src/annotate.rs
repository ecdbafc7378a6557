use std::time::Duration;

use serde_json::Value;

use admatch_config::Config;
use admatch_domain::{Annotation, extract_topics, fallback_annotation, tokenize};
use admatch_providers::extractor::Extraction;

use crate::{Providers, deliver::Turn};

/// Two-tier annotation: the external extractor under a hard timeout, the
/// local pattern tables when it fails. This never returns an error; a dead
/// extractor degrades the annotation instead of failing the request.
pub(crate) async fn annotate(
	cfg: &Config,
	providers: &Providers,
	query: &str,
	history: &[Turn],
) -> Annotation {
	let start = history.len().saturating_sub(cfg.matcher.context_window as usize);
	let messages = history_messages(&history[start..]);
	let timeout = Duration::from_millis(cfg.providers.extractor.timeout_ms);
	let call = providers.extractor.extract(&cfg.providers.extractor, query, &messages);

	match tokio::time::timeout(timeout, call).await {
		Ok(Ok(extraction)) => merge_extraction(query, extraction),
		Ok(Err(err)) => {
			tracing::warn!(
				provider = %cfg.providers.extractor.provider_id,
				error = %err,
				"extractor failed, using local annotation",
			);

			fallback_annotation(query)
		},
		Err(_) => {
			tracing::warn!(
				provider = %cfg.providers.extractor.provider_id,
				timeout_ms = cfg.providers.extractor.timeout_ms,
				"extractor timed out, using local annotation",
			);

			fallback_annotation(query)
		},
	}
}

fn history_messages(history: &[Turn]) -> Vec<Value> {
	history
		.iter()
		.map(|turn| serde_json::json!({ "role": turn.role, "content": turn.content }))
		.collect()
}

/// Extractor output folded over the local baseline: tokens are the local
/// tokenization extended with extracted keywords, topics are the local
/// taxonomy scores overlaid with the extractor's.
fn merge_extraction(query: &str, extraction: Extraction) -> Annotation {
	let mut tokens = tokenize(query);

	for keyword in &extraction.keywords {
		let term = keyword.trim().to_lowercase();

		if !term.is_empty() && !tokens.contains(&term) {
			tokens.push(term);
		}
	}

	let mut topics = extract_topics(query);

	for (topic, value) in &extraction.topics {
		if let Some(score) = value.as_f64() {
			topics.insert(topic.to_lowercase(), (score as f32).clamp(0.0, 1.0));
		}
	}

	Annotation {
		tokens,
		entities: extraction.entities,
		topics,
		categories: extraction
			.categories
			.iter()
			.map(|category| category.trim().to_lowercase())
			.filter(|category| !category.is_empty())
			.collect(),
		intent: parse_label(&extraction.intent),
		commercial_intent: extraction.commercial_intent,
		sentiment: parse_label(&extraction.sentiment),
		degraded: false,
	}
}

fn parse_label<T>(raw: &str) -> T
where
	T: Default + serde::de::DeserializeOwned,
{
	serde_json::from_value(Value::String(raw.trim().to_lowercase())).unwrap_or_default()
}
