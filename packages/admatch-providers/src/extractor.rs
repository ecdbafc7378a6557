use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const SYSTEM_PROMPT: &str = "You analyze user queries for an ad relevance engine. \
Respond with a single JSON object containing exactly these fields: \
\"keywords\" (array of strings), \
\"entities\" (array of strings, products, brands and places), \
\"categories\" (array of 1-3 product or service category strings), \
\"topics\" (object mapping 1-3 topic names to confidence numbers in 0.0-1.0), \
\"intent\" (one of \"informational\", \"transactional\", \"navigational\", \"unknown\"), \
\"commercial_intent\" (boolean, whether the user may want to purchase something), \
\"sentiment\" (one of \"positive\", \"neutral\", \"negative\"). \
Output only the JSON object, no prose.";

/// Structured extraction returned by the remote model. Every field defaults
/// so a partially filled response still deserializes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Extraction {
	pub keywords: Vec<String>,
	pub entities: Vec<String>,
	pub categories: Vec<String>,
	pub topics: serde_json::Map<String, Value>,
	pub intent: String,
	pub commercial_intent: bool,
	pub sentiment: String,
}

pub async fn extract(
	cfg: &admatch_config::ExtractorProviderConfig,
	query: &str,
	history: &[Value],
) -> Result<Extraction> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let messages = build_messages(query, history);

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"response_format": { "type": "json_object" },
			"messages": messages,
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;
		if let Ok(parsed) = parse_extraction(json) {
			return Ok(parsed);
		}
	}

	Err(eyre::eyre!("Extractor response is not valid JSON."))
}

fn build_messages(query: &str, history: &[Value]) -> Vec<Value> {
	let mut messages = vec![serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT })];

	messages.extend(history.iter().cloned());
	messages.push(serde_json::json!({ "role": "user", "content": query }));

	messages
}

fn parse_extraction(json: Value) -> Result<Extraction> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Extraction = serde_json::from_str(content)
			.map_err(|_| eyre::eyre!("Extractor content is not valid JSON."))?;

		return Ok(parsed);
	}

	if json.is_object() {
		return Ok(serde_json::from_value(json)?);
	}

	Err(eyre::eyre!("Extractor response is missing JSON content."))
}
