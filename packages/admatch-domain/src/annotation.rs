use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
	Informational,
	Transactional,
	Navigational,
	#[default]
	#[serde(other)]
	Unknown,
}
impl Intent {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Informational => "informational",
			Self::Transactional => "transactional",
			Self::Navigational => "navigational",
			Self::Unknown => "unknown",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
	Positive,
	Negative,
	#[default]
	#[serde(other)]
	Neutral,
}

/// Conversational intent signals tracked across turns. Distinct from the
/// per-query [`Intent`] label: these accumulate with decay in the
/// conversation context.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentSignal {
	Purchase,
	Research,
	PriceCheck,
}
impl IntentSignal {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Purchase => "purchase",
			Self::Research => "research",
			Self::PriceCheck => "price_check",
		}
	}
}

/// Structured interpretation of one query, derived fresh per pipeline
/// invocation and never mutated afterwards.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Annotation {
	pub tokens: Vec<String>,
	pub entities: Vec<String>,
	pub topics: HashMap<String, f32>,
	pub categories: Vec<String>,
	pub intent: Intent,
	pub commercial_intent: bool,
	pub sentiment: Sentiment,
	/// True when the external extractor failed and the local heuristics
	/// filled in. Observability only; scoring never reads it.
	pub degraded: bool,
}
