//! Core domain types and deterministic heuristics for ad matching.
//!
//! Everything here is pure: no IO, no clocks, no provider calls. The service
//! layer wires these pieces to configuration, conversation state and the
//! external extractor.

mod ad;
mod annotation;
mod context;
mod patterns;

pub use ad::{
	Ad, AdRecordIssue, Demographics, MatchWeights, Performance, TargetAudience, validate_ad,
};
pub use annotation::{Annotation, Intent, IntentSignal, Sentiment};
pub use context::{
	ConversationContext, DiscussedProduct, FrequencyState, RecentQuery, TopicSnapshot,
};
pub use patterns::{
	detect_intents, extract_preferences, extract_topics, fallback_annotation, is_purchase_word,
	is_stopword, tokenize,
};
