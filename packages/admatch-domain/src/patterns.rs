use std::collections::HashMap;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::annotation::{Annotation, Intent, IntentSignal, Sentiment};

/// Fixed divisor normalizing accumulated topic pattern weight into [0, 1].
const TOPIC_SCORE_DIVISOR: f32 = 3.0;
const KEYWORD_OCCURRENCE_BONUS: f32 = 0.2;
const PATTERN_CONFIDENCE_FLOOR: f32 = 0.3;

const STOPWORDS: &[&str] = &[
	"the", "and", "to", "a", "of", "for", "in", "is", "that", "on", "with", "have", "this", "from",
	"they", "would", "what",
];

/// Cues that mark a query as shopping-oriented; used for the context-free
/// semantic bonus.
const PURCHASE_WORDS: &[&str] = &[
	"buy", "purchase", "get", "need", "want", "looking", "search", "find", "recommend", "best",
	"top", "good", "great", "review",
];

const INTENT_PATTERNS: &[(IntentSignal, &[&str])] = &[
	(IntentSignal::Purchase, &[
		r"(?i)(looking for|want to buy|need a|shopping for)",
		r"(?i)(purchase|buy|get|acquire)",
		r"(?i)(recommend|suggest).*(to buy|purchase)",
	]),
	(IntentSignal::Research, &[
		r"(?i)(what's|what is|tell me about|learn about)",
		r"(?i)(compare|difference between|vs|versus)",
		r"(?i)(recommend|suggestion|advice|opinion)",
		r"(?i)(review|rating|best)",
	]),
	(IntentSignal::PriceCheck, &[
		r"(?i)(how much|price|cost|pricing)",
		r"(?i)(cheaper|cheapest|expensive|affordable)",
		r"(?i)(deal|discount|offer|sale)",
	]),
];

const PREFERENCE_PATTERNS: &[(&str, &[&str])] = &[
	("budget_conscious", &[
		r"(?i)(cheap|affordable|budget|save money|cost-effective)",
		r"(?i)(lowest price|best deal|discount|sale)",
	]),
	("premium", &[
		r"(?i)(high-end|premium|luxury|best quality|top-tier)",
		r"(?i)(professional|advanced|elite)",
	]),
	("performance", &[
		r"(?i)(fast|powerful|speed|performance|efficient)",
		r"(?i)(high-performance|processing|capacity)",
	]),
	("quality", &[
		r"(?i)(reliable|durable|long-lasting|quality)",
		r"(?i)(well-made|solid|robust)",
	]),
	("convenience", &[
		r"(?i)(easy|simple|convenient|quick|handy)",
		r"(?i)(user-friendly|straightforward)",
	]),
];

struct TopicRule {
	topic: &'static str,
	patterns: &'static [(&'static str, f32)],
	keywords: &'static [&'static str],
}

const TOPIC_RULES: &[TopicRule] = &[
	TopicRule {
		topic: "technology",
		patterns: &[
			(r"(?i)(computer|laptop|phone|tech|software|hardware|device)", 1.0),
			(r"(?i)(digital|smart|electronic|gadget|app)", 0.8),
			(r"(?i)(processor|memory|storage|battery)", 0.9),
		],
		keywords: &["computer", "laptop", "phone", "tech", "software", "hardware"],
	},
	TopicRule {
		topic: "fashion",
		patterns: &[
			(r"(?i)(shoes|clothing|wear|fashion|style|outfit)", 1.0),
			(r"(?i)(dress|shirt|pants|accessories)", 0.8),
			(r"(?i)(comfortable|fit|size)", 0.7),
		],
		keywords: &["shoes", "clothing", "wear", "fashion", "style"],
	},
	TopicRule {
		topic: "sports",
		patterns: &[
			(r"(?i)(run|sport|exercise|fitness|workout|training)", 1.0),
			(r"(?i)(athletic|gym|performance|endurance)", 0.8),
			(r"(?i)(muscle|strength|cardio)", 0.7),
		],
		keywords: &["run", "sport", "exercise", "fitness", "workout"],
	},
	TopicRule {
		topic: "education",
		patterns: &[
			(r"(?i)(course|learn|study|class|tutorial|lesson)", 1.0),
			(r"(?i)(certificate|degree|skill|training)", 0.8),
			(r"(?i)(teacher|student|online learning)", 0.7),
		],
		keywords: &["course", "learn", "study", "class", "education"],
	},
	TopicRule {
		topic: "home",
		patterns: &[
			(r"(?i)(house|apartment|furniture|kitchen|bathroom)", 1.0),
			(r"(?i)(decor|interior|renovation|appliance)", 0.8),
			(r"(?i)(garden|backyard|outdoor)", 0.7),
		],
		keywords: &["house", "furniture", "kitchen", "bathroom", "home"],
	},
];

/// Lower-cased word tokens in query order, deduplicated, single characters
/// dropped.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut out = Vec::new();

	for word in text.unicode_words() {
		let token = word.to_lowercase();

		if token.chars().count() < 2 {
			continue;
		}
		if !out.contains(&token) {
			out.push(token);
		}
	}

	out
}

pub fn is_stopword(token: &str) -> bool {
	STOPWORDS.contains(&token)
}

pub fn is_purchase_word(token: &str) -> bool {
	PURCHASE_WORDS.contains(&token)
}

/// Conversational intent signals with confidence scores. Confidence grows
/// with the share of cue patterns that fire, floored at 0.3 so a single hit
/// still registers.
pub fn detect_intents(text: &str) -> HashMap<IntentSignal, f32> {
	let mut intents = HashMap::new();

	for (signal, patterns) in INTENT_PATTERNS {
		let confidence = pattern_confidence(text, patterns);

		if confidence > 0.0 {
			intents.insert(*signal, confidence);
		}
	}

	intents
}

pub fn extract_preferences(text: &str) -> HashMap<String, f32> {
	let mut preferences = HashMap::new();

	for (preference, patterns) in PREFERENCE_PATTERNS {
		let confidence = pattern_confidence(text, patterns);

		if confidence > 0.0 {
			preferences.insert((*preference).to_string(), confidence);
		}
	}

	preferences
}

/// Topic scores over the fixed taxonomy: weighted pattern hits plus a bonus
/// per keyword occurrence, normalized by a fixed divisor and clamped.
pub fn extract_topics(text: &str) -> HashMap<String, f32> {
	let lowered = text.to_lowercase();
	let mut topics = HashMap::new();

	for rule in TOPIC_RULES {
		let mut score = 0.0_f32;

		for (pattern, weight) in rule.patterns {
			if Regex::new(pattern).map(|re| re.is_match(&lowered)).unwrap_or(false) {
				score += weight;
			}
		}

		let keyword_hits =
			rule.keywords.iter().filter(|keyword| lowered.contains(*keyword)).count();

		score += keyword_hits as f32 * KEYWORD_OCCURRENCE_BONUS;

		if score > 0.0 {
			topics.insert(rule.topic.to_string(), (score / TOPIC_SCORE_DIVISOR).min(1.0));
		}
	}

	topics
}

/// Deterministic annotation built purely from the local pattern tables.
/// Purchase or price-check cues imply a transactional, commercially-minded
/// query; research cues an informational one. Sentiment stays neutral.
pub fn fallback_annotation(query: &str) -> Annotation {
	let intents = detect_intents(query);
	let commercial_intent = intents.contains_key(&IntentSignal::Purchase)
		|| intents.contains_key(&IntentSignal::PriceCheck);
	let intent = if commercial_intent {
		Intent::Transactional
	} else if intents.contains_key(&IntentSignal::Research) {
		Intent::Informational
	} else {
		Intent::Unknown
	};

	Annotation {
		tokens: tokenize(query),
		entities: Vec::new(),
		topics: extract_topics(query),
		categories: Vec::new(),
		intent,
		commercial_intent,
		sentiment: Sentiment::Neutral,
		degraded: true,
	}
}

fn pattern_confidence(text: &str, patterns: &[&str]) -> f32 {
	let matches = patterns
		.iter()
		.filter(|pattern| Regex::new(pattern).map(|re| re.is_match(text)).unwrap_or(false))
		.count();

	if matches == 0 {
		return 0.0;
	}

	(matches as f32 / patterns.len() as f32 + PATTERN_CONFIDENCE_FLOOR).min(1.0)
}
