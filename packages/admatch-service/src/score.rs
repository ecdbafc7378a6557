use std::{
	collections::HashSet,
	sync::Arc,
};

use serde::Serialize;

use admatch_config::Ranking;
use admatch_domain::{Ad, Annotation, ConversationContext, is_purchase_word, is_stopword, tokenize};

use crate::index::term_matches;

const EXACT_PHRASE_BOOST: f32 = 1.5;
const DIRECT_BRAND_SCORE: f32 = 0.85;
const DIRECT_PRODUCT_SCORE: f32 = 0.75;
const DIRECT_INTENT_SCORE: f32 = 0.5;
const PURCHASE_WORD_BONUS: f32 = 0.2;
const KEYWORD_DENOMINATOR_CAP: usize = 5;

/// One candidate with its relevance and the evidence behind it. Lives for a
/// single pipeline invocation.
#[derive(Clone, Debug)]
pub(crate) struct ScoredCandidate {
	pub(crate) ad: Arc<Ad>,
	pub(crate) relevance: f32,
	pub(crate) sub_scores: SubScores,
	pub(crate) matched_keywords: Vec<String>,
	pub(crate) matched_categories: Vec<String>,
	pub(crate) vetoed: bool,
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SubScores {
	pub keyword: f32,
	pub category: f32,
	pub intent: f32,
	/// Audit-only: recorded alongside the weighted sub-scores but not part
	/// of the combined relevance.
	pub direct_term: f32,
}

pub(crate) fn score(
	ad: Arc<Ad>,
	query: &str,
	annotation: &Annotation,
	context: Option<&ConversationContext>,
	ranking: &Ranking,
) -> ScoredCandidate {
	let query_lower = query.to_lowercase();
	let tokens = &annotation.tokens;

	let matched_keywords: Vec<String> = ad
		.keywords
		.iter()
		.map(|keyword| keyword.trim().to_lowercase())
		.filter(|keyword| !keyword.is_empty() && term_matches(keyword, &query_lower, tokens))
		.collect();
	let matched_categories: Vec<String> = ad
		.categories
		.iter()
		.map(|category| category.trim().to_lowercase())
		.filter(|category| {
			!category.is_empty()
				&& (term_matches(category, &query_lower, tokens)
					|| annotation.categories.contains(category))
		})
		.collect();

	let sub_scores = SubScores {
		keyword: keyword_score(&ad, &matched_keywords, &query_lower),
		category: category_score(&ad, &matched_categories, &query_lower),
		intent: intent_score(&ad, tokens, context),
		direct_term: direct_term_score(&ad, &query_lower, annotation, &matched_keywords),
	};

	let weights = ad.match_weights;
	let mut relevance = sub_scores.keyword * weights.keyword
		+ sub_scores.category * weights.category
		+ sub_scores.intent * weights.intent;

	if matched_keywords.len() > 1 {
		relevance *= ranking.multi_keyword_boost;
	}

	let vetoed = vetoed(&ad, &query_lower, tokens);

	if vetoed {
		relevance = 0.0;
	}

	ScoredCandidate {
		ad,
		relevance: relevance.clamp(0.0, 1.0),
		sub_scores,
		matched_keywords,
		matched_categories,
		vetoed,
	}
}

/// Share of the ad's keywords the query hit, against a denominator capped at
/// five so keyword-stuffed ads gain nothing from the long tail. Any keyword
/// found verbatim in the raw query earns the exact-phrase boost.
fn keyword_score(ad: &Ad, matched: &[String], query_lower: &str) -> f32 {
	if matched.is_empty() {
		return 0.0;
	}

	let denominator = ad.keywords.len().min(KEYWORD_DENOMINATOR_CAP).max(1);
	let mut score = matched.len() as f32 / denominator as f32;

	if matched.iter().any(|keyword| query_lower.contains(keyword.as_str())) {
		score *= EXACT_PHRASE_BOOST;
	}

	score.min(1.0)
}

fn category_score(ad: &Ad, matched: &[String], query_lower: &str) -> f32 {
	if matched.iter().any(|category| query_lower.contains(category.as_str())) {
		return 1.0;
	}
	if matched.is_empty() || ad.categories.is_empty() {
		return 0.0;
	}

	(matched.len() as f32 / ad.categories.len() as f32).min(1.0)
}

/// Context-aware mode reads the strongest accumulated intent signal for the
/// conversation. Context-free mode falls back to token overlap between the
/// query and the ad copy, with a bonus for shopping-flavored queries.
fn intent_score(ad: &Ad, tokens: &[String], context: Option<&ConversationContext>) -> f32 {
	if let Some(ctx) = context
		&& !ctx.intents.is_empty()
	{
		return ctx.intents.values().fold(0.0_f32, |max, &score| max.max(score)).min(1.0);
	}

	let query_words: HashSet<&str> = tokens
		.iter()
		.map(|token| token.as_str())
		.filter(|token| !is_stopword(token))
		.collect();
	let ad_text = format!("{} {}", ad.title, ad.description);
	let ad_tokens = tokenize(&ad_text);
	let ad_words: HashSet<&str> = ad_tokens
		.iter()
		.map(|token| token.as_str())
		.filter(|token| !is_stopword(token))
		.collect();

	if query_words.is_empty() || ad_words.is_empty() {
		return 0.0;
	}

	let overlap = query_words.intersection(&ad_words).count();
	let union = query_words.len() + ad_words.len() - overlap;
	let similarity = overlap as f32 / union as f32;

	let purchase_hits = query_words.iter().filter(|token| is_purchase_word(token)).count();
	let bonus = PURCHASE_WORD_BONUS * (purchase_hits as f32 / query_words.len() as f32);

	(similarity + bonus).min(1.0)
}

/// Priority-ordered exact-match rules. One hit per rule group, groups stack,
/// capped at 1.0.
fn direct_term_score(
	ad: &Ad,
	query_lower: &str,
	annotation: &Annotation,
	matched_keywords: &[String],
) -> f32 {
	let mut score = 0.0_f32;

	if let Some(brand) = &ad.brand {
		let brand_lower = brand.trim().to_lowercase();

		if !brand_lower.is_empty()
			&& query_lower.contains(&brand_lower)
			&& ad.title.to_lowercase().contains(&brand_lower)
		{
			score += DIRECT_BRAND_SCORE;
		}
	}

	if matched_keywords
		.iter()
		.any(|keyword| keyword.contains(' ') && query_lower.contains(keyword.as_str()))
	{
		score += DIRECT_PRODUCT_SCORE;
	}

	if annotation.commercial_intent && !matched_keywords.is_empty() {
		score += DIRECT_INTENT_SCORE;
	}

	score.min(1.0)
}

/// A negative keyword anywhere among the query's matched terms discards the
/// candidate outright, so no other signal can resurface it.
fn vetoed(ad: &Ad, query_lower: &str, tokens: &[String]) -> bool {
	ad.negative_keywords
		.iter()
		.map(|keyword| keyword.trim().to_lowercase())
		.any(|keyword| !keyword.is_empty() && term_matches(&keyword, query_lower, tokens))
}
