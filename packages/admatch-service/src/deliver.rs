use serde::{Deserialize, Serialize};

use admatch_domain::{
	Annotation, ConversationContext, detect_intents, extract_preferences, extract_topics,
};

use crate::{
	AdService, Error, Result,
	annotate::annotate,
	rank::{RankFactors, RankedCandidate, apply_frequency_cap, rank},
	score::{SubScores, score},
};

/// Messages folded into the conversation context beyond the live query.
const HISTORY_WINDOW: usize = 5;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AdRequest {
	pub query: String,
	#[serde(default)]
	pub conversation_id: Option<String>,
	#[serde(default)]
	pub history: Vec<Turn>,
	#[serde(default)]
	pub user_context: Option<UserContext>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Turn {
	pub role: String,
	pub content: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserContext {
	pub interests: Vec<String>,
	pub age: Option<u32>,
	pub location: Option<String>,
}

/// An ad selected for display, with the full scoring evidence attached.
#[derive(Clone, Debug, Serialize)]
pub struct DisplayAd {
	pub id: String,
	pub title: String,
	pub description: String,
	pub cta: String,
	pub url: String,
	pub relevance_score: f32,
	pub match_factors: MatchFactors,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchFactors {
	pub sub_scores: SubScores,
	pub ranking: RankFactors,
	pub final_score: f32,
	pub matched_keywords: Vec<String>,
	pub matched_categories: Vec<String>,
	pub annotation_degraded: bool,
}

impl AdService {
	/// Full pipeline for one request: annotate, update conversation state,
	/// gather lexical candidates, score, threshold, rank, frequency-cap,
	/// select. Empty inventory or nothing above threshold returns an empty
	/// list, never an error.
	pub async fn get_relevant_ads(&self, request: &AdRequest) -> Result<Vec<DisplayAd>> {
		let query = request.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "Query must be non-empty.".to_string() });
		}

		let annotation = annotate(&self.cfg, &self.providers, query, &request.history).await;
		let snapshot = self.snapshot();
		let query_lower = query.to_lowercase();

		let conversation = request
			.conversation_id
			.as_deref()
			.filter(|id| !id.trim().is_empty())
			.map(|id| self.conversation(id));
		let mut guard = conversation
			.as_ref()
			.map(|ctx| ctx.lock().unwrap_or_else(|err| err.into_inner()));

		if let Some(ctx) = guard.as_deref_mut() {
			update_context(ctx, query, &query_lower, &snapshot, request, &self.cfg.context);
		}

		if snapshot.is_empty() {
			return Ok(Vec::new());
		}

		let candidates = snapshot.candidates(&query_lower, &annotation.tokens);
		let scored: Vec<_> = candidates
			.into_iter()
			.map(|ad| score(ad, query, &annotation, guard.as_deref(), &self.cfg.ranking))
			.filter(|candidate| {
				!candidate.vetoed
					&& candidate.relevance >= self.cfg.matcher.relevance_threshold
			})
			.collect();
		let ranked = rank(scored, request.user_context.as_ref(), query, &self.cfg.ranking);
		let mut surviving = match guard.as_deref() {
			Some(ctx) => apply_frequency_cap(ranked, ctx, &self.cfg.frequency),
			None => ranked,
		};

		surviving.truncate(self.cfg.matcher.max_ads_per_request as usize);

		if let Some(ctx) = guard.as_deref_mut() {
			// Reverse order so last_shown lands on the top pick.
			for candidate in surviving.iter().rev() {
				ctx.record_impression(&candidate.scored.ad.id);
			}
		}

		for candidate in &surviving {
			tracing::info!(
				ad_id = %candidate.scored.ad.id,
				query = %query,
				relevance = candidate.scored.relevance,
				final_score = candidate.final_score,
				degraded = annotation.degraded,
				"ad impression",
			);
		}

		Ok(surviving.into_iter().map(|candidate| display_ad(candidate, &annotation)).collect())
	}

	/// Click event hook. Emission only; persistence is the caller's concern.
	pub fn record_click(&self, ad_id: &str) -> Result<()> {
		let snapshot = self.snapshot();
		let Some(ad) = snapshot.get(ad_id) else {
			return Err(Error::UnknownAd { ad_id: ad_id.to_string() });
		};

		tracing::info!(ad_id = %ad.id, title = %ad.title, "ad click");

		Ok(())
	}
}

/// One context update per request: the live query at full strength, then the
/// trailing history window at reduced weight.
fn update_context(
	ctx: &mut ConversationContext,
	query: &str,
	query_lower: &str,
	snapshot: &crate::index::IndexSnapshot,
	request: &AdRequest,
	cfg: &admatch_config::ContextTracking,
) {
	let topics = extract_topics(query);
	let preferences = extract_preferences(query);
	let intents = detect_intents(query);
	let products = snapshot.product_mentions(query_lower);

	ctx.absorb_query(query, &topics, &preferences, &intents, &products, cfg);

	let start = request.history.len().saturating_sub(HISTORY_WINDOW);

	for turn in &request.history[start..] {
		let content = turn.content.trim();

		if content.is_empty() {
			continue;
		}

		let topics = extract_topics(content);
		let preferences = extract_preferences(content);
		let products = snapshot.product_mentions(&content.to_lowercase());

		ctx.absorb_history_message(&topics, &preferences, &products, cfg);
	}
}

fn display_ad(candidate: RankedCandidate, annotation: &Annotation) -> DisplayAd {
	let RankedCandidate { scored, factors, final_score } = candidate;
	let ad = scored.ad;

	DisplayAd {
		id: ad.id.clone(),
		title: ad.title.clone(),
		description: ad.description.clone(),
		cta: ad.cta.clone(),
		url: ad.url.clone(),
		relevance_score: scored.relevance,
		match_factors: MatchFactors {
			sub_scores: scored.sub_scores,
			ranking: factors,
			final_score,
			matched_keywords: scored.matched_keywords,
			matched_categories: scored.matched_categories,
			annotation_degraded: annotation.degraded,
		},
	}
}
