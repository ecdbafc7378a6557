use std::{cmp::Ordering, hash::{BuildHasher, Hash, Hasher}};

use serde::Serialize;

use admatch_config::{Frequency, Ranking};
use admatch_domain::{Ad, ConversationContext};

use crate::{deliver::UserContext, score::ScoredCandidate};

const JITTER_CEILING: f32 = 0.01;
const NEUTRAL_TARGETING: f32 = 0.5;
const INTEREST_WEIGHT: f32 = 0.5;
const AGE_WEIGHT: f32 = 0.25;
const LOCATION_WEIGHT: f32 = 0.25;

/// Business factors behind one candidate's final score, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RankFactors {
	pub relevance: f32,
	pub bid: f32,
	pub ctr: f32,
	pub budget: f32,
	pub targeting: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct RankedCandidate {
	pub(crate) scored: ScoredCandidate,
	pub(crate) factors: RankFactors,
	pub(crate) final_score: f32,
}

/// Weighted blend of relevance and business factors, sorted descending.
/// The sort is stable, so exact ties keep candidate order.
pub(crate) fn rank(
	candidates: Vec<ScoredCandidate>,
	user: Option<&UserContext>,
	query: &str,
	ranking: &Ranking,
) -> Vec<RankedCandidate> {
	let mut ranked: Vec<RankedCandidate> = candidates
		.into_iter()
		.map(|scored| {
			let factors = RankFactors {
				relevance: scored.relevance,
				bid: bid_factor(&scored.ad, ranking),
				ctr: ctr_factor(&scored.ad, ranking),
				budget: budget_factor(&scored.ad),
				targeting: targeting_factor(&scored.ad, user),
			};
			let weights = &ranking.weights;
			let mut final_score = factors.relevance * weights.relevance
				+ factors.bid * weights.bid
				+ factors.ctr * weights.ctr
				+ factors.budget * weights.budget
				+ factors.targeting * weights.targeting;

			if ranking.tie_breaker {
				final_score += jitter(&scored.ad.id, query) * final_score;
			}

			RankedCandidate { scored, factors, final_score }
		})
		.collect();

	ranked.sort_by(|a, b| {
		b.final_score.partial_cmp(&a.final_score).unwrap_or(Ordering::Equal)
	});

	ranked
}

/// Frequency capping over an already ranked list. Pure filter: survivors
/// keep their order and scores. An ad at the impression cap, or the ad shown
/// immediately before, is removed.
pub(crate) fn apply_frequency_cap(
	ranked: Vec<RankedCandidate>,
	ctx: &ConversationContext,
	frequency: &Frequency,
) -> Vec<RankedCandidate> {
	ranked
		.into_iter()
		.filter(|candidate| {
			let ad_id = candidate.scored.ad.id.as_str();

			if ctx.impressions(ad_id) >= frequency.max_impressions {
				return false;
			}
			if frequency.block_consecutive && ctx.last_shown.as_deref() == Some(ad_id) {
				return false;
			}

			true
		})
		.collect()
}

fn bid_factor(ad: &Ad, ranking: &Ranking) -> f32 {
	(ad.bid_amount / ranking.max_bid).clamp(0.0, 1.0)
}

fn ctr_factor(ad: &Ad, ranking: &Ranking) -> f32 {
	(ad.performance.ctr / ranking.baseline_ctr).clamp(0.0, 1.0)
}

/// Remaining share of today's budget; an exhausted or unset budget scores 0
/// without excluding the ad outright.
fn budget_factor(ad: &Ad) -> f32 {
	if ad.daily_budget <= 0.0 {
		return 0.0;
	}

	((ad.daily_budget - ad.spent_today) / ad.daily_budget).clamp(0.0, 1.0)
}

fn targeting_factor(ad: &Ad, user: Option<&UserContext>) -> f32 {
	let Some(user) = user else { return NEUTRAL_TARGETING };
	let Some(audience) = &ad.target_audience else { return NEUTRAL_TARGETING };

	let mut score = 0.0_f32;

	if !audience.interests.is_empty() && !user.interests.is_empty() {
		let matched = audience
			.interests
			.iter()
			.filter(|interest| {
				user.interests.iter().any(|candidate| candidate.eq_ignore_ascii_case(interest))
			})
			.count();

		score += INTEREST_WEIGHT * (matched as f32 / audience.interests.len() as f32);
	}

	if let Some(age) = user.age {
		let demographics = &audience.demographics;
		let above_min = demographics.age_min.map(|min| age >= min).unwrap_or(true);
		let below_max = demographics.age_max.map(|max| age <= max).unwrap_or(true);

		if above_min && below_max {
			score += AGE_WEIGHT;
		}
	}

	if let Some(location) = &user.location
		&& let Some(target) = &audience.demographics.location
		&& location.eq_ignore_ascii_case(target)
	{
		score += LOCATION_WEIGHT;
	}

	score.min(1.0)
}

/// Deterministic tie-breaking jitter, strictly below 1% of the combined
/// score. Keyed on ad id and query so reruns of the same request rank
/// identically.
fn jitter(ad_id: &str, query: &str) -> f32 {
	let mut hasher = ahash::RandomState::with_seeds(7, 11, 13, 17).build_hasher();

	ad_id.hash(&mut hasher);
	query.hash(&mut hasher);

	let bucket = (hasher.finish() % 1_000) as f32 / 1_000.0;

	bucket * JITTER_CEILING
}
