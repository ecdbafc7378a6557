use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use time::OffsetDateTime;

use admatch_config::ContextTracking;

use crate::annotation::IntentSignal;

/// Mutable per-conversation state. One instance per conversation id, owned by
/// the service layer and updated once per turn before scoring reads it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversationContext {
	pub topics: HashMap<String, f32>,
	pub intents: HashMap<IntentSignal, f32>,
	pub preferences: HashMap<String, f32>,
	pub discussed_products: HashMap<String, DiscussedProduct>,
	pub recent_queries: VecDeque<RecentQuery>,
	pub topic_history: VecDeque<TopicSnapshot>,
	pub frequency: HashMap<String, FrequencyState>,
	pub last_shown: Option<String>,
	pub turn: u64,
}
impl ConversationContext {
	/// Folds one user query into the context. Accumulated topic, preference
	/// and intent scores first decay, then take the maximum of the decayed
	/// value and the fresh signal, so a stale signal fades across turns while
	/// a repeated one snaps back to full strength.
	pub fn absorb_query(
		&mut self,
		query: &str,
		topics: &HashMap<String, f32>,
		preferences: &HashMap<String, f32>,
		intents: &HashMap<IntentSignal, f32>,
		products: &[String],
		cfg: &ContextTracking,
	) {
		let now = OffsetDateTime::now_utc();

		self.turn += 1;

		self.recent_queries.push_back(RecentQuery { text: query.to_string(), at: now });

		while self.recent_queries.len() > cfg.max_recent_queries as usize {
			self.recent_queries.pop_front();
		}

		if !topics.is_empty() {
			self.topic_history.push_back(TopicSnapshot { topics: topics.clone(), at: now });

			while self.topic_history.len() > cfg.max_topic_history as usize {
				self.topic_history.pop_front();
			}
		}

		for (topic, &score) in topics {
			decay_then_max(&mut self.topics, topic.clone(), score, cfg.topic_decay);
		}
		for (preference, &score) in preferences {
			decay_then_max(&mut self.preferences, preference.clone(), score, cfg.preference_decay);
		}
		for (&signal, &score) in intents {
			let stored = self.intents.entry(signal).or_insert(0.0);

			*stored = ((*stored * cfg.intent_decay).max(score)).min(1.0);
		}

		for product in products {
			self.note_product(product, now);
		}
	}

	/// Folds one prior-history message in with reduced weight. Unlike
	/// [`absorb_query`](Self::absorb_query) this is a blend, not a max, so a
	/// backlog of old messages cannot outvote the live query.
	pub fn absorb_history_message(
		&mut self,
		topics: &HashMap<String, f32>,
		preferences: &HashMap<String, f32>,
		products: &[String],
		cfg: &ContextTracking,
	) {
		let weight = cfg.history_weight;

		for (topic, &score) in topics {
			let stored = self.topics.entry(topic.clone()).or_insert(0.0);

			*stored = (*stored * (1.0 - weight) + score * weight).min(1.0);
		}
		for (preference, &score) in preferences {
			let stored = self.preferences.entry(preference.clone()).or_insert(0.0);

			*stored = (*stored * (1.0 - weight) + score * weight).min(1.0);
		}

		let now = OffsetDateTime::now_utc();

		for product in products {
			if !self.discussed_products.contains_key(product) {
				self.note_product(product, now);
			}
		}
	}

	pub fn impressions(&self, ad_id: &str) -> u32 {
		self.frequency.get(ad_id).map(|state| state.shown_count).unwrap_or(0)
	}

	/// Records that `ad_id` was actually selected for display. Called exactly
	/// once per delivered ad; rejected candidates never reach here.
	pub fn record_impression(&mut self, ad_id: &str) {
		let state = self.frequency.entry(ad_id.to_string()).or_default();

		state.shown_count += 1;
		state.last_shown_turn = self.turn;

		self.last_shown = Some(ad_id.to_string());
	}

	fn note_product(&mut self, product: &str, now: OffsetDateTime) {
		self.discussed_products
			.entry(product.to_string())
			.and_modify(|entry| {
				entry.last_mentioned = now;
				entry.mention_count += 1;
			})
			.or_insert(DiscussedProduct {
				first_mentioned: now,
				last_mentioned: now,
				mention_count: 1,
			});
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct RecentQuery {
	pub text: String,
	pub at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicSnapshot {
	pub topics: HashMap<String, f32>,
	pub at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct DiscussedProduct {
	pub first_mentioned: OffsetDateTime,
	pub last_mentioned: OffsetDateTime,
	pub mention_count: u32,
}

/// Per-ad delivery counters inside one conversation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FrequencyState {
	pub shown_count: u32,
	pub last_shown_turn: u64,
}

fn decay_then_max(stored: &mut HashMap<String, f32>, key: String, fresh: f32, decay: f32) {
	let entry = stored.entry(key).or_insert(0.0);

	*entry = ((*entry * decay).max(fresh)).min(1.0);
}
