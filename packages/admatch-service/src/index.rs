use std::{
	collections::{BTreeMap, BTreeSet, HashMap},
	sync::Arc,
};

use time::Date;

use admatch_domain::{Ad, validate_ad};

/// Outcome of one index build. Skipped records carry the reason so callers
/// can surface malformed inventory without failing the reload.
#[derive(Clone, Debug)]
pub struct IndexReport {
	/// Servable ads that made it into the index.
	pub indexed: usize,
	/// Valid records excluded for being inactive or outside their flight
	/// window.
	pub excluded: usize,
	pub skipped: Vec<SkippedAd>,
}

#[derive(Clone, Debug)]
pub struct SkippedAd {
	pub ad_id: String,
	pub title: String,
	pub issue: &'static str,
}

/// Immutable lexical index over one inventory generation. Rebuilds produce a
/// whole new snapshot that is swapped in atomically; nothing here mutates.
pub(crate) struct IndexSnapshot {
	ads: HashMap<String, Arc<Ad>>,
	keyword_to_ads: BTreeMap<String, Vec<String>>,
	category_to_ads: BTreeMap<String, Vec<String>>,
	product_terms: Vec<String>,
}
impl IndexSnapshot {
	pub(crate) fn build(inventory: Vec<Ad>, today: Date) -> (Self, IndexReport) {
		let mut ads = HashMap::new();
		let mut keyword_to_ads: BTreeMap<String, Vec<String>> = BTreeMap::new();
		let mut category_to_ads: BTreeMap<String, Vec<String>> = BTreeMap::new();
		let mut product_terms = BTreeSet::new();
		let mut excluded = 0_usize;
		let mut skipped = Vec::new();

		for ad in inventory {
			if let Err(issue) = validate_ad(&ad) {
				tracing::warn!(
					ad_id = %ad.id,
					issue = issue.as_str(),
					"skipping malformed ad record",
				);
				skipped.push(SkippedAd {
					ad_id: ad.id.clone(),
					title: ad.title.clone(),
					issue: issue.as_str(),
				});

				continue;
			}
			if !ad.is_servable(today) {
				excluded += 1;

				continue;
			}

			for keyword in &ad.keywords {
				let term = keyword.trim().to_lowercase();

				if term.is_empty() {
					continue;
				}

				let ids = keyword_to_ads.entry(term.clone()).or_default();

				if !ids.contains(&ad.id) {
					ids.push(ad.id.clone());
				}

				product_terms.insert(term);
			}
			for category in &ad.categories {
				let term = category.trim().to_lowercase();

				if term.is_empty() {
					continue;
				}

				let ids = category_to_ads.entry(term).or_default();

				if !ids.contains(&ad.id) {
					ids.push(ad.id.clone());
				}
			}

			if let Some(brand) = &ad.brand {
				let term = brand.trim().to_lowercase();

				if !term.is_empty() {
					product_terms.insert(term);
				}
			}

			ads.insert(ad.id.clone(), Arc::new(ad));
		}

		let indexed = ads.len();
		let snapshot = Self {
			ads,
			keyword_to_ads,
			category_to_ads,
			product_terms: product_terms.into_iter().collect(),
		};

		(snapshot, IndexReport { indexed, excluded, skipped })
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.ads.is_empty()
	}

	pub(crate) fn get(&self, ad_id: &str) -> Option<&Arc<Ad>> {
		self.ads.get(ad_id)
	}

	/// Union of the keyword and category hit-sets for one query, in stable
	/// id order. Ads with no lexical hit at all are never scored.
	pub(crate) fn candidates(&self, query_lower: &str, tokens: &[String]) -> Vec<Arc<Ad>> {
		let mut ids = BTreeSet::new();

		for table in [&self.keyword_to_ads, &self.category_to_ads] {
			for (term, ad_ids) in table {
				if term_matches(term, query_lower, tokens) {
					ids.extend(ad_ids.iter().cloned());
				}
			}
		}

		ids.iter().filter_map(|id| self.ads.get(id).cloned()).collect()
	}

	/// Indexed keywords and brands mentioned verbatim in the query, for
	/// product tracking in the conversation context.
	pub(crate) fn product_mentions(&self, query_lower: &str) -> Vec<String> {
		self.product_terms
			.iter()
			.filter(|term| query_lower.contains(term.as_str()))
			.cloned()
			.collect()
	}
}

/// Shared match predicate for indexed terms, also used by the scorer so the
/// candidate set and the per-ad matched-term lists agree. A term matches on:
/// an exact token hit, a verbatim phrase hit, a term contained inside one
/// query token, or a query token contained inside one of a multi-word term's
/// component words.
pub(crate) fn term_matches(term_lower: &str, query_lower: &str, tokens: &[String]) -> bool {
	if tokens.iter().any(|token| token == term_lower) {
		return true;
	}
	if term_lower.contains(' ') && query_lower.contains(term_lower) {
		return true;
	}
	if tokens.iter().any(|token| token.contains(term_lower)) {
		return true;
	}
	if term_lower.contains(' ') {
		return term_lower
			.split_whitespace()
			.any(|component| tokens.iter().any(|token| component.contains(token.as_str())));
	}

	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use admatch_domain::tokenize;

	fn ad(id: &str, keywords: &[&str], categories: &[&str]) -> Ad {
		let raw = serde_json::json!({
			"id": id,
			"title": format!("title {id}"),
			"keywords": keywords,
			"categories": categories,
		});

		serde_json::from_value(raw).expect("parse failed")
	}

	fn build(inventory: Vec<Ad>) -> (IndexSnapshot, IndexReport) {
		IndexSnapshot::build(inventory, Date::from_ordinal_date(2026, 1).expect("date"))
	}

	#[test]
	fn finds_exact_token_and_phrase_matches() {
		let (snapshot, _) = build(vec![
			ad("ad_1", &["running shoes"], &["footwear"]),
			ad("ad_2", &["laptop"], &["electronics"]),
		]);
		let query = "best running shoes for a marathon";
		let tokens = tokenize(query);
		let hits = snapshot.candidates(query, &tokens);

		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].id, "ad_1");
	}

	#[test]
	fn finds_partial_containment_in_both_directions() {
		let tokens = tokenize("running");

		assert!(term_matches("running shoes", "running", &tokens));
		assert!(term_matches("run", "runner wanted", &tokenize("runner wanted")));
	}

	#[test]
	fn skips_malformed_records_and_counts_them() {
		let (snapshot, report) = build(vec![ad("ad_1", &["laptop"], &[]), ad("", &["phone"], &[])]);

		assert_eq!(report.indexed, 1);
		assert_eq!(report.skipped.len(), 1);
		assert_eq!(report.skipped[0].issue, "missing_id");
		assert!(snapshot.get("ad_1").is_some());
	}

	#[test]
	fn excludes_inactive_records_silently() {
		let mut stale = ad("ad_1", &["laptop"], &[]);

		stale.active = false;

		let (snapshot, report) = build(vec![stale, ad("ad_2", &["phone"], &[])]);

		assert_eq!(report.indexed, 1);
		assert_eq!(report.excluded, 1);
		assert!(report.skipped.is_empty());
		assert!(snapshot.get("ad_1").is_none());
	}

	#[test]
	fn same_term_counts_an_ad_once() {
		let (snapshot, _) =
			build(vec![ad("ad_1", &["running shoes", "running shoes"], &["running shoes"])]);
		let query = "running shoes";
		let hits = snapshot.candidates(query, &tokenize(query));

		assert_eq!(hits.len(), 1);
	}

	#[test]
	fn tracks_keywords_and_brands_as_product_terms() {
		let mut branded = ad("ad_1", &["running shoes"], &[]);

		branded.brand = Some("Nike".to_string());

		let (snapshot, _) = build(vec![branded]);
		let mentions = snapshot.product_mentions("are nike running shoes worth it");

		assert_eq!(mentions, vec!["nike", "running shoes"]);
	}
}
