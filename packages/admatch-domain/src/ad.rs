use serde::{Deserialize, Serialize};
use time::Date;

/// Canonical ad record. Advertiser-facing tooling produces records with
/// drifting field names (`ad_id` vs `id`, `call_to_action` vs `cta`); the
/// serde aliases normalize them here so the core never branches on variants.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ad {
	#[serde(alias = "ad_id")]
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default = "default_cta", alias = "call_to_action")]
	pub cta: String,
	#[serde(default, alias = "landing_page")]
	pub url: String,
	#[serde(default)]
	pub brand: Option<String>,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub categories: Vec<String>,
	#[serde(default)]
	pub negative_keywords: Vec<String>,
	#[serde(default)]
	pub bid_amount: f32,
	#[serde(default)]
	pub daily_budget: f32,
	#[serde(default)]
	pub spent_today: f32,
	#[serde(default)]
	pub target_audience: Option<TargetAudience>,
	#[serde(default)]
	pub match_weights: MatchWeights,
	#[serde(default)]
	pub performance: Performance,
	#[serde(default = "default_active")]
	pub active: bool,
	#[serde(default)]
	pub start_date: Option<Date>,
	#[serde(default)]
	pub end_date: Option<Date>,
}
impl Ad {
	/// Whether the ad may serve on `today`. Inactive records and records
	/// outside their flight window are excluded at the indexing boundary.
	pub fn is_servable(&self, today: Date) -> bool {
		if !self.active {
			return false;
		}
		if let Some(start) = self.start_date
			&& today < start
		{
			return false;
		}
		if let Some(end) = self.end_date
			&& today > end
		{
			return false;
		}

		true
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TargetAudience {
	#[serde(default)]
	pub interests: Vec<String>,
	#[serde(default)]
	pub demographics: Demographics,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Demographics {
	pub age_min: Option<u32>,
	pub age_max: Option<u32>,
	pub location: Option<String>,
}

/// Per-ad weighting of the relevance sub-scores. Values need not sum to 1.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchWeights {
	#[serde(alias = "keyword_match")]
	pub keyword: f32,
	#[serde(alias = "category_match")]
	pub category: f32,
	#[serde(alias = "intent_match")]
	pub intent: f32,
}
impl Default for MatchWeights {
	fn default() -> Self {
		Self { keyword: 0.4, category: 0.3, intent: 0.3 }
	}
}

/// Updated by an external metrics collaborator, read-only to the scorer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Performance {
	pub impressions: u64,
	pub clicks: u64,
	pub conversions: u64,
	pub ctr: f32,
	pub conversion_rate: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdRecordIssue {
	MissingId,
	MissingKeywords,
}
impl AdRecordIssue {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingId => "missing_id",
			Self::MissingKeywords => "missing_keywords",
		}
	}
}

/// A record missing its id or all keywords cannot be matched against and is
/// skipped during indexing rather than aborting the reload.
pub fn validate_ad(ad: &Ad) -> Result<(), AdRecordIssue> {
	if ad.id.trim().is_empty() {
		return Err(AdRecordIssue::MissingId);
	}
	if ad.keywords.iter().all(|keyword| keyword.trim().is_empty()) {
		return Err(AdRecordIssue::MissingKeywords);
	}

	Ok(())
}

fn default_cta() -> String {
	"Learn More".to_string()
}

fn default_active() -> bool {
	true
}
