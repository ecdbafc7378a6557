pub mod annotate;
pub mod deliver;
pub mod index;
pub mod rank;
pub mod score;

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex, RwLock},
};

use serde_json::Value;

use admatch_config::{Config, ExtractorProviderConfig};
use admatch_domain::{Ad, ConversationContext};
use admatch_providers::extractor::{self, Extraction};

pub use deliver::{AdRequest, DisplayAd, MatchFactors, Turn, UserContext};
pub use index::{IndexReport, SkippedAd};
pub use rank::RankFactors;
pub use score::SubScores;

use index::IndexSnapshot;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ExtractorProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a ExtractorProviderConfig,
		query: &'a str,
		history: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Extraction>>;
}

#[derive(Clone)]
pub struct Providers {
	pub extractor: Arc<dyn ExtractorProvider>,
}
impl Providers {
	pub fn new(extractor: Arc<dyn ExtractorProvider>) -> Self {
		Self { extractor }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { extractor: Arc::new(DefaultProviders) }
	}
}

struct DefaultProviders;
impl ExtractorProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a ExtractorProviderConfig,
		query: &'a str,
		history: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Extraction>> {
		Box::pin(extractor::extract(cfg, query, history))
	}
}

pub struct AdService {
	pub cfg: Config,
	pub providers: Providers,
	index: RwLock<Arc<IndexSnapshot>>,
	conversations: RwLock<HashMap<String, Arc<Mutex<ConversationContext>>>>,
}
impl AdService {
	pub fn new(cfg: Config, inventory: Vec<Ad>) -> (Self, IndexReport) {
		Self::with_providers(cfg, inventory, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		inventory: Vec<Ad>,
		providers: Providers,
	) -> (Self, IndexReport) {
		let (snapshot, report) = IndexSnapshot::build(inventory, today());
		let service = Self {
			cfg,
			providers,
			index: RwLock::new(Arc::new(snapshot)),
			conversations: RwLock::new(HashMap::new()),
		};

		(service, report)
	}

	/// Rebuilds the lexical index from a fresh inventory and swaps it in.
	/// Lookups in flight keep reading the snapshot they started with.
	pub fn reload(&self, inventory: Vec<Ad>) -> IndexReport {
		let (snapshot, report) = IndexSnapshot::build(inventory, today());

		*self.index.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(snapshot);

		tracing::info!(
			indexed = report.indexed,
			excluded = report.excluded,
			skipped = report.skipped.len(),
			"ad inventory reloaded",
		);

		report
	}

	/// Drops all tracked state for one conversation. Returns whether any
	/// state existed. Callers use this as the eviction hook for ended
	/// conversations.
	pub fn reset_conversation(&self, conversation_id: &str) -> bool {
		self.conversations
			.write()
			.unwrap_or_else(|err| err.into_inner())
			.remove(conversation_id)
			.is_some()
	}

	pub(crate) fn snapshot(&self) -> Arc<IndexSnapshot> {
		self.index.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub(crate) fn conversation(&self, conversation_id: &str) -> Arc<Mutex<ConversationContext>> {
		if let Some(ctx) = self
			.conversations
			.read()
			.unwrap_or_else(|err| err.into_inner())
			.get(conversation_id)
		{
			return ctx.clone();
		}

		self.conversations
			.write()
			.unwrap_or_else(|err| err.into_inner())
			.entry(conversation_id.to_string())
			.or_default()
			.clone()
	}
}

fn today() -> time::Date {
	time::OffsetDateTime::now_utc().date()
}
