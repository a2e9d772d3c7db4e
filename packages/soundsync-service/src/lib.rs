pub mod presenter;
pub mod recommend;

mod error;

pub use error::{Error, Result};
pub use presenter::{RecommendItem, RecommendResponse, SongView};
pub use recommend::{QUERY_REQUIRED, RecommendRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use soundsync_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use soundsync_domain::{CandidateQuery, Song};
use soundsync_providers::{embedding, sql_generator};
use soundsync_storage::{db::Db, models::GeneratedRow, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

/// Text-to-SQL. Implementations degrade to a fixed statement instead of failing.
pub trait SqlGenerator
where
	Self: Send + Sync,
{
	fn generate<'a>(&'a self, cfg: &'a LlmProviderConfig, query: &'a str) -> BoxFuture<'a, String>;
}

/// Read side of the song catalog.
pub trait SongStore
where
	Self: Send + Sync,
{
	/// At most `query.pool_size` songs satisfying every present constraint.
	fn fetch_candidates<'a>(
		&'a self,
		query: &'a CandidateQuery,
	) -> BoxFuture<'a, Result<Vec<Song>>>;

	fn fetch_top(&self, limit: u32) -> BoxFuture<'_, Result<Vec<Song>>>;

	fn run_generated_select<'a>(
		&'a self,
		select: &'a str,
		ivfflat_probes: u32,
	) -> BoxFuture<'a, Result<Vec<GeneratedRow>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub sql_generator: Arc<dyn SqlGenerator>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		sql_generator: Arc<dyn SqlGenerator>,
	) -> Self {
		Self { embedding, sql_generator }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), sql_generator: provider }
	}
}

pub struct PgSongStore {
	db: Db,
}
impl PgSongStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl SongStore for PgSongStore {
	fn fetch_candidates<'a>(
		&'a self,
		query: &'a CandidateQuery,
	) -> BoxFuture<'a, Result<Vec<Song>>> {
		Box::pin(async move { Ok(queries::fetch_candidates(&self.db, query).await?) })
	}

	fn fetch_top(&self, limit: u32) -> BoxFuture<'_, Result<Vec<Song>>> {
		Box::pin(async move { Ok(queries::fetch_top(&self.db, limit).await?) })
	}

	fn run_generated_select<'a>(
		&'a self,
		select: &'a str,
		ivfflat_probes: u32,
	) -> BoxFuture<'a, Result<Vec<GeneratedRow>>> {
		Box::pin(async move {
			Ok(queries::run_generated_select(&self.db, select, ivfflat_probes).await?)
		})
	}
}

pub struct SoundSyncService {
	pub cfg: Config,
	pub store: Arc<dyn SongStore>,
	pub providers: Providers,
}
impl SoundSyncService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, store: Arc::new(PgSongStore::new(db)), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, store: Arc<dyn SongStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, text).await?) })
	}
}
impl SqlGenerator for DefaultProviders {
	fn generate<'a>(&'a self, cfg: &'a LlmProviderConfig, query: &'a str) -> BoxFuture<'a, String> {
		Box::pin(sql_generator::generate(cfg, query))
	}
}
