use serde::Deserialize;
use serde_json::Value;

use crate::{
	Error, Result, SoundSyncService,
	presenter::{self, RecommendResponse},
};
use soundsync_config::STRATEGY_GENERATED_SQL;
use soundsync_domain::{CandidateQuery, ValidatedFilters, filters, intent, ranking};
use soundsync_providers::sql_generator;

pub const QUERY_REQUIRED: &str = "Query is required and must be a string";

/// Raw request body. Both fields stay untyped so shape errors surface as one message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
	#[serde(default)]
	pub query: Option<Value>,
	#[serde(default)]
	pub filters: Option<Value>,
}
impl RecommendRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: Some(Value::String(query.into())), filters: None }
	}

	pub fn with_filters(mut self, filters: Value) -> Self {
		self.filters = Some(filters);

		self
	}
}

impl SoundSyncService {
	pub async fn recommend(&self, req: RecommendRequest) -> Result<RecommendResponse> {
		let query = parse_query(req.query.as_ref())?;
		let filters = filters::validate(req.filters.as_ref());

		if self.cfg.recommend.strategy == STRATEGY_GENERATED_SQL {
			return self.recommend_generated(query, filters).await;
		}

		self.recommend_rerank(query, filters).await
	}

	async fn recommend_rerank(
		&self,
		query: &str,
		filters: ValidatedFilters,
	) -> Result<RecommendResponse> {
		let intent = intent::analyze(query);
		let embedding = self.providers.embedding.embed(&self.cfg.providers.embedding, query).await?;
		let candidate_query =
			CandidateQuery::new(&filters, &intent, self.cfg.recommend.candidate_pool);
		let candidates = self.store.fetch_candidates(&candidate_query).await?;

		if let Some(first) = candidates.first()
			&& first.features.len() != embedding.len()
		{
			tracing::debug!(
				query_dim = embedding.len(),
				feature_dim = first.features.len(),
				"Embedding and feature dimensions differ; comparing the common prefix."
			);
		}

		let pool_size = candidates.len();
		let ranked = ranking::rank(&embedding, &intent, candidates, filters.limit as usize);

		tracing::info!(
			query,
			pool_size,
			returned = ranked.len(),
			artist = intent.artist_filter.as_deref(),
			genre = intent.genre_filter.as_deref(),
			mood = intent.has_mood(),
			"Recommendation ranked."
		);

		Ok(presenter::present(query, filters, ranked))
	}

	async fn recommend_generated(
		&self,
		query: &str,
		filters: ValidatedFilters,
	) -> Result<RecommendResponse> {
		let Some(generator_cfg) = self.cfg.providers.sql_generator.as_ref() else {
			return Err(Error::Provider {
				message: "providers.sql_generator is not configured.".to_string(),
			});
		};
		let sql = self.providers.sql_generator.generate(generator_cfg, query).await;
		let select = sql_generator::select_statement(&sql);

		tracing::debug!(query, select, "Executing generated select.");

		match self.store.run_generated_select(select, self.cfg.recommend.ivfflat_probes).await {
			Ok(rows) => {
				tracing::info!(query, returned = rows.len(), "Generated select answered.");

				Ok(presenter::present_generated(query, filters, rows))
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					query,
					"Generated select failed; using plain top read."
				);

				let songs = self.store.fetch_top(filters.limit).await?;

				Ok(presenter::present_unscored(query, filters, &songs))
			},
		}
	}
}

/// A usable query is a non-empty JSON string. Whitespace-only text is still a query.
pub fn parse_query(raw: Option<&Value>) -> Result<&str> {
	match raw.and_then(Value::as_str) {
		Some(query) if !query.is_empty() => Ok(query),
		_ => Err(Error::InvalidRequest { message: QUERY_REQUIRED.to_string() }),
	}
}
