use serde::Deserialize;
use serde_json::{Map, Value};

pub const STRATEGY_RERANK: &str = "rerank";
pub const STRATEGY_GENERATED_SQL: &str = "generated_sql";

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub recommend: Recommend,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	/// Dimensionality of the `songs.features` column.
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Only read when `recommend.strategy` is `generated_sql`.
	pub sql_generator: Option<LlmProviderConfig>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	#[serde(default = "default_embedding_path")]
	pub path: String,
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Recommend {
	pub strategy: String,
	/// Upper bound on songs pulled from the store before ranking.
	pub candidate_pool: u32,
	pub ivfflat_probes: u32,
}
impl Default for Recommend {
	fn default() -> Self {
		Self {
			strategy: STRATEGY_RERANK.to_string(),
			candidate_pool: 2_000,
			ivfflat_probes: 10,
		}
	}
}

fn default_embedding_path() -> String {
	"/embed".to_string()
}
