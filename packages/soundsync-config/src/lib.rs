mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Recommend,
	STRATEGY_GENERATED_SQL, STRATEGY_RERANK, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.recommend.candidate_pool == 0 {
		return Err(Error::Validation {
			message: "recommend.candidate_pool must be greater than zero.".to_string(),
		});
	}

	match cfg.recommend.strategy.as_str() {
		STRATEGY_RERANK => {},
		STRATEGY_GENERATED_SQL => {
			let Some(generator) = cfg.providers.sql_generator.as_ref() else {
				return Err(Error::Validation {
					message: "providers.sql_generator is required when recommend.strategy is \
						generated_sql."
						.to_string(),
				});
			};

			if generator.api_key.trim().is_empty() {
				return Err(Error::Validation {
					message: "providers.sql_generator.api_key must be non-empty.".to_string(),
				});
			}
			if !generator.temperature.is_finite() {
				return Err(Error::Validation {
					message: "providers.sql_generator.temperature must be a finite number."
						.to_string(),
				});
			}
		},
		_ => {
			return Err(Error::Validation {
				message: "recommend.strategy must be one of rerank or generated_sql.".to_string(),
			});
		},
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.providers.embedding.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false)
	{
		cfg.providers.embedding.api_key = None;
	}

	cfg.recommend.strategy = cfg.recommend.strategy.trim().to_ascii_lowercase();

	while cfg.providers.embedding.api_base.ends_with('/') {
		cfg.providers.embedding.api_base.pop();
	}
}
