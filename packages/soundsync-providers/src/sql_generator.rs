//! Natural-language to SQL through an OpenAI-compatible chat completions endpoint.
//!
//! Generation never fails from the caller's point of view: any provider error or unusable
//! output degrades to [`FALLBACK_SQL`].

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

pub const FALLBACK_SQL: &str = "\
SET ivfflat.probes = 10;
SELECT id, track_name, artists, track_genre, features <-> (
	SELECT AVG(features)
	FROM songs
	WHERE 'Artist' = ANY(artists)
) AS similarity
FROM songs
ORDER BY similarity
LIMIT 10;";
/// Used when the generated text has no `SELECT` at all.
pub const FALLBACK_SELECT: &str = "SELECT id, track_name, artists, track_genre FROM songs LIMIT 10";
pub const VECTOR_DISTANCE_OPERATOR: &str = "<->";

pub async fn generate(cfg: &soundsync_config::LlmProviderConfig, query: &str) -> String {
	let provider = cfg.provider_id.as_str();

	match request(cfg, &build_prompt(query)).await {
		Ok(Some(raw)) => {
			tracing::debug!(provider, query, raw = raw.as_str(), "SQL generator responded.");

			sanitize(&raw).unwrap_or_else(|| FALLBACK_SQL.to_string())
		},
		Ok(None) => {
			tracing::warn!(
				provider,
				query,
				"SQL generator returned an empty response; using fallback SQL."
			);

			FALLBACK_SQL.to_string()
		},
		Err(err) => {
			tracing::warn!(
				error = %err,
				provider,
				query,
				"SQL generation failed; using fallback SQL."
			);

			FALLBACK_SQL.to_string()
		},
	}
}

pub fn build_prompt(query: &str) -> String {
	format!(
		"\
I have a PostgreSQL table named \"songs\" with the following columns:
- id (bigint)
- album_name (text)
- track_name (text)
- artists (text[])  -- an array of artist names
- track_genre (text)
- popularity (real)
- danceability, energy, acousticness, valence (real, 0.0 to 1.0)
- tempo (real, beats per minute)
- features (vector)  -- the song's feature vector

Generate a PostgreSQL query for the request below that matches this exact format:

{FALLBACK_SQL}

The user query is: \"{query}\"

Important:
1. Replace 'Artist' with the artist name mentioned in the query.
2. Keep the SET ivfflat.probes = 10; line exactly as shown.
3. If no artist is mentioned, adapt the inner query to the genre or mood the user asks for.
4. For genre-based queries, use: WHERE track_genre ILIKE '%genre%'
5. Always use the {VECTOR_DISTANCE_OPERATOR} operator exactly as shown.
6. Do not add any extra WHERE clauses to the outer query.

Return only the SQL query, no explanations or markdown."
	)
}

/// Strips code fences and forces the canonical distance operator. `None` when nothing is left.
///
/// `<=>>` is rewritten as a whole before `<=>`, so no stray `>` survives the rewrite.
pub fn sanitize(raw: &str) -> Option<String> {
	let mut sql = raw.trim();

	if let Some(rest) = sql.strip_prefix("```") {
		let rest = rest.strip_prefix("sql").unwrap_or(rest);

		sql = rest.trim();
		sql = sql.strip_suffix("```").unwrap_or(sql).trim();
	}

	let sql =
		sql.replace("<=>>", VECTOR_DISTANCE_OPERATOR).replace("<=>", VECTOR_DISTANCE_OPERATOR);

	if sql.is_empty() {
		return None;
	}

	Some(sql)
}

/// The statement from the first `SELECT` onward, without a trailing semicolon.
pub fn select_statement(sql: &str) -> &str {
	let Some(start) = sql.find("SELECT") else { return FALLBACK_SELECT };
	let select = sql[start..].trim_end();

	select.strip_suffix(';').unwrap_or(select).trim_end()
}

async fn request(
	cfg: &soundsync_config::LlmProviderConfig,
	prompt: &str,
) -> Result<Option<String>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [{ "role": "user", "content": prompt }],
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(Some(&cfg.api_key), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(json)
}

fn parse_completion(json: Value) -> Result<Option<String>> {
	let choices = json.get("choices").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Completion response is missing choices.".to_string() }
	})?;
	let content = choices
		.first()
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|content| !content.is_empty());

	Ok(content.map(str::to_string))
}
