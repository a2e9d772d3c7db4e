use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 50;

/// Caller-supplied filters after sanitization.
///
/// Bounds are inclusive and independent; `min > max` is passed through unchanged and simply
/// matches nothing downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedFilters {
	pub limit: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub genres: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_popularity: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_popularity: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_danceability: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_danceability: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_energy: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_energy: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_tempo: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_tempo: Option<f64>,
}
impl Default for ValidatedFilters {
	fn default() -> Self {
		Self {
			limit: DEFAULT_LIMIT,
			genres: None,
			min_popularity: None,
			max_popularity: None,
			min_danceability: None,
			max_danceability: None,
			min_energy: None,
			max_energy: None,
			min_tempo: None,
			max_tempo: None,
		}
	}
}

/// Sanitizes a raw `filters` JSON value. Never fails: anything unusable is dropped.
pub fn validate(raw: Option<&Value>) -> ValidatedFilters {
	let empty = Map::new();
	let raw = raw.and_then(Value::as_object).unwrap_or(&empty);

	ValidatedFilters {
		limit: clamp_limit(raw.get("limit")),
		genres: raw.get("genres").and_then(parse_genres),
		min_popularity: number(raw, "min_popularity"),
		max_popularity: number(raw, "max_popularity"),
		min_danceability: number(raw, "min_danceability"),
		max_danceability: number(raw, "max_danceability"),
		min_energy: number(raw, "min_energy"),
		max_energy: number(raw, "max_energy"),
		min_tempo: number(raw, "min_tempo"),
		max_tempo: number(raw, "max_tempo"),
	}
}

fn clamp_limit(raw: Option<&Value>) -> u32 {
	let Some(value) = raw else { return DEFAULT_LIMIT };
	let requested = match (value.as_i64(), value.as_f64()) {
		(Some(int), _) => int,
		// Saturating float-to-int cast; fractional limits truncate toward zero.
		(None, Some(float)) => float.trunc() as i64,
		(None, None) => return DEFAULT_LIMIT,
	};

	requested.clamp(MIN_LIMIT, MAX_LIMIT) as u32
}

fn parse_genres(raw: &Value) -> Option<Vec<String>> {
	let genres: Vec<String> = match raw {
		Value::String(genre) => vec![genre.clone()],
		Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
		_ => return None,
	};

	// An empty set constrains nothing.
	(!genres.is_empty()).then_some(genres)
}

fn number(raw: &Map<String, Value>, key: &str) -> Option<f64> {
	raw.get(key).filter(|value| value.is_number()).and_then(Value::as_f64)
}
