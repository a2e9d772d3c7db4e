use std::cmp::Ordering;

use crate::{QueryIntent, ScoredResult, Song};

pub const MOOD_BOOST: f32 = 0.15;
pub const POPULAR_BOOST: f32 = 0.10;
pub const HIGH_THRESHOLD: f32 = 0.7;
pub const LOW_THRESHOLD: f32 = 0.4;
pub const POPULARITY_THRESHOLD: f32 = 70.0;
pub const MAX_SIMILARITY: f32 = 1.0;

/// Cosine similarity over the common prefix of both vectors.
///
/// Dimensions beyond the shorter vector are ignored for the dot product and both norms. A zero
/// norm yields 0.0.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f32 {
	let len = lhs.len().min(rhs.len());
	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs[..len].iter().zip(&rhs[..len]) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	dot / (lhs_norm.sqrt() * rhs_norm.sqrt())
}

/// Sum of the intent boosts the song qualifies for.
pub fn intent_boost(intent: &QueryIntent, song: &Song) -> f32 {
	let rules = [
		(intent.high_energy, song.energy > HIGH_THRESHOLD, MOOD_BOOST),
		(intent.low_energy, song.energy < LOW_THRESHOLD, MOOD_BOOST),
		(intent.danceable, song.danceability > HIGH_THRESHOLD, MOOD_BOOST),
		(intent.acoustic, song.acousticness > HIGH_THRESHOLD, MOOD_BOOST),
		(intent.upbeat, song.valence > HIGH_THRESHOLD, MOOD_BOOST),
		(intent.sad, song.valence < LOW_THRESHOLD, MOOD_BOOST),
		(intent.popular, song.popularity > POPULARITY_THRESHOLD, POPULAR_BOOST),
	];
	let mut boost = 0.0;

	for (wanted, satisfied, weight) in rules {
		if wanted && satisfied {
			boost += weight;
		}
	}

	boost
}

/// Final score: base similarity plus boosts, capped from above only.
pub fn score(query_embedding: &[f32], intent: &QueryIntent, song: &Song) -> f32 {
	let base = cosine_similarity(query_embedding, &song.features);

	(base + intent_boost(intent, song)).min(MAX_SIMILARITY)
}

/// Scores, orders, and truncates the candidate pool.
///
/// Artist and genre intent never boost here; they only narrow the pool upstream. Equal scores
/// keep their candidate-pool order.
pub fn rank(
	query_embedding: &[f32],
	intent: &QueryIntent,
	candidates: Vec<Song>,
	limit: usize,
) -> Vec<ScoredResult> {
	let mut scored: Vec<ScoredResult> = candidates
		.into_iter()
		.map(|song| {
			let similarity = score(query_embedding, intent, &song);

			ScoredResult { song, similarity }
		})
		.collect();

	scored.sort_by(|a, b| cmp_f32_desc(a.similarity, b.similarity));
	scored.truncate(limit);

	scored
}

/// Descending order with NaN last.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
