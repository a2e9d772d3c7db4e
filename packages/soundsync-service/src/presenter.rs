//! Wire shape of a recommendation response.

use serde::Serialize;

use soundsync_domain::{ScoredResult, Song, ValidatedFilters};
use soundsync_storage::models::GeneratedRow;

/// Similarity reported for rows that carry no numeric score.
pub const UNSCORED_SIMILARITY: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongView {
	pub id: String,
	pub track_name: String,
	pub artists: String,
	pub album_name: String,
}
impl From<&Song> for SongView {
	fn from(song: &Song) -> Self {
		Self {
			id: song.id.to_string(),
			track_name: song.track_name.clone(),
			artists: song.artists_display(),
			album_name: song.album_name.clone().unwrap_or_default(),
		}
	}
}
impl From<GeneratedRow> for SongView {
	fn from(row: GeneratedRow) -> Self {
		Self {
			id: row.id,
			track_name: row.track_name,
			artists: row.artists.unwrap_or_default(),
			album_name: row.album_name.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendItem {
	pub song: SongView,
	pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendResponse {
	pub results: Vec<RecommendItem>,
	pub query: String,
	pub filters: ValidatedFilters,
}

pub fn present(
	query: &str,
	filters: ValidatedFilters,
	ranked: Vec<ScoredResult>,
) -> RecommendResponse {
	let results = ranked
		.into_iter()
		.map(|scored| RecommendItem {
			song: SongView::from(&scored.song),
			similarity: scored.similarity,
		})
		.collect();

	RecommendResponse { results, query: query.to_string(), filters }
}

pub fn present_generated(
	query: &str,
	filters: ValidatedFilters,
	rows: Vec<GeneratedRow>,
) -> RecommendResponse {
	let results = rows
		.into_iter()
		.map(|row| {
			let similarity = row.similarity.map_or(UNSCORED_SIMILARITY, |value| value as f32);

			RecommendItem { song: SongView::from(row), similarity }
		})
		.collect();

	RecommendResponse { results, query: query.to_string(), filters }
}

/// Songs from a plain read, all reported as [`UNSCORED_SIMILARITY`].
pub fn present_unscored(
	query: &str,
	filters: ValidatedFilters,
	songs: &[Song],
) -> RecommendResponse {
	let results = songs
		.iter()
		.map(|song| RecommendItem { song: SongView::from(song), similarity: UNSCORED_SIMILARITY })
		.collect();

	RecommendResponse { results, query: query.to_string(), filters }
}
