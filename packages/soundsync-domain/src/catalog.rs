//! Turning raw catalog exports into store-ready [`Song`] rows.
//!
//! Each feature is min-max normalized across the imported batch, so the vectors are only
//! comparable within one import.

use std::collections::HashSet;

use serde::Deserialize;

use crate::Song;

/// Length of the vectors produced by [`build_features`].
pub const FEATURE_DIM: usize = 12;
/// Popularity is down-weighted so it cannot dominate audio similarity.
pub const POPULARITY_WEIGHT: f32 = 0.3;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArtists {
	List(Vec<String>),
	/// Semicolon-separated, as found in the public Spotify track dumps.
	Joined(String),
}
impl RawArtists {
	pub fn into_vec(self) -> Vec<String> {
		let raw = match self {
			Self::List(list) => list,
			Self::Joined(joined) => joined.split(';').map(str::to_string).collect(),
		};

		raw.into_iter()
			.map(|artist| artist.trim().to_string())
			.filter(|artist| !artist.is_empty())
			.collect()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSong {
	pub id: i64,
	pub track_name: String,
	pub artists: RawArtists,
	#[serde(default)]
	pub album_name: Option<String>,
	pub track_genre: String,
	pub popularity: f32,
	pub duration_ms: f32,
	#[serde(default)]
	pub explicit: bool,
	pub danceability: f32,
	pub energy: f32,
	pub loudness: f32,
	pub speechiness: f32,
	pub acousticness: f32,
	pub instrumentalness: f32,
	pub liveness: f32,
	pub valence: f32,
	pub tempo: f32,
}

/// Drops repeated `(track_name, artists)` pairs, keeping the first occurrence.
pub fn dedupe(songs: Vec<RawSong>) -> Vec<RawSong> {
	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(songs.len());

	for song in songs {
		let artists = match &song.artists {
			RawArtists::List(list) => list.join(";"),
			RawArtists::Joined(joined) => joined.clone(),
		};

		if seen.insert((song.track_name.clone(), artists)) {
			out.push(song);
		}
	}

	out
}

pub fn build_features(songs: &[RawSong]) -> Vec<Vec<f32>> {
	let columns: [fn(&RawSong) -> f32; 10] = [
		|s| s.danceability,
		|s| s.energy,
		|s| s.loudness,
		|s| s.speechiness,
		|s| s.acousticness,
		|s| s.instrumentalness,
		|s| s.liveness,
		|s| s.valence,
		|s| s.tempo,
		|s| s.duration_ms,
	];
	let ranges: Vec<(f32, f32)> = columns.iter().map(|column| min_max(songs, *column)).collect();
	let popularity_range = min_max(songs, |s| s.popularity);

	songs
		.iter()
		.map(|song| {
			let mut features = Vec::with_capacity(FEATURE_DIM);

			for (column, range) in columns.iter().zip(&ranges) {
				features.push(normalize(column(song), *range));
			}

			features.push(if song.explicit { 1.0 } else { 0.0 });
			features.push(normalize(song.popularity, popularity_range) * POPULARITY_WEIGHT);

			features
		})
		.collect()
}

/// Dedupes, builds features, and converts the batch into [`Song`] rows.
pub fn prepare(songs: Vec<RawSong>) -> Vec<Song> {
	let songs = dedupe(songs);
	let features = build_features(&songs);

	songs
		.into_iter()
		.zip(features)
		.map(|(raw, features)| Song {
			id: raw.id,
			track_name: raw.track_name,
			artists: raw.artists.into_vec(),
			album_name: raw.album_name.filter(|album| !album.trim().is_empty()),
			track_genre: raw.track_genre,
			popularity: raw.popularity,
			danceability: raw.danceability,
			energy: raw.energy,
			acousticness: raw.acousticness,
			valence: raw.valence,
			tempo: raw.tempo,
			features,
		})
		.collect()
}

fn min_max(songs: &[RawSong], column: impl Fn(&RawSong) -> f32) -> (f32, f32) {
	songs.iter().map(column).fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), value| {
		(lo.min(value), hi.max(value))
	})
}

fn normalize(value: f32, (lo, hi): (f32, f32)) -> f32 {
	let span = hi - lo;

	if !span.is_finite() || span <= 0.0 {
		return 0.0;
	}

	(value - lo) / span
}
