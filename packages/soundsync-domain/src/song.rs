use serde::{Deserialize, Serialize};

/// A catalog row as read from the song store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
	pub id: i64,
	pub track_name: String,
	pub artists: Vec<String>,
	pub album_name: Option<String>,
	pub track_genre: String,
	pub popularity: f32,
	pub danceability: f32,
	pub energy: f32,
	pub acousticness: f32,
	pub valence: f32,
	pub tempo: f32,
	pub features: Vec<f32>,
}
impl Song {
	pub fn artists_display(&self) -> String {
		self.artists.join(", ")
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
	pub song: Song,
	/// Cosine similarity plus intent boosts, capped at 1.0. May be negative.
	pub similarity: f32,
}
