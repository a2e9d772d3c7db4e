use sqlx::{Row, postgres::PgRow};

use crate::{Error, Result, vector};
use soundsync_domain::Song;

#[derive(Debug, sqlx::FromRow)]
pub struct SongRow {
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
	/// `features::text`; pgvector has no native sqlx decoding here.
	pub features: String,
}
impl TryFrom<SongRow> for Song {
	type Error = Error;

	fn try_from(row: SongRow) -> Result<Self> {
		Ok(Self {
			features: vector::parse_pg_vector(&row.features)?,
			id: row.id,
			track_name: row.track_name,
			artists: row.artists,
			album_name: row.album_name,
			track_genre: row.track_genre,
			popularity: row.popularity,
			danceability: row.danceability,
			energy: row.energy,
			acousticness: row.acousticness,
			valence: row.valence,
			tempo: row.tempo,
		})
	}
}

/// A row returned by a generated statement, whose column set is not known in advance.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRow {
	pub id: String,
	pub track_name: String,
	pub artists: Option<String>,
	pub album_name: Option<String>,
	pub similarity: Option<f64>,
}
impl GeneratedRow {
	pub fn from_row(row: &PgRow) -> Result<Self> {
		let id = match row.try_get::<i64, _>("id") {
			Ok(id) => id.to_string(),
			Err(_) => row
				.try_get::<i32, _>("id")
				.map(|id| id.to_string())
				.or_else(|_| row.try_get::<String, _>("id"))
				.map_err(|err| {
					Error::InvalidRow(format!("Generated row has no usable id: {err}"))
				})?,
		};
		let track_name =
			row.try_get::<Option<String>, _>("track_name").ok().flatten().unwrap_or_default();
		let artists = match row.try_get::<Option<Vec<String>>, _>("artists") {
			Ok(list) => list.map(|list| list.join(", ")),
			Err(_) => row.try_get::<Option<String>, _>("artists").ok().flatten(),
		};
		let album_name = row.try_get::<Option<String>, _>("album_name").ok().flatten();
		let similarity = match row.try_get::<Option<f64>, _>("similarity") {
			Ok(value) => value,
			Err(_) => row.try_get::<Option<f32>, _>("similarity").ok().flatten().map(f64::from),
		};

		Ok(Self { id, track_name, artists, album_name, similarity })
	}
}
