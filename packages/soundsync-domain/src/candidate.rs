use crate::{QueryIntent, Song, ValidatedFilters};

/// Everything the song store needs to narrow the candidate pool for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
	pub genres: Option<Vec<String>>,
	/// Case-insensitive substring over the comma-joined artist list.
	pub artist: Option<String>,
	/// Case-insensitive substring over `track_genre`.
	pub genre: Option<String>,
	pub min_popularity: Option<f64>,
	pub max_popularity: Option<f64>,
	pub min_danceability: Option<f64>,
	pub max_danceability: Option<f64>,
	pub min_energy: Option<f64>,
	pub max_energy: Option<f64>,
	pub min_tempo: Option<f64>,
	pub max_tempo: Option<f64>,
	pub pool_size: u32,
}
impl CandidateQuery {
	pub fn new(filters: &ValidatedFilters, intent: &QueryIntent, pool_size: u32) -> Self {
		Self {
			genres: filters.genres.clone(),
			artist: intent.artist_filter.clone(),
			genre: intent.genre_filter.clone(),
			min_popularity: filters.min_popularity,
			max_popularity: filters.max_popularity,
			min_danceability: filters.min_danceability,
			max_danceability: filters.max_danceability,
			min_energy: filters.min_energy,
			max_energy: filters.max_energy,
			min_tempo: filters.min_tempo,
			max_tempo: filters.max_tempo,
			pool_size,
		}
	}

	/// Reference predicate for the store contract. The Postgres store expresses the same
	/// conditions in SQL.
	pub fn matches(&self, song: &Song) -> bool {
		if let Some(genres) = self.genres.as_ref()
			&& !genres.is_empty()
			&& !genres.iter().any(|genre| genre == &song.track_genre)
		{
			return false;
		}
		if let Some(artist) = self.artist.as_deref()
			&& !contains_ignore_case(&song.artists_display(), artist)
		{
			return false;
		}
		if let Some(genre) = self.genre.as_deref()
			&& !contains_ignore_case(&song.track_genre, genre)
		{
			return false;
		}

		within(song.popularity, self.min_popularity, self.max_popularity)
			&& within(song.danceability, self.min_danceability, self.max_danceability)
			&& within(song.energy, self.min_energy, self.max_energy)
			&& within(song.tempo, self.min_tempo, self.max_tempo)
	}
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
	haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn within(value: f32, min: Option<f64>, max: Option<f64>) -> bool {
	let value = f64::from(value);

	min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}
