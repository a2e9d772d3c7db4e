use sqlx::{Postgres, QueryBuilder};

use crate::{
	Error, Result,
	db::Db,
	models::{GeneratedRow, SongRow},
	vector,
};
use soundsync_domain::{CandidateQuery, Song};

const SONG_COLUMNS: &str = "\
SELECT
	id,
	track_name,
	artists,
	album_name,
	track_genre,
	popularity,
	danceability,
	energy,
	acousticness,
	valence,
	tempo,
	features::text AS features
FROM songs
WHERE TRUE";

/// Candidate pool for ranking. Every present constraint narrows the result.
pub async fn fetch_candidates(db: &Db, query: &CandidateQuery) -> Result<Vec<Song>> {
	let mut builder = candidate_query_builder(query);
	let rows: Vec<SongRow> = builder.build_query_as().fetch_all(&db.pool).await?;

	rows.into_iter().map(Song::try_from).collect()
}

/// Plain unscored read used when a generated statement cannot run.
pub async fn fetch_top(db: &Db, limit: u32) -> Result<Vec<Song>> {
	let mut builder = QueryBuilder::<Postgres>::new(SONG_COLUMNS);

	builder.push(" ORDER BY popularity DESC, id LIMIT ");
	builder.push_bind(i64::from(limit));

	let rows: Vec<SongRow> = builder.build_query_as().fetch_all(&db.pool).await?;

	rows.into_iter().map(Song::try_from).collect()
}

/// Runs one generated `SELECT` inside a read-only transaction.
pub async fn run_generated_select(
	db: &Db,
	select: &str,
	ivfflat_probes: u32,
) -> Result<Vec<GeneratedRow>> {
	let select = select.trim();

	if !select.starts_with("SELECT") || select.contains(';') {
		return Err(Error::InvalidArgument(
			"Generated SQL must be a single SELECT statement.".to_string(),
		));
	}

	let mut tx = db.pool.begin().await?;

	sqlx::query("SET TRANSACTION READ ONLY").execute(&mut *tx).await?;
	sqlx::query(&format!("SET LOCAL ivfflat.probes = {ivfflat_probes}")).execute(&mut *tx).await?;

	let rows = sqlx::query(select).fetch_all(&mut *tx).await?;

	tx.rollback().await?;

	rows.iter().map(GeneratedRow::from_row).collect()
}

pub async fn upsert_songs(db: &Db, songs: &[Song]) -> Result<u64> {
	let mut tx = db.pool.begin().await?;
	let mut written = 0;

	for song in songs {
		let result = sqlx::query(
			"\
INSERT INTO songs (
	id,
	track_name,
	artists,
	album_name,
	track_genre,
	popularity,
	danceability,
	energy,
	acousticness,
	valence,
	tempo,
	features
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12::text::vector)
ON CONFLICT (id) DO UPDATE
SET
	track_name = EXCLUDED.track_name,
	artists = EXCLUDED.artists,
	album_name = EXCLUDED.album_name,
	track_genre = EXCLUDED.track_genre,
	popularity = EXCLUDED.popularity,
	danceability = EXCLUDED.danceability,
	energy = EXCLUDED.energy,
	acousticness = EXCLUDED.acousticness,
	valence = EXCLUDED.valence,
	tempo = EXCLUDED.tempo,
	features = EXCLUDED.features,
	updated_at = now()",
		)
		.bind(song.id)
		.bind(song.track_name.as_str())
		.bind(&song.artists)
		.bind(song.album_name.as_deref())
		.bind(song.track_genre.as_str())
		.bind(song.popularity)
		.bind(song.danceability)
		.bind(song.energy)
		.bind(song.acousticness)
		.bind(song.valence)
		.bind(song.tempo)
		.bind(vector::vector_to_pg(&song.features))
		.execute(&mut *tx)
		.await?;

		written += result.rows_affected();
	}

	tx.commit().await?;

	Ok(written)
}

pub(crate) fn candidate_query_builder(query: &CandidateQuery) -> QueryBuilder<'_, Postgres> {
	let mut builder = QueryBuilder::<Postgres>::new(SONG_COLUMNS);

	if let Some(genres) = query.genres.as_ref()
		&& !genres.is_empty()
	{
		builder.push(" AND track_genre = ANY(");
		builder.push_bind(genres.clone());
		builder.push(")");
	}
	if let Some(artist) = query.artist.as_deref() {
		builder.push(" AND array_to_string(artists, ', ') ILIKE ");
		builder.push_bind(like_pattern(artist));
	}
	if let Some(genre) = query.genre.as_deref() {
		builder.push(" AND track_genre ILIKE ");
		builder.push_bind(like_pattern(genre));
	}

	for (column, min, max) in [
		("popularity", query.min_popularity, query.max_popularity),
		("danceability", query.min_danceability, query.max_danceability),
		("energy", query.min_energy, query.max_energy),
		("tempo", query.min_tempo, query.max_tempo),
	] {
		if let Some(min) = min {
			builder.push(format!(" AND {column} >= "));
			builder.push_bind(min);
		}
		if let Some(max) = max {
			builder.push(format!(" AND {column} <= "));
			builder.push_bind(max);
		}
	}

	builder.push(" ORDER BY id LIMIT ");
	builder.push_bind(i64::from(query.pool_size));

	builder
}

/// `%needle%` with LIKE metacharacters escaped.
pub(crate) fn like_pattern(needle: &str) -> String {
	let mut out = String::with_capacity(needle.len() + 2);

	out.push('%');

	for ch in needle.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}
