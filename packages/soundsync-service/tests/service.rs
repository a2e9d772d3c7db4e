use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::{Map, json};

use soundsync_config::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers as ProviderConfigs,
	Recommend, STRATEGY_GENERATED_SQL, Service, Storage,
};
use soundsync_domain::{CandidateQuery, Song};
use soundsync_service::{
	BoxFuture, EmbeddingProvider, Error, Providers, QUERY_REQUIRED, RecommendRequest, Result,
	SongStore, SoundSyncService, SqlGenerator,
};
use soundsync_storage::models::GeneratedRow;

struct FixedEmbedding {
	vector: Vec<f32>,
	calls: Arc<AtomicUsize>,
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vector = self.vector.clone();

		Box::pin(async move { Ok(vector) })
	}
}

struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async {
			Err(Error::Provider { message: "embedding service returned 503".to_string() })
		})
	}
}

struct FixedSql(&'static str);
impl SqlGenerator for FixedSql {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_query: &'a str,
	) -> BoxFuture<'a, String> {
		let sql = self.0.to_string();

		Box::pin(async move { sql })
	}
}

#[derive(Default)]
struct MemoryStore {
	songs: Vec<Song>,
	generated: Option<Vec<GeneratedRow>>,
	fail_candidates: bool,
	seen_queries: Mutex<Vec<CandidateQuery>>,
	seen_selects: Mutex<Vec<(String, u32)>>,
}
impl SongStore for MemoryStore {
	fn fetch_candidates<'a>(
		&'a self,
		query: &'a CandidateQuery,
	) -> BoxFuture<'a, Result<Vec<Song>>> {
		self.seen_queries.lock().unwrap_or_else(|err| err.into_inner()).push(query.clone());

		let result = if self.fail_candidates {
			Err(Error::Storage { message: "connection refused".to_string() })
		} else {
			Ok(self
				.songs
				.iter()
				.filter(|song| query.matches(song))
				.take(query.pool_size as usize)
				.cloned()
				.collect())
		};

		Box::pin(async move { result })
	}

	fn fetch_top(&self, limit: u32) -> BoxFuture<'_, Result<Vec<Song>>> {
		let songs = self.songs.iter().take(limit as usize).cloned().collect();

		Box::pin(async move { Ok(songs) })
	}

	fn run_generated_select<'a>(
		&'a self,
		select: &'a str,
		ivfflat_probes: u32,
	) -> BoxFuture<'a, Result<Vec<GeneratedRow>>> {
		self.seen_selects
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push((select.to_string(), ivfflat_probes));

		let result = self
			.generated
			.clone()
			.ok_or_else(|| Error::Storage {
				message: "syntax error at or near \"FROM\"".to_string(),
			});

		Box::pin(async move { result })
	}
}

fn song(id: i64, artist: &str, genre: &str, energy: f32, features: Vec<f32>) -> Song {
	Song {
		id,
		track_name: format!("Track {id}"),
		artists: vec![artist.to_string()],
		album_name: None,
		track_genre: genre.to_string(),
		popularity: 50.0,
		danceability: 0.5,
		energy,
		acousticness: 0.2,
		valence: 0.5,
		tempo: 120.0,
		features,
	}
}

fn catalog() -> Vec<Song> {
	vec![
		song(1, "Miles Davis", "jazz", 0.2, vec![0.3, 0.7]),
		song(2, "Queen", "rock", 0.9, vec![0.3, 0.7]),
		song(3, "Queen", "rock", 0.3, vec![0.35, 0.65]),
		song(4, "Norah Jones", "acoustic", 0.1, vec![0.0, 1.0]),
	]
}

fn test_config(strategy: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://localhost/soundsync".to_string(),
				pool_max_conns: 1,
			},
			vector_dim: 2,
		},
		providers: ProviderConfigs {
			embedding: EmbeddingProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				path: "/embed".to_string(),
				api_key: None,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			sql_generator: Some(LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			}),
		},
		recommend: Recommend { strategy: strategy.to_string(), ..Recommend::default() },
	}
}

fn service(store: Arc<MemoryStore>, embedding: Arc<dyn EmbeddingProvider>) -> SoundSyncService {
	SoundSyncService::with_parts(
		test_config("rerank"),
		store,
		Providers::new(embedding, Arc::new(FixedSql("SELECT 1"))),
	)
}

fn fixed_embedding(vector: Vec<f32>) -> (Arc<FixedEmbedding>, Arc<AtomicUsize>) {
	let calls = Arc::new(AtomicUsize::new(0));

	(Arc::new(FixedEmbedding { vector, calls: calls.clone() }), calls)
}

#[tokio::test]
async fn energetic_rock_ranks_high_energy_song_first() {
	let store = Arc::new(MemoryStore { songs: catalog(), ..MemoryStore::default() });
	let (embedding, calls) = fixed_embedding(vec![1.0, 0.0]);
	let service = service(store.clone(), embedding);
	let response = service
		.recommend(RecommendRequest::new("energetic rock songs"))
		.await
		.expect("Recommendation must succeed.");

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(response.query, "energetic rock songs");
	// Genre intent narrows the pool to rock; the high-energy boost lifts song 2 past song 3.
	assert_eq!(
		response.results.iter().map(|item| item.song.id.as_str()).collect::<Vec<_>>(),
		vec!["2", "3"]
	);
	assert_eq!(response.results[0].song.artists, "Queen");
	assert_eq!(response.results[0].song.album_name, "");

	let seen = store.seen_queries.lock().expect("lock poisoned");

	assert_eq!(seen[0].genre.as_deref(), Some("rock"));
	assert_eq!(seen[0].pool_size, 2_000);
}

#[tokio::test]
async fn filters_are_validated_and_echoed() {
	let store = Arc::new(MemoryStore { songs: catalog(), ..MemoryStore::default() });
	let (embedding, _) = fixed_embedding(vec![0.0, 1.0]);
	let service = service(store, embedding);
	let response = service
		.recommend(
			RecommendRequest::new("something to listen to")
				.with_filters(json!({ "limit": 2, "max_energy": 0.25, "min_tempo": "fast" })),
		)
		.await
		.expect("Recommendation must succeed.");
	let json = serde_json::to_value(&response).expect("serialize failed");

	assert_eq!(json["filters"], json!({ "limit": 2, "max_energy": 0.25 }));
	assert_eq!(response.results.len(), 2);
	assert_eq!(response.results[0].song.id, "4");
	assert!(response.results.iter().all(|item| item.similarity <= 1.0));
}

#[tokio::test]
async fn artist_phrase_restricts_candidates() {
	let store = Arc::new(MemoryStore { songs: catalog(), ..MemoryStore::default() });
	let (embedding, _) = fixed_embedding(vec![1.0, 1.0]);
	let service = service(store, embedding);
	let response = service
		.recommend(RecommendRequest::new("songs by queen"))
		.await
		.expect("Recommendation must succeed.");

	assert!(!response.results.is_empty());
	assert!(response.results.iter().all(|item| item.song.artists == "Queen"));
}

#[tokio::test]
async fn empty_pool_is_an_empty_success() {
	let store = Arc::new(MemoryStore::default());
	let (embedding, _) = fixed_embedding(vec![1.0, 0.0]);
	let response = service(store, embedding)
		.recommend(RecommendRequest::new("anything at all"))
		.await
		.expect("Recommendation must succeed.");

	assert!(response.results.is_empty());
}

#[tokio::test]
async fn invalid_query_is_rejected_before_embedding() {
	let store = Arc::new(MemoryStore { songs: catalog(), ..MemoryStore::default() });
	let (embedding, calls) = fixed_embedding(vec![1.0, 0.0]);
	let service = service(store, embedding);

	for query in [None, Some(json!(7)), Some(json!("")), Some(json!({ "text": "rock" }))] {
		let err = service
			.recommend(RecommendRequest { query, filters: None })
			.await
			.expect_err("Invalid query must fail.");

		assert!(
			matches!(&err, Error::InvalidRequest { message } if message == QUERY_REQUIRED),
			"Unexpected error: {err}"
		);
	}

	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn provider_and_store_failures_propagate() {
	let store = Arc::new(MemoryStore { songs: catalog(), ..MemoryStore::default() });
	let err = service(store, Arc::new(FailingEmbedding))
		.recommend(RecommendRequest::new("rock"))
		.await
		.expect_err("Embedding failure must fail the request.");

	assert!(matches!(err, Error::Provider { .. }));

	let store = Arc::new(MemoryStore { fail_candidates: true, ..MemoryStore::default() });
	let (embedding, _) = fixed_embedding(vec![1.0, 0.0]);
	let err = service(store, embedding)
		.recommend(RecommendRequest::new("rock"))
		.await
		.expect_err("Store failure must fail the request.");

	assert!(matches!(err, Error::Storage { .. }));
}

#[tokio::test]
async fn generated_sql_strategy_runs_the_select_part() {
	let store = Arc::new(MemoryStore {
		songs: catalog(),
		generated: Some(vec![GeneratedRow {
			id: "2".to_string(),
			track_name: "Track 2".to_string(),
			artists: Some("Queen".to_string()),
			album_name: None,
			similarity: None,
		}]),
		..MemoryStore::default()
	});
	let (embedding, calls) = fixed_embedding(vec![1.0, 0.0]);
	let service = SoundSyncService::with_parts(
		test_config(STRATEGY_GENERATED_SQL),
		store.clone(),
		Providers::new(
			embedding,
			Arc::new(FixedSql(
				"SET ivfflat.probes = 10;\nSELECT id, track_name FROM songs LIMIT 10;",
			)),
		),
	);
	let response = service
		.recommend(RecommendRequest::new("songs by queen"))
		.await
		.expect("Recommendation must succeed.");

	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(response.results.len(), 1);
	assert_eq!(response.results[0].similarity, 1.0);

	let selects = store.seen_selects.lock().expect("lock poisoned");

	assert_eq!(selects[0], ("SELECT id, track_name FROM songs LIMIT 10".to_string(), 10));
}

#[tokio::test]
async fn failed_generated_select_falls_back_to_plain_read() {
	let store = Arc::new(MemoryStore { songs: catalog(), ..MemoryStore::default() });
	let (embedding, _) = fixed_embedding(vec![1.0, 0.0]);
	let service = SoundSyncService::with_parts(
		test_config(STRATEGY_GENERATED_SQL),
		store,
		Providers::new(embedding, Arc::new(FixedSql("not sql at all"))),
	);
	let response = service
		.recommend(RecommendRequest::new("rock").with_filters(json!({ "limit": 3 })))
		.await
		.expect("Fallback must succeed.");

	assert_eq!(response.results.len(), 3);
	assert!(response.results.iter().all(|item| item.similarity == 1.0));
}
