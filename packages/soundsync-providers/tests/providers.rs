use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use soundsync_config::{EmbeddingProviderConfig, LlmProviderConfig};
use soundsync_providers::{embedding, sql_generator};

async fn spawn(app: Router) -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind mock server.");
	let addr = listener.local_addr().expect("Mock server must have an address.");

	tokio::spawn(async move {
		let _ = axum::serve(listener, app).await;
	});

	addr
}

fn embedding_config(api_base: String) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		api_base,
		path: "/embed".to_string(),
		api_key: None,
		timeout_ms: 2_000,
		default_headers: Map::new(),
	}
}

fn generator_config(api_base: String) -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base,
		api_key: "test-key".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: "test".to_string(),
		temperature: 0.0,
		timeout_ms: 2_000,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers = soundsync_providers::auth_headers(Some("secret"), &Map::new())
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn omits_auth_header_without_key() {
	let headers =
		soundsync_providers::auth_headers(None, &Map::new()).expect("Failed to build headers.");

	assert!(headers.get(AUTHORIZATION).is_none());
}

#[test]
fn rejects_non_string_default_headers() {
	let mut extra = Map::new();

	extra.insert("x-retries".to_string(), Value::from(3));

	assert!(soundsync_providers::auth_headers(None, &extra).is_err());
}

#[tokio::test]
async fn embed_posts_text_and_reads_vector() {
	let app = Router::new().route(
		"/embed",
		post(|Json(body): Json<Value>| async move {
			let text = body.get("text").and_then(Value::as_str).unwrap_or_default();

			Json(serde_json::json!({ "vector": [text.len() as f64, 0.5] }))
		}),
	);
	let addr = spawn(app).await;
	let cfg = embedding_config(format!("http://{addr}"));
	let vector = embedding::embed(&cfg, "calm").await.expect("Embedding must succeed.");

	assert_eq!(vector, vec![4.0, 0.5]);
}

#[tokio::test]
async fn embed_treats_error_status_as_failure() {
	let app = Router::new().route("/embed", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
	let addr = spawn(app).await;
	let cfg = embedding_config(format!("http://{addr}"));

	assert!(embedding::embed(&cfg, "calm").await.is_err());
}

#[tokio::test]
async fn generator_sanitizes_fenced_output() {
	let app = Router::new().route(
		"/v1/chat/completions",
		post(|| async {
			Json(serde_json::json!({
				"choices": [{
					"message": {
						"content": "```sql\nSET ivfflat.probes = 10;\n\
							SELECT id, features <=> q AS similarity FROM songs LIMIT 5;\n```"
					}
				}]
			}))
		}),
	);
	let addr = spawn(app).await;
	let cfg = generator_config(format!("http://{addr}"));
	let sql = sql_generator::generate(&cfg, "songs by queen").await;

	assert_eq!(
		sql,
		"SET ivfflat.probes = 10;\nSELECT id, features <-> q AS similarity FROM songs LIMIT 5;"
	);
}

#[tokio::test]
async fn generator_falls_back_when_unreachable() {
	let cfg = generator_config("http://127.0.0.1:1".to_string());
	let sql = sql_generator::generate(&cfg, "songs by queen").await;

	assert_eq!(sql, sql_generator::FALLBACK_SQL);
}

#[tokio::test]
async fn generator_falls_back_on_empty_content() {
	let app = Router::new().route(
		"/v1/chat/completions",
		post(|| async {
			Json(serde_json::json!({ "choices": [{ "message": { "content": "" } }] }))
		}),
	);
	let addr = spawn(app).await;
	let cfg = generator_config(format!("http://{addr}"));

	assert_eq!(sql_generator::generate(&cfg, "anything").await, sql_generator::FALLBACK_SQL);
}
