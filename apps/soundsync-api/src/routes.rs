use axum::{
	Json, Router,
	body::Bytes,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use crate::state::AppState;
use soundsync_service::{Error, QUERY_REQUIRED, RecommendRequest, RecommendResponse};

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INTERNAL_ERROR: &str = "Internal server error";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/recommend", post(recommend).fallback(method_not_allowed))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn recommend(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<Json<RecommendResponse>, ApiError> {
	let request = parse_request(&body)?;
	let response = state.service.recommend(request).await?;

	Ok(Json(response))
}

async fn method_not_allowed() -> ApiError {
	ApiError::new(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}

/// Any body that is not a JSON object is treated as a request without a query.
fn parse_request(body: &[u8]) -> Result<RecommendRequest, ApiError> {
	let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
		return Err(ApiError::new(StatusCode::BAD_REQUEST, QUERY_REQUIRED));
	};

	Ok(RecommendRequest { query: fields.remove("query"), filters: fields.remove("filters") })
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, message: impl Into<String>) -> Self {
		Self { status, message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => Self::new(StatusCode::BAD_REQUEST, message),
			Error::Provider { .. } | Error::Storage { .. } => {
				tracing::error!(error = %err, "Recommendation failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(ErrorBody { error: self.message })).into_response()
	}
}
