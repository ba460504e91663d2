use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use crate::server::AppState;
use crate::code::{CountryCode, SwiftCode};
use crate::record::NewSwiftRecord;
use crate::view::{CountryView, SwiftCodeDetail};
use crate::{Error, ErrorKind};

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self { message: message.to_string() })
    }
}

/// Error rendered as a JSON body with the matching status
#[derive(Debug)]
pub enum ApiError {
    Registry(Error),
    BadRequest(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Registry(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Registry(Error::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Validation failed", "errors": errors }),
            ),
            ApiError::Registry(e) => {
                let status = status_for(e.kind());
                let message = match &e {
                    Error::Storage(_) | Error::Io(_) | Error::Csv(_) => {
                        tracing::error!("Request failed: {}", e);
                        "Internal server error.".to_string()
                    }
                    other => other.to_string(),
                };
                (status, json!({ "message": message }))
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            ApiError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "Internal server error." }))
            }
        };

        let mut body = body;
        body["statusCode"] = json!(status.as_u16());
        (status, Json(body)).into_response()
    }
}

/// Run a registry call off the async workers; SQLite calls block.
async fn blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> crate::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

pub async fn get_swift_code(
    State(state): State<Arc<AppState>>,
    Path(swift_code): Path<String>,
) -> Result<Json<SwiftCodeDetail>, ApiError> {
    tracing::info!("Received request: GET /v1/swift-codes/{}", swift_code);
    let code = SwiftCode::parse(&swift_code)?;

    let detail = blocking(state, move |s| s.registry.find_one(&code)).await?;
    Ok(Json(detail))
}

pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(country_iso2): Path<String>,
) -> Result<Json<CountryView>, ApiError> {
    tracing::info!("Received request: GET /v1/swift-codes/country/{}", country_iso2);
    let country = CountryCode::parse(&country_iso2)?;

    let view = blocking(state, move |s| s.registry.find_by_country(&country)).await?;
    Ok(Json(view))
}

pub async fn create_swift_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewSwiftRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(candidate) = payload?;
    tracing::info!(
        "Received request: POST /v1/swift-codes with code {}",
        candidate.swift_code.as_deref().unwrap_or("<missing>")
    );

    blocking(state, move |s| s.registry.create(&candidate)).await?;
    Ok((StatusCode::CREATED, MessageResponse::new("SWIFT code added successfully.")))
}

pub async fn delete_swift_code(
    State(state): State<Arc<AppState>>,
    Path(swift_code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    tracing::info!("Received request: DELETE /v1/swift-codes/{}", swift_code);
    let code = SwiftCode::parse(&swift_code)?;

    blocking(state, move |s| s.registry.remove(&code)).await?;
    Ok(MessageResponse::new("SWIFT code deleted successfully."))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let records = blocking(state, |s| s.registry.store().count()).await?;
    Ok(Json(json!({ "status": "ok", "records": records })))
}
