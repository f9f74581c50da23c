use crate::service::AudioMatchService;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use audiomatch_core::{MatchReport, ServiceError};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AudioMatchService>,
    pub engine_name: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/process_audio/", post(process_audio))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Error body matching the original surface: `{"detail": "..."}`.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// Body-limit overruns get a clear message; other multipart read
    /// errors keep the transport error text.
    fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                detail: "uploaded file too large".to_string(),
            }
        } else {
            Self::bad_request(err.to_string())
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match err {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

async fn process_audio(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<MatchReport>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut expected_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(ApiError::from_multipart)?;
                file = Some((filename, data.to_vec()));
            }
            Some("expected_text") => {
                expected_text = Some(field.text().await.map_err(ApiError::from_multipart)?);
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let expected_text =
        expected_text.ok_or_else(|| ApiError::bad_request("expected_text is required"))?;

    let report = state
        .service
        .handle(&filename, &data, &expected_text)
        .await?;
    tracing::info!(
        matched = report.matched,
        "processed '{filename}' ({} bytes)",
        data.len(),
    );
    Ok(Json(report))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "engine": state.engine_name,
    }))
}
