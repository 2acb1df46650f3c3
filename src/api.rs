use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::models::{
    EstimateRequest, EstimateResult, HealthStatus, PingResponse, TestUploadResponse, UploadedFile,
};
use crate::services::CarbonEstimator;

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const IMAGE_FIELD: &str = "image";

pub struct AppState {
    /// `None` when no OpenRouter key is configured
    pub estimator: Option<Arc<CarbonEstimator>>,
    pub ping_message: String,
}

/// Glue-layer failures, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotConfigured,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            ApiError::BadRequest(format!("Upload error: {}", err.body_text()))
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        ApiError::BadRequest(format!("File upload failed: {}", err.body_text()))
    }
}

fn too_large() -> ApiError {
    ApiError::BadRequest("File too large. Maximum size is 5MB.".to_string())
}

struct UploadedImage {
    file_name: String,
    content_type: String,
    data: Bytes,
}

impl UploadedImage {
    fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Reads the `image` field, enforcing the image/* type and the 5 MB cap.
/// Returns the names of any other fields alongside it.
async fn read_image_field(
    mut multipart: Multipart,
) -> Result<(Option<UploadedImage>, Vec<String>), ApiError> {
    let mut image = None;
    let mut other_fields = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name != IMAGE_FIELD {
            other_fields.push(name);
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest(
                "File upload failed: Only image files are allowed".to_string(),
            ));
        }
        let file_name = field.file_name().unwrap_or_default().to_string();

        let data = field.bytes().await?;
        if data.len() > MAX_IMAGE_BYTES {
            return Err(too_large());
        }

        image = Some(UploadedImage {
            file_name,
            content_type,
            data,
        });
    }

    Ok((image, other_fields))
}

pub fn create_router(state: AppState, static_dir: Option<&str>) -> Router {
    let router = Router::new()
        .route("/api/ping", get(ping_handler))
        .route("/api/health", get(health_handler))
        .route("/api/estimate", post(estimate_handler))
        .route("/api/estimate/image", post(estimate_image_handler))
        .route("/api/test-upload", post(test_upload_handler))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state));

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

async fn ping_handler(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        message: state.ping_message.clone(),
    })
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let api_configured = state.estimator.is_some();

    Json(HealthStatus {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        api_configured,
        message: if api_configured {
            "Carbon Footprint Estimator is ready"
        } else {
            "OpenRouter API key not configured"
        },
    })
}

async fn estimate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<EstimateResult>, ApiError> {
    let dish = payload
        .ok()
        .and_then(|Json(request)| request.dish)
        .map(|dish| dish.trim().to_string())
        .filter(|dish| !dish.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Invalid request. 'dish' field is required and must be a non-empty string."
                    .to_string(),
            )
        })?;

    let estimator = state.estimator.as_ref().ok_or_else(|| {
        log::error!("❌ OPENROUTER_API_KEY not configured");
        ApiError::NotConfigured
    })?;

    log::info!("🍽️ Estimating carbon footprint for: {}", dish);
    Ok(Json(estimator.estimate_from_text(&dish).await))
}

async fn estimate_image_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EstimateResult>, ApiError> {
    let (image, _) = read_image_field(multipart?).await?;
    let image = image.ok_or_else(|| {
        ApiError::BadRequest(
            "No image file uploaded. Please provide an image file in the 'image' field."
                .to_string(),
        )
    })?;

    log::info!(
        "📸 File received: {}, size: {}, type: {}",
        image.file_name,
        image.data.len(),
        image.content_type
    );

    let estimator = state.estimator.as_ref().ok_or_else(|| {
        log::error!("❌ OPENROUTER_API_KEY not configured");
        ApiError::NotConfigured
    })?;

    let result = estimator.estimate_from_image(&image.data_url()).await;
    log::info!("✅ Image estimate ready: {}", result.dish);
    Ok(Json(result))
}

async fn test_upload_handler(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let (image, received) = read_image_field(multipart?).await?;

    let Some(image) = image else {
        let body = json!({ "error": "No image file uploaded in test", "received": received });
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    };

    Ok(Json(TestUploadResponse {
        success: true,
        file: UploadedFile {
            originalname: image.file_name,
            mimetype: image.content_type,
            size: image.data.len(),
        },
        message: "Test upload successful",
    })
    .into_response())
}
