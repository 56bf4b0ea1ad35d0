//! Route handlers and response envelopes.

use std::collections::HashSet;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use gstx_core::{InvoiceRecord, KeywordScan, PipelineError, UploadError};

use super::{AppState, StoredExtraction};
use crate::service::ServiceError;

/// Error returned as `{"detail": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    fn not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Extraction {} not found", id))
    }

    fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Extraction model is not available. Check the API key configuration.",
        )
    }

    fn from_multipart(e: MultipartError) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NoModel => Self::unavailable(),
            ServiceError::Upload(UploadError::TooLarge { limit, .. }) => Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File size too large. Maximum size is {} bytes", limit),
            ),
            ServiceError::Upload(e) => Self::bad_request(e.to_string()),
            ServiceError::Image(e) => Self::bad_request(e.to_string()),
            ServiceError::Pipeline(e) => Self::bad_request(e.to_string()),
            ServiceError::Model(e) => {
                error!("Model call failed: {}", e);
                Self::new(StatusCode::BAD_GATEWAY, e.to_string())
            }
        }
    }
}

/// Envelope returned by the extraction endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<InvoiceRecord>,
    pub extraction_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub invoice_text: String,
}

#[derive(Debug, Serialize)]
struct ExtractionSummary {
    extraction_id: String,
    timestamp: DateTime<Utc>,
    invoice_number: String,
    supplier_name: String,
    total_amount: f64,
}

/// Store a successful extraction or turn a failure into an envelope/status.
fn finish(
    state: &AppState,
    result: Result<InvoiceRecord, ServiceError>,
    source: &str,
) -> Result<Json<ExtractionResponse>, ApiError> {
    match result {
        Ok(record) => {
            let entry = StoredExtraction::new(record.clone());
            let extraction_id = entry.id.clone();
            let timestamp = entry.timestamp;
            state.store.insert(entry);
            info!(extraction_id = %extraction_id, "Stored {} extraction", source);

            Ok(Json(ExtractionResponse {
                success: true,
                message: format!("Invoice data extracted successfully from {}", source),
                data: Some(record),
                extraction_id: Some(extraction_id),
                timestamp,
            }))
        }
        Err(ServiceError::Pipeline(PipelineError::EmptyInput)) => {
            Err(ApiError::bad_request("Invoice text cannot be empty"))
        }
        Err(ServiceError::Pipeline(e)) => {
            warn!(kind = e.kind(), "Extraction failed: {}", e);
            Ok(Json(ExtractionResponse {
                success: false,
                message: format!("Failed to extract data from the {} ({}): {}", source, e.kind(), e),
                data: None,
                extraction_id: None,
                timestamp: Utc::now(),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "GST Invoice Data Extractor API",
        "status": "active",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "extract_from_image": "/extract/image",
            "extract_from_text": "/extract/text",
            "scan_text": "/scan/text",
            "get_extraction": "/extraction/{extraction_id}",
            "download_extraction": "/extraction/{extraction_id}/download",
            "list_extractions": "/extractions",
            "stats": "/stats"
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let model_status = if state.service.has_model() {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "gemini_api": model_status,
        "total_extractions": state.store.len(),
    }))
}

pub async fn extract_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, ApiError> {
    if !state.service.has_model() {
        return Err(ApiError::unavailable());
    }

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(ApiError::from_multipart)? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
            upload = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    if bytes.len() as u64 > state.max_upload_bytes {
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "File size too large. Maximum size is {} bytes",
                state.max_upload_bytes
            ),
        ));
    }

    let result = state.service.extract_image(filename.as_deref(), &bytes).await;
    finish(&state, result, "image")
}

pub async fn extract_text(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Result<Json<ExtractionResponse>, ApiError> {
    if !state.service.has_model() {
        return Err(ApiError::unavailable());
    }

    let result = state.service.extract_text(&request.invoice_text).await;
    finish(&state, result, "text")
}

pub async fn scan_text(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Result<Json<KeywordScan>, ApiError> {
    if request.invoice_text.trim().is_empty() {
        return Err(ApiError::bad_request("Invoice text cannot be empty"));
    }

    Ok(Json(state.scanner.scan(&request.invoice_text)))
}

pub async fn get_extraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let entry = state.store.get(&id).ok_or_else(|| ApiError::not_found(&id))?;

    Ok(Json(json!({
        "extraction_id": entry.id,
        "data": entry.record,
        "timestamp": entry.timestamp,
    })))
}

pub async fn delete_extraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.store.remove(&id) {
        return Err(ApiError::not_found(&id));
    }

    Ok(Json(json!({
        "message": format!("Extraction {} deleted successfully", id)
    })))
}

pub async fn download_extraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let entry = state.store.get(&id).ok_or_else(|| ApiError::not_found(&id))?;

    let body = serde_json::to_string_pretty(&entry.record)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let disposition = format!("attachment; filename=\"gst_invoice_{}.json\"", id);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn list_extractions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let extractions: Vec<ExtractionSummary> = state
        .store
        .list()
        .into_iter()
        .map(|entry| ExtractionSummary {
            extraction_id: entry.id,
            timestamp: entry.timestamp,
            invoice_number: entry.record.invoice_details.invoice_number,
            supplier_name: entry.record.supplier_details.name,
            total_amount: entry.record.total_values.total_invoice_value_numbers,
        })
        .collect();

    Json(json!({
        "total_extractions": extractions.len(),
        "extractions": extractions,
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let entries = state.store.list();

    let total_amount: f64 = entries
        .iter()
        .map(|e| e.record.total_values.total_invoice_value_numbers)
        .sum();
    let suppliers: HashSet<&str> = entries
        .iter()
        .map(|e| e.record.supplier_details.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .collect();

    Json(json!({
        "total_extractions": entries.len(),
        "total_invoice_amount": total_amount,
        "unique_suppliers": suppliers.len(),
        "api_status": "active",
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Endpoint not found")
}
