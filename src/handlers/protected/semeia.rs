use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthUser};
use crate::state::AppState;

use super::{json_body, JsonBody};

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ImageAnalysis {
    pub analysis: String,
}

/// POST /api/semeia/chat - `{ "message": "..." }`
pub async fn chat(
    State(state): State<AppState>,
    _user: AuthUser,
    body: JsonBody,
) -> ApiResult<ChatResponse> {
    let body = json_body(body)?;
    let message = body
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;

    let response = state.assistant.chat(message).await.map_err(|e| {
        tracing::error!("SemeIA chat failed: {}", e);
        ApiError::internal_server_error("Failed to process message with AI")
    })?;
    Ok(Json(ChatResponse { response }))
}

/// POST /api/semeia/analyze-image - multipart with an `image` file part
pub async fn analyze_image(
    State(state): State<AppState>,
    _user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ImageAnalysis> {
    let mut multipart = multipart?;
    let max_bytes = state.config.api.max_upload_bytes;
    let mut image = None;
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::bad_request("Only image files are allowed"));
        }

        // The cap applies to the file itself, not the multipart framing around it
        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::payload_too_large("Uploaded file too large"));
            }
            bytes.extend_from_slice(&chunk);
        }
        image = Some((bytes, content_type));
        break;
    }

    let (bytes, content_type) = image
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("Image file is required"))?;

    let analysis = state
        .assistant
        .analyze_image(&bytes, &content_type)
        .await
        .map_err(|e| {
            tracing::error!("SemeIA image analysis failed: {}", e);
            ApiError::internal_server_error("Failed to analyze image")
        })?;
    Ok(Json(ImageAnalysis { analysis }))
}
