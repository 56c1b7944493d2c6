use crate::adapters::http::UpstreamReply;
use crate::adapters::SimilarityClient;
use crate::domain::model::{AssetKind, PatentQuery, PatentTrainRequest};
use crate::server::{health, ApiError, ApiJson, UploadForm};
use crate::utils::error::Result;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct UploadGatewayState {
    pub similarity: Arc<SimilarityClient>,
}

pub fn router(similarity: SimilarityClient, max_upload_bytes: usize) -> Router {
    let state = UploadGatewayState {
        similarity: Arc::new(similarity),
    };

    Router::new()
        .route("/api/PdfSimilarityApi/train", post(train_pdf))
        .route("/api/PdfSimilarityApi/check", post(check_pdf))
        .route("/api/ImageSimilarityApi/train-image", post(train_image))
        .route("/api/ImageSimilarityApi/check-image", post(check_image))
        .route("/api/VideoSimilarityApi/train-video", post(train_video))
        .route("/api/VideoSimilarityApi/check-video", post(check_video))
        .route("/api/PatentSimilarityApi/train-patent", post(train_patent))
        .route(
            "/api/PatentSimilarityApi/check-patent-similarity",
            post(check_patent),
        )
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Check,
    Train,
}

/// 成功時 200 + 上游本文；失敗時影片沿用上游狀態碼，其餘一律 500
fn relay(kind: Option<AssetKind>, reply: UpstreamReply) -> Response {
    let status = if reply.is_success() {
        StatusCode::OK
    } else if matches!(kind, Some(AssetKind::Video)) {
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let content_type = reply
        .content_type
        .unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
    (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
}

fn answer(result: Result<UpstreamReply>, kind: Option<AssetKind>) -> Response {
    match result {
        Ok(reply) => relay(kind, reply),
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}

async fn forward_file(
    state: &UploadGatewayState,
    kind: AssetKind,
    step: Step,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form
        .take_file(kind.form_field())
        .ok_or_else(|| ApiError::BadRequest(format!("{} file required.", kind.label())))?;

    tracing::info!(
        "📨 {:?} {} {} ({} bytes)",
        step,
        kind.label(),
        upload.file_name,
        upload.bytes.len()
    );
    let result = match step {
        Step::Check => state.similarity.relay_check(kind, &upload).await,
        Step::Train => state.similarity.relay_train(kind, &upload).await,
    };
    Ok(answer(result, Some(kind)))
}

async fn train_pdf(
    State(state): State<UploadGatewayState>,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    forward_file(&state, AssetKind::Pdf, Step::Train, multipart).await
}

async fn check_pdf(
    State(state): State<UploadGatewayState>,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    forward_file(&state, AssetKind::Pdf, Step::Check, multipart).await
}

async fn train_image(
    State(state): State<UploadGatewayState>,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    forward_file(&state, AssetKind::Image, Step::Train, multipart).await
}

async fn check_image(
    State(state): State<UploadGatewayState>,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    forward_file(&state, AssetKind::Image, Step::Check, multipart).await
}

async fn train_video(
    State(state): State<UploadGatewayState>,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    forward_file(&state, AssetKind::Video, Step::Train, multipart).await
}

async fn check_video(
    State(state): State<UploadGatewayState>,
    multipart: Multipart,
) -> std::result::Result<Response, ApiError> {
    forward_file(&state, AssetKind::Video, Step::Check, multipart).await
}

async fn train_patent(
    State(state): State<UploadGatewayState>,
    ApiJson(request): ApiJson<PatentTrainRequest>,
) -> Response {
    let result = state.similarity.relay_patent_train(&request).await;
    answer(result, None)
}

async fn check_patent(
    State(state): State<UploadGatewayState>,
    ApiJson(query): ApiJson<PatentQuery>,
) -> Response {
    let result = state.similarity.relay_patent_check(&query).await;
    answer(result, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16) -> UpstreamReply {
        UpstreamReply {
            status,
            content_type: Some("application/json".to_string()),
            body: "{}".to_string(),
        }
    }

    #[test]
    fn test_relay_status_mapping() {
        assert_eq!(relay(Some(AssetKind::Pdf), reply(201)).status(), StatusCode::OK);
        assert_eq!(
            relay(Some(AssetKind::Image), reply(422)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            relay(Some(AssetKind::Video), reply(422)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(relay(None, reply(404)).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
