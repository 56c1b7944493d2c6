use crate::core::Ledger;
use crate::domain::model::{
    AssetKind, AssetMetadata, DocumentPin, HistoryEntry, PinReceipt, RegisterRequest,
    RegisterResponse, TokenRecord, TransferRequest, TransferResponse,
};
use crate::server::{health, ApiError, ApiJson, UploadForm};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn router(ledger: Ledger, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/ipfs/upload", post(upload_document))
        .route("/ipfs/registerImage", post(register_image))
        .route("/ipfs/registerVideo", post(register_video))
        .route("/blockchain/register", post(register))
        .route("/blockchain/tokens/{wallet}", get(tokens))
        .route("/blockchain/transfer", post(transfer))
        .route("/blockchain/history/{token_id}", get(history))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ledger)
}

async fn upload_document(
    State(ledger): State<Ledger>,
    multipart: Multipart,
) -> ApiResult<DocumentPin> {
    let mut form = UploadForm::read(multipart).await?;
    let upload = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("File is missing in the request.".to_string()))?;
    let title = form.text("title");
    let author = form.text("author");

    let hash = ledger
        .pin_document(&upload, title.as_deref(), author.as_deref())
        .await?;
    Ok(Json(DocumentPin { hash }))
}

async fn register_image(
    State(ledger): State<Ledger>,
    ApiJson(metadata): ApiJson<AssetMetadata>,
) -> ApiResult<PinReceipt> {
    Ok(Json(ledger.pin_asset_metadata(AssetKind::Image, &metadata).await?))
}

async fn register_video(
    State(ledger): State<Ledger>,
    ApiJson(metadata): ApiJson<AssetMetadata>,
) -> ApiResult<PinReceipt> {
    Ok(Json(ledger.pin_asset_metadata(AssetKind::Video, &metadata).await?))
}

async fn register(
    State(ledger): State<Ledger>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let ipfs_hash = request.ipfs_hash.unwrap_or_default();
    let wallet_address = request.wallet_address.unwrap_or_default();
    if let Some(property_type) = request.property_type.as_deref() {
        tracing::debug!("Registering {} property", property_type);
    }

    let token_id = ledger.register(&ipfs_hash, &wallet_address).await?;
    Ok(Json(RegisterResponse {
        token_id: token_id.to_string(),
    }))
}

async fn tokens(
    State(ledger): State<Ledger>,
    Path(wallet): Path<String>,
) -> ApiResult<Vec<TokenRecord>> {
    Ok(Json(ledger.tokens_of(&wallet).await?))
}

async fn transfer(
    State(ledger): State<Ledger>,
    ApiJson(request): ApiJson<TransferRequest>,
) -> ApiResult<TransferResponse> {
    let to = request
        .to
        .ok_or_else(|| ApiError::BadRequest("to is required.".to_string()))?;
    let token_id = request
        .token_id
        .ok_or_else(|| ApiError::BadRequest("tokenId is required.".to_string()))?;

    let tx_hash = ledger
        .transfer(request.from.as_deref(), &to, &token_id)
        .await?;
    Ok(Json(TransferResponse {
        success: true,
        tx_hash,
    }))
}

async fn history(
    State(ledger): State<Ledger>,
    Path(token_id): Path<String>,
) -> ApiResult<Vec<HistoryEntry>> {
    Ok(Json(ledger.history(&token_id).await?))
}
