// Server-rendered frontend: wallet login, registration pages, chain views

pub mod error;
pub mod handlers;
pub mod session;
pub mod state;
pub mod views;

use crate::server::health;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use handlers::{blockchain, dashboard, documents, login, media, patents};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use state::{SharedState, WebState};

pub fn router(state: WebState, max_upload_bytes: usize) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Login
        .route("/", get(login::index))
        .route("/login", get(login::login_page))
        .route("/login/challenge", post(login::challenge))
        .route("/login/authenticate", post(login::authenticate))
        .route("/logout", post(login::logout))
        .route("/dashboard", get(dashboard::dashboard))
        // Documents
        .route("/pdf", get(documents::pdf_page).post(documents::pdf_submit))
        .route("/textual", get(documents::textual_page))
        .route("/textual/check", post(documents::textual_check))
        .route("/textual/register", post(documents::textual_register))
        // Media
        .route("/image", get(media::image_index))
        .route(
            "/image/upload",
            get(media::image_upload_page).post(media::image_upload),
        )
        .route("/image/results", get(media::image_results))
        .route("/image/register", post(media::image_register))
        .route("/video", get(media::video_page).post(media::video_submit))
        .route("/video/register", post(media::video_register))
        // Blockchain
        .route("/wallet", get(blockchain::wallet_page))
        .route("/wallet/history/{token_id}", get(blockchain::history_page))
        .route(
            "/transfer",
            get(blockchain::transfer_page).post(blockchain::transfer_submit),
        )
        // Related patents
        .route("/patents", get(patents::patents_page))
        .route("/patents/validate", post(patents::validate_keyword))
        .route("/patents/search", get(patents::search))
        .route("/patents/registered", get(patents::registered))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
