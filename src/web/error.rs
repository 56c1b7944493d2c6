use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

/// 頁面處理錯誤；一般業務錯誤直接顯示在頁面上，不走這裡
#[derive(Debug, Error)]
pub enum WebError {
    #[error("login required")]
    LoginRequired,

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("invalid form: {0}")]
    Form(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::LoginRequired => Redirect::to("/login").into_response(),
            WebError::Template(e) => {
                tracing::error!("❌ Template rendering failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Page rendering failed").into_response()
            }
            WebError::Form(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        WebError::Form(err.body_text())
    }
}

impl From<crate::server::ApiError> for WebError {
    fn from(err: crate::server::ApiError) -> Self {
        WebError::Form(err.to_string())
    }
}
